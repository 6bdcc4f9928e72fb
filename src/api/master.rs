//! Master data: instansi, programs, kegiatan, indicators and targets.

use crate::api::extract::{AuthUser, SanitizedJson};
use crate::api::{AppState, created, message, ok, run_db};
use crate::core::indicator::IndicatorLogic;
use crate::core::instansi::InstansiLogic;
use crate::core::kegiatan::KegiatanLogic;
use crate::core::program::ProgramLogic;
use crate::core::rbac::{ADMIN, DASHBOARD_VIEW};
use crate::core::target::TargetLogic;
use crate::errors::AppResult;
use crate::models::indicator::IndicatorInput;
use crate::models::instansi::InstansiInput;
use crate::models::kegiatan::KegiatanInput;
use crate::models::program::ProgramInput;
use crate::models::status::{DbEnum, IndicatorCategory};
use crate::models::target::TargetInput;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/instansi")
            .route(web::get().to(list_instansi))
            .route(web::post().to(create_instansi)),
    )
    .service(
        web::resource("/instansi/{id}")
            .route(web::get().to(show_instansi))
            .route(web::put().to(update_instansi))
            .route(web::delete().to(delete_instansi)),
    )
    .service(
        web::resource("/programs")
            .route(web::get().to(list_programs))
            .route(web::post().to(create_program)),
    )
    .service(
        web::resource("/programs/{id}")
            .route(web::get().to(show_program))
            .route(web::put().to(update_program))
            .route(web::delete().to(delete_program)),
    )
    .service(
        web::resource("/kegiatan")
            .route(web::get().to(list_kegiatan))
            .route(web::post().to(create_kegiatan)),
    )
    .service(
        web::resource("/kegiatan/{id}")
            .route(web::get().to(show_kegiatan))
            .route(web::put().to(update_kegiatan))
            .route(web::delete().to(delete_kegiatan)),
    )
    .service(
        web::resource("/performance-indicators")
            .route(web::get().to(list_indicators))
            .route(web::post().to(create_indicator)),
    )
    .service(
        web::resource("/performance-indicators/{id}")
            .route(web::get().to(show_indicator))
            .route(web::put().to(update_indicator))
            .route(web::delete().to(delete_indicator)),
    )
    .service(
        web::resource("/targets")
            .route(web::get().to(list_targets))
            .route(web::post().to(create_target)),
    )
    .service(
        web::resource("/targets/{id}")
            .route(web::get().to(show_target))
            .route(web::put().to(update_target))
            .route(web::delete().to(delete_target)),
    )
    .route("/targets/{id}/approve", web::post().to(approve_target))
    .route("/targets/{id}/reject", web::post().to(reject_target));
}

fn can_read(state: &AppState, user: &AuthUser) -> AppResult<()> {
    user.require(DASHBOARD_VIEW)?;
    user.throttle(state, "api")
}

fn can_write(state: &AppState, user: &AuthUser) -> AppResult<()> {
    user.require(ADMIN)?;
    user.throttle(state, "admin")
}

#[derive(Debug, Default, Deserialize)]
pub struct MasterQuery {
    pub instansi_id: Option<i64>,
    pub program_id: Option<i64>,
    pub indicator_id: Option<i64>,
    pub tahun: Option<i32>,
    pub year: Option<i32>,
    pub category: Option<String>,
}

//
// Instansi
//

async fn list_instansi(state: web::Data<AppState>, user: AuthUser) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let rows = run_db(&state, |conn, _| InstansiLogic::list(conn)).await?;
    Ok(ok(rows))
}

async fn show_instansi(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| InstansiLogic::get(conn, id)).await?;
    Ok(ok(row))
}

async fn create_instansi(
    state: web::Data<AppState>,
    user: AuthUser,
    body: SanitizedJson<InstansiInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let row = run_db(&state, move |conn, _| InstansiLogic::create(conn, body.0)).await?;
    Ok(created(row))
}

async fn update_instansi(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    body: SanitizedJson<InstansiInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| InstansiLogic::update(conn, id, body.0)).await?;
    Ok(ok(row))
}

async fn delete_instansi(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    run_db(&state, move |conn, _| InstansiLogic::delete(conn, id)).await?;
    Ok(message("Instansi deleted"))
}

//
// Programs
//

async fn list_programs(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<MasterQuery>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let instansi = user.scope(q.instansi_id);
    let tahun = q.tahun.or(q.year);
    let rows = run_db(&state, move |conn, _| ProgramLogic::list(conn, instansi, tahun)).await?;
    Ok(ok(rows))
}

async fn show_program(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| ProgramLogic::get(conn, id)).await?;
    Ok(ok(row))
}

async fn create_program(
    state: web::Data<AppState>,
    user: AuthUser,
    body: SanitizedJson<ProgramInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let row = run_db(&state, move |conn, _| ProgramLogic::create(conn, body.0)).await?;
    Ok(created(row))
}

async fn update_program(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    body: SanitizedJson<ProgramInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| ProgramLogic::update(conn, id, body.0)).await?;
    Ok(ok(row))
}

async fn delete_program(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    run_db(&state, move |conn, _| ProgramLogic::delete(conn, id)).await?;
    Ok(message("Program deleted"))
}

//
// Kegiatan
//

async fn list_kegiatan(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<MasterQuery>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let program = q.program_id;
    let rows = run_db(&state, move |conn, _| KegiatanLogic::list(conn, program)).await?;
    Ok(ok(rows))
}

async fn show_kegiatan(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| KegiatanLogic::get(conn, id)).await?;
    Ok(ok(row))
}

async fn create_kegiatan(
    state: web::Data<AppState>,
    user: AuthUser,
    body: SanitizedJson<KegiatanInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let row = run_db(&state, move |conn, _| KegiatanLogic::create(conn, body.0)).await?;
    Ok(created(row))
}

async fn update_kegiatan(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    body: SanitizedJson<KegiatanInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| KegiatanLogic::update(conn, id, body.0)).await?;
    Ok(ok(row))
}

async fn delete_kegiatan(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    run_db(&state, move |conn, _| KegiatanLogic::delete(conn, id)).await?;
    Ok(message("Kegiatan deleted"))
}

//
// Performance indicators
//

async fn list_indicators(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<MasterQuery>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let instansi = user.scope(q.instansi_id);
    let category = q.category.as_deref().map(IndicatorCategory::parse).transpose()?;
    let rows = run_db(&state, move |conn, _| IndicatorLogic::list(conn, instansi, category)).await?;
    Ok(ok(rows))
}

async fn show_indicator(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| IndicatorLogic::get(conn, id)).await?;
    Ok(ok(row))
}

async fn create_indicator(
    state: web::Data<AppState>,
    user: AuthUser,
    body: SanitizedJson<IndicatorInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let row = run_db(&state, move |conn, _| IndicatorLogic::create(conn, body.0)).await?;
    Ok(created(row))
}

async fn update_indicator(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    body: SanitizedJson<IndicatorInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| IndicatorLogic::update(conn, id, body.0)).await?;
    Ok(ok(row))
}

async fn delete_indicator(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    run_db(&state, move |conn, _| IndicatorLogic::delete(conn, id)).await?;
    Ok(message("Indicator deleted"))
}

//
// Targets
//

async fn list_targets(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<MasterQuery>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let (indicator, year) = (q.indicator_id, q.year);
    let rows = run_db(&state, move |conn, _| TargetLogic::list(conn, indicator, year)).await?;
    Ok(ok(rows))
}

async fn show_target(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_read(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| TargetLogic::get(conn, id)).await?;
    Ok(ok(row))
}

async fn create_target(
    state: web::Data<AppState>,
    user: AuthUser,
    body: SanitizedJson<TargetInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let row = run_db(&state, move |conn, _| TargetLogic::create(conn, body.0)).await?;
    Ok(created(row))
}

async fn update_target(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    body: SanitizedJson<TargetInput>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| TargetLogic::update(conn, id, body.0)).await?;
    Ok(ok(row))
}

async fn delete_target(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    run_db(&state, move |conn, _| TargetLogic::delete(conn, id)).await?;
    Ok(message("Target deleted"))
}

async fn approve_target(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| TargetLogic::approve(conn, id)).await?;
    Ok(ok(row))
}

async fn reject_target(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_write(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| TargetLogic::reject(conn, id)).await?;
    Ok(ok(row))
}
