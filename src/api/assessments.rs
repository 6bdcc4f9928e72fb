use crate::api::extract::{AuthUser, SanitizedJson};
use crate::api::{AppState, created, ok, run_db};
use crate::core::assessment::AssessmentLogic;
use crate::core::rbac::{ASSESSOR, PIMPINAN};
use crate::errors::AppResult;
use crate::models::assessment::AssessmentInput;
use crate::models::status::{AssessmentStatus, DbEnum};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/assessments")
            .route(web::get().to(list))
            .route(web::post().to(create)),
    )
    .service(
        web::resource("/assessments/{id}")
            .route(web::get().to(show))
            .route(web::put().to(update)),
    )
    .route("/assessments/{id}/complete", web::post().to(complete))
    .route("/assessments/{id}/approve", web::post().to(approve));
}

#[derive(Debug, Default, Deserialize)]
pub struct AssessmentQuery {
    pub status: Option<String>,
}

fn can_assess(state: &AppState, user: &AuthUser) -> AppResult<()> {
    user.require(ASSESSOR)?;
    user.throttle(state, "api")
}

async fn list(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<AssessmentQuery>,
) -> AppResult<HttpResponse> {
    can_assess(&state, &user)?;
    let status = q.status.as_deref().map(AssessmentStatus::parse).transpose()?;
    let rows = run_db(&state, move |conn, cfg| AssessmentLogic::list(conn, cfg, status)).await?;
    Ok(ok(rows))
}

async fn show(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_assess(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, cfg| AssessmentLogic::get(conn, cfg, id)).await?;
    Ok(ok(row))
}

async fn create(
    state: web::Data<AppState>,
    user: AuthUser,
    body: SanitizedJson<AssessmentInput>,
) -> AppResult<HttpResponse> {
    can_assess(&state, &user)?;
    let by = Some(user.id());
    let row = run_db(&state, move |conn, cfg| {
        AssessmentLogic::create(conn, cfg, body.0, by)
    })
    .await?;
    Ok(created(row))
}

async fn update(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    body: SanitizedJson<AssessmentInput>,
) -> AppResult<HttpResponse> {
    can_assess(&state, &user)?;
    let (id, by) = (id.into_inner(), Some(user.id()));
    let row = run_db(&state, move |conn, cfg| {
        AssessmentLogic::update(conn, cfg, id, body.0, by)
    })
    .await?;
    Ok(ok(row))
}

async fn complete(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_assess(&state, &user)?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, cfg| AssessmentLogic::complete(conn, cfg, id)).await?;
    Ok(ok(row))
}

/// Sign-off is reserved for leadership.
async fn approve(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require(PIMPINAN)?;
    user.throttle(&state, "api")?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, cfg| AssessmentLogic::approve(conn, cfg, id)).await?;
    Ok(ok(row))
}
