use crate::api::extract::{AuthUser, SanitizedJson};
use crate::api::{AppState, created, ok, run_db};
use crate::core::rbac::{DASHBOARD_VIEW, PIMPINAN};
use crate::core::report::ReportLogic;
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::models::status::{DbEnum, ReportType};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/reports")
            .route(web::get().to(list))
            .route(web::post().to(generate)),
    )
    .route("/reports/{id}", web::get().to(show))
    .route("/reports/{id}/submit", web::post().to(submit));
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub instansi_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    report_type: String,
    format: Option<String>,
    period: Option<String>,
    instansi_id: Option<i64>,
}

async fn list(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<ReportQuery>,
) -> AppResult<HttpResponse> {
    user.require(DASHBOARD_VIEW)?;
    user.throttle(&state, "api")?;
    let instansi = user.scope(q.instansi_id);
    let rows = run_db(&state, move |conn, _| ReportLogic::list(conn, instansi)).await?;
    Ok(ok(rows))
}

async fn show(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require(DASHBOARD_VIEW)?;
    user.throttle(&state, "api")?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| ReportLogic::get(conn, id)).await?;
    Ok(ok(row))
}

/// Generation runs inline; a failed write still returns the recorded row.
async fn generate(
    state: web::Data<AppState>,
    user: AuthUser,
    body: SanitizedJson<GenerateRequest>,
) -> AppResult<HttpResponse> {
    user.require(PIMPINAN)?;
    user.throttle(&state, "report_generation")?;

    let req = body.0;
    let report_type = ReportType::parse(&req.report_type)?;
    let format = ExportFormat::parse(req.format.as_deref().unwrap_or("pdf"))?;
    let instansi = user.scope(req.instansi_id);
    let by = Some(user.id());

    let report = run_db(&state, move |conn, cfg| {
        ReportLogic::generate(
            conn,
            cfg,
            report_type,
            format,
            req.period.as_deref(),
            instansi,
            by,
        )
    })
    .await?;
    Ok(created(report))
}

async fn submit(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require(PIMPINAN)?;
    user.throttle(&state, "api")?;
    let id = id.into_inner();
    let row = run_db(&state, move |conn, _| ReportLogic::submit(conn, id)).await?;
    Ok(ok(row))
}
