use crate::api::extract::AuthUser;
use crate::api::{AppState, ok, run_db};
use crate::core::dashboard::DashboardLogic;
use crate::core::rbac::DASHBOARD_VIEW;
use crate::errors::AppResult;
use crate::models::status::{DbEnum, IndicatorCategory};
use crate::utils::date::{current_year, parse_year};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(overview))
        .route("/dashboard/summary", web::get().to(summary))
        .route("/dashboard/trends", web::get().to(trends))
        .route("/dashboard/compliance", web::get().to(compliance))
        .route("/dashboard/comparison", web::get().to(comparison));
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub instansi_id: Option<i64>,
    pub indicator_id: Option<i64>,
    pub periods: Option<i64>,
    pub category: Option<String>,
}

impl DashboardQuery {
    fn year(&self) -> AppResult<i32> {
        parse_year(self.year.unwrap_or_else(current_year))
    }
}

/// Permission, throttle and instansi scoping shared by every dashboard view.
fn guard(state: &AppState, user: &AuthUser, q: &DashboardQuery) -> AppResult<Option<i64>> {
    user.require(DASHBOARD_VIEW)?;
    user.throttle(state, "dashboard")?;
    Ok(user.scope(q.instansi_id))
}

async fn overview(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<DashboardQuery>,
) -> AppResult<HttpResponse> {
    let instansi = guard(&state, &user, &q)?;
    let year = q.year()?;
    let data = run_db(&state, move |conn, _| DashboardLogic::dashboard(conn, instansi, year)).await?;
    Ok(ok(data))
}

async fn summary(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<DashboardQuery>,
) -> AppResult<HttpResponse> {
    let instansi = guard(&state, &user, &q)?;
    let year = q.year()?;
    let data = run_db(&state, move |conn, _| {
        DashboardLogic::performance_summary(conn, instansi, year)
    })
    .await?;
    Ok(ok(data))
}

async fn trends(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<DashboardQuery>,
) -> AppResult<HttpResponse> {
    let instansi = guard(&state, &user, &q)?;
    let indicator = q.indicator_id;
    let periods = q.periods.unwrap_or(12).clamp(1, 120);
    let data = run_db(&state, move |conn, _| {
        DashboardLogic::achievement_trends(conn, instansi, indicator, periods)
    })
    .await?;
    Ok(ok(data))
}

async fn compliance(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<DashboardQuery>,
) -> AppResult<HttpResponse> {
    let instansi = guard(&state, &user, &q)?;
    let year = q.year()?;
    let data = run_db(&state, move |conn, _| {
        DashboardLogic::compliance_status(conn, instansi, year)
    })
    .await?;
    Ok(ok(data))
}

async fn comparison(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<DashboardQuery>,
) -> AppResult<HttpResponse> {
    let instansi = guard(&state, &user, &q)?;
    let year = q.year()?;
    let category = q.category.as_deref().map(IndicatorCategory::parse).transpose()?;
    let data = run_db(&state, move |conn, _| {
        DashboardLogic::indicator_comparison(conn, instansi, year, category)
    })
    .await?;
    Ok(ok(data))
}
