use crate::api::extract::client_ip;
use crate::api::{AppState, ok};
use crate::errors::AppResult;
use actix_web::{HttpRequest, HttpResponse, web};

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/info", web::get().to(info));
}

async fn health(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    state.limiter.hit("guest", &client_ip(&req))?;
    Ok(ok(serde_json::json!({
        "status": "ok",
        "timestamp": crate::utils::date::now_str(),
    })))
}

async fn info(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    state.limiter.hit("guest", &client_ip(&req))?;
    Ok(ok(serde_json::json!({
        "name": "SAKIP API",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "institution": state.config.institution_name,
        "environment": state.config.environment,
    })))
}
