use crate::api::extract::{AuthUser, SanitizedJson, client_ip};
use crate::api::{AppState, message, ok, run_db};
use crate::core::users::UserLogic;
use crate::errors::AppResult;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/login", web::post().to(login))
        .route("/auth/logout", web::post().to(logout))
        .route("/auth/user", web::get().to(current_user));
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    device_name: Option<String>,
}

async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: SanitizedJson<LoginRequest>,
) -> AppResult<HttpResponse> {
    let body = body.0;
    state.limiter.hit_login(&body.email, &client_ip(&req))?;

    let (token, principal) = run_db(&state, move |conn, _| {
        let device = body.device_name.as_deref().unwrap_or("api");
        UserLogic::login(conn, &body.email, &body.password, device)
    })
    .await?;

    Ok(ok(serde_json::json!({
        "token": token,
        "token_type": "Bearer",
        "user": principal,
    })))
}

async fn logout(state: web::Data<AppState>, user: AuthUser) -> AppResult<HttpResponse> {
    let token = user.token.clone();
    run_db(&state, move |conn, _| UserLogic::logout(conn, &token)).await?;
    Ok(message("Logged out"))
}

async fn current_user(state: web::Data<AppState>, user: AuthUser) -> AppResult<HttpResponse> {
    user.throttle(&state, "api")?;
    Ok(ok(user.principal))
}
