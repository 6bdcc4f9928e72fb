//! Versioned JSON API (`/api/v1`) over the same `*Logic` operations the
//! CLI uses.

pub mod assessments;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod master;
pub mod performance;
pub mod reports;
pub mod system;

use crate::config::{Config, Environment};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::security::headers::security_headers;
use crate::security::rate_limit::RateLimiter;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer, web};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Mutex;

/// Shared by every worker. SQLite access is serialised through the mutex.
pub struct AppState {
    pub pool: Mutex<DbPool>,
    pub config: Config,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let limiter = RateLimiter::new(config.rate_limits.clone());
        Self {
            pool: Mutex::new(pool),
            config,
            limiter,
        }
    }

    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection, &Config) -> AppResult<T>) -> AppResult<T> {
        let pool = self
            .pool
            .lock()
            .map_err(|_| AppError::Other("database lock poisoned".into()))?;
        f(&pool.conn, &self.config)
    }
}

/// Run a database closure on the blocking thread pool.
pub async fn run_db<T, F>(state: &web::Data<AppState>, f: F) -> AppResult<T>
where
    F: FnOnce(&Connection, &Config) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    web::block(move || state.with_conn(f))
        .await
        .map_err(|e| AppError::Other(e.to_string()))?
}

/// `{"success": true, "data": ...}`
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": data }))
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(serde_json::json!({ "success": true, "data": data }))
}

pub fn message(text: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": text }))
}

/// Security headers for every response.
pub fn default_headers(env: Environment) -> DefaultHeaders {
    security_headers(env)
        .into_iter()
        .fold(DefaultHeaders::new(), |h, pair| h.add(pair))
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {err}")).into())
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(system::routes)
            .configure(auth::routes)
            .configure(dashboard::routes)
            .configure(master::routes)
            .configure(performance::routes)
            .configure(assessments::routes)
            .configure(reports::routes),
    );
}

/// Open the database and wrap it for the server.
pub fn build_state(config: Config) -> AppResult<web::Data<AppState>> {
    let pool = crate::db::open(&config)?;
    Ok(web::Data::new(AppState::new(pool, config)))
}

/// `sakip serve`: blocks until the server stops.
pub fn serve(config: Config, host: &str, port: u16) -> AppResult<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let env = config.environment;
    let state = build_state(config)?;
    log::info!("starting SAKIP API on http://{host}:{port}/api/v1 ({env:?})");

    let addr = (host.to_string(), port);
    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .app_data(json_config())
                .wrap(default_headers(env))
                .wrap(Logger::default())
                .configure(routes)
        })
        .bind(addr)?
        .run()
        .await
    })?;
    Ok(())
}
