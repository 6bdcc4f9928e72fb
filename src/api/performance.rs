//! Performance data workflow and evidence uploads.

use crate::api::extract::{AuthUser, SanitizedJson};
use crate::api::{AppState, created, message, ok, run_db};
use crate::core::evidence::EvidenceLogic;
use crate::core::performance::PerformanceLogic;
use crate::core::rbac::{ASSESSOR, DATA_COLLECTOR, DASHBOARD_VIEW};
use crate::db::queries::performance::DataFilter;
use crate::errors::{AppError, AppResult};
use crate::models::performance_data::{PerformanceData, PerformanceDataInput};
use crate::models::status::{DataStatus, DbEnum};
use crate::security::sanitize::sanitize_str;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::TryStreamExt;
use rusqlite::Connection;
use serde::Deserialize;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/performance-data")
            .route(web::get().to(list))
            .route(web::post().to(create)),
    )
    .service(
        web::resource("/performance-data/{id}")
            .route(web::get().to(show))
            .route(web::put().to(update))
            .route(web::delete().to(destroy)),
    )
    .route("/performance-data/{id}/submit", web::post().to(submit))
    .route("/performance-data/{id}/validate", web::post().to(validate))
    .route("/performance-data/{id}/reject", web::post().to(reject))
    .route("/performance-data/{id}/quality", web::get().to(quality))
    .service(
        web::resource("/performance-data/{id}/evidence")
            .route(web::get().to(list_evidence))
            .route(web::post().to(upload_evidence)),
    );
}

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    pub instansi_id: Option<i64>,
    pub indicator_id: Option<i64>,
    pub status: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RejectRequest {
    reason: Option<String>,
}

fn can_collect(state: &AppState, user: &AuthUser) -> AppResult<()> {
    user.require(DATA_COLLECTOR)?;
    user.throttle(state, "api")
}

/// Rows of another instansi look missing to a user scoped to their own.
fn visible_row(conn: &Connection, id: i64, scope: Option<i64>) -> AppResult<PerformanceData> {
    let row = PerformanceLogic::get(conn, id)?;
    match scope {
        Some(own) if own != row.instansi_id => Err(AppError::not_found("Performance data", id)),
        _ => Ok(row),
    }
}

async fn list(
    state: web::Data<AppState>,
    user: AuthUser,
    q: web::Query<DataQuery>,
) -> AppResult<HttpResponse> {
    user.require(DASHBOARD_VIEW)?;
    user.throttle(&state, "api")?;

    let q = q.into_inner();
    let instansi_id = user.scope(q.instansi_id);
    let status = q.status.as_deref().map(DataStatus::parse).transpose()?;
    let rows = run_db(&state, move |conn, _| {
        let filter = DataFilter {
            instansi_id,
            indicator_id: q.indicator_id,
            status,
            period_prefix: q.period.as_deref(),
        };
        PerformanceLogic::list(conn, &filter)
    })
    .await?;
    Ok(ok(rows))
}

async fn show(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require(DASHBOARD_VIEW)?;
    user.throttle(&state, "api")?;
    let (id, scope) = (id.into_inner(), user.scope(None));

    let row = run_db(&state, move |conn, _| visible_row(conn, id, scope)).await?;
    Ok(ok(row))
}

async fn quality(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require(DASHBOARD_VIEW)?;
    user.throttle(&state, "api")?;
    let (id, scope) = (id.into_inner(), user.scope(None));

    let report = run_db(&state, move |conn, _| {
        visible_row(conn, id, scope)?;
        PerformanceLogic::check_quality(conn, id)
    })
    .await?;
    Ok(ok(report))
}

async fn create(
    state: web::Data<AppState>,
    user: AuthUser,
    body: SanitizedJson<PerformanceDataInput>,
) -> AppResult<HttpResponse> {
    can_collect(&state, &user)?;
    let mut input = body.0;
    input.instansi_id = user.scope(input.instansi_id);

    let by = Some(user.id());
    let row = run_db(&state, move |conn, _| PerformanceLogic::create(conn, input, by)).await?;
    Ok(created(row))
}

async fn update(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    body: SanitizedJson<PerformanceDataInput>,
) -> AppResult<HttpResponse> {
    can_collect(&state, &user)?;
    let (id, scope) = (id.into_inner(), user.scope(None));
    let mut input = body.0;
    if input.instansi_id.is_some() {
        input.instansi_id = user.scope(input.instansi_id);
    }

    let row = run_db(&state, move |conn, _| {
        visible_row(conn, id, scope)?;
        PerformanceLogic::update(conn, id, input)
    })
    .await?;
    Ok(ok(row))
}

async fn destroy(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_collect(&state, &user)?;
    let (id, scope) = (id.into_inner(), user.scope(None));
    run_db(&state, move |conn, _| {
        visible_row(conn, id, scope)?;
        PerformanceLogic::delete(conn, id)
    })
    .await?;
    Ok(message("Performance data deleted"))
}

async fn submit(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    can_collect(&state, &user)?;
    let (id, by, scope) = (id.into_inner(), Some(user.id()), user.scope(None));
    let row = run_db(&state, move |conn, _| {
        visible_row(conn, id, scope)?;
        PerformanceLogic::submit(conn, id, by)
    })
    .await?;
    Ok(ok(row))
}

async fn validate(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require(ASSESSOR)?;
    user.throttle(&state, "api")?;
    let (id, scope) = (id.into_inner(), user.scope(None));
    let row = run_db(&state, move |conn, _| {
        visible_row(conn, id, scope)?;
        PerformanceLogic::validate(conn, id)
    })
    .await?;
    Ok(ok(row))
}

async fn reject(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    body: SanitizedJson<RejectRequest>,
) -> AppResult<HttpResponse> {
    user.require(ASSESSOR)?;
    user.throttle(&state, "api")?;
    let (id, scope) = (id.into_inner(), user.scope(None));
    let reason = body.0.reason;
    let row = run_db(&state, move |conn, _| {
        visible_row(conn, id, scope)?;
        PerformanceLogic::reject(conn, id, reason)
    })
    .await?;
    Ok(ok(row))
}

async fn list_evidence(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require(DASHBOARD_VIEW)?;
    user.throttle(&state, "api")?;
    let (id, scope) = (id.into_inner(), user.scope(None));
    let docs = run_db(&state, move |conn, _| {
        visible_row(conn, id, scope)?;
        EvidenceLogic::list(conn, id)
    })
    .await?;
    Ok(ok(docs))
}

/// Multipart form with a `file` part and an optional `description` part.
async fn upload_evidence(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<i64>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    user.require(DATA_COLLECTOR)?;
    user.throttle(&state, "upload")?;
    let (id, scope) = (id.into_inner(), user.scope(None));
    run_db(&state, move |conn, _| visible_row(conn, id, scope)).await?;

    // One byte over the limit is enough for the size check to reject.
    let cap = state.config.max_upload_size as usize + 1;
    let bad_form = |e: actix_multipart::MultipartError| {
        AppError::UploadRejected(format!("Malformed multipart body: {e}"))
    };

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut description: Option<String> = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_form)? {
        let (name, file_name) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or_default().to_string(),
                cd.get_filename().map(str::to_string),
            ),
            None => continue,
        };

        let mut buf = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_form)? {
            if buf.len() < cap {
                let room = cap - buf.len();
                buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }
        }

        match name.as_str() {
            "file" => file = Some((file_name.unwrap_or_default(), buf)),
            "description" => description = Some(sanitize_str(&String::from_utf8_lossy(&buf))),
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| {
        AppError::UploadRejected("The file field is required.".into())
    })?;

    let by = Some(user.id());
    let doc = run_db(&state, move |conn, cfg| {
        EvidenceLogic::attach(conn, cfg, id, &file_name, &bytes, description, by)
    })
    .await?;
    Ok(created(doc))
}
