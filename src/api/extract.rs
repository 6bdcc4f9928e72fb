//! Request extractors: bearer-token principal and sanitised JSON bodies.

use crate::api::{AppState, run_db};
use crate::core::rbac::CROSS_INSTITUTION;
use crate::core::users::UserLogic;
use crate::errors::{AppError, AppResult};
use crate::models::user::Principal;
use crate::security::sanitize::sanitize_value;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The caller behind `Authorization: Bearer <token>`. Missing or unknown
/// tokens fail extraction with 401.
pub struct AuthUser {
    pub principal: Principal,
    pub token: String,
    pub ip: String,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.principal.user.id
    }

    pub fn require(&self, permission: &str) -> AppResult<()> {
        if self.principal.can(permission) {
            Ok(())
        } else {
            log::warn!("user {} denied: missing {permission}", self.id());
            Err(AppError::Forbidden(format!(
                "Unauthorized: missing permission {permission}"
            )))
        }
    }

    /// Users bound to an instansi only see that instansi unless they may
    /// look across institutions.
    pub fn scope(&self, requested: Option<i64>) -> Option<i64> {
        match self.principal.user.instansi_id {
            Some(own) if !self.principal.can(CROSS_INSTITUTION) => Some(own),
            _ => requested,
        }
    }

    /// Count a hit against the named limit, keyed by user id.
    pub fn throttle(&self, state: &AppState, limit: &str) -> AppResult<()> {
        state.limiter.hit(limit, &format!("user:{}", self.id()))
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);
        let ip = client_ip(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| AppError::Other("application state missing".into()))?;
            let token = token.ok_or(AppError::Unauthenticated)?;

            let lookup = token.clone();
            let principal =
                run_db(&state, move |conn, _| UserLogic::resolve_token(conn, &lookup)).await?;
            Ok(AuthUser {
                principal,
                token,
                ip,
            })
        })
    }
}

/// JSON body with every non-exempt string sanitised before it is
/// deserialised. An empty body reads as `{}`.
pub struct SanitizedJson<T>(pub T);

impl<T: DeserializeOwned + 'static> FromRequest for SanitizedJson<T> {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Bytes::from_request(req, payload);

        Box::pin(async move {
            let bytes = body.await?;
            let invalid = |e: serde_json::Error| AppError::Validation(format!("Invalid JSON body: {e}"));

            let mut value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
                Value::Object(Default::default())
            } else {
                serde_json::from_slice(&bytes).map_err(invalid)?
            };
            sanitize_value(&mut value);

            let inner = serde_json::from_value(value).map_err(invalid)?;
            Ok(SanitizedJson(inner))
        })
    }
}
