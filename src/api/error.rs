use crate::errors::AppError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// `{"success": false, "message": ...}`; 429 adds `retry_after` and the
    /// `Retry-After` header. Internal errors are logged, not echoed.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);

        match self {
            AppError::RateLimited {
                message,
                retry_after,
            } => builder
                .insert_header(("Retry-After", retry_after.to_string()))
                .json(serde_json::json!({
                    "success": false,
                    "message": message,
                    "retry_after": retry_after,
                })),
            _ if status.is_server_error() => {
                log::error!("request failed: {self}");
                builder.json(serde_json::json!({
                    "success": false,
                    "message": "Server Error",
                }))
            }
            _ => builder.json(serde_json::json!({
                "success": false,
                "message": self.to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn rate_limit_carries_retry_after() {
        let err = AppError::RateLimited {
            message: "Too many requests. Please try again later.".into(),
            retry_after: 42,
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get("Retry-After").unwrap(), "42");

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["retry_after"], 42);
        assert_eq!(json["success"], false);
    }

    #[actix_web::test]
    async fn internal_errors_are_not_echoed() {
        let resp = AppError::Other("disk on fire".into()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("disk"));
    }
}
