//! Unified application error type.
//! All modules (db, core, security, api, cli) return AppError so the CLI
//! and the HTTP layer can report failures the same way.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid period: {0} (expected YYYY-MM)")]
    InvalidPeriod(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    // ---------------------------
    // Domain errors
    // ---------------------------
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    UploadRejected(String),

    #[error("{message}")]
    RateLimited { message: String, retry_after: u64 },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export format not supported: {0}")]
    InvalidExportFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// HTTP status used when the error crosses the API boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Validation(_)
            | AppError::InvalidDate(_)
            | AppError::InvalidPeriod(_)
            | AppError::InvalidStatus(_)
            | AppError::InvalidExportFormat(_)
            | AppError::UploadRejected(_) => 422,
            AppError::NotFound(_) => 404,
            AppError::Duplicate(_) | AppError::Conflict(_) => 409,
            AppError::Unauthenticated => 401,
            AppError::Forbidden(_) => 403,
            AppError::RateLimited { .. } => 429,
            _ => 500,
        }
    }

    pub fn not_found(what: &str, id: i64) -> Self {
        AppError::NotFound(format!("{what} #{id}"))
    }
}

pub type AppResult<T> = Result<T, AppError>;
