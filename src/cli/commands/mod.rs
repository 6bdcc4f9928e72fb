pub mod assessment;
pub mod backup;
pub mod classes;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod db;
pub mod export;
pub mod indicator;
pub mod init;
pub mod instansi;
pub mod kegiatan;
pub mod log;
pub mod permissions;
pub mod program;
pub mod report;
pub mod role;
pub mod seed;
pub mod serve;
pub mod target;
pub mod test_users;
pub mod upload;
pub mod user;

use crate::errors::AppResult;
use crate::models::status::DbEnum;

/// Parse an optional enum flag such as `--status`.
pub(crate) fn parse_opt<T: DbEnum>(value: &Option<String>) -> AppResult<Option<T>> {
    value.as_deref().map(T::parse).transpose()
}

/// Print a serialisable value as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| crate::errors::AppError::Other(e.to_string()))?;
    println!("{text}");
    Ok(())
}
