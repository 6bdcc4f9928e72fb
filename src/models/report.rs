use crate::models::status::{ReportStatus, ReportType, enum_col};
use rusqlite::Row;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: i64,
    pub instansi_id: Option<i64>,
    pub generated_by: Option<i64>,
    pub report_type: ReportType,
    pub format: String,
    pub period: String,
    pub file_path: Option<String>,
    pub parameters: serde_json::Value,
    pub status: ReportStatus,
    pub generated_at: Option<String>,
    pub submitted_at: Option<String>,
    pub created_at: String,
}

impl Report {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let raw_params: String = row.get("parameters")?;
        Ok(Self {
            id: row.get("id")?,
            instansi_id: row.get("instansi_id")?,
            generated_by: row.get("generated_by")?,
            report_type: enum_col(row, "report_type")?,
            format: row.get("format")?,
            period: row.get("period")?,
            file_path: row.get("file_path")?,
            parameters: serde_json::from_str(&raw_params).unwrap_or(serde_json::Value::Null),
            status: enum_col(row, "status")?,
            generated_at: row.get("generated_at")?,
            submitted_at: row.get("submitted_at")?,
            created_at: row.get("created_at")?,
        })
    }
}
