use crate::models::status::{TargetStatus, enum_col};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub id: i64,
    pub indicator_id: i64,
    pub year: i32,
    pub target_value: f64,
    pub minimum_value: Option<f64>,
    pub justification: Option<String>,
    pub status: TargetStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Target {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            indicator_id: row.get("indicator_id")?,
            year: row.get("year")?,
            target_value: row.get("target_value")?,
            minimum_value: row.get("minimum_value")?,
            justification: row.get("justification")?,
            status: enum_col(row, "status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetInput {
    pub indicator_id: Option<i64>,
    pub year: Option<i32>,
    pub target_value: Option<f64>,
    pub minimum_value: Option<f64>,
    pub justification: Option<String>,
}
