use crate::models::status::{AssessmentStatus, enum_col};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub id: i64,
    pub performance_data_id: i64,
    pub assessed_by: Option<i64>,
    pub overall_score: Option<f64>,
    pub grade: Option<String>,
    pub comments: Option<String>,
    pub recommendations: Option<String>,
    pub status: AssessmentStatus,
    pub assessed_at: Option<String>,
    pub approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Assessment {
    /// `grade` is derived from the configured scale, not stored.
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            performance_data_id: row.get("performance_data_id")?,
            assessed_by: row.get("assessed_by")?,
            overall_score: row.get("overall_score")?,
            grade: None,
            comments: row.get("comments")?,
            recommendations: row.get("recommendations")?,
            status: enum_col(row, "status")?,
            assessed_at: row.get("assessed_at")?,
            approved_at: row.get("approved_at")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssessmentInput {
    pub performance_data_id: Option<i64>,
    pub overall_score: Option<f64>,
    pub comments: Option<String>,
    pub recommendations: Option<String>,
}
