use crate::models::status::{DataQuality, DataStatus, enum_col, opt_enum_col};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// One realisation figure for an indicator in a `YYYY-MM` period.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceData {
    pub id: i64,
    pub indicator_id: i64,
    pub instansi_id: i64,
    pub submitted_by: Option<i64>,
    pub period: String,
    pub actual_value: f64,
    pub notes: Option<String>,
    pub status: DataStatus,
    pub data_quality: Option<DataQuality>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<String>,
    pub validated_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PerformanceData {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            indicator_id: row.get("indicator_id")?,
            instansi_id: row.get("instansi_id")?,
            submitted_by: row.get("submitted_by")?,
            period: row.get("period")?,
            actual_value: row.get("actual_value")?,
            notes: row.get("notes")?,
            status: enum_col(row, "status")?,
            data_quality: opt_enum_col(row, "data_quality")?,
            rejection_reason: row.get("rejection_reason")?,
            submitted_at: row.get("submitted_at")?,
            validated_at: row.get("validated_at")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Year part of the period.
    pub fn year(&self) -> i32 {
        self.period
            .get(0..4)
            .and_then(|y| y.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceDataInput {
    pub indicator_id: Option<i64>,
    pub instansi_id: Option<i64>,
    pub period: Option<String>,
    pub actual_value: Option<f64>,
    pub notes: Option<String>,
    pub data_quality: Option<DataQuality>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityIssue {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Outcome of the data quality checks on one row.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub data_id: i64,
    pub achievement_percentage: f64,
    /// 100 minus 20 per critical issue and 5 per warning, floored at 0.
    pub quality_score: f64,
    pub severity: Severity,
    pub is_valid: bool,
    pub suggested_quality: DataQuality,
    pub issues: Vec<QualityIssue>,
}
