//! Closed vocabularies stored as TEXT columns.

use crate::errors::{AppError, AppResult};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Enum ⇄ DB string mapping shared by every status column.
pub trait DbEnum: Sized + Copy + 'static {
    const LABEL: &'static str;
    const ALL: &'static [Self];

    /// Convert enum → DB string
    fn to_db_str(&self) -> &'static str;

    /// Convert DB string → enum
    fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.to_db_str() == s)
    }

    /// Parse user input (case-insensitive) with a descriptive error.
    fn parse(s: &str) -> AppResult<Self> {
        Self::from_db_str(&s.trim().to_lowercase()).ok_or_else(|| {
            let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.to_db_str()).collect();
            AppError::InvalidStatus(format!(
                "{} '{}' (expected one of: {})",
                Self::LABEL,
                s,
                allowed.join(", ")
            ))
        })
    }
}

/// Read a status column, failing the row mapping on unknown values.
pub fn enum_col<T: DbEnum>(row: &Row, col: &str) -> rusqlite::Result<T> {
    let raw: String = row.get(col)?;
    T::from_db_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidStatus(format!("{} '{}'", T::LABEL, raw))),
        )
    })
}

pub fn opt_enum_col<T: DbEnum>(row: &Row, col: &str) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(r) => T::from_db_str(&r).map(Some).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(AppError::InvalidStatus(format!("{} '{}'", T::LABEL, r))),
            )
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstansiStatus {
    Aktif,
    Nonaktif,
}

impl DbEnum for InstansiStatus {
    const LABEL: &'static str = "instansi status";
    const ALL: &'static [Self] = &[Self::Aktif, Self::Nonaktif];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Aktif => "aktif",
            Self::Nonaktif => "nonaktif",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    Draft,
    Aktif,
    Selesai,
}

impl DbEnum for ProgramStatus {
    const LABEL: &'static str = "program status";
    const ALL: &'static [Self] = &[Self::Draft, Self::Aktif, Self::Selesai];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Aktif => "aktif",
            Self::Selesai => "selesai",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KegiatanStatus {
    Draft,
    Berjalan,
    Selesai,
    Tunda,
}

impl DbEnum for KegiatanStatus {
    const LABEL: &'static str = "kegiatan status";
    const ALL: &'static [Self] = &[Self::Draft, Self::Berjalan, Self::Selesai, Self::Tunda];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Berjalan => "berjalan",
            Self::Selesai => "selesai",
            Self::Tunda => "tunda",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Input,
    Output,
    Outcome,
    Impact,
}

impl DbEnum for IndicatorCategory {
    const LABEL: &'static str = "indicator category";
    const ALL: &'static [Self] = &[Self::Input, Self::Output, Self::Outcome, Self::Impact];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Outcome => "outcome",
            Self::Impact => "impact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Semester,
    Annual,
}

impl DbEnum for Frequency {
    const LABEL: &'static str = "frequency";
    const ALL: &'static [Self] = &[Self::Monthly, Self::Quarterly, Self::Semester, Self::Annual];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Semester => "semester",
            Self::Annual => "annual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Draft,
    Approved,
    Rejected,
    Revised,
}

impl DbEnum for TargetStatus {
    const LABEL: &'static str = "target status";
    const ALL: &'static [Self] = &[Self::Draft, Self::Approved, Self::Rejected, Self::Revised];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Revised => "revised",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    Draft,
    Submitted,
    Validated,
    Rejected,
}

impl DbEnum for DataStatus {
    const LABEL: &'static str = "data status";
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Submitted,
        Self::Validated,
        Self::Rejected,
    ];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }
}

impl DataStatus {
    /// Draft and rejected rows are still owned by the collector.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl DbEnum for DataQuality {
    const LABEL: &'static str = "data quality";
    const ALL: &'static [Self] = &[Self::Excellent, Self::Good, Self::Fair, Self::Poor];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Pending,
    InReview,
    Completed,
    Approved,
}

impl DbEnum for AssessmentStatus {
    const LABEL: &'static str = "assessment status";
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::InReview,
        Self::Completed,
        Self::Approved,
    ];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Completed => "completed",
            Self::Approved => "approved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Generating,
    Completed,
    Failed,
    Submitted,
}

impl DbEnum for ReportStatus {
    const LABEL: &'static str = "report status";
    const ALL: &'static [Self] = &[
        Self::Generating,
        Self::Completed,
        Self::Failed,
        Self::Submitted,
    ];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    PerformanceSummary,
    AchievementTrends,
    ComplianceStatus,
    IndicatorComparison,
}

impl DbEnum for ReportType {
    const LABEL: &'static str = "report type";
    const ALL: &'static [Self] = &[
        Self::PerformanceSummary,
        Self::AchievementTrends,
        Self::ComplianceStatus,
        Self::IndicatorComparison,
    ];

    fn to_db_str(&self) -> &'static str {
        match self {
            Self::PerformanceSummary => "performance_summary",
            Self::AchievementTrends => "achievement_trends",
            Self::ComplianceStatus => "compliance_status",
            Self::IndicatorComparison => "indicator_comparison",
        }
    }
}

impl ReportType {
    pub fn title(&self) -> &'static str {
        match self {
            Self::PerformanceSummary => "Performance summary",
            Self::AchievementTrends => "Achievement trends",
            Self::ComplianceStatus => "Compliance status",
            Self::IndicatorComparison => "Indicator comparison",
        }
    }
}
