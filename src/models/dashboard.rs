//! Dashboard-shaped records produced by `core::dashboard`.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub year: i32,
    pub instansi_id: Option<i64>,
    pub total_indicators: i64,
    pub active_targets: i64,
    pub submitted_data: i64,
    pub completed_assessments: i64,
    pub overall_achievement: f64,
    pub compliance_rate: f64,
    pub recent_activities: Vec<Activity>,
    pub top_performers: Vec<IndicatorAchievement>,
    pub underperforming_indicators: Vec<IndicatorAchievement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub kind: String,
    pub description: String,
    pub user: Option<String>,
    pub timestamp: Option<String>,
}

/// Achievement of one validated data row against its yearly target.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorAchievement {
    pub indicator_id: i64,
    pub indicator_code: String,
    pub indicator_name: String,
    pub category: String,
    pub instansi_id: i64,
    pub instansi_name: String,
    pub period: String,
    pub actual_value: f64,
    pub target_value: f64,
    pub achievement_percentage: f64,
    pub status: String,
    pub weight: f64,
    pub is_mandatory: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub name: String,
    pub total: i64,
    pub achieved: f64,
    pub average_achievement: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub year: i32,
    pub total_indicators: i64,
    pub achieved_indicators: i64,
    pub partially_achieved: i64,
    pub not_achieved: i64,
    pub average_achievement: f64,
    pub category_breakdown: Vec<Breakdown>,
    pub instansi_breakdown: Vec<Breakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub indicator_name: String,
    pub actual_value: f64,
    pub target_value: f64,
    pub achievement_percentage: f64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MandatoryCompliance {
    pub mandatory_indicators: i64,
    pub compliant_data: i64,
    pub compliance_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceStatus {
    pub year: i32,
    pub total_indicators: i64,
    pub submitted_data: i64,
    pub validated_data: i64,
    pub submission_rate: f64,
    pub validation_rate: f64,
    pub mandatory_compliance: MandatoryCompliance,
}
