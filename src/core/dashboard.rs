//! Dashboard aggregations: achievement maths, summaries, trends,
//! compliance and indicator comparison.

use crate::config::GradeBand;
use crate::db::queries::dashboard as counts;
use crate::db::queries::performance::{self as perf, DataFilter, DataPoint};
use crate::db::queries::assessment;
use crate::errors::AppResult;
use crate::models::dashboard::{
    Activity, Breakdown, ComplianceStatus, DashboardData, IndicatorAchievement,
    MandatoryCompliance, PerformanceSummary, TrendPoint,
};
use crate::models::status::{DataStatus, DbEnum, IndicatorCategory};
use crate::utils::formatting::round2;
use rusqlite::Connection;
use std::collections::{BTreeMap, HashSet};

const RECENT_LIMIT: i64 = 10;
const RANKING_LIMIT: usize = 5;
const UNDERPERFORMING_BELOW: f64 = 60.0;

/// `actual / target * 100` rounded to two decimals; 0 without a usable target.
pub fn achievement_percentage(actual: f64, target: Option<f64>) -> f64 {
    match target {
        Some(t) if t != 0.0 => round2(actual / t * 100.0),
        _ => 0.0,
    }
}

/// Achievement capped at 100.
pub fn capped_achievement(target: f64, realization: f64) -> f64 {
    if target == 0.0 {
        return 0.0;
    }
    (realization / target * 100.0).min(100.0)
}

pub fn performance_status(percentage: f64) -> &'static str {
    if percentage >= 100.0 {
        "excellent"
    } else if percentage >= 80.0 {
        "good"
    } else if percentage >= 60.0 {
        "satisfactory"
    } else {
        "needs_improvement"
    }
}

pub fn achievement_status(percentage: f64) -> &'static str {
    if percentage >= 100.0 {
        "excellent"
    } else if percentage >= 80.0 {
        "good"
    } else if percentage >= 60.0 {
        "fair"
    } else {
        "poor"
    }
}

/// Band with the highest `min` not above `score`; `E` when nothing matches.
pub fn assessment_grade(score: f64, grading: &[GradeBand]) -> String {
    let mut bands: Vec<&GradeBand> = grading.iter().collect();
    bands.sort_by(|a, b| b.min.total_cmp(&a.min));

    bands
        .into_iter()
        .find(|b| score >= b.min)
        .map(|b| b.grade.clone())
        .unwrap_or_else(|| "E".to_string())
}

fn percent_of(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn to_achievement(p: &DataPoint) -> IndicatorAchievement {
    let pct = achievement_percentage(p.actual_value, p.target_value);
    IndicatorAchievement {
        indicator_id: p.indicator_id,
        indicator_code: p.indicator_code.clone(),
        indicator_name: p.indicator_name.clone(),
        category: p.category.clone(),
        instansi_id: p.instansi_id,
        instansi_name: p.instansi_name.clone(),
        period: p.period.clone(),
        actual_value: p.actual_value,
        target_value: p.target_value.unwrap_or(0.0),
        achievement_percentage: pct,
        status: performance_status(pct).to_string(),
        weight: p.weight,
        is_mandatory: p.is_mandatory,
    }
}

fn by_achievement_desc(a: &IndicatorAchievement, b: &IndicatorAchievement) -> std::cmp::Ordering {
    b.achievement_percentage.total_cmp(&a.achievement_percentage)
}

pub struct DashboardLogic;

impl DashboardLogic {
    fn year_points(
        conn: &Connection,
        instansi_id: Option<i64>,
        year: i32,
        status: Option<DataStatus>,
    ) -> AppResult<Vec<DataPoint>> {
        let prefix = year.to_string();
        let filter = DataFilter {
            instansi_id,
            indicator_id: None,
            status,
            period_prefix: Some(&prefix),
        };
        Ok(perf::points(conn, &filter, None)?)
    }

    pub fn dashboard(
        conn: &Connection,
        instansi_id: Option<i64>,
        year: i32,
    ) -> AppResult<DashboardData> {
        let total_indicators = counts::indicator_count(conn, instansi_id)?;
        let submitted_data =
            counts::data_count(conn, instansi_id, year, DataStatus::Submitted.to_db_str())?;

        let validated: Vec<IndicatorAchievement> =
            Self::year_points(conn, instansi_id, year, Some(DataStatus::Validated))?
                .iter()
                .map(to_achievement)
                .collect();

        let overall_achievement = if validated.is_empty() {
            0.0
        } else {
            round2(
                validated.iter().map(|a| a.achievement_percentage).sum::<f64>()
                    / validated.len() as f64,
            )
        };

        let mut top = validated.clone();
        top.sort_by(by_achievement_desc);
        top.truncate(RANKING_LIMIT);

        let mut under: Vec<IndicatorAchievement> = validated
            .into_iter()
            .filter(|a| a.achievement_percentage < UNDERPERFORMING_BELOW)
            .collect();
        under.sort_by(|a, b| a.achievement_percentage.total_cmp(&b.achievement_percentage));
        under.truncate(RANKING_LIMIT);

        let recent_activities = perf::recent_submissions(conn, instansi_id, RECENT_LIMIT)?
            .into_iter()
            .map(|p| Activity {
                kind: "data_submission".into(),
                description: format!("Performance data submitted for {}", p.indicator_name),
                user: p.submitter,
                timestamp: p.submitted_at,
            })
            .collect();

        Ok(DashboardData {
            year,
            instansi_id,
            total_indicators,
            active_targets: counts::approved_targets(conn, instansi_id, year)?,
            submitted_data,
            completed_assessments: assessment::approved_in_year(conn, instansi_id, year)?,
            overall_achievement,
            compliance_rate: percent_of(submitted_data, total_indicators),
            recent_activities,
            top_performers: top,
            underperforming_indicators: under,
        })
    }

    pub fn performance_summary(
        conn: &Connection,
        instansi_id: Option<i64>,
        year: i32,
    ) -> AppResult<PerformanceSummary> {
        let rows: Vec<IndicatorAchievement> = Self::year_points(conn, instansi_id, year, None)?
            .iter()
            .map(to_achievement)
            .collect();

        let total = rows.len() as i64;
        let achieved = rows
            .iter()
            .filter(|r| r.achievement_percentage >= 100.0)
            .count() as i64;
        let partial = rows
            .iter()
            .filter(|r| (70.0..100.0).contains(&r.achievement_percentage))
            .count() as i64;

        let average_achievement = if total == 0 {
            0.0
        } else {
            round2((achieved as f64 * 100.0 + partial as f64 * 70.0) / total as f64)
        };

        Ok(PerformanceSummary {
            year,
            total_indicators: total,
            achieved_indicators: achieved,
            partially_achieved: partial,
            not_achieved: total - achieved - partial,
            average_achievement,
            category_breakdown: breakdown(&rows, |r| r.category.clone()),
            instansi_breakdown: breakdown(&rows, |r| r.instansi_name.clone()),
        })
    }

    /// Latest `periods` validated rows, oldest first.
    pub fn achievement_trends(
        conn: &Connection,
        instansi_id: Option<i64>,
        indicator_id: Option<i64>,
        periods: i64,
    ) -> AppResult<Vec<TrendPoint>> {
        let filter = DataFilter {
            instansi_id,
            indicator_id,
            status: Some(DataStatus::Validated),
            period_prefix: None,
        };

        let mut points: Vec<TrendPoint> = perf::points(conn, &filter, Some(periods.max(1)))?
            .iter()
            .map(|p| {
                let pct = achievement_percentage(p.actual_value, p.target_value);
                TrendPoint {
                    period: p.period.clone(),
                    indicator_name: p.indicator_name.clone(),
                    actual_value: p.actual_value,
                    target_value: p.target_value.unwrap_or(0.0),
                    achievement_percentage: pct,
                    status: achievement_status(pct).to_string(),
                }
            })
            .collect();
        points.reverse();
        Ok(points)
    }

    pub fn compliance_status(
        conn: &Connection,
        instansi_id: Option<i64>,
        year: i32,
    ) -> AppResult<ComplianceStatus> {
        let total_indicators = counts::indicator_count(conn, instansi_id)?;
        let submitted =
            counts::data_count(conn, instansi_id, year, DataStatus::Submitted.to_db_str())?;
        let validated =
            counts::data_count(conn, instansi_id, year, DataStatus::Validated.to_db_str())?;

        let mandatory = counts::mandatory_indicator_count(conn, instansi_id)?;
        let compliant = counts::validated_mandatory_data(conn, instansi_id, year)?;

        Ok(ComplianceStatus {
            year,
            total_indicators,
            submitted_data: submitted,
            validated_data: validated,
            submission_rate: percent_of(submitted + validated, total_indicators),
            validation_rate: percent_of(validated, submitted + validated),
            mandatory_compliance: MandatoryCompliance {
                mandatory_indicators: mandatory,
                compliant_data: compliant,
                compliance_rate: percent_of(compliant, mandatory),
            },
        })
    }

    /// One entry per indicator with validated data in `year`, taken from its
    /// latest period, best first.
    pub fn indicator_comparison(
        conn: &Connection,
        instansi_id: Option<i64>,
        year: i32,
        category: Option<IndicatorCategory>,
    ) -> AppResult<Vec<IndicatorAchievement>> {
        let points = Self::year_points(conn, instansi_id, year, Some(DataStatus::Validated))?;

        let mut seen = HashSet::new();
        let mut out: Vec<IndicatorAchievement> = points
            .iter()
            .filter(|p| category.is_none_or(|c| c.to_db_str() == p.category))
            .filter(|p| seen.insert(p.indicator_id))
            .map(to_achievement)
            .collect();

        out.sort_by(by_achievement_desc);
        Ok(out)
    }
}

/// Group rows by `key`, summing achievement capped at 100 per row.
fn breakdown<F>(rows: &[IndicatorAchievement], key: F) -> Vec<Breakdown>
where
    F: Fn(&IndicatorAchievement) -> String,
{
    let mut groups: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(key(r)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += capped_achievement(r.target_value, r.actual_value);
    }

    groups
        .into_iter()
        .map(|(name, (total, sum))| Breakdown {
            name,
            total,
            achieved: round2(sum),
            average_achievement: round2(sum / total as f64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_grading;

    #[test]
    fn achievement_handles_missing_and_zero_targets() {
        assert_eq!(achievement_percentage(50.0, None), 0.0);
        assert_eq!(achievement_percentage(50.0, Some(0.0)), 0.0);
        assert_eq!(achievement_percentage(2.0, Some(3.0)), 66.67);
        assert_eq!(achievement_percentage(120.0, Some(100.0)), 120.0);
    }

    #[test]
    fn capped_achievement_never_exceeds_hundred() {
        assert_eq!(capped_achievement(100.0, 150.0), 100.0);
        assert_eq!(capped_achievement(0.0, 10.0), 0.0);
        assert_eq!(capped_achievement(200.0, 50.0), 25.0);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(performance_status(100.0), "excellent");
        assert_eq!(performance_status(80.0), "good");
        assert_eq!(performance_status(60.0), "satisfactory");
        assert_eq!(performance_status(59.99), "needs_improvement");
        assert_eq!(achievement_status(60.0), "fair");
        assert_eq!(achievement_status(10.0), "poor");
    }

    #[test]
    fn grades_follow_configured_bands() {
        let grading = default_grading();
        assert_eq!(assessment_grade(95.0, &grading), "A");
        assert_eq!(assessment_grade(89.5, &grading), "B");
        assert_eq!(assessment_grade(60.0, &grading), "D");
        assert_eq!(assessment_grade(12.0, &grading), "E");
        assert_eq!(assessment_grade(50.0, &[]), "E");
    }

    mod with_data {
        use super::super::*;
        use crate::core::indicator::IndicatorLogic;
        use crate::core::instansi::InstansiLogic;
        use crate::core::performance::PerformanceLogic;
        use crate::core::target::TargetLogic;
        use crate::db::pool::DbPool;
        use crate::models::indicator::IndicatorInput;
        use crate::models::instansi::InstansiInput;
        use crate::models::performance_data::PerformanceDataInput;
        use crate::models::target::TargetInput;

        /// One instansi, two indicators with 2025 targets of 100 and 50.
        fn setup() -> DbPool {
            let pool = DbPool::in_memory().unwrap();
            crate::db::initialize::init_db(&pool.conn).unwrap();
            let conn = &pool.conn;
            InstansiLogic::create(
                conn,
                InstansiInput {
                    kode_instansi: Some("DISDIK".into()),
                    nama_instansi: Some("Dinas Pendidikan".into()),
                    ..Default::default()
                },
            )
            .unwrap();

            for (code, category, target) in [("IKU-01", "outcome", 100.0), ("IKU-02", "output", 50.0)] {
                let ind = IndicatorLogic::create(
                    conn,
                    IndicatorInput {
                        instansi_id: Some(1),
                        code: Some(code.into()),
                        name: Some(format!("Indikator {code}")),
                        measurement_unit: Some("persen".into()),
                        category: Some(IndicatorCategory::parse(category).unwrap()),
                        ..Default::default()
                    },
                )
                .unwrap();
                let t = TargetLogic::create(
                    conn,
                    TargetInput {
                        indicator_id: Some(ind.id),
                        year: Some(2025),
                        target_value: Some(target),
                        ..Default::default()
                    },
                )
                .unwrap();
                TargetLogic::approve(conn, t.id).unwrap();
            }
            pool
        }

        fn validated(pool: &DbPool, indicator_id: i64, period: &str, value: f64) {
            let row = PerformanceLogic::create(
                &pool.conn,
                PerformanceDataInput {
                    indicator_id: Some(indicator_id),
                    instansi_id: Some(1),
                    period: Some(period.into()),
                    actual_value: Some(value),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
            PerformanceLogic::submit(&pool.conn, row.id, None).unwrap();
            PerformanceLogic::validate(&pool.conn, row.id).unwrap();
        }

        #[test]
        fn dashboard_ranks_and_averages_validated_data() {
            let pool = setup();
            validated(&pool, 1, "2025-01", 120.0);
            validated(&pool, 2, "2025-01", 20.0);

            let d = DashboardLogic::dashboard(&pool.conn, None, 2025).unwrap();
            assert_eq!(d.total_indicators, 2);
            assert_eq!(d.active_targets, 2);
            assert_eq!(d.submitted_data, 0);
            assert_eq!(d.overall_achievement, 80.0);
            assert_eq!(d.top_performers[0].indicator_code, "IKU-01");
            assert_eq!(d.underperforming_indicators.len(), 1);
            assert_eq!(d.underperforming_indicators[0].achievement_percentage, 40.0);
        }

        #[test]
        fn summary_caps_breakdown_sums() {
            let pool = setup();
            validated(&pool, 1, "2025-01", 120.0);
            validated(&pool, 2, "2025-01", 40.0);

            let s = DashboardLogic::performance_summary(&pool.conn, None, 2025).unwrap();
            assert_eq!(s.achieved_indicators, 1);
            assert_eq!(s.partially_achieved, 1);
            assert_eq!(s.average_achievement, 85.0);

            let inst = &s.instansi_breakdown[0];
            assert_eq!(inst.total, 2);
            assert_eq!(inst.achieved, 180.0);
            assert_eq!(inst.average_achievement, 90.0);
        }

        #[test]
        fn trends_are_oldest_first_and_limited() {
            let pool = setup();
            for (period, value) in [("2025-01", 50.0), ("2025-02", 70.0), ("2025-03", 110.0)] {
                validated(&pool, 1, period, value);
            }

            let t = DashboardLogic::achievement_trends(&pool.conn, None, Some(1), 2).unwrap();
            let periods: Vec<&str> = t.iter().map(|p| p.period.as_str()).collect();
            assert_eq!(periods, ["2025-02", "2025-03"]);
            assert_eq!(t[0].status, "fair");
            assert_eq!(t[1].status, "excellent");
        }

        #[test]
        fn comparison_takes_the_latest_period_per_indicator() {
            let pool = setup();
            validated(&pool, 1, "2025-01", 30.0);
            validated(&pool, 1, "2025-06", 90.0);
            validated(&pool, 2, "2025-03", 50.0);

            let rows = DashboardLogic::indicator_comparison(&pool.conn, None, 2025, None).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].indicator_code, "IKU-02");
            assert_eq!(rows[1].period, "2025-06");

            let outputs = DashboardLogic::indicator_comparison(
                &pool.conn,
                None,
                2025,
                Some(IndicatorCategory::Output),
            )
            .unwrap();
            assert_eq!(outputs.len(), 1);
        }
    }
}
