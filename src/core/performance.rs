use crate::core::dashboard::achievement_percentage;
use crate::core::evidence::remove_stored;
use crate::core::indicator::IndicatorLogic;
use crate::core::instansi::InstansiLogic;
use crate::core::{optional_text, required, required_text};
use crate::db::log::audit;
use crate::db::queries::performance::{self as q, DataFilter};
use crate::db::queries::{evidence, target};
use crate::errors::{AppError, AppResult};
use crate::models::indicator::PerformanceIndicator;
use crate::models::performance_data::{
    PerformanceData, PerformanceDataInput, QualityIssue, QualityReport, Severity,
};
use crate::models::status::{DataQuality, DataStatus, DbEnum};
use crate::utils::date::{now_str, parse_date, parse_period};
use chrono::{Datelike, Months, NaiveDate};
use rusqlite::Connection;

/// Achievement above this needs a second look before validation.
const IMPLAUSIBLE_ACHIEVEMENT: f64 = 150.0;

/// Quality score a row needs to count as valid.
const MIN_QUALITY_SCORE: f64 = 70.0;

/// Realisation data and its submit → validate / reject workflow.
pub struct PerformanceLogic;

impl PerformanceLogic {
    pub fn create(
        conn: &Connection,
        input: PerformanceDataInput,
        submitted_by: Option<i64>,
    ) -> AppResult<PerformanceData> {
        let indicator = IndicatorLogic::get(conn, required(input.indicator_id, "indicator id")?)?;
        let instansi_id = input.instansi_id.unwrap_or(indicator.instansi_id);
        InstansiLogic::get(conn, instansi_id)?;
        check_owner(&indicator, instansi_id)?;
        let indicator_id = indicator.id;

        let now = now_str();
        let mut row = PerformanceData {
            id: 0,
            indicator_id,
            instansi_id,
            submitted_by,
            period: parse_period(&required(input.period, "period")?)?,
            actual_value: check_value(required(input.actual_value, "actual value")?)?,
            notes: optional_text(input.notes),
            status: DataStatus::Draft,
            data_quality: input.data_quality,
            rejection_reason: None,
            submitted_at: None,
            validated_at: None,
            created_at: now.clone(),
            updated_at: now,
        };
        Self::check_duplicate(conn, &row)?;

        row.id = q::insert(conn, &row)?;
        audit(
            conn,
            "add",
            &format!("data:{}", row.id),
            &format!("indicator {} period {}", row.indicator_id, row.period),
        )?;
        Ok(row)
    }

    /// Only draft or rejected rows may change.
    pub fn update(
        conn: &Connection,
        id: i64,
        input: PerformanceDataInput,
    ) -> AppResult<PerformanceData> {
        let mut row = Self::get(conn, id)?;
        if !row.status.is_editable() {
            return Err(AppError::Validation(format!(
                "Performance data is {} and can no longer be edited",
                row.status.to_db_str()
            )));
        }

        if let Some(instansi_id) = input.instansi_id {
            InstansiLogic::get(conn, instansi_id)?;
            row.instansi_id = instansi_id;
        }
        let indicator = IndicatorLogic::get(conn, input.indicator_id.unwrap_or(row.indicator_id))?;
        check_owner(&indicator, row.instansi_id)?;
        row.indicator_id = indicator.id;
        if let Some(period) = input.period {
            row.period = parse_period(&period)?;
        }
        if let Some(value) = input.actual_value {
            row.actual_value = check_value(value)?;
        }
        if input.notes.is_some() {
            row.notes = optional_text(input.notes);
        }
        if input.data_quality.is_some() {
            row.data_quality = input.data_quality;
        }
        row.updated_at = now_str();
        Self::check_duplicate(conn, &row)?;

        q::update(conn, &row)?;
        audit(conn, "edit", &format!("data:{id}"), &row.period)?;
        Ok(row)
    }

    /// draft | rejected → submitted
    pub fn submit(conn: &Connection, id: i64, user_id: Option<i64>) -> AppResult<PerformanceData> {
        let mut row = Self::get(conn, id)?;
        if !row.status.is_editable() {
            return Err(transition_error(&row, "submitted"));
        }

        let now = now_str();
        row.status = DataStatus::Submitted;
        row.submitted_at = Some(now.clone());
        row.rejection_reason = None;
        if user_id.is_some() {
            row.submitted_by = user_id;
        }
        row.updated_at = now;

        q::update(conn, &row)?;
        audit(conn, "submit", &format!("data:{id}"), &row.period)?;
        Ok(row)
    }

    /// submitted → validated
    pub fn validate(conn: &Connection, id: i64) -> AppResult<PerformanceData> {
        let mut row = Self::get(conn, id)?;
        if row.status != DataStatus::Submitted {
            return Err(transition_error(&row, "validated"));
        }

        let now = now_str();
        row.status = DataStatus::Validated;
        row.validated_at = Some(now.clone());
        row.updated_at = now;

        q::update(conn, &row)?;
        audit(conn, "validate", &format!("data:{id}"), &row.period)?;
        Ok(row)
    }

    /// submitted → rejected, with a mandatory reason.
    pub fn reject(conn: &Connection, id: i64, reason: Option<String>) -> AppResult<PerformanceData> {
        let reason = required_text(reason, "rejection reason", 1000)?;
        let mut row = Self::get(conn, id)?;
        if row.status != DataStatus::Submitted {
            return Err(transition_error(&row, "rejected"));
        }

        row.status = DataStatus::Rejected;
        row.rejection_reason = Some(reason.clone());
        row.updated_at = now_str();

        q::update(conn, &row)?;
        audit(conn, "reject", &format!("data:{id}"), &reason)?;
        Ok(row)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<PerformanceData> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("Performance data", id))
    }

    pub fn list(conn: &Connection, filter: &DataFilter) -> AppResult<Vec<PerformanceData>> {
        Ok(q::list(conn, filter)?)
    }

    /// Achievement against the indicator's target for the period's year.
    pub fn achievement(conn: &Connection, row: &PerformanceData) -> AppResult<f64> {
        let target = target::for_indicator_year(conn, row.indicator_id, row.year())?;
        Ok(achievement_percentage(
            row.actual_value,
            target.map(|t| t.target_value),
        ))
    }

    /// Completeness, plausibility and timeliness checks on one row.
    pub fn check_quality(conn: &Connection, id: i64) -> AppResult<QualityReport> {
        let row = Self::get(conn, id)?;
        let indicator = IndicatorLogic::get(conn, row.indicator_id)?;
        let target = target::for_indicator_year(conn, row.indicator_id, row.year())?;
        let achievement =
            achievement_percentage(row.actual_value, target.as_ref().map(|t| t.target_value));

        let mut issues = Vec::new();
        match target {
            None => issues.push(issue(
                "missing_target",
                Severity::Warning,
                format!("No target is set for {} in {}", indicator.code, row.year()),
            )),
            Some(_) if achievement > IMPLAUSIBLE_ACHIEVEMENT => issues.push(issue(
                "implausible_achievement",
                Severity::Warning,
                format!("Achievement of {achievement:.2}% exceeds 150% of the target and needs verification"),
            )),
            Some(_) => {}
        }
        if is_percentage_unit(&indicator.measurement_unit) && row.actual_value > 100.0 {
            issues.push(issue(
                "percentage_out_of_range",
                Severity::Critical,
                "A percentage value must be between 0 and 100".into(),
            ));
        }
        if indicator.is_mandatory && evidence::for_data(conn, id)?.is_empty() {
            issues.push(issue(
                "missing_evidence",
                Severity::Critical,
                "Evidence is required for mandatory indicators".into(),
            ));
        }
        let reported = row.submitted_at.as_deref().unwrap_or(&row.created_at);
        if let (Some(deadline), Some(day)) = (
            submission_deadline(&row.period),
            reported.get(0..10).and_then(parse_date),
        ) && day > deadline
        {
            issues.push(issue(
                "late_submission",
                Severity::Warning,
                format!("Reported on {day}, after the deadline of {deadline}"),
            ));
        }

        let count = |s: Severity| issues.iter().filter(|i| i.severity == s).count() as f64;
        let score = (100.0 - 20.0 * count(Severity::Critical) - 5.0 * count(Severity::Warning))
            .clamp(0.0, 100.0);

        Ok(QualityReport {
            data_id: id,
            achievement_percentage: achievement,
            quality_score: score,
            severity: issues.iter().map(|i| i.severity).max().unwrap_or(Severity::None),
            is_valid: score >= MIN_QUALITY_SCORE,
            suggested_quality: quality_band(score),
            issues,
        })
    }

    /// Evidence files go with the row; assessed rows are kept.
    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let row = Self::get(conn, id)?;
        if !row.status.is_editable() {
            return Err(AppError::Conflict(format!(
                "Cannot delete {} performance data",
                row.status.to_db_str()
            )));
        }
        if q::assessment_count(conn, id)? > 0 {
            return Err(AppError::Conflict(
                "Cannot delete performance data that has been assessed".into(),
            ));
        }

        let docs = evidence::for_data(conn, id)?;
        q::delete(conn, id)?;
        audit(conn, "del", &format!("data:{id}"), &row.period)?;
        remove_stored(&docs)
    }

    fn check_duplicate(conn: &Connection, row: &PerformanceData) -> AppResult<()> {
        let except = (row.id != 0).then_some(row.id);
        if q::find_duplicate(conn, row.indicator_id, row.instansi_id, &row.period, except)? {
            return Err(AppError::Duplicate(
                "Performance data already exists for this indicator and period".into(),
            ));
        }
        Ok(())
    }
}

/// Data is reported by the instansi that owns the indicator.
fn check_owner(indicator: &PerformanceIndicator, instansi_id: i64) -> AppResult<()> {
    if indicator.instansi_id != instansi_id {
        return Err(AppError::Validation(format!(
            "Indicator {} does not belong to instansi #{instansi_id}",
            indicator.code
        )));
    }
    Ok(())
}

fn issue(code: &'static str, severity: Severity, message: String) -> QualityIssue {
    QualityIssue {
        code,
        severity,
        message,
    }
}

fn is_percentage_unit(unit: &str) -> bool {
    matches!(
        unit.trim().to_lowercase().as_str(),
        "%" | "persen" | "percent" | "persentase"
    )
}

/// Monthly data is due on the 7th of the following month.
fn submission_deadline(period: &str) -> Option<NaiveDate> {
    let first = parse_date(&format!("{period}-01"))?;
    let next = first.checked_add_months(Months::new(1))?;
    NaiveDate::from_ymd_opt(next.year(), next.month(), 7)
}

fn quality_band(score: f64) -> DataQuality {
    match score {
        s if s >= 90.0 => DataQuality::Excellent,
        s if s >= MIN_QUALITY_SCORE => DataQuality::Good,
        s if s >= 50.0 => DataQuality::Fair,
        _ => DataQuality::Poor,
    }
}

fn check_value(value: f64) -> AppResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(
            "The actual value must be a number of at least 0.".into(),
        ));
    }
    Ok(value)
}

fn transition_error(row: &PerformanceData, to: &str) -> AppError {
    AppError::Validation(format!(
        "Performance data cannot be {to} from status {}",
        row.status.to_db_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::TargetLogic;
    use crate::db::pool::DbPool;
    use crate::models::indicator::IndicatorInput;
    use crate::models::instansi::InstansiInput;
    use crate::models::target::TargetInput;

    struct Fixture {
        pool: DbPool,
        instansi_id: i64,
        indicator_id: i64,
    }

    fn fixture() -> Fixture {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        let inst = InstansiLogic::create(
            &pool.conn,
            InstansiInput {
                kode_instansi: Some("DINSOS".into()),
                nama_instansi: Some("Dinas Sosial".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let ind = IndicatorLogic::create(
            &pool.conn,
            IndicatorInput {
                instansi_id: Some(inst.id),
                code: Some("IKU-01".into()),
                name: Some("Penerima bantuan".into()),
                measurement_unit: Some("orang".into()),
                ..Default::default()
            },
        )
        .unwrap();
        Fixture {
            pool,
            instansi_id: inst.id,
            indicator_id: ind.id,
        }
    }

    fn data(f: &Fixture, period: &str, value: f64) -> PerformanceData {
        PerformanceLogic::create(
            &f.pool.conn,
            PerformanceDataInput {
                indicator_id: Some(f.indicator_id),
                instansi_id: Some(f.instansi_id),
                period: Some(period.into()),
                actual_value: Some(value),
                ..Default::default()
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn workflow_follows_allowed_transitions() {
        let f = fixture();
        let row = data(&f, "2025-01", 80.0);
        assert_eq!(row.status, DataStatus::Draft);

        // validate before submit is refused
        let err = PerformanceLogic::validate(&f.pool.conn, row.id).unwrap_err();
        assert_eq!(err.http_status(), 422);

        let row = PerformanceLogic::submit(&f.pool.conn, row.id, None).unwrap();
        assert!(row.submitted_at.is_some());

        let row = PerformanceLogic::reject(&f.pool.conn, row.id, Some("Angka tidak sesuai".into()))
            .unwrap();
        assert_eq!(row.status, DataStatus::Rejected);

        // rejected rows can be edited and resubmitted
        PerformanceLogic::update(
            &f.pool.conn,
            row.id,
            PerformanceDataInput {
                actual_value: Some(95.0),
                ..Default::default()
            },
        )
        .unwrap();
        PerformanceLogic::submit(&f.pool.conn, row.id, None).unwrap();
        let row = PerformanceLogic::validate(&f.pool.conn, row.id).unwrap();
        assert_eq!(row.status, DataStatus::Validated);
        assert!(row.validated_at.is_some());
        assert!(row.rejection_reason.is_none());

        // validated rows are frozen
        let err = PerformanceLogic::update(&f.pool.conn, row.id, PerformanceDataInput::default())
            .unwrap_err();
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn duplicate_period_conflicts() {
        let f = fixture();
        data(&f, "2025-02", 10.0);
        let err = PerformanceLogic::create(
            &f.pool.conn,
            PerformanceDataInput {
                indicator_id: Some(f.indicator_id),
                instansi_id: Some(f.instansi_id),
                period: Some("2025-02".into()),
                actual_value: Some(11.0),
                ..Default::default()
            },
            None,
        )
        .unwrap_err();
        assert_eq!(err.http_status(), 409);
    }

    #[test]
    fn achievement_uses_target_of_the_period_year() {
        let f = fixture();
        let row = data(&f, "2025-06", 45.0);
        assert_eq!(PerformanceLogic::achievement(&f.pool.conn, &row).unwrap(), 0.0);

        TargetLogic::create(
            &f.pool.conn,
            TargetInput {
                indicator_id: Some(f.indicator_id),
                year: Some(2025),
                target_value: Some(60.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(PerformanceLogic::achievement(&f.pool.conn, &row).unwrap(), 75.0);
    }

    #[test]
    fn target_with_data_in_its_year_cannot_be_deleted() {
        let f = fixture();
        let target = TargetLogic::create(
            &f.pool.conn,
            TargetInput {
                indicator_id: Some(f.indicator_id),
                year: Some(2024),
                target_value: Some(100.0),
                ..Default::default()
            },
        )
        .unwrap();
        data(&f, "2024-12", 50.0);

        let err = TargetLogic::delete(&f.pool.conn, target.id).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot delete target that has associated performance data"
        );
    }

    #[test]
    fn indicator_must_belong_to_the_instansi() {
        let f = fixture();
        let other = InstansiLogic::create(
            &f.pool.conn,
            InstansiInput {
                kode_instansi: Some("DINKES".into()),
                nama_instansi: Some("Dinas Kesehatan".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let err = PerformanceLogic::create(
            &f.pool.conn,
            PerformanceDataInput {
                indicator_id: Some(f.indicator_id),
                instansi_id: Some(other.id),
                period: Some("2025-01".into()),
                actual_value: Some(1.0),
                ..Default::default()
            },
            None,
        )
        .unwrap_err();
        assert_eq!(err.http_status(), 422);
        assert_eq!(
            err.to_string(),
            format!("Indicator IKU-01 does not belong to instansi #{}", other.id)
        );

        // the instansi defaults to the indicator's owner
        let row = PerformanceLogic::create(
            &f.pool.conn,
            PerformanceDataInput {
                indicator_id: Some(f.indicator_id),
                period: Some("2025-01".into()),
                actual_value: Some(1.0),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(row.instansi_id, f.instansi_id);

        let moved = PerformanceDataInput {
            instansi_id: Some(other.id),
            ..Default::default()
        };
        assert_eq!(
            PerformanceLogic::update(&f.pool.conn, row.id, moved)
                .unwrap_err()
                .http_status(),
            422
        );
    }

    #[test]
    fn quality_check_flags_implausible_values_and_missing_evidence() {
        let f = fixture();
        IndicatorLogic::update(
            &f.pool.conn,
            f.indicator_id,
            IndicatorInput {
                is_mandatory: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let now = chrono::Local::now();
        TargetLogic::create(
            &f.pool.conn,
            TargetInput {
                indicator_id: Some(f.indicator_id),
                year: Some(now.year()),
                target_value: Some(40.0),
                ..Default::default()
            },
        )
        .unwrap();
        let row = data(&f, &now.format("%Y-%m").to_string(), 70.0);

        let report = PerformanceLogic::check_quality(&f.pool.conn, row.id).unwrap();
        let codes: Vec<_> = report.issues.iter().map(|i| i.code).collect();
        assert_eq!(codes, ["implausible_achievement", "missing_evidence"]);
        assert_eq!(report.achievement_percentage, 175.0);
        assert_eq!(report.quality_score, 75.0);
        assert_eq!(report.severity, Severity::Critical);
        assert!(report.is_valid);
        assert_eq!(report.suggested_quality, DataQuality::Good);
    }

    #[test]
    fn quality_check_flags_late_data_without_target() {
        let f = fixture();
        let row = data(&f, "2024-01", 5.0);

        let report = PerformanceLogic::check_quality(&f.pool.conn, row.id).unwrap();
        let codes: Vec<_> = report.issues.iter().map(|i| i.code).collect();
        assert_eq!(codes, ["missing_target", "late_submission"]);
        assert_eq!(report.quality_score, 90.0);
        assert_eq!(report.severity, Severity::Warning);
        assert_eq!(report.suggested_quality, DataQuality::Excellent);
    }

    #[test]
    fn monthly_deadline_is_the_seventh_of_next_month() {
        assert_eq!(
            submission_deadline("2025-12"),
            NaiveDate::from_ymd_opt(2026, 1, 7)
        );
        assert_eq!(submission_deadline("2025-13"), None);
    }

    #[test]
    fn invalid_target_values_are_rejected() {
        let f = fixture();
        let zero = TargetInput {
            indicator_id: Some(f.indicator_id),
            year: Some(2025),
            target_value: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            TargetLogic::create(&f.pool.conn, zero).unwrap_err().to_string(),
            "Target value must be a positive number"
        );

        let above = TargetInput {
            indicator_id: Some(f.indicator_id),
            year: Some(2025),
            target_value: Some(50.0),
            minimum_value: Some(60.0),
            ..Default::default()
        };
        assert!(TargetLogic::create(&f.pool.conn, above).is_err());
    }
}
