use crate::config::Config;
use crate::core::optional_text;
use crate::core::performance::PerformanceLogic;
use crate::core::required;
use crate::db::log::audit;
use crate::db::queries::assessment as q;
use crate::errors::{AppError, AppResult};
use crate::models::assessment::{Assessment, AssessmentInput};
use crate::models::status::{AssessmentStatus, DataStatus, DbEnum};
use crate::utils::date::now_str;
use rusqlite::Connection;

/// Assessor reviews: pending → in_review → completed → approved.
pub struct AssessmentLogic;

impl AssessmentLogic {
    pub fn create(
        conn: &Connection,
        cfg: &Config,
        input: AssessmentInput,
        assessed_by: Option<i64>,
    ) -> AppResult<Assessment> {
        let data_id = required(input.performance_data_id, "performance data id")?;
        let data = PerformanceLogic::get(conn, data_id)?;

        if !matches!(data.status, DataStatus::Submitted | DataStatus::Validated) {
            return Err(AppError::Validation(
                "Only submitted or validated performance data can be assessed".into(),
            ));
        }
        if q::for_data(conn, data_id)?.is_some() {
            return Err(AppError::Duplicate(
                "Performance data has already been assessed".into(),
            ));
        }

        let now = now_str();
        let score = input.overall_score.map(check_score).transpose()?;
        let mut row = Assessment {
            id: 0,
            performance_data_id: data_id,
            assessed_by,
            overall_score: score,
            grade: None,
            comments: optional_text(input.comments),
            recommendations: optional_text(input.recommendations),
            status: if score.is_some() {
                AssessmentStatus::InReview
            } else {
                AssessmentStatus::Pending
            },
            assessed_at: score.map(|_| now.clone()),
            approved_at: None,
            created_at: now.clone(),
            updated_at: now,
        };

        row.id = q::insert(conn, &row)?;
        audit(
            conn,
            "add",
            &format!("assessment:{}", row.id),
            &format!("data {data_id}"),
        )?;
        Ok(with_grade(row, cfg))
    }

    /// Scoring moves a pending assessment into review. Closed ones are frozen.
    pub fn update(
        conn: &Connection,
        cfg: &Config,
        id: i64,
        input: AssessmentInput,
        assessed_by: Option<i64>,
    ) -> AppResult<Assessment> {
        let mut row = Self::get(conn, cfg, id)?;
        if !matches!(
            row.status,
            AssessmentStatus::Pending | AssessmentStatus::InReview
        ) {
            return Err(AppError::Validation(format!(
                "Assessment is {} and can no longer be edited",
                row.status.to_db_str()
            )));
        }

        let now = now_str();
        if let Some(score) = input.overall_score {
            row.overall_score = Some(check_score(score)?);
            row.status = AssessmentStatus::InReview;
            row.assessed_at = Some(now.clone());
            if assessed_by.is_some() {
                row.assessed_by = assessed_by;
            }
        }
        if input.comments.is_some() {
            row.comments = optional_text(input.comments);
        }
        if input.recommendations.is_some() {
            row.recommendations = optional_text(input.recommendations);
        }
        row.updated_at = now;

        q::update(conn, &row)?;
        audit(conn, "edit", &format!("assessment:{id}"), row.status.to_db_str())?;
        Ok(with_grade(row, cfg))
    }

    /// in_review → completed; needs a score.
    pub fn complete(conn: &Connection, cfg: &Config, id: i64) -> AppResult<Assessment> {
        let mut row = Self::get(conn, cfg, id)?;
        if row.status != AssessmentStatus::InReview {
            return Err(transition_error(&row, "completed"));
        }
        if row.overall_score.is_none() {
            return Err(AppError::Validation(
                "Assessment needs an overall score before completion".into(),
            ));
        }

        row.status = AssessmentStatus::Completed;
        row.updated_at = now_str();
        q::update(conn, &row)?;
        audit(conn, "complete", &format!("assessment:{id}"), "completed")?;
        Ok(row)
    }

    /// completed → approved
    pub fn approve(conn: &Connection, cfg: &Config, id: i64) -> AppResult<Assessment> {
        let mut row = Self::get(conn, cfg, id)?;
        if row.status != AssessmentStatus::Completed {
            return Err(transition_error(&row, "approved"));
        }

        let now = now_str();
        row.status = AssessmentStatus::Approved;
        row.approved_at = Some(now.clone());
        row.updated_at = now;
        q::update(conn, &row)?;
        audit(conn, "approve", &format!("assessment:{id}"), "approved")?;
        Ok(row)
    }

    pub fn get(conn: &Connection, cfg: &Config, id: i64) -> AppResult<Assessment> {
        let row = q::get(conn, id)?.ok_or_else(|| AppError::not_found("Assessment", id))?;
        Ok(with_grade(row, cfg))
    }

    pub fn list(
        conn: &Connection,
        cfg: &Config,
        status: Option<AssessmentStatus>,
    ) -> AppResult<Vec<Assessment>> {
        Ok(q::list(conn, status)?
            .into_iter()
            .map(|a| with_grade(a, cfg))
            .collect())
    }
}

fn with_grade(mut row: Assessment, cfg: &Config) -> Assessment {
    row.grade = row.overall_score.map(|s| cfg.grade_for(s));
    row
}

fn check_score(score: f64) -> AppResult<f64> {
    if !(0.0..=100.0).contains(&score) {
        return Err(AppError::Validation(
            "The overall score must be between 0 and 100.".into(),
        ));
    }
    Ok(score)
}

fn transition_error(row: &Assessment, to: &str) -> AppError {
    AppError::Validation(format!(
        "Assessment cannot be {to} from status {}",
        row.status.to_db_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::indicator::IndicatorLogic;
    use crate::core::instansi::InstansiLogic;
    use crate::db::pool::DbPool;
    use crate::models::indicator::IndicatorInput;
    use crate::models::instansi::InstansiInput;
    use crate::models::performance_data::PerformanceDataInput;

    fn submitted_data() -> (DbPool, i64) {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        let inst = InstansiLogic::create(
            &pool.conn,
            InstansiInput {
                kode_instansi: Some("INSP".into()),
                nama_instansi: Some("Inspektorat".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let ind = IndicatorLogic::create(
            &pool.conn,
            IndicatorInput {
                instansi_id: Some(inst.id),
                code: Some("IKU-09".into()),
                name: Some("Temuan ditindaklanjuti".into()),
                measurement_unit: Some("%".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let data = PerformanceLogic::create(
            &pool.conn,
            PerformanceDataInput {
                indicator_id: Some(ind.id),
                instansi_id: Some(inst.id),
                period: Some("2025-03".into()),
                actual_value: Some(88.0),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        (pool, data.id)
    }

    fn input(data_id: i64, score: Option<f64>) -> AssessmentInput {
        AssessmentInput {
            performance_data_id: Some(data_id),
            overall_score: score,
            ..Default::default()
        }
    }

    #[test]
    fn draft_data_cannot_be_assessed() {
        let (pool, data_id) = submitted_data();
        let cfg = Config::with_database(":memory:".into());
        let err = AssessmentLogic::create(&pool.conn, &cfg, input(data_id, Some(80.0)), None)
            .unwrap_err();
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn full_lifecycle_with_grade() {
        let (pool, data_id) = submitted_data();
        let cfg = Config::with_database(":memory:".into());
        PerformanceLogic::submit(&pool.conn, data_id, None).unwrap();

        let a = AssessmentLogic::create(&pool.conn, &cfg, input(data_id, None), None).unwrap();
        assert_eq!(a.status, AssessmentStatus::Pending);
        assert!(AssessmentLogic::complete(&pool.conn, &cfg, a.id).is_err());

        let a = AssessmentLogic::update(&pool.conn, &cfg, a.id, input(data_id, Some(84.5)), None)
            .unwrap();
        assert_eq!(a.status, AssessmentStatus::InReview);
        assert_eq!(a.grade.as_deref(), Some("B"));

        let a = AssessmentLogic::complete(&pool.conn, &cfg, a.id).unwrap();
        let a = AssessmentLogic::approve(&pool.conn, &cfg, a.id).unwrap();
        assert_eq!(a.status, AssessmentStatus::Approved);
        assert!(a.approved_at.is_some());

        // one assessment per data row
        let err = AssessmentLogic::create(&pool.conn, &cfg, input(data_id, Some(90.0)), None)
            .unwrap_err();
        assert_eq!(err.http_status(), 409);
    }

    #[test]
    fn score_out_of_range_is_rejected() {
        let (pool, data_id) = submitted_data();
        let cfg = Config::with_database(":memory:".into());
        PerformanceLogic::submit(&pool.conn, data_id, None).unwrap();
        let err = AssessmentLogic::create(&pool.conn, &cfg, input(data_id, Some(101.0)), None)
            .unwrap_err();
        assert!(err.to_string().contains("between 0 and 100"));
    }
}
