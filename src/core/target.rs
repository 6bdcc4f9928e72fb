use crate::core::indicator::IndicatorLogic;
use crate::core::{optional_text, required};
use crate::db::log::audit;
use crate::db::queries::target as q;
use crate::errors::{AppError, AppResult};
use crate::models::status::{DbEnum, TargetStatus};
use crate::models::target::{Target, TargetInput};
use crate::utils::date::{now_str, parse_year};
use rusqlite::Connection;

/// Yearly targets per indicator.
pub struct TargetLogic;

impl TargetLogic {
    pub fn create(conn: &Connection, input: TargetInput) -> AppResult<Target> {
        let indicator_id = required(input.indicator_id, "indicator id")?;
        IndicatorLogic::get(conn, indicator_id)?;

        let now = now_str();
        let mut row = Target {
            id: 0,
            indicator_id,
            year: parse_year(required(input.year, "year")?)?,
            target_value: required(input.target_value, "target value")?,
            minimum_value: input.minimum_value,
            justification: optional_text(input.justification),
            status: TargetStatus::Draft,
            created_at: now.clone(),
            updated_at: now,
        };
        Self::check(conn, &row)?;

        row.id = q::insert(conn, &row)?;
        audit(
            conn,
            "add",
            &format!("target:{}", row.id),
            &format!("indicator {} year {}", row.indicator_id, row.year),
        )?;
        Ok(row)
    }

    /// Editing an approved target sends it back as `revised`.
    pub fn update(conn: &Connection, id: i64, input: TargetInput) -> AppResult<Target> {
        let mut row = Self::get(conn, id)?;

        if let Some(indicator_id) = input.indicator_id {
            IndicatorLogic::get(conn, indicator_id)?;
            row.indicator_id = indicator_id;
        }
        if let Some(year) = input.year {
            row.year = parse_year(year)?;
        }
        if let Some(value) = input.target_value {
            row.target_value = value;
        }
        if input.minimum_value.is_some() {
            row.minimum_value = input.minimum_value;
        }
        if input.justification.is_some() {
            row.justification = optional_text(input.justification);
        }
        if row.status == TargetStatus::Approved {
            row.status = TargetStatus::Revised;
        }
        row.updated_at = now_str();
        Self::check(conn, &row)?;

        q::update(conn, &row)?;
        audit(conn, "edit", &format!("target:{id}"), row.status.to_db_str())?;
        Ok(row)
    }

    pub fn approve(conn: &Connection, id: i64) -> AppResult<Target> {
        Self::set_status(conn, id, TargetStatus::Approved)
    }

    pub fn reject(conn: &Connection, id: i64) -> AppResult<Target> {
        Self::set_status(conn, id, TargetStatus::Rejected)
    }

    pub fn revise(conn: &Connection, id: i64) -> AppResult<Target> {
        Self::set_status(conn, id, TargetStatus::Revised)
    }

    fn set_status(conn: &Connection, id: i64, status: TargetStatus) -> AppResult<Target> {
        let mut row = Self::get(conn, id)?;
        if row.status == status {
            return Err(AppError::Validation(format!(
                "Target is already {}",
                status.to_db_str()
            )));
        }

        row.status = status;
        row.updated_at = now_str();
        q::set_status(conn, id, status, &row.updated_at)?;
        audit(conn, "status", &format!("target:{id}"), status.to_db_str())?;
        Ok(row)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<Target> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("Target", id))
    }

    pub fn list(
        conn: &Connection,
        indicator_id: Option<i64>,
        year: Option<i32>,
    ) -> AppResult<Vec<Target>> {
        Ok(q::list(conn, indicator_id, year)?)
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let row = Self::get(conn, id)?;

        if q::data_in_year(conn, row.indicator_id, row.year)? > 0 {
            return Err(AppError::Conflict(
                "Cannot delete target that has associated performance data".into(),
            ));
        }

        q::delete(conn, id)?;
        audit(conn, "del", &format!("target:{id}"), &row.year.to_string())?;
        Ok(())
    }

    fn check(conn: &Connection, row: &Target) -> AppResult<()> {
        if !(row.target_value > 0.0) || !row.target_value.is_finite() {
            return Err(AppError::Validation(
                "Target value must be a positive number".into(),
            ));
        }
        if let Some(min) = row.minimum_value
            && (min < 0.0 || min > row.target_value)
        {
            return Err(AppError::Validation(
                "Minimum value must be between 0 and the target value".into(),
            ));
        }

        if let Some(existing) = q::for_indicator_year(conn, row.indicator_id, row.year)?
            && existing.id != row.id
        {
            return Err(AppError::Duplicate(
                "Target already exists for this indicator and period".into(),
            ));
        }
        Ok(())
    }
}
