use crate::core::instansi::InstansiLogic;
use crate::core::kegiatan::KegiatanLogic;
use crate::core::program::ProgramLogic;
use crate::core::{optional_text, required, required_text};
use crate::db::log::audit;
use crate::db::queries::indicator as q;
use crate::errors::{AppError, AppResult};
use crate::models::indicator::{IndicatorInput, PerformanceIndicator};
use crate::models::status::{DbEnum, Frequency, IndicatorCategory};
use crate::utils::date::now_str;
use rusqlite::Connection;

pub struct IndicatorLogic;

impl IndicatorLogic {
    pub fn create(conn: &Connection, input: IndicatorInput) -> AppResult<PerformanceIndicator> {
        let now = now_str();
        let mut row = PerformanceIndicator {
            id: 0,
            instansi_id: required(input.instansi_id, "instansi id")?,
            program_id: input.program_id,
            kegiatan_id: input.kegiatan_id,
            code: required_text(input.code, "code", 50)?,
            name: required_text(input.name, "name", 255)?,
            description: optional_text(input.description),
            measurement_unit: required_text(input.measurement_unit, "measurement unit", 50)?,
            data_source: optional_text(input.data_source),
            collection_method: optional_text(input.collection_method),
            frequency: input.frequency.unwrap_or(Frequency::Annual),
            category: input.category.unwrap_or(IndicatorCategory::Output),
            weight: input.weight.unwrap_or(1.0),
            is_mandatory: input.is_mandatory.unwrap_or(false),
            created_at: now.clone(),
            updated_at: now,
        };
        Self::check(conn, &row)?;

        row.id = q::insert(conn, &row)?;
        audit(conn, "add", &format!("indicator:{}", row.id), &row.code)?;
        Ok(row)
    }

    pub fn update(
        conn: &Connection,
        id: i64,
        input: IndicatorInput,
    ) -> AppResult<PerformanceIndicator> {
        let mut row = Self::get(conn, id)?;

        if let Some(instansi_id) = input.instansi_id {
            row.instansi_id = instansi_id;
        }
        if input.program_id.is_some() {
            row.program_id = input.program_id;
        }
        if input.kegiatan_id.is_some() {
            row.kegiatan_id = input.kegiatan_id;
        }
        if input.code.is_some() {
            row.code = required_text(input.code, "code", 50)?;
        }
        if input.name.is_some() {
            row.name = required_text(input.name, "name", 255)?;
        }
        if input.description.is_some() {
            row.description = optional_text(input.description);
        }
        if input.measurement_unit.is_some() {
            row.measurement_unit = required_text(input.measurement_unit, "measurement unit", 50)?;
        }
        if input.data_source.is_some() {
            row.data_source = optional_text(input.data_source);
        }
        if input.collection_method.is_some() {
            row.collection_method = optional_text(input.collection_method);
        }
        if let Some(frequency) = input.frequency {
            row.frequency = frequency;
        }
        if let Some(category) = input.category {
            row.category = category;
        }
        if let Some(weight) = input.weight {
            row.weight = weight;
        }
        if let Some(mandatory) = input.is_mandatory {
            row.is_mandatory = mandatory;
        }
        row.updated_at = now_str();
        Self::check(conn, &row)?;

        q::update(conn, &row)?;
        audit(conn, "edit", &format!("indicator:{id}"), &row.code)?;
        Ok(row)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<PerformanceIndicator> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("Performance indicator", id))
    }

    pub fn list(
        conn: &Connection,
        instansi_id: Option<i64>,
        category: Option<IndicatorCategory>,
    ) -> AppResult<Vec<PerformanceIndicator>> {
        Ok(q::list(conn, instansi_id, category.map(|c| c.to_db_str()))?)
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let row = Self::get(conn, id)?;

        let (targets, data) = q::dependents(conn, id)?;
        if targets + data > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete indicator {}: {targets} target(s) and {data} data row(s) still reference it",
                row.code
            )));
        }

        q::delete(conn, id)?;
        audit(conn, "del", &format!("indicator:{id}"), &row.code)?;
        Ok(())
    }

    fn check(conn: &Connection, row: &PerformanceIndicator) -> AppResult<()> {
        InstansiLogic::get(conn, row.instansi_id)?;

        // Program and kegiatan must sit under the same instansi.
        if let Some(program_id) = row.program_id {
            let program = ProgramLogic::get(conn, program_id)?;
            if program.instansi_id != row.instansi_id {
                return Err(AppError::Validation(
                    "The selected program belongs to another instansi.".into(),
                ));
            }
        }
        if let Some(kegiatan_id) = row.kegiatan_id {
            let kegiatan = KegiatanLogic::get(conn, kegiatan_id)?;
            let program = ProgramLogic::get(conn, kegiatan.program_id)?;
            if program.instansi_id != row.instansi_id {
                return Err(AppError::Validation(
                    "The selected kegiatan belongs to another instansi.".into(),
                ));
            }
        }

        if !(row.weight > 0.0 && row.weight <= 100.0) {
            return Err(AppError::Validation(
                "The weight must be greater than 0 and at most 100.".into(),
            ));
        }

        let except = (row.id != 0).then_some(row.id);
        if q::code_taken(conn, &row.code, except)? {
            return Err(AppError::Duplicate(format!(
                "The code '{}' has already been taken.",
                row.code
            )));
        }
        Ok(())
    }
}
