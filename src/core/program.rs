use crate::core::instansi::InstansiLogic;
use crate::core::{non_negative, optional_text, required, required_text};
use crate::db::log::audit;
use crate::db::queries::program as q;
use crate::errors::{AppError, AppResult};
use crate::models::program::{Program, ProgramInput};
use crate::models::status::ProgramStatus;
use crate::utils::date::{now_str, parse_year};
use rusqlite::Connection;

/// Programs run by an instansi in a fiscal year.
pub struct ProgramLogic;

impl ProgramLogic {
    pub fn create(conn: &Connection, input: ProgramInput) -> AppResult<Program> {
        let instansi_id = required(input.instansi_id, "instansi id")?;
        InstansiLogic::get(conn, instansi_id)?;

        let now = now_str();
        let mut row = Program {
            id: 0,
            instansi_id,
            kode_program: required_text(input.kode_program, "kode program", 50)?,
            nama_program: required_text(input.nama_program, "nama program", 255)?,
            deskripsi: optional_text(input.deskripsi),
            anggaran: non_negative(input.anggaran.unwrap_or(0.0), "anggaran")?,
            tahun: parse_year(required(input.tahun, "tahun")?)?,
            status: input.status.unwrap_or(ProgramStatus::Draft),
            created_at: now.clone(),
            updated_at: now,
        };
        Self::check_code(conn, &row)?;

        row.id = q::insert(conn, &row)?;
        audit(conn, "add", &format!("program:{}", row.id), &row.kode_program)?;
        Ok(row)
    }

    pub fn update(conn: &Connection, id: i64, input: ProgramInput) -> AppResult<Program> {
        let mut row = Self::get(conn, id)?;

        if let Some(instansi_id) = input.instansi_id {
            InstansiLogic::get(conn, instansi_id)?;
            row.instansi_id = instansi_id;
        }
        if input.kode_program.is_some() {
            row.kode_program = required_text(input.kode_program, "kode program", 50)?;
        }
        if input.nama_program.is_some() {
            row.nama_program = required_text(input.nama_program, "nama program", 255)?;
        }
        if input.deskripsi.is_some() {
            row.deskripsi = optional_text(input.deskripsi);
        }
        if let Some(anggaran) = input.anggaran {
            row.anggaran = non_negative(anggaran, "anggaran")?;
        }
        if let Some(tahun) = input.tahun {
            row.tahun = parse_year(tahun)?;
        }
        if let Some(status) = input.status {
            row.status = status;
        }
        row.updated_at = now_str();
        Self::check_code(conn, &row)?;

        q::update(conn, &row)?;
        audit(conn, "edit", &format!("program:{id}"), &row.kode_program)?;
        Ok(row)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<Program> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("Program", id))
    }

    pub fn list(
        conn: &Connection,
        instansi_id: Option<i64>,
        tahun: Option<i32>,
    ) -> AppResult<Vec<Program>> {
        Ok(q::list(conn, instansi_id, tahun)?)
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let row = Self::get(conn, id)?;

        let (kegiatan, indicators) = q::dependents(conn, id)?;
        if kegiatan + indicators > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete program {}: {kegiatan} kegiatan and {indicators} indicator(s) still reference it",
                row.kode_program
            )));
        }

        q::delete(conn, id)?;
        audit(conn, "del", &format!("program:{id}"), &row.kode_program)?;
        Ok(())
    }

    fn check_code(conn: &Connection, row: &Program) -> AppResult<()> {
        let except = (row.id != 0).then_some(row.id);
        if q::code_taken(conn, &row.kode_program, except)? {
            return Err(AppError::Duplicate(format!(
                "The kode program '{}' has already been taken.",
                row.kode_program
            )));
        }
        Ok(())
    }
}
