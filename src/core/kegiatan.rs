use crate::core::program::ProgramLogic;
use crate::core::{non_negative, optional_text, required, required_text};
use crate::db::log::audit;
use crate::db::queries::kegiatan as q;
use crate::errors::{AppError, AppResult};
use crate::models::kegiatan::{Kegiatan, KegiatanInput};
use crate::models::status::KegiatanStatus;
use crate::utils::date::{now_str, parse_date};
use rusqlite::Connection;

pub struct KegiatanLogic;

impl KegiatanLogic {
    pub fn create(conn: &Connection, input: KegiatanInput) -> AppResult<Kegiatan> {
        let program_id = required(input.program_id, "program id")?;
        ProgramLogic::get(conn, program_id)?;

        let now = now_str();
        let mut row = Kegiatan {
            id: 0,
            program_id,
            kode_kegiatan: required_text(input.kode_kegiatan, "kode kegiatan", 50)?,
            nama_kegiatan: required_text(input.nama_kegiatan, "nama kegiatan", 255)?,
            deskripsi: optional_text(input.deskripsi),
            anggaran: non_negative(input.anggaran.unwrap_or(0.0), "anggaran")?,
            tanggal_mulai: optional_text(input.tanggal_mulai),
            tanggal_selesai: optional_text(input.tanggal_selesai),
            penanggung_jawab: optional_text(input.penanggung_jawab),
            status: input.status.unwrap_or(KegiatanStatus::Draft),
            created_at: now.clone(),
            updated_at: now,
        };
        Self::check(conn, &row)?;

        row.id = q::insert(conn, &row)?;
        audit(conn, "add", &format!("kegiatan:{}", row.id), &row.kode_kegiatan)?;
        Ok(row)
    }

    pub fn update(conn: &Connection, id: i64, input: KegiatanInput) -> AppResult<Kegiatan> {
        let mut row = Self::get(conn, id)?;

        if let Some(program_id) = input.program_id {
            ProgramLogic::get(conn, program_id)?;
            row.program_id = program_id;
        }
        if input.kode_kegiatan.is_some() {
            row.kode_kegiatan = required_text(input.kode_kegiatan, "kode kegiatan", 50)?;
        }
        if input.nama_kegiatan.is_some() {
            row.nama_kegiatan = required_text(input.nama_kegiatan, "nama kegiatan", 255)?;
        }
        if input.deskripsi.is_some() {
            row.deskripsi = optional_text(input.deskripsi);
        }
        if let Some(anggaran) = input.anggaran {
            row.anggaran = non_negative(anggaran, "anggaran")?;
        }
        if input.tanggal_mulai.is_some() {
            row.tanggal_mulai = optional_text(input.tanggal_mulai);
        }
        if input.tanggal_selesai.is_some() {
            row.tanggal_selesai = optional_text(input.tanggal_selesai);
        }
        if input.penanggung_jawab.is_some() {
            row.penanggung_jawab = optional_text(input.penanggung_jawab);
        }
        if let Some(status) = input.status {
            row.status = status;
        }
        row.updated_at = now_str();
        Self::check(conn, &row)?;

        q::update(conn, &row)?;
        audit(conn, "edit", &format!("kegiatan:{id}"), &row.kode_kegiatan)?;
        Ok(row)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<Kegiatan> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("Kegiatan", id))
    }

    pub fn list(conn: &Connection, program_id: Option<i64>) -> AppResult<Vec<Kegiatan>> {
        Ok(q::list(conn, program_id)?)
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let row = Self::get(conn, id)?;

        let indicators = q::indicator_count(conn, id)?;
        if indicators > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete kegiatan {}: {indicators} indicator(s) still reference it",
                row.kode_kegiatan
            )));
        }

        q::delete(conn, id)?;
        audit(conn, "del", &format!("kegiatan:{id}"), &row.kode_kegiatan)?;
        Ok(())
    }

    fn check(conn: &Connection, row: &Kegiatan) -> AppResult<()> {
        let start = match &row.tanggal_mulai {
            Some(s) => Some(parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?),
            None => None,
        };
        let end = match &row.tanggal_selesai {
            Some(s) => Some(parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?),
            None => None,
        };
        if let (Some(start), Some(end)) = (start, end)
            && end < start
        {
            return Err(AppError::Validation(
                "The tanggal selesai must be a date after or equal to tanggal mulai.".into(),
            ));
        }

        let except = (row.id != 0).then_some(row.id);
        if q::code_taken(conn, &row.kode_kegiatan, except)? {
            return Err(AppError::Duplicate(format!(
                "The kode kegiatan '{}' has already been taken.",
                row.kode_kegiatan
            )));
        }
        Ok(())
    }
}
