use crate::core::{check_len, optional_text, required_text};
use crate::db::log::audit;
use crate::db::queries::instansi as q;
use crate::errors::{AppError, AppResult};
use crate::models::instansi::{Instansi, InstansiInput};
use crate::models::status::InstansiStatus;
use crate::utils::date::now_str;
use rusqlite::Connection;

/// High-level business logic for government institutions.
pub struct InstansiLogic;

impl InstansiLogic {
    pub fn create(conn: &Connection, input: InstansiInput) -> AppResult<Instansi> {
        let now = now_str();
        let mut row = Instansi {
            id: 0,
            kode_instansi: required_text(input.kode_instansi, "kode instansi", 20)?,
            nama_instansi: required_text(input.nama_instansi, "nama instansi", 255)?,
            alamat: optional_text(input.alamat),
            telepon: optional_text(input.telepon),
            email: optional_text(input.email),
            website: optional_text(input.website),
            kepala_instansi: optional_text(input.kepala_instansi),
            nip_kepala: optional_text(input.nip_kepala),
            status: input.status.unwrap_or(InstansiStatus::Aktif),
            created_at: now.clone(),
            updated_at: now,
        };
        Self::check(conn, &row)?;

        row.id = q::insert(conn, &row)?;
        audit(conn, "add", &format!("instansi:{}", row.id), &row.kode_instansi)?;
        Ok(row)
    }

    /// Partial update: fields left as None keep their stored value.
    pub fn update(conn: &Connection, id: i64, input: InstansiInput) -> AppResult<Instansi> {
        let mut row = Self::get(conn, id)?;

        if input.kode_instansi.is_some() {
            row.kode_instansi = required_text(input.kode_instansi, "kode instansi", 20)?;
        }
        if input.nama_instansi.is_some() {
            row.nama_instansi = required_text(input.nama_instansi, "nama instansi", 255)?;
        }
        if input.alamat.is_some() {
            row.alamat = optional_text(input.alamat);
        }
        if input.telepon.is_some() {
            row.telepon = optional_text(input.telepon);
        }
        if input.email.is_some() {
            row.email = optional_text(input.email);
        }
        if input.website.is_some() {
            row.website = optional_text(input.website);
        }
        if input.kepala_instansi.is_some() {
            row.kepala_instansi = optional_text(input.kepala_instansi);
        }
        if input.nip_kepala.is_some() {
            row.nip_kepala = optional_text(input.nip_kepala);
        }
        if let Some(status) = input.status {
            row.status = status;
        }
        row.updated_at = now_str();
        Self::check(conn, &row)?;

        q::update(conn, &row)?;
        audit(conn, "edit", &format!("instansi:{id}"), &row.kode_instansi)?;
        Ok(row)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<Instansi> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("Instansi", id))
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<Instansi>> {
        Ok(q::list(conn)?)
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let row = Self::get(conn, id)?;

        let (programs, indicators, users, data) = q::dependents(conn, id)?;
        if programs + indicators + users + data > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete instansi {}: {programs} program(s), {indicators} indicator(s), \
                 {users} user(s) and {data} data row(s) still reference it",
                row.kode_instansi
            )));
        }

        q::delete(conn, id)?;
        audit(conn, "del", &format!("instansi:{id}"), &row.kode_instansi)?;
        Ok(())
    }

    fn check(conn: &Connection, row: &Instansi) -> AppResult<()> {
        if let Some(email) = &row.email {
            check_len(email, "email", 255)?;
            if !email.contains('@') {
                return Err(AppError::Validation(
                    "The email must be a valid email address.".into(),
                ));
            }
        }
        if let Some(nip) = &row.nip_kepala {
            check_len(nip, "nip kepala", 30)?;
        }

        let except = (row.id != 0).then_some(row.id);
        if q::code_taken(conn, &row.kode_instansi, except)? {
            return Err(AppError::Duplicate(format!(
                "The kode instansi '{}' has already been taken.",
                row.kode_instansi
            )));
        }
        Ok(())
    }
}
