use crate::models::status::{ProgramStatus, enum_col};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub id: i64,
    pub instansi_id: i64,
    pub kode_program: String,
    pub nama_program: String,
    pub deskripsi: Option<String>,
    pub anggaran: f64,
    pub tahun: i32,
    pub status: ProgramStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Program {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            instansi_id: row.get("instansi_id")?,
            kode_program: row.get("kode_program")?,
            nama_program: row.get("nama_program")?,
            deskripsi: row.get("deskripsi")?,
            anggaran: row.get("anggaran")?,
            tahun: row.get("tahun")?,
            status: enum_col(row, "status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramInput {
    pub instansi_id: Option<i64>,
    pub kode_program: Option<String>,
    pub nama_program: Option<String>,
    pub deskripsi: Option<String>,
    pub anggaran: Option<f64>,
    pub tahun: Option<i32>,
    pub status: Option<ProgramStatus>,
}
