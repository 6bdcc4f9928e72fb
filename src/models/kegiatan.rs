use crate::models::status::{KegiatanStatus, enum_col};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Activity carried out under a program.
#[derive(Debug, Clone, Serialize)]
pub struct Kegiatan {
    pub id: i64,
    pub program_id: i64,
    pub kode_kegiatan: String,
    pub nama_kegiatan: String,
    pub deskripsi: Option<String>,
    pub anggaran: f64,
    pub tanggal_mulai: Option<String>,
    pub tanggal_selesai: Option<String>,
    pub penanggung_jawab: Option<String>,
    pub status: KegiatanStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Kegiatan {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            program_id: row.get("program_id")?,
            kode_kegiatan: row.get("kode_kegiatan")?,
            nama_kegiatan: row.get("nama_kegiatan")?,
            deskripsi: row.get("deskripsi")?,
            anggaran: row.get("anggaran")?,
            tanggal_mulai: row.get("tanggal_mulai")?,
            tanggal_selesai: row.get("tanggal_selesai")?,
            penanggung_jawab: row.get("penanggung_jawab")?,
            status: enum_col(row, "status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KegiatanInput {
    pub program_id: Option<i64>,
    pub kode_kegiatan: Option<String>,
    pub nama_kegiatan: Option<String>,
    pub deskripsi: Option<String>,
    pub anggaran: Option<f64>,
    pub tanggal_mulai: Option<String>,
    pub tanggal_selesai: Option<String>,
    pub penanggung_jawab: Option<String>,
    pub status: Option<KegiatanStatus>,
}
