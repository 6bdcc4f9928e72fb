use crate::models::status::{InstansiStatus, enum_col};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Government institution, the root of the organisational tree.
#[derive(Debug, Clone, Serialize)]
pub struct Instansi {
    pub id: i64,
    pub kode_instansi: String,
    pub nama_instansi: String,
    pub alamat: Option<String>,
    pub telepon: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub kepala_instansi: Option<String>,
    pub nip_kepala: Option<String>,
    pub status: InstansiStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Instansi {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            kode_instansi: row.get("kode_instansi")?,
            nama_instansi: row.get("nama_instansi")?,
            alamat: row.get("alamat")?,
            telepon: row.get("telepon")?,
            email: row.get("email")?,
            website: row.get("website")?,
            kepala_instansi: row.get("kepala_instansi")?,
            nip_kepala: row.get("nip_kepala")?,
            status: enum_col(row, "status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstansiInput {
    pub kode_instansi: Option<String>,
    pub nama_instansi: Option<String>,
    pub alamat: Option<String>,
    pub telepon: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub kepala_instansi: Option<String>,
    pub nip_kepala: Option<String>,
    pub status: Option<InstansiStatus>,
}
