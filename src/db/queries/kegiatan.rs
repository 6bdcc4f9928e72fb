use crate::models::kegiatan::Kegiatan;
use crate::models::status::DbEnum;
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(conn: &Connection, k: &Kegiatan) -> Result<i64> {
    conn.execute(
        "INSERT INTO kegiatan (program_id, kode_kegiatan, nama_kegiatan, deskripsi, anggaran,
                               tanggal_mulai, tanggal_selesai, penanggung_jawab, status,
                               created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            k.program_id,
            k.kode_kegiatan,
            k.nama_kegiatan,
            k.deskripsi,
            k.anggaran,
            k.tanggal_mulai,
            k.tanggal_selesai,
            k.penanggung_jawab,
            k.status.to_db_str(),
            k.created_at,
            k.updated_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, k: &Kegiatan) -> Result<usize> {
    conn.execute(
        "UPDATE kegiatan
         SET program_id = ?1, kode_kegiatan = ?2, nama_kegiatan = ?3, deskripsi = ?4,
             anggaran = ?5, tanggal_mulai = ?6, tanggal_selesai = ?7, penanggung_jawab = ?8,
             status = ?9, updated_at = ?10
         WHERE id = ?11",
        params![
            k.program_id,
            k.kode_kegiatan,
            k.nama_kegiatan,
            k.deskripsi,
            k.anggaran,
            k.tanggal_mulai,
            k.tanggal_selesai,
            k.penanggung_jawab,
            k.status.to_db_str(),
            k.updated_at,
            k.id
        ],
    )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Kegiatan>> {
    conn.query_row("SELECT * FROM kegiatan WHERE id = ?1", [id], Kegiatan::from_row)
        .optional()
}

pub fn list(conn: &Connection, program_id: Option<i64>) -> Result<Vec<Kegiatan>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM kegiatan
         WHERE (?1 IS NULL OR program_id = ?1)
         ORDER BY kode_kegiatan ASC",
    )?;
    let rows = stmt.query_map([program_id], Kegiatan::from_row)?;
    rows.collect()
}

pub fn code_taken(conn: &Connection, kode: &str, except_id: Option<i64>) -> Result<bool> {
    super::exists(
        conn,
        "SELECT COUNT(*) FROM kegiatan WHERE kode_kegiatan = ?1 AND id != ?2",
        params![kode, except_id.unwrap_or(0)],
    )
}

pub fn indicator_count(conn: &Connection, id: i64) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM performance_indicators WHERE kegiatan_id = ?1",
        [id],
    )
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM kegiatan WHERE id = ?1", [id])
}
