use crate::models::program::Program;
use crate::models::status::DbEnum;
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(conn: &Connection, p: &Program) -> Result<i64> {
    conn.execute(
        "INSERT INTO programs (instansi_id, kode_program, nama_program, deskripsi, anggaran,
                               tahun, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            p.instansi_id,
            p.kode_program,
            p.nama_program,
            p.deskripsi,
            p.anggaran,
            p.tahun,
            p.status.to_db_str(),
            p.created_at,
            p.updated_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, p: &Program) -> Result<usize> {
    conn.execute(
        "UPDATE programs
         SET instansi_id = ?1, kode_program = ?2, nama_program = ?3, deskripsi = ?4,
             anggaran = ?5, tahun = ?6, status = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            p.instansi_id,
            p.kode_program,
            p.nama_program,
            p.deskripsi,
            p.anggaran,
            p.tahun,
            p.status.to_db_str(),
            p.updated_at,
            p.id
        ],
    )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Program>> {
    conn.query_row("SELECT * FROM programs WHERE id = ?1", [id], Program::from_row)
        .optional()
}

/// Programs filtered by instansi and/or year (NULL filters match everything).
pub fn list(conn: &Connection, instansi_id: Option<i64>, tahun: Option<i32>) -> Result<Vec<Program>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM programs
         WHERE (?1 IS NULL OR instansi_id = ?1)
           AND (?2 IS NULL OR tahun = ?2)
         ORDER BY tahun DESC, kode_program ASC",
    )?;
    let rows = stmt.query_map(params![instansi_id, tahun], Program::from_row)?;
    rows.collect()
}

pub fn code_taken(conn: &Connection, kode: &str, except_id: Option<i64>) -> Result<bool> {
    super::exists(
        conn,
        "SELECT COUNT(*) FROM programs WHERE kode_program = ?1 AND id != ?2",
        params![kode, except_id.unwrap_or(0)],
    )
}

/// (kegiatan, indicators) still attached to the program.
pub fn dependents(conn: &Connection, id: i64) -> Result<(i64, i64)> {
    Ok((
        super::count(conn, "SELECT COUNT(*) FROM kegiatan WHERE program_id = ?1", [id])?,
        super::count(
            conn,
            "SELECT COUNT(*) FROM performance_indicators WHERE program_id = ?1",
            [id],
        )?,
    ))
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM programs WHERE id = ?1", [id])
}
