use crate::models::instansi::Instansi;
use crate::models::status::DbEnum;
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(conn: &Connection, i: &Instansi) -> Result<i64> {
    conn.execute(
        "INSERT INTO instansi (kode_instansi, nama_instansi, alamat, telepon, email, website,
                               kepala_instansi, nip_kepala, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            i.kode_instansi,
            i.nama_instansi,
            i.alamat,
            i.telepon,
            i.email,
            i.website,
            i.kepala_instansi,
            i.nip_kepala,
            i.status.to_db_str(),
            i.created_at,
            i.updated_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, i: &Instansi) -> Result<usize> {
    conn.execute(
        "UPDATE instansi
         SET kode_instansi = ?1, nama_instansi = ?2, alamat = ?3, telepon = ?4, email = ?5,
             website = ?6, kepala_instansi = ?7, nip_kepala = ?8, status = ?9, updated_at = ?10
         WHERE id = ?11",
        params![
            i.kode_instansi,
            i.nama_instansi,
            i.alamat,
            i.telepon,
            i.email,
            i.website,
            i.kepala_instansi,
            i.nip_kepala,
            i.status.to_db_str(),
            i.updated_at,
            i.id
        ],
    )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Instansi>> {
    conn.query_row("SELECT * FROM instansi WHERE id = ?1", [id], Instansi::from_row)
        .optional()
}

pub fn list(conn: &Connection) -> Result<Vec<Instansi>> {
    let mut stmt = conn.prepare("SELECT * FROM instansi ORDER BY kode_instansi ASC")?;
    let rows = stmt.query_map([], Instansi::from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn code_taken(conn: &Connection, kode: &str, except_id: Option<i64>) -> Result<bool> {
    super::exists(
        conn,
        "SELECT COUNT(*) FROM instansi WHERE kode_instansi = ?1 AND id != ?2",
        params![kode, except_id.unwrap_or(0)],
    )
}

/// Rows that block deletion: (programs, indicators, users, performance data).
pub fn dependents(conn: &Connection, id: i64) -> Result<(i64, i64, i64, i64)> {
    Ok((
        super::count(conn, "SELECT COUNT(*) FROM programs WHERE instansi_id = ?1", [id])?,
        super::count(
            conn,
            "SELECT COUNT(*) FROM performance_indicators WHERE instansi_id = ?1",
            [id],
        )?,
        super::count(conn, "SELECT COUNT(*) FROM users WHERE instansi_id = ?1", [id])?,
        super::count(
            conn,
            "SELECT COUNT(*) FROM performance_data WHERE instansi_id = ?1",
            [id],
        )?,
    ))
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM instansi WHERE id = ?1", [id])
}
