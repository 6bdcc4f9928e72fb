use crate::models::report::Report;
use crate::models::status::{DbEnum, ReportStatus};
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(conn: &Connection, r: &Report) -> Result<i64> {
    conn.execute(
        "INSERT INTO reports (instansi_id, generated_by, report_type, format, period, file_path,
             parameters, status, generated_at, submitted_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            r.instansi_id,
            r.generated_by,
            r.report_type.to_db_str(),
            r.format,
            r.period,
            r.file_path,
            r.parameters.to_string(),
            r.status.to_db_str(),
            r.generated_at,
            r.submitted_at,
            r.created_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn finish(
    conn: &Connection,
    id: i64,
    status: ReportStatus,
    file_path: Option<&str>,
    parameters: &serde_json::Value,
    generated_at: &str,
) -> Result<usize> {
    conn.execute(
        "UPDATE reports SET status = ?1, file_path = ?2, parameters = ?3, generated_at = ?4
         WHERE id = ?5",
        params![
            status.to_db_str(),
            file_path,
            parameters.to_string(),
            generated_at,
            id
        ],
    )
}

pub fn mark_submitted(conn: &Connection, id: i64, now: &str) -> Result<usize> {
    conn.execute(
        "UPDATE reports SET status = 'submitted', submitted_at = ?1 WHERE id = ?2",
        params![now, id],
    )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Report>> {
    conn.query_row("SELECT * FROM reports WHERE id = ?1", [id], Report::from_row)
        .optional()
}

pub fn list(conn: &Connection, instansi_id: Option<i64>) -> Result<Vec<Report>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM reports
         WHERE (?1 IS NULL OR instansi_id = ?1)
         ORDER BY id DESC",
    )?;
    let rows = stmt.query_map([instansi_id], Report::from_row)?;
    rows.collect()
}
