use crate::models::indicator::PerformanceIndicator;
use crate::models::status::DbEnum;
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(conn: &Connection, i: &PerformanceIndicator) -> Result<i64> {
    conn.execute(
        "INSERT INTO performance_indicators (instansi_id, program_id, kegiatan_id, code, name,
             description, measurement_unit, data_source, collection_method, frequency, category,
             weight, is_mandatory, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            i.instansi_id,
            i.program_id,
            i.kegiatan_id,
            i.code,
            i.name,
            i.description,
            i.measurement_unit,
            i.data_source,
            i.collection_method,
            i.frequency.to_db_str(),
            i.category.to_db_str(),
            i.weight,
            i.is_mandatory as i64,
            i.created_at,
            i.updated_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, i: &PerformanceIndicator) -> Result<usize> {
    conn.execute(
        "UPDATE performance_indicators
         SET instansi_id = ?1, program_id = ?2, kegiatan_id = ?3, code = ?4, name = ?5,
             description = ?6, measurement_unit = ?7, data_source = ?8, collection_method = ?9,
             frequency = ?10, category = ?11, weight = ?12, is_mandatory = ?13, updated_at = ?14
         WHERE id = ?15",
        params![
            i.instansi_id,
            i.program_id,
            i.kegiatan_id,
            i.code,
            i.name,
            i.description,
            i.measurement_unit,
            i.data_source,
            i.collection_method,
            i.frequency.to_db_str(),
            i.category.to_db_str(),
            i.weight,
            i.is_mandatory as i64,
            i.updated_at,
            i.id
        ],
    )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<PerformanceIndicator>> {
    conn.query_row(
        "SELECT * FROM performance_indicators WHERE id = ?1",
        [id],
        PerformanceIndicator::from_row,
    )
    .optional()
}

pub fn list(
    conn: &Connection,
    instansi_id: Option<i64>,
    category: Option<&str>,
) -> Result<Vec<PerformanceIndicator>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM performance_indicators
         WHERE (?1 IS NULL OR instansi_id = ?1)
           AND (?2 IS NULL OR category = ?2)
         ORDER BY code ASC",
    )?;
    let rows = stmt.query_map(params![instansi_id, category], PerformanceIndicator::from_row)?;
    rows.collect()
}

pub fn code_taken(conn: &Connection, code: &str, except_id: Option<i64>) -> Result<bool> {
    super::exists(
        conn,
        "SELECT COUNT(*) FROM performance_indicators WHERE code = ?1 AND id != ?2",
        params![code, except_id.unwrap_or(0)],
    )
}

/// (targets, performance data) recorded for the indicator.
pub fn dependents(conn: &Connection, id: i64) -> Result<(i64, i64)> {
    Ok((
        super::count(conn, "SELECT COUNT(*) FROM targets WHERE indicator_id = ?1", [id])?,
        super::count(
            conn,
            "SELECT COUNT(*) FROM performance_data WHERE indicator_id = ?1",
            [id],
        )?,
    ))
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM performance_indicators WHERE id = ?1", [id])
}
