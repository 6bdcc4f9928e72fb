use crate::models::status::{DbEnum, TargetStatus};
use crate::models::target::Target;
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(conn: &Connection, t: &Target) -> Result<i64> {
    conn.execute(
        "INSERT INTO targets (indicator_id, year, target_value, minimum_value, justification,
                              status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            t.indicator_id,
            t.year,
            t.target_value,
            t.minimum_value,
            t.justification,
            t.status.to_db_str(),
            t.created_at,
            t.updated_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, t: &Target) -> Result<usize> {
    conn.execute(
        "UPDATE targets
         SET indicator_id = ?1, year = ?2, target_value = ?3, minimum_value = ?4,
             justification = ?5, status = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            t.indicator_id,
            t.year,
            t.target_value,
            t.minimum_value,
            t.justification,
            t.status.to_db_str(),
            t.updated_at,
            t.id
        ],
    )
}

pub fn set_status(conn: &Connection, id: i64, status: TargetStatus, now: &str) -> Result<usize> {
    conn.execute(
        "UPDATE targets SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.to_db_str(), now, id],
    )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Target>> {
    conn.query_row("SELECT * FROM targets WHERE id = ?1", [id], Target::from_row)
        .optional()
}

pub fn for_indicator_year(conn: &Connection, indicator_id: i64, year: i32) -> Result<Option<Target>> {
    conn.query_row(
        "SELECT * FROM targets WHERE indicator_id = ?1 AND year = ?2",
        params![indicator_id, year],
        Target::from_row,
    )
    .optional()
}

pub fn list(conn: &Connection, indicator_id: Option<i64>, year: Option<i32>) -> Result<Vec<Target>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM targets
         WHERE (?1 IS NULL OR indicator_id = ?1)
           AND (?2 IS NULL OR year = ?2)
         ORDER BY year DESC, indicator_id ASC",
    )?;
    let rows = stmt.query_map(params![indicator_id, year], Target::from_row)?;
    rows.collect()
}

/// Performance data rows of the indicator reported in the target's year.
pub fn data_in_year(conn: &Connection, indicator_id: i64, year: i32) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM performance_data
         WHERE indicator_id = ?1 AND substr(period, 1, 4) = ?2",
        params![indicator_id, format!("{year:04}")],
    )
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM targets WHERE id = ?1", [id])
}
