use crate::models::assessment::Assessment;
use crate::models::status::{AssessmentStatus, DbEnum};
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(conn: &Connection, a: &Assessment) -> Result<i64> {
    conn.execute(
        "INSERT INTO assessments (performance_data_id, assessed_by, overall_score, comments,
             recommendations, status, assessed_at, approved_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            a.performance_data_id,
            a.assessed_by,
            a.overall_score,
            a.comments,
            a.recommendations,
            a.status.to_db_str(),
            a.assessed_at,
            a.approved_at,
            a.created_at,
            a.updated_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, a: &Assessment) -> Result<usize> {
    conn.execute(
        "UPDATE assessments
         SET assessed_by = ?1, overall_score = ?2, comments = ?3, recommendations = ?4,
             status = ?5, assessed_at = ?6, approved_at = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            a.assessed_by,
            a.overall_score,
            a.comments,
            a.recommendations,
            a.status.to_db_str(),
            a.assessed_at,
            a.approved_at,
            a.updated_at,
            a.id
        ],
    )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Assessment>> {
    conn.query_row("SELECT * FROM assessments WHERE id = ?1", [id], Assessment::from_row)
        .optional()
}

pub fn for_data(conn: &Connection, data_id: i64) -> Result<Option<Assessment>> {
    conn.query_row(
        "SELECT * FROM assessments WHERE performance_data_id = ?1",
        [data_id],
        Assessment::from_row,
    )
    .optional()
}

pub fn list(conn: &Connection, status: Option<AssessmentStatus>) -> Result<Vec<Assessment>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM assessments
         WHERE (?1 IS NULL OR status = ?1)
         ORDER BY id DESC",
    )?;
    let rows = stmt.query_map([status.map(|s| s.to_db_str())], Assessment::from_row)?;
    rows.collect()
}

/// Approved assessments whose data belongs to the year.
pub fn approved_in_year(conn: &Connection, instansi_id: Option<i64>, year: i32) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM assessments a
         JOIN performance_data pd ON pd.id = a.performance_data_id
         WHERE a.status = 'approved'
           AND pd.period LIKE ?1 || '%'
           AND (?2 IS NULL OR pd.instansi_id = ?2)",
        params![format!("{year:04}"), instansi_id],
    )
}
