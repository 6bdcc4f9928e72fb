use crate::models::performance_data::PerformanceData;
use crate::models::status::{DataStatus, DbEnum};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub fn insert(conn: &Connection, d: &PerformanceData) -> Result<i64> {
    conn.execute(
        "INSERT INTO performance_data (indicator_id, instansi_id, submitted_by, period,
             actual_value, notes, status, data_quality, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            d.indicator_id,
            d.instansi_id,
            d.submitted_by,
            d.period,
            d.actual_value,
            d.notes,
            d.status.to_db_str(),
            d.data_quality.map(|q| q.to_db_str()),
            d.created_at,
            d.updated_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Persist every mutable column, status timestamps included.
pub fn update(conn: &Connection, d: &PerformanceData) -> Result<usize> {
    conn.execute(
        "UPDATE performance_data
         SET indicator_id = ?1, instansi_id = ?2, submitted_by = ?3, period = ?4,
             actual_value = ?5, notes = ?6, status = ?7, data_quality = ?8,
             rejection_reason = ?9, submitted_at = ?10, validated_at = ?11, updated_at = ?12
         WHERE id = ?13",
        params![
            d.indicator_id,
            d.instansi_id,
            d.submitted_by,
            d.period,
            d.actual_value,
            d.notes,
            d.status.to_db_str(),
            d.data_quality.map(|q| q.to_db_str()),
            d.rejection_reason,
            d.submitted_at,
            d.validated_at,
            d.updated_at,
            d.id
        ],
    )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<PerformanceData>> {
    conn.query_row(
        "SELECT * FROM performance_data WHERE id = ?1",
        [id],
        PerformanceData::from_row,
    )
    .optional()
}

pub fn find_duplicate(
    conn: &Connection,
    indicator_id: i64,
    instansi_id: i64,
    period: &str,
    except_id: Option<i64>,
) -> Result<bool> {
    super::exists(
        conn,
        "SELECT COUNT(*) FROM performance_data
         WHERE indicator_id = ?1 AND instansi_id = ?2 AND period = ?3 AND id != ?4",
        params![indicator_id, instansi_id, period, except_id.unwrap_or(0)],
    )
}

pub struct DataFilter<'a> {
    pub instansi_id: Option<i64>,
    pub indicator_id: Option<i64>,
    pub status: Option<DataStatus>,
    pub period_prefix: Option<&'a str>,
}

pub fn list(conn: &Connection, f: &DataFilter) -> Result<Vec<PerformanceData>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM performance_data
         WHERE (?1 IS NULL OR instansi_id = ?1)
           AND (?2 IS NULL OR indicator_id = ?2)
           AND (?3 IS NULL OR status = ?3)
           AND (?4 IS NULL OR period LIKE ?4 || '%')
         ORDER BY period DESC, id DESC",
    )?;
    let rows = stmt.query_map(
        params![
            f.instansi_id,
            f.indicator_id,
            f.status.map(|s| s.to_db_str()),
            f.period_prefix
        ],
        PerformanceData::from_row,
    )?;
    rows.collect()
}

pub fn assessment_count(conn: &Connection, id: i64) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM assessments WHERE performance_data_id = ?1",
        [id],
    )
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM performance_data WHERE id = ?1", [id])
}

/// Data row joined with its indicator, instansi and the target of the
/// period's year. Input for every dashboard aggregation.
#[derive(Debug, Clone)]
pub struct DataPoint {
    pub data_id: i64,
    pub indicator_id: i64,
    pub indicator_code: String,
    pub indicator_name: String,
    pub category: String,
    pub weight: f64,
    pub is_mandatory: bool,
    pub instansi_id: i64,
    pub instansi_name: String,
    pub period: String,
    pub actual_value: f64,
    pub status: String,
    pub target_value: Option<f64>,
    pub submitted_at: Option<String>,
    pub submitter: Option<String>,
}

fn map_point(row: &Row) -> Result<DataPoint> {
    Ok(DataPoint {
        data_id: row.get("data_id")?,
        indicator_id: row.get("indicator_id")?,
        indicator_code: row.get("code")?,
        indicator_name: row.get("name")?,
        category: row.get("category")?,
        weight: row.get("weight")?,
        is_mandatory: row.get::<_, i64>("is_mandatory")? == 1,
        instansi_id: row.get("instansi_id")?,
        instansi_name: row.get("nama_instansi")?,
        period: row.get("period")?,
        actual_value: row.get("actual_value")?,
        status: row.get("status")?,
        target_value: row.get("target_value")?,
        submitted_at: row.get("submitted_at")?,
        submitter: row.get("submitter")?,
    })
}

const POINT_SELECT: &str = "
    SELECT pd.id AS data_id, pd.indicator_id, pi.code, pi.name, pi.category, pi.weight,
           pi.is_mandatory, pd.instansi_id, i.nama_instansi, pd.period, pd.actual_value,
           pd.status, t.target_value, pd.submitted_at, u.name AS submitter
    FROM performance_data pd
    JOIN performance_indicators pi ON pi.id = pd.indicator_id
    JOIN instansi i ON i.id = pd.instansi_id
    LEFT JOIN targets t
           ON t.indicator_id = pd.indicator_id
          AND t.year = CAST(substr(pd.period, 1, 4) AS INTEGER)
    LEFT JOIN users u ON u.id = pd.submitted_by";

/// Data points, newest period first. `limit` of None returns every row.
pub fn points(conn: &Connection, f: &DataFilter, limit: Option<i64>) -> Result<Vec<DataPoint>> {
    let sql = format!(
        "{POINT_SELECT}
         WHERE (?1 IS NULL OR pd.instansi_id = ?1)
           AND (?2 IS NULL OR pd.indicator_id = ?2)
           AND (?3 IS NULL OR pd.status = ?3)
           AND (?4 IS NULL OR pd.period LIKE ?4 || '%')
         ORDER BY pd.period DESC, pd.id DESC
         LIMIT ?5"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            f.instansi_id,
            f.indicator_id,
            f.status.map(|s| s.to_db_str()),
            f.period_prefix,
            limit.unwrap_or(-1)
        ],
        map_point,
    )?;
    rows.collect()
}

/// Latest submissions (rows that were ever submitted), newest first.
pub fn recent_submissions(
    conn: &Connection,
    instansi_id: Option<i64>,
    limit: i64,
) -> Result<Vec<DataPoint>> {
    let sql = format!(
        "{POINT_SELECT}
         WHERE pd.submitted_at IS NOT NULL
           AND (?1 IS NULL OR pd.instansi_id = ?1)
         ORDER BY pd.submitted_at DESC, pd.id DESC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![instansi_id, limit], map_point)?;
    rows.collect()
}
