//! Counters behind the dashboard cards. `instansi_id` of None means all.

use rusqlite::{Connection, Result, params};

pub fn indicator_count(conn: &Connection, instansi_id: Option<i64>) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM performance_indicators WHERE (?1 IS NULL OR instansi_id = ?1)",
        params![instansi_id],
    )
}

pub fn mandatory_indicator_count(conn: &Connection, instansi_id: Option<i64>) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM performance_indicators
         WHERE is_mandatory = 1 AND (?1 IS NULL OR instansi_id = ?1)",
        params![instansi_id],
    )
}

pub fn approved_targets(conn: &Connection, instansi_id: Option<i64>, year: i32) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM targets t
         JOIN performance_indicators pi ON pi.id = t.indicator_id
         WHERE t.status = 'approved' AND t.year = ?2
           AND (?1 IS NULL OR pi.instansi_id = ?1)",
        params![instansi_id, year],
    )
}

/// Data rows of `year` in the given status.
pub fn data_count(
    conn: &Connection,
    instansi_id: Option<i64>,
    year: i32,
    status: &str,
) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM performance_data
         WHERE status = ?3 AND substr(period, 1, 4) = ?2
           AND (?1 IS NULL OR instansi_id = ?1)",
        params![instansi_id, year.to_string(), status],
    )
}

pub fn validated_mandatory_data(
    conn: &Connection,
    instansi_id: Option<i64>,
    year: i32,
) -> Result<i64> {
    super::count(
        conn,
        "SELECT COUNT(*) FROM performance_data pd
         JOIN performance_indicators pi ON pi.id = pd.indicator_id
         WHERE pi.is_mandatory = 1 AND pd.status = 'validated'
           AND substr(pd.period, 1, 4) = ?2
           AND (?1 IS NULL OR pd.instansi_id = ?1)",
        params![instansi_id, year.to_string()],
    )
}
