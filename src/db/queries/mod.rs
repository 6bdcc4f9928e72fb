//! SQL access per table. Functions take a plain connection so they can run
//! inside a transaction as well.

pub mod assessment;
pub mod dashboard;
pub mod evidence;
pub mod indicator;
pub mod instansi;
pub mod kegiatan;
pub mod performance;
pub mod program;
pub mod rbac;
pub mod report;
pub mod target;
pub mod user;

use rusqlite::{Connection, Params, Result};

/// `SELECT COUNT(*) ...` helper.
pub fn count<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<i64> {
    conn.query_row(sql, params, |row| row.get(0))
}

pub fn exists<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<bool> {
    Ok(count(conn, sql, params)? > 0)
}
