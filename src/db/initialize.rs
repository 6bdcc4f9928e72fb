//! Schema bootstrap for a fresh or existing database.

use crate::db::migrate::run_pending_migrations;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;

/// Tables every command and API handler expects.
pub const REQUIRED_TABLES: &[&str] = &[
    "users",
    "roles",
    "permissions",
    "role_user",
    "permission_role",
    "permission_user",
    "api_tokens",
    "instansi",
    "programs",
    "kegiatan",
    "performance_indicators",
    "targets",
    "performance_data",
    "evidence_documents",
    "assessments",
    "reports",
    "log",
];

/// Apply pending migrations, then make sure no table went missing.
/// Returns the number of migrations applied.
pub fn init_db(conn: &Connection) -> AppResult<usize> {
    let applied = run_pending_migrations(conn)?;

    let missing = missing_tables(conn)?;
    if !missing.is_empty() {
        return Err(AppError::Migration(format!(
            "tables missing after migration: {}",
            missing.join(", ")
        )));
    }
    Ok(applied)
}

pub fn missing_tables(conn: &Connection) -> AppResult<Vec<&'static str>> {
    let mut stmt =
        conn.prepare_cached("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let mut out = Vec::new();
    for table in REQUIRED_TABLES {
        if !stmt.exists([table])? {
            out.push(*table);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::DbPool;

    #[test]
    fn fresh_database_gets_every_table() {
        let pool = DbPool::in_memory().unwrap();
        assert_eq!(missing_tables(&pool.conn).unwrap().len(), REQUIRED_TABLES.len());

        assert!(init_db(&pool.conn).unwrap() > 0);
        assert!(missing_tables(&pool.conn).unwrap().is_empty());
        assert_eq!(init_db(&pool.conn).unwrap(), 0);
    }

    #[test]
    fn dropped_table_is_reported() {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        pool.conn.execute_batch("DROP TABLE reports").unwrap();

        let err = init_db(&pool.conn).unwrap_err().to_string();
        assert!(err.contains("reports"), "{err}");
    }
}
