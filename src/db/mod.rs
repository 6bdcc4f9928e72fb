pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod queries;
pub mod stats;

use crate::config::Config;
use crate::errors::AppResult;
use pool::DbPool;

/// Open the configured database and bring its schema up to date.
pub fn open(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    initialize::init_db(&pool.conn)?;
    Ok(pool)
}
