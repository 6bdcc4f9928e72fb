use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{hint, info, success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = db_path.to_string_lossy().to_string();

    info("Initializing sakip…");
    info(format!("Config file : {}", Config::config_file().display()));
    info(format!("Database    : {db_path}"));

    let pool = DbPool::new(&db_path)?;
    let applied = init_db(&pool.conn)?;

    if let Err(e) = audit(&pool.conn, "init", "database", &db_path) {
        warning(format!("Failed to write internal log: {e}"));
    }

    success(format!(
        "Database initialized at {db_path} ({applied} migration(s) applied)"
    ));
    hint("Run `sakip seed` to create the permission catalogue and default roles.");
    Ok(())
}
