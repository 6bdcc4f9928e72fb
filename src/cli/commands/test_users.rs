use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::test_users::TestUserLogic;
use crate::db;
use crate::errors::AppResult;
use crate::ui::messages::{header, info, success, warning};
use crate::ui::prompt::confirm;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::RemoveTestUsers { force, dry_run } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        header("Test user cleanup");
        let users = TestUserLogic::find(conn)?;
        if users.is_empty() {
            success("No test users found");
            return Ok(());
        }

        let mut table = Table::new(&["ID", "Name", "Email", "Roles", "Created"]);
        for t in &users {
            table.add_row(vec![
                t.user.id.to_string(),
                t.user.name.clone(),
                t.user.email.clone(),
                t.roles.join(", "),
                t.user.created_at.clone(),
            ]);
        }
        table.print();
        info(format!("{} test user(s) found", users.len()));

        if *dry_run {
            info("Dry run: nothing was deleted");
            return Ok(());
        }

        if !*force {
            if !confirm(&format!("Delete these {} user(s)?", users.len()))? {
                warning("Operation cancelled");
                return Ok(());
            }
            if cfg.environment.is_production()
                && !confirm("This is a PRODUCTION database. Really delete?")?
            {
                warning("Operation cancelled");
                return Ok(());
            }
        }

        let deleted = TestUserLogic::remove(conn, &users)?;
        success(format!("{deleted} test user(s) removed"));
    }
    Ok(())
}
