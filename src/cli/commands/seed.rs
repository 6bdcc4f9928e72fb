use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::rbac::RbacLogic;
use crate::db;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Seed = cmd {
        let pool = db::open(cfg)?;
        let summary = RbacLogic::seed(&pool.conn)?;

        for p in &summary.permissions_created {
            info(format!("permission {p}"));
        }
        for r in &summary.roles_created {
            info(format!("role {r}"));
        }
        success(format!(
            "Seed completed: {} permission(s), {} role(s) created",
            summary.permissions_created.len(),
            summary.roles_created.len()
        ));
    }
    Ok(())
}
