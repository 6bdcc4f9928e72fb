use crate::cli::parser::{Commands, RoleAction};
use crate::config::Config;
use crate::core::rbac::RbacLogic;
use crate::core::users::UserLogic;
use crate::db;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{GREEN, RED, RESET};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Role { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            RoleAction::List => {
                let roles = RbacLogic::roles(conn)?;
                if roles.is_empty() {
                    info("No roles found. Run `sakip seed` first.");
                    return Ok(());
                }
                let mut table = Table::new(&["Role", "Display name", "Permissions"]);
                for r in roles {
                    table.add_row(vec![
                        r.role.name,
                        r.role.display_name,
                        r.permissions.join(", "),
                    ]);
                }
                table.print();
            }
            RoleAction::Assign { user, role } => {
                let u = UserLogic::find(conn, user)?;
                if RbacLogic::assign_role(conn, u.id, role)? {
                    success(format!("Role '{role}' assigned to {}", u.email));
                } else {
                    warning(format!("{} already has role '{role}'", u.email));
                }
            }
            RoleAction::Remove { user, role } => {
                let u = UserLogic::find(conn, user)?;
                RbacLogic::remove_role(conn, u.id, role)?;
                success(format!("Role '{role}' removed from {}", u.email));
            }
            RoleAction::Grant { user, permission } => {
                let u = UserLogic::find(conn, user)?;
                if RbacLogic::grant(conn, u.id, permission)? {
                    success(format!("Permission '{permission}' granted to {}", u.email));
                } else {
                    warning(format!("{} already holds '{permission}'", u.email));
                }
            }
            RoleAction::Check { user, permission } => {
                let u = UserLogic::find(conn, user)?;
                if RbacLogic::has_permission(conn, u.id, permission)? {
                    println!("{GREEN}✔ {} has {permission}{RESET}", u.email);
                } else {
                    println!("{RED}✘ {} lacks {permission}{RESET}", u.email);
                }
            }
        }
    }
    Ok(())
}
