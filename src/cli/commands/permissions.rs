use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::rbac::{PERMISSIONS, RbacLogic};
use crate::core::users::UserLogic;
use crate::db;
use crate::errors::AppResult;
use crate::ui::messages::{error, header, info, success, warning};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::AddPermissions {
        user,
        role,
        all_users,
        fix_all,
    } = cmd
    {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        header("SAKIP permissions");
        let created = RbacLogic::ensure_permissions(conn)?;
        if created.is_empty() {
            info(format!("All {} SAKIP permissions exist", PERMISSIONS.len()));
        } else {
            for name in &created {
                success(format!("Created permission: {name}"));
            }
        }

        let mut acted = false;

        if *fix_all {
            acted = true;
            if RbacLogic::fix_all(conn)? {
                success("superadmin now holds every permission");
            } else {
                warning("No superadmin role found; run `sakip seed` to create it");
            }
            success("Every user can view the SAKIP dashboard");
        }

        if *all_users {
            acted = true;
            let users = RbacLogic::grant_required_to_all_users(conn)?;
            success(format!("Required permissions granted to {} user(s)", users.len()));
        }

        if let Some(key) = user {
            acted = true;
            let u = UserLogic::find(conn, key)?;
            let added = RbacLogic::grant_required_to_user(conn, u.id)?;
            success(format!("{added} permission(s) added to {}", u.email));
        }

        if let Some(name) = role {
            acted = true;
            let added = RbacLogic::grant_required_to_role(conn, name)?;
            success(format!("{added} permission(s) added to role '{name}'"));
        }

        if !acted {
            print_status(conn)?;
        }
    }
    Ok(())
}

fn print_status(conn: &rusqlite::Connection) -> AppResult<()> {
    let status = RbacLogic::status(conn)?;

    if status.missing.is_empty() {
        success("No required permission is missing");
    } else {
        for name in &status.missing {
            error(format!("Missing permission: {name}"));
        }
    }

    if status.roles.is_empty() {
        warning("No role holds a sakip.* permission");
    } else {
        let mut table = Table::new(&["Role", "SAKIP permissions"]);
        for (role, perms) in &status.roles {
            table.add_row(vec![role.clone(), perms.join(", ")]);
        }
        table.print();
    }

    if status.users_without.is_empty() {
        success("Every user holds at least one SAKIP permission");
    } else {
        warning(format!(
            "{} user(s) without any SAKIP permission:",
            status.users_without.len()
        ));
        for u in &status.users_without {
            println!("    #{} {} <{}>", u.id, u.name, u.email);
        }
        info("Use --user, --role, --all-users or --fix-all to grant them");
    }
    Ok(())
}
