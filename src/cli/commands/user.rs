use crate::cli::parser::{Commands, UserAction};
use crate::config::Config;
use crate::core::rbac::RbacLogic;
use crate::core::users::{UserInput, UserLogic};
use crate::db;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREEN, RED, RESET};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::User { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            UserAction::List => {
                let users = UserLogic::list(conn)?;
                if users.is_empty() {
                    info("No users found.");
                    return Ok(());
                }
                let mut table = Table::new(&["ID", "Name", "Email", "Instansi", "Active", "Roles"]);
                for u in users {
                    let principal = UserLogic::principal(conn, u)?;
                    let u = &principal.user;
                    table.add_row(vec![
                        u.id.to_string(),
                        u.name.clone(),
                        u.email.clone(),
                        u.instansi_id.map(|i| i.to_string()).unwrap_or_default(),
                        if u.is_active {
                            format!("{GREEN}yes{RESET}")
                        } else {
                            format!("{RED}no{RESET}")
                        },
                        principal.roles.join(", "),
                    ]);
                }
                table.print();
            }
            UserAction::Add {
                name,
                email,
                password,
                instansi_id,
                role,
            } => {
                let user = UserLogic::create(
                    conn,
                    UserInput {
                        name: Some(name.clone()),
                        email: Some(email.clone()),
                        password: Some(password.clone()),
                        instansi_id: *instansi_id,
                    },
                )?;
                success(format!("User #{} created: {}", user.id, user.email));
                if let Some(role) = role {
                    RbacLogic::assign_role(conn, user.id, role)?;
                    success(format!("Role '{role}' assigned"));
                }
            }
            UserAction::Activate { user } => {
                let u = UserLogic::find(conn, user)?;
                UserLogic::set_active(conn, u.id, true)?;
                success(format!("User {} activated", u.email));
            }
            UserAction::Deactivate { user } => {
                let u = UserLogic::find(conn, user)?;
                UserLogic::set_active(conn, u.id, false)?;
                success(format!("User {} deactivated; API tokens revoked", u.email));
            }
            UserAction::Password { user, password } => {
                let u = UserLogic::find(conn, user)?;
                UserLogic::set_password(conn, u.id, password)?;
                success(format!("Password updated for {}", u.email));
            }
            UserAction::Token {
                email,
                password,
                device,
            } => {
                let (token, principal) = UserLogic::login(conn, email, password, device)?;
                info(format!("Token for {}:", principal.user.email));
                println!("{token}");
            }
        }
    }
    Ok(())
}
