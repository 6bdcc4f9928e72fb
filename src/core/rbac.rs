//! Roles, permissions and the SAKIP permission catalogue.

use crate::core::users::UserLogic;
use crate::db::log::audit;
use crate::db::queries::rbac as q;
use crate::db::queries::user as users;
use crate::errors::{AppError, AppResult};
use crate::models::user::{Role, User};
use crate::utils::date::now_str;
use rusqlite::Connection;
use serde::Serialize;

pub const DASHBOARD_VIEW: &str = "sakip.dashboard.view";
pub const ADMIN: &str = "sakip.admin";
pub const PIMPINAN: &str = "sakip.pimpinan";
pub const DATA_COLLECTOR: &str = "sakip.data_collector";
pub const ASSESSOR: &str = "sakip.assessor";
pub const AUDITOR: &str = "sakip.auditor";
pub const CROSS_INSTITUTION: &str = "sakip.dashboard.cross_institution";

/// (name, display name)
pub const PERMISSIONS: &[(&str, &str)] = &[
    (DASHBOARD_VIEW, "View SAKIP Dashboard"),
    (ADMIN, "SAKIP Admin Access"),
    (PIMPINAN, "SAKIP Executive Access"),
    (DATA_COLLECTOR, "SAKIP Data Collector Access"),
    (ASSESSOR, "SAKIP Assessor Access"),
    (AUDITOR, "SAKIP Auditor Access"),
    ("sakip.dashboard.executive", "View Executive Dashboard"),
    ("sakip.dashboard.collector", "View Data Collector Dashboard"),
    ("sakip.dashboard.assessor", "View Assessor Dashboard"),
    ("sakip.dashboard.audit", "View Audit Dashboard"),
    (CROSS_INSTITUTION, "View Cross-Institution Data"),
];

/// Attached by `add-permissions --user/--role/--all-users`.
pub const REQUIRED_PERMISSIONS: &[&str] =
    &[DASHBOARD_VIEW, ADMIN, PIMPINAN, DATA_COLLECTOR, ASSESSOR, AUDITOR];

pub const SUPERADMIN: &str = "superadmin";

struct RoleSeed {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    permissions: &'static [&'static str],
}

const ROLES: &[RoleSeed] = &[
    RoleSeed {
        name: "assessor",
        display_name: "Assessor",
        description: "Scores and reviews submitted performance data",
        permissions: &[DASHBOARD_VIEW, ASSESSOR, "sakip.dashboard.assessor"],
    },
    RoleSeed {
        name: "data_collector",
        display_name: "Data Collector",
        description: "Enters and submits performance data",
        permissions: &[DASHBOARD_VIEW, DATA_COLLECTOR, "sakip.dashboard.collector"],
    },
    RoleSeed {
        name: "auditor",
        display_name: "Auditor",
        description: "Read access to every institution and the audit trail",
        permissions: &[DASHBOARD_VIEW, AUDITOR, "sakip.dashboard.audit", CROSS_INSTITUTION],
    },
    RoleSeed {
        name: "collector",
        display_name: "Collector",
        description: "Field data gathering",
        permissions: &[DASHBOARD_VIEW, DATA_COLLECTOR, "sakip.dashboard.collector"],
    },
    RoleSeed {
        name: "executive",
        display_name: "Executive",
        description: "Approves assessments and generates reports",
        permissions: &[
            DASHBOARD_VIEW,
            PIMPINAN,
            "sakip.dashboard.executive",
            CROSS_INSTITUTION,
        ],
    },
    RoleSeed {
        name: "government_official",
        display_name: "Government Official",
        description: "Views verified reports",
        permissions: &[DASHBOARD_VIEW, "sakip.dashboard.executive"],
    },
];

#[derive(Debug, Default, Serialize)]
pub struct SeedSummary {
    pub permissions_created: Vec<String>,
    pub roles_created: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub role: Role,
    pub permissions: Vec<String>,
}

/// Output of `add-permissions` without options.
#[derive(Debug, Serialize)]
pub struct PermissionStatus {
    pub missing: Vec<String>,
    pub roles: Vec<(String, Vec<String>)>,
    pub users_without: Vec<User>,
}

pub struct RbacLogic;

impl RbacLogic {
    /// Create catalogue permissions that do not exist yet. Returns the new names.
    pub fn ensure_permissions(conn: &Connection) -> AppResult<Vec<String>> {
        let now = now_str();
        let mut created = Vec::new();
        for (name, display) in PERMISSIONS {
            let (_, new) = q::ensure_permission(conn, name, display, "sakip", &now)?;
            if new {
                audit(conn, "permission", name, "created")?;
                created.push(name.to_string());
            }
        }
        Ok(created)
    }

    /// Idempotent: catalogue, `superadmin` with everything, and the
    /// functional roles with their permission sets.
    pub fn seed(conn: &Connection) -> AppResult<SeedSummary> {
        let tx = conn.unchecked_transaction()?;
        let now = now_str();
        let mut summary = SeedSummary {
            permissions_created: Self::ensure_permissions(&tx)?,
            ..Default::default()
        };

        let (admin_id, new) = q::ensure_role(
            &tx,
            SUPERADMIN,
            "Super Admin",
            "Full access to every SAKIP feature",
            &now,
        )?;
        if new {
            summary.roles_created.push(SUPERADMIN.to_string());
        }
        for p in q::list_permissions(&tx)? {
            q::grant_to_role(&tx, p.id, admin_id)?;
        }

        for seed in ROLES {
            let (role_id, new) =
                q::ensure_role(&tx, seed.name, seed.display_name, seed.description, &now)?;
            if new {
                summary.roles_created.push(seed.name.to_string());
            }
            for name in seed.permissions {
                if let Some(p) = q::permission_by_name(&tx, name)? {
                    q::grant_to_role(&tx, p.id, role_id)?;
                }
            }
        }

        audit(
            &tx,
            "seed",
            "rbac",
            &format!(
                "{} permissions, {} roles created",
                summary.permissions_created.len(),
                summary.roles_created.len()
            ),
        )?;
        tx.commit()?;
        Ok(summary)
    }

    fn required_ids(conn: &Connection) -> AppResult<Vec<i64>> {
        let mut ids = Vec::new();
        for name in REQUIRED_PERMISSIONS {
            if let Some(p) = q::permission_by_name(conn, name)? {
                ids.push(p.id);
            }
        }
        Ok(ids)
    }

    /// Attach the required permissions to one user, keeping existing grants.
    /// Returns how many were new.
    pub fn grant_required_to_user(conn: &Connection, user_id: i64) -> AppResult<usize> {
        UserLogic::get(conn, user_id)?;
        let mut added = 0;
        for id in Self::required_ids(conn)? {
            if q::grant_to_user(conn, id, user_id)? {
                added += 1;
            }
        }
        audit(conn, "grant", &format!("user:{user_id}"), &format!("{added} permissions"))?;
        Ok(added)
    }

    pub fn grant_required_to_role(conn: &Connection, role_name: &str) -> AppResult<usize> {
        let role = Self::role(conn, role_name)?;
        let mut added = 0;
        for id in Self::required_ids(conn)? {
            if q::grant_to_role(conn, id, role.id)? {
                added += 1;
            }
        }
        audit(conn, "grant", &format!("role:{}", role.name), &format!("{added} permissions"))?;
        Ok(added)
    }

    /// Returns the users processed.
    pub fn grant_required_to_all_users(conn: &Connection) -> AppResult<Vec<User>> {
        let all = users::list(conn)?;
        for u in &all {
            Self::grant_required_to_user(conn, u.id)?;
        }
        Ok(all)
    }

    /// `superadmin` gets every permission and every user gets dashboard
    /// access. Returns false when there is no superadmin role.
    pub fn fix_all(conn: &Connection) -> AppResult<bool> {
        let superadmin = q::role_by_name(conn, SUPERADMIN)?;
        if let Some(role) = &superadmin {
            for p in q::list_permissions(conn)? {
                q::grant_to_role(conn, p.id, role.id)?;
            }
        }

        if let Some(view) = q::permission_by_name(conn, DASHBOARD_VIEW)? {
            for u in users::list(conn)? {
                q::grant_to_user(conn, view.id, u.id)?;
            }
        }
        audit(conn, "grant", "all", "permission fixes applied")?;
        Ok(superadmin.is_some())
    }

    pub fn status(conn: &Connection) -> AppResult<PermissionStatus> {
        let mut missing = Vec::new();
        for name in REQUIRED_PERMISSIONS {
            if q::permission_by_name(conn, name)?.is_none() {
                missing.push(name.to_string());
            }
        }

        let mut roles = Vec::new();
        for role in q::list_roles(conn)? {
            let sakip: Vec<String> = q::role_permissions(conn, role.id)?
                .into_iter()
                .filter(|p| p.starts_with("sakip."))
                .collect();
            if !sakip.is_empty() {
                roles.push((role.name, sakip));
            }
        }

        Ok(PermissionStatus {
            missing,
            roles,
            users_without: q::users_without_prefix(conn, "sakip.")?,
        })
    }

    pub fn role(conn: &Connection, name: &str) -> AppResult<Role> {
        q::role_by_name(conn, name)?.ok_or_else(|| AppError::NotFound(format!("Role '{name}'")))
    }

    pub fn roles(conn: &Connection) -> AppResult<Vec<RoleSummary>> {
        let mut out = Vec::new();
        for role in q::list_roles(conn)? {
            let permissions = q::role_permissions(conn, role.id)?;
            out.push(RoleSummary { role, permissions });
        }
        Ok(out)
    }

    pub fn assign_role(conn: &Connection, user_id: i64, role_name: &str) -> AppResult<bool> {
        UserLogic::get(conn, user_id)?;
        let role = Self::role(conn, role_name)?;
        let added = q::assign_role(conn, role.id, user_id)?;
        audit(conn, "assign", &format!("user:{user_id}"), &role.name)?;
        Ok(added)
    }

    pub fn remove_role(conn: &Connection, user_id: i64, role_name: &str) -> AppResult<()> {
        let role = Self::role(conn, role_name)?;
        if q::revoke_role(conn, role.id, user_id)? == 0 {
            return Err(AppError::NotFound(format!(
                "Role '{role_name}' on user #{user_id}"
            )));
        }
        audit(conn, "revoke", &format!("user:{user_id}"), &role.name)?;
        Ok(())
    }

    /// Direct permission grant.
    pub fn grant(conn: &Connection, user_id: i64, permission: &str) -> AppResult<bool> {
        UserLogic::get(conn, user_id)?;
        let p = q::permission_by_name(conn, permission)?
            .ok_or_else(|| AppError::NotFound(format!("Permission '{permission}'")))?;
        let added = q::grant_to_user(conn, p.id, user_id)?;
        audit(conn, "grant", &format!("user:{user_id}"), permission)?;
        Ok(added)
    }

    /// Direct grant or any role grant.
    pub fn has_permission(conn: &Connection, user_id: i64, permission: &str) -> AppResult<bool> {
        Ok(q::effective_permissions(conn, user_id)?
            .iter()
            .any(|p| p == permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::users::UserInput;
    use crate::db::pool::DbPool;

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        pool
    }

    fn user(conn: &Connection, email: &str) -> User {
        UserLogic::create(
            conn,
            UserInput {
                name: Some("Pegawai".into()),
                email: Some(email.into()),
                password: Some("password-kuat".into()),
                instansi_id: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn seed_is_idempotent() {
        let pool = pool();
        let first = RbacLogic::seed(&pool.conn).unwrap();
        assert_eq!(first.permissions_created.len(), PERMISSIONS.len());
        assert_eq!(first.roles_created.len(), ROLES.len() + 1);

        let second = RbacLogic::seed(&pool.conn).unwrap();
        assert!(second.permissions_created.is_empty());
        assert!(second.roles_created.is_empty());

        let admin = RbacLogic::role(&pool.conn, SUPERADMIN).unwrap();
        assert_eq!(
            q::role_permissions(&pool.conn, admin.id).unwrap().len(),
            PERMISSIONS.len()
        );
    }

    #[test]
    fn role_grants_flow_into_permissions() {
        let pool = pool();
        RbacLogic::seed(&pool.conn).unwrap();
        let u = user(&pool.conn, "penilai@sakip.go.id");

        assert!(!RbacLogic::has_permission(&pool.conn, u.id, ASSESSOR).unwrap());
        RbacLogic::assign_role(&pool.conn, u.id, "assessor").unwrap();
        assert!(RbacLogic::has_permission(&pool.conn, u.id, ASSESSOR).unwrap());
        assert!(!RbacLogic::has_permission(&pool.conn, u.id, ADMIN).unwrap());

        RbacLogic::grant(&pool.conn, u.id, ADMIN).unwrap();
        assert!(RbacLogic::has_permission(&pool.conn, u.id, ADMIN).unwrap());

        RbacLogic::remove_role(&pool.conn, u.id, "assessor").unwrap();
        assert!(!RbacLogic::has_permission(&pool.conn, u.id, ASSESSOR).unwrap());
    }

    #[test]
    fn required_grants_keep_existing_ones() {
        let pool = pool();
        RbacLogic::ensure_permissions(&pool.conn).unwrap();
        let u = user(&pool.conn, "kasubag@sakip.go.id");
        RbacLogic::grant(&pool.conn, u.id, CROSS_INSTITUTION).unwrap();

        assert_eq!(RbacLogic::grant_required_to_user(&pool.conn, u.id).unwrap(), 6);
        assert_eq!(RbacLogic::grant_required_to_user(&pool.conn, u.id).unwrap(), 0);
        assert!(RbacLogic::has_permission(&pool.conn, u.id, CROSS_INSTITUTION).unwrap());
    }

    #[test]
    fn status_lists_users_without_sakip_permissions() {
        let pool = pool();
        let before = RbacLogic::status(&pool.conn).unwrap();
        assert_eq!(before.missing.len(), REQUIRED_PERMISSIONS.len());

        RbacLogic::seed(&pool.conn).unwrap();
        let u = user(&pool.conn, "baru@sakip.go.id");
        let status = RbacLogic::status(&pool.conn).unwrap();
        assert!(status.missing.is_empty());
        assert!(status.roles.iter().any(|(r, _)| r == SUPERADMIN));
        assert_eq!(status.users_without.len(), 1);

        assert!(RbacLogic::fix_all(&pool.conn).unwrap());
        assert!(RbacLogic::has_permission(&pool.conn, u.id, DASHBOARD_VIEW).unwrap());
        assert!(RbacLogic::status(&pool.conn).unwrap().users_without.is_empty());
    }
}
