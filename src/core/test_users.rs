//! Detection and removal of seed/test accounts before going live.

use crate::db::log::audit;
use crate::db::queries::{rbac, user as q};
use crate::errors::AppResult;
use crate::models::user::User;
use rusqlite::Connection;
use serde::Serialize;

pub const TEST_EMAIL_PATTERNS: &[&str] = &[
    "@sakip.local",
    "@example.com",
    "@test.com",
    "test@",
    "demo@",
    "seed@",
];

pub const KNOWN_TEST_EMAILS: &[&str] = &[
    "superadmin@sakip.local",
    "assessor@sakip.local",
    "datacollector@sakip.local",
    "auditor@sakip.local",
    "executive@sakip.local",
    "collector@sakip.local",
    "official@sakip.local",
    "admin@example.com",
    "test@example.com",
    "user@example.com",
];

#[derive(Debug, Clone, Serialize)]
pub struct TestUser {
    pub user: User,
    pub roles: Vec<String>,
}

pub struct TestUserLogic;

impl TestUserLogic {
    pub fn find(conn: &Connection) -> AppResult<Vec<TestUser>> {
        let mut out = Vec::new();
        for user in q::matching_emails(conn, TEST_EMAIL_PATTERNS, KNOWN_TEST_EMAILS)? {
            let roles = rbac::user_roles(conn, user.id)?;
            out.push(TestUser { user, roles });
        }
        Ok(out)
    }

    /// All or nothing: roles, permissions and tokens are detached first,
    /// then the user row goes. Any failure rolls the whole batch back.
    pub fn remove(conn: &Connection, users: &[TestUser]) -> AppResult<usize> {
        let tx = conn.unchecked_transaction()?;
        let mut deleted = 0;

        for t in users {
            rbac::detach_all(&tx, t.user.id)?;
            q::delete_tokens_of(&tx, t.user.id)?;
            deleted += q::delete(&tx, t.user.id)?;
            audit(&tx, "del", &format!("user:{}", t.user.id), &t.user.email)?;
        }

        tx.commit()?;
        log::info!("removed {deleted} test user(s)");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rbac::RbacLogic;
    use crate::core::users::{UserInput, UserLogic};
    use crate::db::pool::DbPool;

    fn setup() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        RbacLogic::seed(&pool.conn).unwrap();
        for email in [
            "superadmin@sakip.local",
            "demo@dinas.go.id",
            "kepala@bappeda.go.id",
            "qa@test.com",
        ] {
            UserLogic::create(
                &pool.conn,
                UserInput {
                    name: Some(email.into()),
                    email: Some(email.into()),
                    password: Some("password123".into()),
                    instansi_id: None,
                },
            )
            .unwrap();
        }
        pool
    }

    #[test]
    fn finds_only_test_accounts() {
        let pool = setup();
        let found: Vec<String> = TestUserLogic::find(&pool.conn)
            .unwrap()
            .into_iter()
            .map(|t| t.user.email)
            .collect();
        assert_eq!(
            found,
            ["superadmin@sakip.local", "demo@dinas.go.id", "qa@test.com"]
        );
    }

    #[test]
    fn removal_detaches_roles_and_deletes() {
        let pool = setup();
        let admin = UserLogic::find(&pool.conn, "superadmin@sakip.local").unwrap();
        RbacLogic::assign_role(&pool.conn, admin.id, "superadmin").unwrap();

        let found = TestUserLogic::find(&pool.conn).unwrap();
        assert_eq!(found[0].roles, ["superadmin"]);
        assert_eq!(TestUserLogic::remove(&pool.conn, &found).unwrap(), 3);
        assert_eq!(UserLogic::list(&pool.conn).unwrap().len(), 1);
    }

    #[test]
    fn failure_rolls_everything_back() {
        let pool = setup();
        pool.conn
            .execute_batch(
                "CREATE TRIGGER keep_qa BEFORE DELETE ON users
                 WHEN old.email = 'qa@test.com'
                 BEGIN SELECT RAISE(ABORT, 'locked'); END;",
            )
            .unwrap();

        let found = TestUserLogic::find(&pool.conn).unwrap();
        assert!(TestUserLogic::remove(&pool.conn, &found).is_err());
        assert_eq!(UserLogic::list(&pool.conn).unwrap().len(), 4);
    }
}
