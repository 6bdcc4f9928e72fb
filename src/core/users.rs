use crate::core::instansi::InstansiLogic;
use crate::core::{check_len, required, required_text};
use crate::db::log::audit;
use crate::db::queries::{rbac, user as q};
use crate::errors::{AppError, AppResult};
use crate::models::user::{Principal, User};
use crate::utils::date::now_str;
use rand::Rng;
use rand::distr::Alphanumeric;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

pub const TOKEN_LEN: usize = 40;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub instansi_id: Option<i64>,
}

/// Accounts, passwords and bearer tokens.
pub struct UserLogic;

impl UserLogic {
    pub fn create(conn: &Connection, input: UserInput) -> AppResult<User> {
        let name = required_text(input.name, "name", 255)?;
        let email = required_text(input.email, "email", 255)?.to_lowercase();
        if !email.contains('@') {
            return Err(AppError::Validation(
                "The email must be a valid email address.".into(),
            ));
        }
        if q::get_by_email(conn, &email)?.is_some() {
            return Err(AppError::Duplicate("The email has already been taken.".into()));
        }
        let hash = hash_password(&required(input.password, "password")?)?;
        if let Some(id) = input.instansi_id {
            InstansiLogic::get(conn, id)?;
        }

        let id = q::insert(conn, &name, &email, &hash, input.instansi_id, &now_str())?;
        audit(conn, "add", &format!("user:{id}"), &email)?;
        Self::get(conn, id)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<User> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("User", id))
    }

    /// Look a user up by numeric id or by e-mail.
    pub fn find(conn: &Connection, id_or_email: &str) -> AppResult<User> {
        let key = id_or_email.trim();
        let found = match key.parse::<i64>() {
            Ok(id) => q::get(conn, id)?,
            Err(_) => q::get_by_email(conn, key)?,
        };
        found.ok_or_else(|| AppError::NotFound(format!("User {key}")))
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<User>> {
        Ok(q::list(conn)?)
    }

    pub fn set_active(conn: &Connection, id: i64, active: bool) -> AppResult<User> {
        Self::get(conn, id)?;
        q::set_active(conn, id, active, &now_str())?;
        if !active {
            q::delete_tokens_of(conn, id)?;
        }
        let op = if active { "activate" } else { "deactivate" };
        audit(conn, op, &format!("user:{id}"), "")?;
        Self::get(conn, id)
    }

    pub fn set_password(conn: &Connection, id: i64, password: &str) -> AppResult<()> {
        Self::get(conn, id)?;
        let hash = hash_password(password)?;
        q::set_password(conn, id, &hash, &now_str())?;
        q::delete_tokens_of(conn, id)?;
        audit(conn, "password", &format!("user:{id}"), "")?;
        Ok(())
    }

    /// User with merged role and permission names.
    pub fn principal(conn: &Connection, user: User) -> AppResult<Principal> {
        let roles = rbac::user_roles(conn, user.id)?;
        let permissions = rbac::effective_permissions(conn, user.id)?;
        Ok(Principal {
            user,
            roles,
            permissions,
        })
    }

    /// Check the password and issue a fresh bearer token.
    pub fn login(
        conn: &Connection,
        email: &str,
        password: &str,
        device: &str,
    ) -> AppResult<(String, Principal)> {
        let invalid = || AppError::Validation("The provided credentials are incorrect.".into());

        let (user, hash) = q::credentials(conn, email.trim())?.ok_or_else(invalid)?;
        if !bcrypt::verify(password, &hash).map_err(|e| AppError::Other(e.to_string()))? {
            log::warn!("failed login for {}", user.email);
            return Err(invalid());
        }
        if !user.is_active {
            return Err(AppError::Forbidden("This account has been deactivated.".into()));
        }

        let token = generate_token();
        q::insert_token(conn, user.id, device, &hash_token(&token), &now_str())?;
        audit(conn, "login", &format!("user:{}", user.id), device)?;

        let principal = Self::principal(conn, user)?;
        Ok((token, principal))
    }

    /// Resolve a bearer token. Unknown tokens and inactive users are 401.
    pub fn resolve_token(conn: &Connection, token: &str) -> AppResult<Principal> {
        let (token_id, user_id) =
            q::token_owner(conn, &hash_token(token))?.ok_or(AppError::Unauthenticated)?;
        let user = q::get(conn, user_id)?.ok_or(AppError::Unauthenticated)?;
        if !user.is_active {
            return Err(AppError::Unauthenticated);
        }
        q::touch_token(conn, token_id, &now_str())?;
        Self::principal(conn, user)
    }

    pub fn logout(conn: &Connection, token: &str) -> AppResult<()> {
        if q::delete_token(conn, &hash_token(token))? == 0 {
            return Err(AppError::Unauthenticated);
        }
        Ok(())
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "The password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    check_len(password, "password", 72)?;
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AppError::Other(e.to_string()))
}

/// 40 random alphanumerics. Only the SHA-256 of it is stored.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::DbPool;

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();
        pool
    }

    fn input(email: &str) -> UserInput {
        UserInput {
            name: Some("Operator".into()),
            email: Some(email.into()),
            password: Some("rahasia123".into()),
            instansi_id: None,
        }
    }

    #[test]
    fn tokens_are_random_and_hashed() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
        assert_eq!(hash_token(&a).len(), 64);
    }

    #[test]
    fn login_resolve_logout() {
        let pool = pool();
        let user = UserLogic::create(&pool.conn, input("Operator@Bappeda.go.id")).unwrap();
        assert_eq!(user.email, "operator@bappeda.go.id");

        let err = UserLogic::login(&pool.conn, "operator@bappeda.go.id", "salah-sekali", "cli")
            .unwrap_err();
        assert_eq!(err.to_string(), "The provided credentials are incorrect.");

        let (token, principal) =
            UserLogic::login(&pool.conn, "operator@bappeda.go.id", "rahasia123", "cli").unwrap();
        assert_eq!(principal.user.id, user.id);

        let resolved = UserLogic::resolve_token(&pool.conn, &token).unwrap();
        assert_eq!(resolved.user.id, user.id);

        UserLogic::logout(&pool.conn, &token).unwrap();
        assert!(matches!(
            UserLogic::resolve_token(&pool.conn, &token),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn deactivation_revokes_tokens() {
        let pool = pool();
        let user = UserLogic::create(&pool.conn, input("staf@dinkes.go.id")).unwrap();
        let (token, _) =
            UserLogic::login(&pool.conn, "staf@dinkes.go.id", "rahasia123", "cli").unwrap();

        UserLogic::set_active(&pool.conn, user.id, false).unwrap();
        assert!(UserLogic::resolve_token(&pool.conn, &token).is_err());
        assert_eq!(
            UserLogic::login(&pool.conn, "staf@dinkes.go.id", "rahasia123", "cli")
                .unwrap_err()
                .http_status(),
            403
        );
    }

    #[test]
    fn duplicate_email_and_short_password() {
        let pool = pool();
        UserLogic::create(&pool.conn, input("a@b.go.id")).unwrap();
        assert_eq!(
            UserLogic::create(&pool.conn, input("A@B.go.id"))
                .unwrap_err()
                .http_status(),
            409
        );

        let mut short = input("c@d.go.id");
        short.password = Some("123".into());
        assert!(UserLogic::create(&pool.conn, short).is_err());
        assert!(UserLogic::find(&pool.conn, "a@b.go.id").is_ok());
    }
}
