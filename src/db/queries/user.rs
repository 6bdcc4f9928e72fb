use crate::models::user::User;
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
    instansi_id: Option<i64>,
    now: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (name, email, password_hash, instansi_id, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
        params![name, email, password_hash, instansi_id, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row("SELECT * FROM users WHERE id = ?1", [id], User::from_row)
        .optional()
}

pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT * FROM users WHERE lower(email) = lower(?1)",
        [email],
        User::from_row,
    )
    .optional()
}

/// User plus stored bcrypt hash, for login.
pub fn credentials(conn: &Connection, email: &str) -> Result<Option<(User, String)>> {
    conn.query_row(
        "SELECT * FROM users WHERE lower(email) = lower(?1)",
        [email],
        |row| Ok((User::from_row(row)?, row.get("password_hash")?)),
    )
    .optional()
}

pub fn list(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY id ASC")?;
    let rows = stmt.query_map([], User::from_row)?;
    rows.collect()
}

pub fn set_active(conn: &Connection, id: i64, active: bool, now: &str) -> Result<usize> {
    conn.execute(
        "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![active as i64, now, id],
    )
}

pub fn set_password(conn: &Connection, id: i64, hash: &str, now: &str) -> Result<usize> {
    conn.execute(
        "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
        params![hash, now, id],
    )
}

/// Users whose e-mail contains any fragment or equals any exact address.
pub fn matching_emails(conn: &Connection, fragments: &[&str], exact: &[&str]) -> Result<Vec<User>> {
    let mut out: Vec<User> = Vec::new();
    for u in list(conn)? {
        let email = u.email.to_lowercase();
        if fragments.iter().any(|f| email.contains(f)) || exact.iter().any(|e| email == *e) {
            out.push(u);
        }
    }
    Ok(out)
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM users WHERE id = ?1", [id])
}

// ---------------------------
// API tokens
// ---------------------------

pub fn insert_token(conn: &Connection, user_id: i64, name: &str, hash: &str, now: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO api_tokens (user_id, name, token_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, name, hash, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Resolve a token hash to (token id, user id).
pub fn token_owner(conn: &Connection, hash: &str) -> Result<Option<(i64, i64)>> {
    conn.query_row(
        "SELECT id, user_id FROM api_tokens WHERE token_hash = ?1",
        [hash],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn touch_token(conn: &Connection, token_id: i64, now: &str) -> Result<usize> {
    conn.execute(
        "UPDATE api_tokens SET last_used_at = ?1 WHERE id = ?2",
        params![now, token_id],
    )
}

pub fn delete_token(conn: &Connection, hash: &str) -> Result<usize> {
    conn.execute("DELETE FROM api_tokens WHERE token_hash = ?1", [hash])
}

pub fn delete_tokens_of(conn: &Connection, user_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM api_tokens WHERE user_id = ?1", [user_id])
}
