use crate::models::user::{Permission, Role, User};
use rusqlite::{Connection, OptionalExtension, Result, params};

// ---------------------------
// Permissions
// ---------------------------

pub fn permission_by_name(conn: &Connection, name: &str) -> Result<Option<Permission>> {
    conn.query_row(
        "SELECT * FROM permissions WHERE name = ?1",
        [name],
        Permission::from_row,
    )
    .optional()
}

/// Insert the permission when missing. Returns (id, created).
pub fn ensure_permission(
    conn: &Connection,
    name: &str,
    display_name: &str,
    module: &str,
    now: &str,
) -> Result<(i64, bool)> {
    if let Some(p) = permission_by_name(conn, name)? {
        return Ok((p.id, false));
    }
    conn.execute(
        "INSERT INTO permissions (name, display_name, module, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, display_name, module, now],
    )?;
    Ok((conn.last_insert_rowid(), true))
}

pub fn list_permissions(conn: &Connection) -> Result<Vec<Permission>> {
    let mut stmt = conn.prepare("SELECT * FROM permissions ORDER BY module ASC, name ASC")?;
    let rows = stmt.query_map([], Permission::from_row)?;
    rows.collect()
}

// ---------------------------
// Roles
// ---------------------------

pub fn role_by_name(conn: &Connection, name: &str) -> Result<Option<Role>> {
    conn.query_row("SELECT * FROM roles WHERE name = ?1", [name], Role::from_row)
        .optional()
}

pub fn ensure_role(
    conn: &Connection,
    name: &str,
    display_name: &str,
    description: &str,
    now: &str,
) -> Result<(i64, bool)> {
    if let Some(r) = role_by_name(conn, name)? {
        return Ok((r.id, false));
    }
    conn.execute(
        "INSERT INTO roles (name, display_name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, display_name, description, now],
    )?;
    Ok((conn.last_insert_rowid(), true))
}

pub fn list_roles(conn: &Connection) -> Result<Vec<Role>> {
    let mut stmt = conn.prepare("SELECT * FROM roles ORDER BY name ASC")?;
    let rows = stmt.query_map([], Role::from_row)?;
    rows.collect()
}

pub fn role_permissions(conn: &Connection, role_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT p.name FROM permissions p
         JOIN permission_role pr ON pr.permission_id = p.id
         WHERE pr.role_id = ?1
         ORDER BY p.name ASC",
    )?;
    let rows = stmt.query_map([role_id], |row| row.get(0))?;
    rows.collect()
}

// ---------------------------
// Attach / detach (never detaches what is not named)
// ---------------------------

pub fn grant_to_role(conn: &Connection, permission_id: i64, role_id: i64) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO permission_role (permission_id, role_id) VALUES (?1, ?2)",
        params![permission_id, role_id],
    )?;
    Ok(n > 0)
}

pub fn grant_to_user(conn: &Connection, permission_id: i64, user_id: i64) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO permission_user (permission_id, user_id) VALUES (?1, ?2)",
        params![permission_id, user_id],
    )?;
    Ok(n > 0)
}

pub fn assign_role(conn: &Connection, role_id: i64, user_id: i64) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO role_user (role_id, user_id) VALUES (?1, ?2)",
        params![role_id, user_id],
    )?;
    Ok(n > 0)
}

pub fn revoke_role(conn: &Connection, role_id: i64, user_id: i64) -> Result<usize> {
    conn.execute(
        "DELETE FROM role_user WHERE role_id = ?1 AND user_id = ?2",
        params![role_id, user_id],
    )
}

/// Drop every role and direct permission of a user. Returns (roles, permissions).
pub fn detach_all(conn: &Connection, user_id: i64) -> Result<(usize, usize)> {
    let roles = conn.execute("DELETE FROM role_user WHERE user_id = ?1", [user_id])?;
    let perms = conn.execute("DELETE FROM permission_user WHERE user_id = ?1", [user_id])?;
    Ok((roles, perms))
}

// ---------------------------
// Lookups
// ---------------------------

pub fn user_roles(conn: &Connection, user_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT r.name FROM roles r
         JOIN role_user ru ON ru.role_id = r.id
         WHERE ru.user_id = ?1
         ORDER BY r.name ASC",
    )?;
    let rows = stmt.query_map([user_id], |row| row.get(0))?;
    rows.collect()
}

/// Direct grants and role grants, de-duplicated.
pub fn effective_permissions(conn: &Connection, user_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT p.name FROM permissions p
         JOIN permission_user pu ON pu.permission_id = p.id
         WHERE pu.user_id = ?1
         UNION
         SELECT p.name FROM permissions p
         JOIN permission_role pr ON pr.permission_id = p.id
         JOIN role_user ru ON ru.role_id = pr.role_id
         WHERE ru.user_id = ?1
         ORDER BY 1",
    )?;
    let rows = stmt.query_map([user_id], |row| row.get(0))?;
    rows.collect()
}

/// Users holding no permission whose name starts with `prefix`, directly or via a role.
pub fn users_without_prefix(conn: &Connection, prefix: &str) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM users u
         WHERE NOT EXISTS (
             SELECT 1 FROM permission_user pu
             JOIN permissions p ON p.id = pu.permission_id
             WHERE pu.user_id = u.id AND p.name LIKE ?1 || '%'
         )
         AND NOT EXISTS (
             SELECT 1 FROM role_user ru
             JOIN permission_role pr ON pr.role_id = ru.role_id
             JOIN permissions p ON p.id = pr.permission_id
             WHERE ru.user_id = u.id AND p.name LIKE ?1 || '%'
         )
         ORDER BY u.id ASC",
    )?;
    let rows = stmt.query_map([prefix], User::from_row)?;
    rows.collect()
}
