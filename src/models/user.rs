use rusqlite::Row;
use serde::Serialize;

/// Account row. The password hash never leaves the db layer.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub instansi_id: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
}

impl User {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            instansi_id: row.get("instansi_id")?,
            is_active: row.get::<_, i64>("is_active")? == 1,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

impl Role {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            display_name: row.get("display_name")?,
            description: row.get("description")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub module: String,
}

impl Permission {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            display_name: row.get("display_name")?,
            module: row.get("module")?,
        })
    }
}

/// Authenticated principal: the user plus the effective permission names
/// (direct grants and role grants merged).
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub user: User,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl Principal {
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}
