use rusqlite::Row;
use serde::Serialize;

/// Supporting document attached to a performance data row.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceDocument {
    pub id: i64,
    pub performance_data_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub sha256: String,
    pub description: Option<String>,
    pub uploaded_by: Option<i64>,
    pub created_at: String,
}

impl EvidenceDocument {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            performance_data_id: row.get("performance_data_id")?,
            file_name: row.get("file_name")?,
            file_path: row.get("file_path")?,
            file_type: row.get("file_type")?,
            file_size: row.get("file_size")?,
            sha256: row.get("sha256")?,
            description: row.get("description")?,
            uploaded_by: row.get("uploaded_by")?,
            created_at: row.get("created_at")?,
        })
    }
}
