use crate::models::evidence::EvidenceDocument;
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn insert(conn: &Connection, e: &EvidenceDocument) -> Result<i64> {
    conn.execute(
        "INSERT INTO evidence_documents (performance_data_id, file_name, file_path, file_type,
             file_size, sha256, description, uploaded_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            e.performance_data_id,
            e.file_name,
            e.file_path,
            e.file_type,
            e.file_size,
            e.sha256,
            e.description,
            e.uploaded_by,
            e.created_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<EvidenceDocument>> {
    conn.query_row(
        "SELECT * FROM evidence_documents WHERE id = ?1",
        [id],
        EvidenceDocument::from_row,
    )
    .optional()
}

pub fn for_data(conn: &Connection, data_id: i64) -> Result<Vec<EvidenceDocument>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM evidence_documents WHERE performance_data_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([data_id], EvidenceDocument::from_row)?;
    rows.collect()
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM evidence_documents WHERE id = ?1", [id])
}
