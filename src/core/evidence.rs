use crate::config::Config;
use crate::core::optional_text;
use crate::core::performance::PerformanceLogic;
use crate::db::log::audit;
use crate::db::queries::evidence as q;
use crate::errors::{AppError, AppResult};
use crate::models::evidence::EvidenceDocument;
use crate::security::upload::UploadPolicy;
use crate::utils::date::now_str;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

/// Supporting documents of a performance data row.
pub struct EvidenceLogic;

impl EvidenceLogic {
    /// Validate the upload and store it as `upload_dir/<data id>/<uuid>.<ext>`.
    pub fn attach(
        conn: &Connection,
        cfg: &Config,
        data_id: i64,
        file_name: &str,
        bytes: &[u8],
        description: Option<String>,
        uploaded_by: Option<i64>,
    ) -> AppResult<EvidenceDocument> {
        PerformanceLogic::get(conn, data_id)?;
        let upload = UploadPolicy::from_config(cfg).validate("evidence", file_name, bytes)?;

        let dir = PathBuf::from(&cfg.upload_dir).join(data_id.to_string());
        fs::create_dir_all(&dir)?;
        let stored = dir.join(format!("{}.{}", uuid::Uuid::new_v4(), upload.extension));
        fs::write(&stored, bytes)?;

        let mut doc = EvidenceDocument {
            id: 0,
            performance_data_id: data_id,
            file_name: upload.original_name,
            file_path: stored.to_string_lossy().to_string(),
            file_type: upload.mime_type,
            file_size: upload.size as i64,
            sha256: upload.sha256,
            description: optional_text(description),
            uploaded_by,
            created_at: now_str(),
        };

        match q::insert(conn, &doc) {
            Ok(id) => doc.id = id,
            Err(e) => {
                let _ = fs::remove_file(&stored);
                return Err(e.into());
            }
        }

        audit(
            conn,
            "upload",
            &format!("data:{data_id}"),
            &format!("{} ({} bytes)", doc.file_name, doc.file_size),
        )?;
        Ok(doc)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<EvidenceDocument> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("Evidence document", id))
    }

    pub fn list(conn: &Connection, data_id: i64) -> AppResult<Vec<EvidenceDocument>> {
        PerformanceLogic::get(conn, data_id)?;
        Ok(q::for_data(conn, data_id)?)
    }

    /// Removes the row, then the stored file if it is still there.
    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let doc = Self::get(conn, id)?;
        q::delete(conn, id)?;
        audit(conn, "del", &format!("evidence:{id}"), &doc.file_name)?;
        remove_stored(std::slice::from_ref(&doc))
    }
}

/// Delete the files of already removed evidence rows, and each
/// `upload_dir/<data id>` directory once it is empty.
pub fn remove_stored(docs: &[EvidenceDocument]) -> AppResult<()> {
    for doc in docs {
        let path = Path::new(&doc.file_path);
        if path.exists() {
            fs::remove_file(path)?;
        }
        if let Some(dir) = path.parent() {
            // fails while other files remain
            let _ = fs::remove_dir(dir);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::indicator::IndicatorLogic;
    use crate::core::instansi::InstansiLogic;
    use crate::db::pool::DbPool;
    use crate::models::indicator::IndicatorInput;
    use crate::models::instansi::InstansiInput;
    use crate::models::performance_data::PerformanceDataInput;

    fn setup(tag: &str) -> (DbPool, Config, i64) {
        let pool = DbPool::in_memory().unwrap();
        crate::db::initialize::init_db(&pool.conn).unwrap();

        let mut cfg = Config::with_database(":memory:".into());
        let dir = std::env::temp_dir().join(format!("sakip-evidence-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        cfg.upload_dir = dir.to_string_lossy().to_string();

        let inst = InstansiLogic::create(
            &pool.conn,
            InstansiInput {
                kode_instansi: Some("BAPPEDA".into()),
                nama_instansi: Some("Bappeda".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let ind = IndicatorLogic::create(
            &pool.conn,
            IndicatorInput {
                instansi_id: Some(inst.id),
                code: Some("IKU-09".into()),
                name: Some("Dokumen perencanaan".into()),
                measurement_unit: Some("dokumen".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let data = PerformanceLogic::create(
            &pool.conn,
            PerformanceDataInput {
                indicator_id: Some(ind.id),
                instansi_id: Some(inst.id),
                period: Some("2025-03".into()),
                actual_value: Some(3.0),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        (pool, cfg, data.id)
    }

    #[test]
    fn attach_stores_file_and_row() {
        let (pool, cfg, data_id) = setup("ok");
        let doc = EvidenceLogic::attach(
            &pool.conn,
            &cfg,
            data_id,
            "notulen.pdf",
            b"%PDF-1.4\n%%EOF",
            Some("Notulen rapat".into()),
            None,
        )
        .unwrap();

        assert!(Path::new(&doc.file_path).exists());
        assert!(doc.file_path.ends_with(".pdf"));
        assert_eq!(EvidenceLogic::list(&pool.conn, data_id).unwrap().len(), 1);

        EvidenceLogic::delete(&pool.conn, doc.id).unwrap();
        assert!(!Path::new(&doc.file_path).exists());
        let _ = fs::remove_dir_all(&cfg.upload_dir);
    }

    #[test]
    fn deleting_the_data_removes_its_files() {
        let (pool, cfg, data_id) = setup("cascade");
        let doc = EvidenceLogic::attach(
            &pool.conn,
            &cfg,
            data_id,
            "a.pdf",
            b"%PDF-1.4\n%%EOF",
            None,
            None,
        )
        .unwrap();
        let data_dir = Path::new(&cfg.upload_dir).join(data_id.to_string());
        assert!(Path::new(&doc.file_path).exists());

        PerformanceLogic::delete(&pool.conn, data_id).unwrap();
        assert!(q::for_data(&pool.conn, data_id).unwrap().is_empty());
        assert!(!Path::new(&doc.file_path).exists());
        assert!(!data_dir.exists());
        let _ = fs::remove_dir_all(&cfg.upload_dir);
    }

    #[test]
    fn rejected_upload_leaves_nothing_behind() {
        let (pool, cfg, data_id) = setup("bad");
        let err = EvidenceLogic::attach(
            &pool.conn,
            &cfg,
            data_id,
            "shell.php",
            b"<?php phpinfo();",
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err.http_status(), 422);
        assert!(EvidenceLogic::list(&pool.conn, data_id).unwrap().is_empty());
        assert!(!Path::new(&cfg.upload_dir).join(data_id.to_string()).exists());
    }
}
