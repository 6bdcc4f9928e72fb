use crate::config::Config;
use crate::db::log::audit;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::ui::prompt::confirm;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the configured database to `dest_file`, optionally as a zip.
    /// Returns the written path, or None when the user declined to overwrite.
    pub fn backup(
        conn: &Connection,
        cfg: &Config,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<Option<PathBuf>> {
        let src = Path::new(&cfg.database);
        let dest = Path::new(dest_file);

        if !src.is_file() {
            return Err(AppError::NotFound(format!("Database {}", src.display())));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let final_target = if compress {
            dest.with_extension("zip")
        } else {
            dest.to_path_buf()
        };
        if final_target.exists()
            && !force
            && !confirm(&format!(
                "The file '{}' already exists. Overwrite it?",
                final_target.display()
            ))?
        {
            warning("Backup cancelled.");
            return Ok(None);
        }

        // Flush the WAL so the copy is self-contained.
        conn.query_row("PRAGMA wal_checkpoint(FULL)", [], |_| Ok(()))?;

        let written = if compress {
            compress_into(src, &final_target)?
        } else {
            fs::copy(src, dest)?;
            dest.to_path_buf()
        };

        let size = fs::metadata(&written).map(|m| m.len()).unwrap_or(0);
        success(format!("Backup created: {}", written.display()));
        info(format!("Size: {}", crate::utils::format_file_size(size)));

        audit(
            conn,
            "backup",
            &written.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;
        Ok(Some(written))
    }
}

/// Deflate `src` into a single-entry zip at `zip_path`.
fn compress_into(src: &Path, zip_path: &Path) -> AppResult<PathBuf> {
    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entry = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "sakip.sqlite".to_string());
    zip.start_file(entry, options)
        .map_err(std::io::Error::other)?;

    let mut f = fs::File::open(src)?;
    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(zip_path.to_path_buf())
}
