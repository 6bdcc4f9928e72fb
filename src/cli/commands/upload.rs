use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::security::upload::UploadPolicy;
use crate::ui::messages::success;
use crate::utils::formatting::format_file_size;
use std::fs;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::ValidateUpload { file } = cmd {
        let path = Path::new(file);
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::Validation(format!("Invalid file name: {file}")))?;

        let upload = UploadPolicy::from_config(cfg).validate("file", name, &bytes)?;
        success(format!(
            "{} accepted: {} ({}), sha256 {}",
            upload.original_name,
            upload.mime_type,
            format_file_size(upload.size),
            upload.sha256
        ));
    }
    Ok(())
}
