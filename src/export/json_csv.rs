// src/export/json_csv.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::Dataset;
use serde_json::json;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Pretty JSON: `{ "title": ..., "generated_at": ..., "data": [ {..}, .. ] }`.
pub(crate) fn export_json(dataset: &Dataset, path: &Path) -> AppResult<()> {
    let doc = json!({
        "title": dataset.title,
        "generated_at": crate::utils::date::now_str(),
        "data": dataset.to_records(),
    });

    let json_data = serde_json::to_string_pretty(&doc)
        .map_err(|e| AppError::Export(format!("JSON serialization error: {e}")))?;

    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;
    Ok(())
}

/// CSV with the header row first.
pub(crate) fn export_csv(dataset: &Dataset, path: &Path) -> AppResult<()> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::Export(format!("CSV open error: {e}")))?;

    wtr.write_record(&dataset.headers)
        .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    for row in &dataset.rows {
        wtr.write_record(row)
            .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::Export(format!("CSV flush error: {e}")))?;
    Ok(())
}
