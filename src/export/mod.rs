// src/export/mod.rs

mod excel_date;
mod fs_utils;
mod json_csv;
pub mod logic;
pub mod model;
mod pdf;
mod pdf_export;
pub mod range;
mod xlsx;

pub use logic::{ExportFilter, ExportKind, ExportLogic};
pub use model::Dataset;

use crate::errors::{AppError, AppResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(AppError::InvalidExportFormat(other.to_string())),
        }
    }
}

/// Write `dataset` to `path` in `format`. Silent; callers report.
pub fn write_dataset(
    dataset: &Dataset,
    format: ExportFormat,
    path: &Path,
    institution: &str,
) -> AppResult<()> {
    match format {
        ExportFormat::Csv => json_csv::export_csv(dataset, path),
        ExportFormat::Json => json_csv::export_json(dataset, path),
        ExportFormat::Xlsx => xlsx::export_xlsx(dataset, path),
        ExportFormat::Pdf => pdf_export::export_pdf(dataset, path, institution),
    }
}
