// src/export/pdf_export.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::Dataset;
use crate::export::pdf::PdfManager;
use std::path::Path;

/// Tables wider than this many columns go landscape.
const LANDSCAPE_FROM: usize = 6;

pub(crate) fn export_pdf(dataset: &Dataset, path: &Path, institution: &str) -> AppResult<()> {
    let landscape = dataset.headers.len() >= LANDSCAPE_FROM;
    let footer = format!(
        "{institution} - generated {}",
        crate::utils::date::now_str()
    );

    let mut pdf = PdfManager::new(landscape);
    pdf.write_table(&dataset.title, &footer, &dataset.header_refs(), &dataset.rows);

    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))
}
