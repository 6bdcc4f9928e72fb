// src/export/xlsx.rs

use crate::errors::{AppError, AppResult};
use crate::export::excel_date::parse_to_excel_date;
use crate::export::model::Dataset;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const TITLE_ROW: u32 = 0;
const HEADER_ROW: u32 = 2;

/// Styled sheet: title line, coloured header, banded rows, auto width.
pub(crate) fn export_xlsx(dataset: &Dataset, path: &Path) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name(&dataset.title))
        .map_err(to_export_error)?;

    let title_format = Format::new().set_bold().set_font_size(14);
    worksheet
        .write_with_format(TITLE_ROW, 0, dataset.title.as_str(), &title_format)
        .map_err(to_export_error)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x1F4E79))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in dataset.headers.iter().enumerate() {
        worksheet
            .write_with_format(HEADER_ROW, col as u16, header.as_str(), &header_format)
            .map_err(to_export_error)?;
    }
    worksheet.set_freeze_panes(HEADER_ROW + 1, 0).ok();

    if dataset.is_empty() {
        worksheet
            .write(HEADER_ROW + 1, 0, "No data available")
            .map_err(to_export_error)?;
    }

    let mut col_widths: Vec<usize> = dataset
        .headers
        .iter()
        .map(|h| UnicodeWidthStr::width(h.as_str()))
        .collect();

    let band1 = Color::RGB(0xEAF3FB);
    let band2 = Color::RGB(0xFFFFFF);

    for (row_index, values) in dataset.rows.iter().enumerate() {
        let row = HEADER_ROW + 1 + row_index as u32;
        let band = if row_index % 2 == 0 { band1 } else { band2 };

        for (col, value) in values.iter().enumerate().take(col_widths.len()) {
            write_cell(worksheet, row, col as u16, value, band)?;
            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, (*w).min(60) as f64 + 2.0)
            .map_err(to_export_error)?;
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| AppError::Export(format!("invalid path: {}", path.display())))?;
    workbook.save(path_str).map_err(to_export_error)?;
    Ok(())
}

/// Dates and numbers become typed cells; everything else stays text.
fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, s: &str, bg: Color) -> AppResult<()> {
    let base = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    if let Some((num_format, serial)) = parse_to_excel_date(s) {
        worksheet
            .write_with_format(row, col, serial, &base.set_num_format(num_format))
            .map_err(to_export_error)?;
        return Ok(());
    }

    if let Ok(num) = s.parse::<f64>() {
        worksheet
            .write_with_format(row, col, num, &base.set_align(FormatAlign::Right))
            .map_err(to_export_error)?;
        return Ok(());
    }

    worksheet
        .write_with_format(row, col, s, &base)
        .map_err(to_export_error)?;
    Ok(())
}

/// Excel sheet names: max 31 chars, no `[]:*?/\`.
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Data".to_string()
    } else {
        cleaned
    }
}

fn to_export_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_sanitised() {
        assert_eq!(sheet_name("Trends 2025/2026"), "Trends 20252026");
        assert_eq!(sheet_name("???"), "Data");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
    }
}
