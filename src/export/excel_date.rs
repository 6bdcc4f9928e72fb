// src/export/excel_date.rs

use chrono::{NaiveDate, NaiveDateTime};

/// Recognise stored timestamps and dates and return the Excel number
/// format plus serial value.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(("yyyy-mm-dd hh:mm", excel_serial(&dt)));
        }
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(("yyyy-mm-dd hh:mm", excel_serial(&dt.naive_local())));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| ("yyyy-mm-dd", excel_serial(&dt)))
}

/// Days since 1899-12-30, fractional part for the time of day.
fn excel_serial(dt: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    let secs = (*dt - epoch).num_seconds() as f64;
    secs / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_and_timestamps_become_serials() {
        assert_eq!(parse_to_excel_date("2025-01-01"), Some(("yyyy-mm-dd", 45658.0)));
        let (fmt, serial) = parse_to_excel_date("2025-01-01 12:00:00").unwrap();
        assert_eq!(fmt, "yyyy-mm-dd hh:mm");
        assert_eq!(serial, 45658.5);
        assert!(parse_to_excel_date("2025-01").is_none());
        assert!(parse_to_excel_date("IKU-01").is_none());
    }
}
