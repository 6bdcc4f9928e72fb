use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn current_year() -> i32 {
    today().year()
}

/// Timestamp stored in every `created_at`/`updated_at` column.
pub fn now_str() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Validate a reporting period `YYYY-MM` and return it normalised.
pub fn parse_period(s: &str) -> AppResult<String> {
    let p = s.trim();
    let ok = p.len() == 7
        && p.as_bytes()[4] == b'-'
        && NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d").is_ok();

    if ok {
        Ok(p.to_string())
    } else {
        Err(AppError::InvalidPeriod(s.to_string()))
    }
}

/// Accept a plausible fiscal year.
pub fn parse_year(year: i32) -> AppResult<i32> {
    if (2000..=2100).contains(&year) {
        Ok(year)
    } else {
        Err(AppError::Validation(format!(
            "Year {year} must be between 2000 and 2100"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_must_be_year_month() {
        assert_eq!(parse_period("2025-03").unwrap(), "2025-03");
        assert!(parse_period("2025-13").is_err());
        assert!(parse_period("2025/03").is_err());
        assert!(parse_period("2025").is_err());
    }
}
