// src/export/range.rs

use crate::errors::{AppError, AppResult};
use crate::utils::date::{parse_period, parse_year};

/// Inclusive bounds over `YYYY-MM` periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRange {
    pub from: String,
    pub to: String,
}

impl PeriodRange {
    pub fn contains(&self, period: &str) -> bool {
        period >= self.from.as_str() && period <= self.to.as_str()
    }

    pub fn label(&self) -> String {
        if self.from == self.to {
            self.from.clone()
        } else {
            format!("{} - {}", self.from, self.to)
        }
    }
}

/// Parse `--period`:
/// - `YYYY`
/// - `YYYY-MM`
/// - `YYYY:YYYY`
/// - `YYYY-MM:YYYY-MM`
pub fn parse_period_range(r: &str) -> AppResult<PeriodRange> {
    let (start, end) = match r.split_once(':') {
        Some((s, e)) => (s.trim(), e.trim()),
        None => (r.trim(), r.trim()),
    };

    if start.len() != end.len() {
        return Err(AppError::InvalidPeriod(format!(
            "{r}: start and end must have the same format"
        )));
    }

    let range = match start.len() {
        4 => PeriodRange {
            from: format!("{}-01", year(start)?),
            to: format!("{}-12", year(end)?),
        },
        7 => PeriodRange {
            from: parse_period(start)?,
            to: parse_period(end)?,
        },
        _ => return Err(AppError::InvalidPeriod(r.to_string())),
    };

    if range.from > range.to {
        return Err(AppError::InvalidPeriod(format!("{r}: start after end")));
    }
    Ok(range)
}

fn year(s: &str) -> AppResult<i32> {
    let y: i32 = s
        .parse()
        .map_err(|_| AppError::InvalidPeriod(s.to_string()))?;
    parse_year(y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_expands_to_twelve_months() {
        let r = parse_period_range("2025").unwrap();
        assert_eq!(r.from, "2025-01");
        assert_eq!(r.to, "2025-12");
        assert!(r.contains("2025-07"));
        assert!(!r.contains("2026-01"));
    }

    #[test]
    fn month_ranges_and_errors() {
        let r = parse_period_range("2024-11:2025-02").unwrap();
        assert!(r.contains("2024-12"));
        assert_eq!(r.label(), "2024-11 - 2025-02");

        assert!(parse_period_range("2025:2025-03").is_err());
        assert!(parse_period_range("2025-06:2025-01").is_err());
        assert!(parse_period_range("25").is_err());
    }
}
