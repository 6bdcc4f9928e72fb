//! Business operations. Each `*Logic` works on a plain connection so the
//! CLI and the HTTP handlers share the same rules.

pub mod assessment;
pub mod backup;
pub mod class_check;
pub mod dashboard;
pub mod evidence;
pub mod indicator;
pub mod instansi;
pub mod kegiatan;
pub mod log;
pub mod performance;
pub mod program;
pub mod rbac;
pub mod report;
pub mod target;
pub mod test_users;
pub mod users;

use crate::errors::{AppError, AppResult};

/// Unwrap a mandatory input field.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("The {field} field is required.")))
}

/// Mandatory text field: trimmed, non-blank, at most `max` characters.
pub(crate) fn required_text(value: Option<String>, field: &str, max: usize) -> AppResult<String> {
    let v = required(value, field)?.trim().to_string();
    if v.is_empty() {
        return Err(AppError::Validation(format!("The {field} field is required.")));
    }
    check_len(&v, field, max)?;
    Ok(v)
}

/// Optional text: blank becomes None.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn check_len(value: &str, field: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "The {field} may not be greater than {max} characters."
        )));
    }
    Ok(())
}

pub(crate) fn non_negative(value: f64, field: &str) -> AppResult<f64> {
    if value < 0.0 || !value.is_finite() {
        return Err(AppError::Validation(format!("The {field} must be at least 0.")));
    }
    Ok(value)
}
