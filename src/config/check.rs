//! Sanity checks for a loaded configuration (`sakip config --check`).

use crate::config::{Config, Limit};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Default, Serialize)]
pub struct ConfigReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate(cfg: &Config) -> ConfigReport {
    let mut report = ConfigReport::default();

    if cfg.database.trim().is_empty() {
        report.errors.push("Database path not configured".into());
    }

    // Grading scale
    if cfg.grading.is_empty() {
        report
            .errors
            .push("Assessment grading configuration missing".into());
    }
    for band in &cfg.grading {
        if band.min > band.max {
            report.errors.push(format!(
                "Grade {} has min {} above max {}",
                band.grade, band.min, band.max
            ));
        }
        if !(0.0..=100.0).contains(&band.min) || !(0.0..=100.0).contains(&band.max) {
            report
                .errors
                .push(format!("Grade {} lies outside 0-100", band.grade));
        }
    }
    let mut sorted: Vec<_> = cfg.grading.iter().collect();
    sorted.sort_by(|a, b| a.min.total_cmp(&b.min));
    for pair in sorted.windows(2) {
        if pair[0].max >= pair[1].min {
            report.warnings.push(format!(
                "Grades {} and {} overlap",
                pair[0].grade, pair[1].grade
            ));
        }
    }

    if !(0.0..=100.0).contains(&cfg.passing_score) {
        report
            .errors
            .push("Passing score must be between 0 and 100".into());
    }

    // Uploads
    if cfg.max_upload_size == 0 {
        report
            .errors
            .push("Maximum upload size must be greater than zero".into());
    }
    if !Path::new(&cfg.upload_dir).is_absolute() {
        report
            .warnings
            .push(format!("Upload directory is relative: {}", cfg.upload_dir));
    }
    if !Path::new(&cfg.report_dir).is_absolute() {
        report
            .warnings
            .push(format!("Report directory is relative: {}", cfg.report_dir));
    }

    if cfg.institution_name.trim().is_empty() {
        report.warnings.push("Institution name not configured".into());
    }

    if cfg.server.port == 0 {
        report.warnings.push("Server port not configured".into());
    }

    let limits = &cfg.rate_limits;
    for (name, limit) in [
        ("api", limits.api),
        ("login", limits.login),
        ("upload", limits.upload),
        ("dashboard", limits.dashboard),
    ] {
        if is_disabled(limit) {
            report
                .warnings
                .push(format!("Rate limit '{name}' allows no requests"));
        }
    }

    report
}

fn is_disabled(limit: Limit) -> bool {
    limit.max == 0 || limit.per_seconds == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradeBand;

    fn cfg() -> Config {
        let mut c = Config::with_database("/tmp/sakip_check.sqlite".into());
        c.upload_dir = "/tmp/uploads".into();
        c.report_dir = "/tmp/reports".into();
        c
    }

    #[test]
    fn defaults_are_valid() {
        let report = validate(&cfg());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn missing_grading_is_an_error() {
        let mut c = cfg();
        c.grading.clear();
        assert!(!validate(&c).is_valid());
    }

    #[test]
    fn overlapping_bands_warn() {
        let mut c = cfg();
        c.grading.push(GradeBand {
            grade: "X".into(),
            min: 85.0,
            max: 95.0,
        });
        let report = validate(&c);
        assert!(report.warnings.iter().any(|w| w.contains("overlap")));
    }
}
