use crate::config::Config;
use crate::db::log::audit;
use crate::db::queries::report as q;
use crate::errors::{AppError, AppResult};
use crate::export::{ExportFilter, ExportFormat, ExportLogic, write_dataset};
use crate::models::report::Report;
use crate::models::status::{DbEnum, ReportStatus, ReportType};
use crate::utils::date::{current_year, now_str, parse_period, parse_year};
use crate::utils::path::expand_tilde;
use rusqlite::Connection;
use serde_json::json;
use std::fs;

pub struct ReportLogic;

impl ReportLogic {
    /// Build the dataset for `report_type`, write it into `report_dir` and
    /// record the outcome. A write failure leaves a `failed` row carrying
    /// the error in its parameters.
    pub fn generate(
        conn: &Connection,
        cfg: &Config,
        report_type: ReportType,
        format: ExportFormat,
        period: Option<&str>,
        instansi_id: Option<i64>,
        generated_by: Option<i64>,
    ) -> AppResult<Report> {
        let period = normalize_period(period)?;
        let year: i32 = period[0..4]
            .parse()
            .map_err(|_| AppError::InvalidPeriod(period.clone()))?;

        let mut params = json!({
            "year": year,
            "instansi_id": instansi_id,
            "format": format.as_str(),
        });

        let now = now_str();
        let mut report = Report {
            id: 0,
            instansi_id,
            generated_by,
            report_type,
            format: format.as_str().to_string(),
            period: period.clone(),
            file_path: None,
            parameters: params.clone(),
            status: ReportStatus::Generating,
            generated_at: None,
            submitted_at: None,
            created_at: now,
        };
        report.id = q::insert(conn, &report)?;

        let filter = ExportFilter {
            year: Some(year),
            instansi_id,
            period: None,
        };

        let outcome = ExportLogic::dataset(conn, cfg, report_type.into(), &filter).and_then(|ds| {
            let dir = expand_tilde(&cfg.report_dir);
            fs::create_dir_all(&dir)?;
            let path = dir.join(format!(
                "{}_{}_{}.{}",
                report_type.to_db_str(),
                period,
                report.id,
                format.as_str()
            ));
            write_dataset(&ds, format, &path, &cfg.institution_name)?;
            params["rows"] = json!(ds.rows.len());
            Ok(path)
        });

        let finished_at = now_str();
        match outcome {
            Ok(path) => {
                let path = path.to_string_lossy().to_string();
                q::finish(
                    conn,
                    report.id,
                    ReportStatus::Completed,
                    Some(&path),
                    &params,
                    &finished_at,
                )?;
                audit(
                    conn,
                    "report",
                    &format!("report:{}", report.id),
                    &format!("{} generated", report_type.to_db_str()),
                )?;
            }
            Err(e) => {
                params["error"] = json!(e.to_string());
                q::finish(
                    conn,
                    report.id,
                    ReportStatus::Failed,
                    None,
                    &params,
                    &finished_at,
                )?;
                audit(
                    conn,
                    "report_failed",
                    &format!("report:{}", report.id),
                    &e.to_string(),
                )?;
            }
        }

        Self::get(conn, report.id)
    }

    /// completed → submitted
    pub fn submit(conn: &Connection, id: i64) -> AppResult<Report> {
        let report = Self::get(conn, id)?;
        if report.status != ReportStatus::Completed {
            return Err(AppError::Validation(format!(
                "Only completed reports can be submitted (status: {})",
                report.status.to_db_str()
            )));
        }

        q::mark_submitted(conn, id, &now_str())?;
        audit(conn, "submit", &format!("report:{id}"), "submitted")?;
        Self::get(conn, id)
    }

    pub fn get(conn: &Connection, id: i64) -> AppResult<Report> {
        q::get(conn, id)?.ok_or_else(|| AppError::not_found("Report", id))
    }

    pub fn list(conn: &Connection, instansi_id: Option<i64>) -> AppResult<Vec<Report>> {
        Ok(q::list(conn, instansi_id)?)
    }
}

/// `YYYY` or `YYYY-MM`; defaults to the current year.
fn normalize_period(period: Option<&str>) -> AppResult<String> {
    match period.map(str::trim) {
        None | Some("") => Ok(current_year().to_string()),
        Some(p) if p.len() == 4 => {
            let y: i32 = p.parse().map_err(|_| AppError::InvalidPeriod(p.to_string()))?;
            Ok(parse_year(y)?.to_string())
        }
        Some(p) => parse_period(p),
    }
}
