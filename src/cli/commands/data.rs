use crate::cli::commands::{parse_opt, print_json};
use crate::cli::parser::{Commands, DataAction, DataArgs};
use crate::config::Config;
use crate::core::dashboard::performance_status;
use crate::core::evidence::EvidenceLogic;
use crate::core::performance::PerformanceLogic;
use crate::db;
use crate::db::queries::performance::DataFilter;
use crate::errors::{AppError, AppResult};
use crate::models::performance_data::{PerformanceData, PerformanceDataInput, Severity};
use crate::models::status::DbEnum;
use crate::ui::messages::{error, info, success, warning};
use crate::utils::colors::{RESET, color_for_achievement, colorize_status};
use crate::utils::formatting::{format_file_size, format_percentage};
use crate::utils::table::Table;
use std::fs;
use std::path::Path;

fn to_input(args: &DataArgs) -> AppResult<PerformanceDataInput> {
    Ok(PerformanceDataInput {
        indicator_id: args.indicator_id,
        instansi_id: args.instansi_id,
        period: args.period.clone(),
        actual_value: args.actual_value,
        notes: args.notes.clone(),
        data_quality: parse_opt(&args.data_quality)?,
    })
}

fn report(verb: &str, row: &PerformanceData) {
    success(format!(
        "Performance data #{} {verb}: {} ({})",
        row.id,
        row.period,
        row.status.to_db_str()
    ));
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Data { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            DataAction::List {
                instansi_id,
                indicator_id,
                status,
                period,
            } => {
                let filter = DataFilter {
                    instansi_id: *instansi_id,
                    indicator_id: *indicator_id,
                    status: parse_opt(status)?,
                    period_prefix: period.as_deref(),
                };
                let rows = PerformanceLogic::list(conn, &filter)?;
                if rows.is_empty() {
                    info("No performance data found.");
                    return Ok(());
                }

                let mut table = Table::new(&[
                    "ID",
                    "Indicator",
                    "Instansi",
                    "Period",
                    "Actual",
                    "Achievement",
                    "Rating",
                    "Status",
                ]);
                for r in &rows {
                    let pct = PerformanceLogic::achievement(conn, r)?;
                    table.add_row(vec![
                        r.id.to_string(),
                        r.indicator_id.to_string(),
                        r.instansi_id.to_string(),
                        r.period.clone(),
                        format!("{:.2}", r.actual_value),
                        format!(
                            "{}{}{}",
                            color_for_achievement(pct),
                            format_percentage(pct, 2),
                            RESET
                        ),
                        performance_status(pct).to_string(),
                        colorize_status(r.status.to_db_str()),
                    ]);
                }
                table.print();
            }
            DataAction::Show { id } => print_json(&PerformanceLogic::get(conn, *id)?)?,
            DataAction::Add { fields } => {
                report("created", &PerformanceLogic::create(conn, to_input(fields)?, None)?)
            }
            DataAction::Edit { id, fields } => {
                report("updated", &PerformanceLogic::update(conn, *id, to_input(fields)?)?)
            }
            DataAction::Submit { id } => report("submitted", &PerformanceLogic::submit(conn, *id, None)?),
            DataAction::Validate { id } => report("validated", &PerformanceLogic::validate(conn, *id)?),
            DataAction::Reject { id, reason } => {
                report("rejected", &PerformanceLogic::reject(conn, *id, reason.clone())?)
            }
            DataAction::Del { id } => {
                PerformanceLogic::delete(conn, *id)?;
                success(format!("Performance data #{id} deleted"));
            }
            DataAction::Attach {
                id,
                file,
                description,
            } => {
                let path = Path::new(file);
                let bytes = fs::read(path)?;
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| AppError::Validation(format!("Invalid file name: {file}")))?;

                let doc = EvidenceLogic::attach(conn, cfg, *id, name, &bytes, description.clone(), None)?;
                success(format!(
                    "Evidence #{} attached to data #{id}: {} ({}, {})",
                    doc.id,
                    doc.file_name,
                    doc.file_type,
                    format_file_size(doc.file_size as u64)
                ));
            }
            DataAction::Evidence { id } => {
                let docs = EvidenceLogic::list(conn, *id)?;
                if docs.is_empty() {
                    info(format!("No evidence attached to data #{id}."));
                    return Ok(());
                }
                let mut table = Table::new(&["ID", "File", "Type", "Size", "Uploaded"]);
                for d in &docs {
                    table.add_row(vec![
                        d.id.to_string(),
                        d.file_name.clone(),
                        d.file_type.clone(),
                        format_file_size(d.file_size as u64),
                        d.created_at.clone(),
                    ]);
                }
                table.print();
            }
            DataAction::Check { id, json } => {
                let report = PerformanceLogic::check_quality(conn, *id)?;
                if *json {
                    return print_json(&report);
                }
                for i in &report.issues {
                    match i.severity {
                        Severity::Critical => error(format!("[{}] {}", i.code, i.message)),
                        _ => warning(format!("[{}] {}", i.code, i.message)),
                    }
                }
                let verdict = format!(
                    "Data #{id}: quality score {:.0} ({}), achievement {}",
                    report.quality_score,
                    report.suggested_quality.to_db_str(),
                    format_percentage(report.achievement_percentage, 2)
                );
                if report.is_valid {
                    success(verdict);
                } else {
                    error(verdict);
                }
            }
        }
    }
    Ok(())
}
