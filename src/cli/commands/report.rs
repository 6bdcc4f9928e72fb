use crate::cli::commands::print_json;
use crate::cli::parser::{Commands, ReportAction};
use crate::config::Config;
use crate::core::report::ReportLogic;
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::status::{DbEnum, ReportStatus};
use crate::ui::messages::{info, success};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            ReportAction::List { instansi_id } => {
                let rows = ReportLogic::list(conn, *instansi_id)?;
                if rows.is_empty() {
                    info("No reports found.");
                    return Ok(());
                }
                let mut table =
                    Table::new(&["ID", "Type", "Format", "Period", "Status", "File"]);
                for r in &rows {
                    table.add_row(vec![
                        r.id.to_string(),
                        r.report_type.to_db_str().to_string(),
                        r.format.clone(),
                        r.period.clone(),
                        colorize_status(r.status.to_db_str()),
                        colorize_optional(r.file_path.as_deref()),
                    ]);
                }
                table.print();
            }
            ReportAction::Show { id } => print_json(&ReportLogic::get(conn, *id)?)?,
            ReportAction::Generate {
                report_type,
                format,
                period,
                instansi_id,
            } => {
                let report = ReportLogic::generate(
                    conn,
                    cfg,
                    *report_type,
                    *format,
                    period.as_deref(),
                    *instansi_id,
                    None,
                )?;
                if report.status == ReportStatus::Failed {
                    let reason = report.parameters["error"].as_str().unwrap_or("unknown error");
                    return Err(AppError::Export(format!(
                        "Report #{} failed: {reason}",
                        report.id
                    )));
                }
                success(format!(
                    "{} report #{} written to {}",
                    report_type.title(),
                    report.id,
                    report.file_path.as_deref().unwrap_or("-")
                ));
            }
            ReportAction::Submit { id } => {
                let report = ReportLogic::submit(conn, *id)?;
                success(format!("Report #{} submitted", report.id));
            }
        }
    }
    Ok(())
}
