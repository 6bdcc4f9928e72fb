use crate::cli::commands::print_json;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::dashboard::DashboardLogic;
use crate::db;
use crate::errors::AppResult;
use crate::models::dashboard::IndicatorAchievement;
use crate::ui::messages::{header, info};
use crate::utils::colors::{CYAN, RESET, color_for_achievement};
use crate::utils::date::{current_year, parse_year};
use crate::utils::formatting::format_percentage;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Dashboard {
        instansi_id,
        year,
        json,
    } = cmd
    {
        let year = parse_year(year.unwrap_or_else(current_year))?;
        let pool = db::open(cfg)?;
        let data = DashboardLogic::dashboard(&pool.conn, *instansi_id, year)?;

        if *json {
            return print_json(&data);
        }

        header(format!("{} - dashboard {year}", cfg.institution_name));
        let line = |label: &str, value: String| println!("{CYAN}• {label:<24}{RESET} {value}");
        line("Indicators", data.total_indicators.to_string());
        line("Approved targets", data.active_targets.to_string());
        line("Submitted data", data.submitted_data.to_string());
        line("Approved assessments", data.completed_assessments.to_string());
        line(
            "Overall achievement",
            coloured(data.overall_achievement),
        );
        line("Compliance rate", format_percentage(data.compliance_rate, 2));

        println!();
        achievements("Top performers", &data.top_performers);
        achievements("Underperforming indicators", &data.underperforming_indicators);

        if !data.recent_activities.is_empty() {
            println!("{CYAN}Recent activity{RESET}");
            for a in &data.recent_activities {
                println!(
                    "  {} {} ({})",
                    a.timestamp.as_deref().unwrap_or("--"),
                    a.description,
                    a.user.as_deref().unwrap_or("system")
                );
            }
        }
    }
    Ok(())
}

fn coloured(pct: f64) -> String {
    format!("{}{}{}", color_for_achievement(pct), format_percentage(pct, 2), RESET)
}

fn achievements(title: &str, rows: &[IndicatorAchievement]) {
    println!("{CYAN}{title}{RESET}");
    if rows.is_empty() {
        info("  none");
        println!();
        return;
    }
    let mut table = Table::new(&["Code", "Indicator", "Instansi", "Period", "Achievement"]);
    for r in rows {
        table.add_row(vec![
            r.indicator_code.clone(),
            r.indicator_name.clone(),
            r.instansi_name.clone(),
            r.period.clone(),
            coloured(r.achievement_percentage),
        ]);
    }
    table.print();
    println!();
}
