use crate::cli::commands::{parse_opt, print_json};
use crate::cli::parser::{AssessmentAction, Commands};
use crate::config::Config;
use crate::core::assessment::AssessmentLogic;
use crate::db;
use crate::errors::AppResult;
use crate::models::assessment::{Assessment, AssessmentInput};
use crate::models::status::DbEnum;
use crate::ui::messages::{info, success};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::table::Table;

fn report(verb: &str, a: &Assessment) {
    let grade = a.grade.as_deref().unwrap_or("-");
    success(format!(
        "Assessment #{} {verb}: data #{} grade {grade} ({})",
        a.id,
        a.performance_data_id,
        a.status.to_db_str()
    ));
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Assessment { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            AssessmentAction::List { status } => {
                let rows = AssessmentLogic::list(conn, cfg, parse_opt(status)?)?;
                if rows.is_empty() {
                    info("No assessments found.");
                    return Ok(());
                }
                let mut table = Table::new(&["ID", "Data", "Score", "Grade", "Status", "Approved"]);
                for a in &rows {
                    let score = a.overall_score.map(|s| format!("{s:.2}"));
                    table.add_row(vec![
                        a.id.to_string(),
                        a.performance_data_id.to_string(),
                        colorize_optional(score.as_deref()),
                        colorize_optional(a.grade.as_deref()),
                        colorize_status(a.status.to_db_str()),
                        colorize_optional(a.approved_at.as_deref()),
                    ]);
                }
                table.print();
            }
            AssessmentAction::Show { id } => print_json(&AssessmentLogic::get(conn, cfg, *id)?)?,
            AssessmentAction::Add {
                data_id,
                score,
                comments,
                recommendations,
            } => {
                let input = AssessmentInput {
                    performance_data_id: Some(*data_id),
                    overall_score: *score,
                    comments: comments.clone(),
                    recommendations: recommendations.clone(),
                };
                report("created", &AssessmentLogic::create(conn, cfg, input, None)?);
            }
            AssessmentAction::Edit {
                id,
                score,
                comments,
                recommendations,
            } => {
                let input = AssessmentInput {
                    performance_data_id: None,
                    overall_score: *score,
                    comments: comments.clone(),
                    recommendations: recommendations.clone(),
                };
                report("updated", &AssessmentLogic::update(conn, cfg, *id, input, None)?);
            }
            AssessmentAction::Complete { id } => {
                report("completed", &AssessmentLogic::complete(conn, cfg, *id)?)
            }
            AssessmentAction::Approve { id } => {
                report("approved", &AssessmentLogic::approve(conn, cfg, *id)?)
            }
        }
    }
    Ok(())
}
