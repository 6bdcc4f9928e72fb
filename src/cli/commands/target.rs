use crate::cli::parser::{Commands, TargetAction, TargetArgs};
use crate::config::Config;
use crate::core::target::TargetLogic;
use crate::db;
use crate::errors::AppResult;
use crate::models::status::DbEnum;
use crate::models::target::{Target, TargetInput};
use crate::ui::messages::{info, success};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::table::Table;

fn to_input(args: &TargetArgs) -> TargetInput {
    TargetInput {
        indicator_id: args.indicator_id,
        year: args.year,
        target_value: args.target_value,
        minimum_value: args.minimum_value,
        justification: args.justification.clone(),
    }
}

fn report(verb: &str, t: &Target) {
    success(format!(
        "Target #{} {verb}: indicator {} year {} ({})",
        t.id,
        t.indicator_id,
        t.year,
        t.status.to_db_str()
    ));
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Target { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            TargetAction::List { indicator_id, year } => {
                let rows = TargetLogic::list(conn, *indicator_id, *year)?;
                if rows.is_empty() {
                    info("No targets found.");
                    return Ok(());
                }
                let mut table =
                    Table::new(&["ID", "Indicator", "Year", "Target", "Minimum", "Status"]);
                for r in &rows {
                    let minimum = r.minimum_value.map(|m| format!("{m:.2}"));
                    table.add_row(vec![
                        r.id.to_string(),
                        r.indicator_id.to_string(),
                        r.year.to_string(),
                        format!("{:.2}", r.target_value),
                        colorize_optional(minimum.as_deref()),
                        colorize_status(r.status.to_db_str()),
                    ]);
                }
                table.print();
            }
            TargetAction::Add { fields } => report("created", &TargetLogic::create(conn, to_input(fields))?),
            TargetAction::Edit { id, fields } => {
                report("updated", &TargetLogic::update(conn, *id, to_input(fields))?)
            }
            TargetAction::Approve { id } => report("approved", &TargetLogic::approve(conn, *id)?),
            TargetAction::Reject { id } => report("rejected", &TargetLogic::reject(conn, *id)?),
            TargetAction::Revise { id } => report("revised", &TargetLogic::revise(conn, *id)?),
            TargetAction::Del { id } => {
                TargetLogic::delete(conn, *id)?;
                success(format!("Target #{id} deleted"));
            }
        }
    }
    Ok(())
}
