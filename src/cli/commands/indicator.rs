use crate::cli::commands::{parse_opt, print_json};
use crate::cli::parser::{Commands, IndicatorAction, IndicatorArgs};
use crate::config::Config;
use crate::core::indicator::IndicatorLogic;
use crate::db;
use crate::errors::AppResult;
use crate::models::indicator::IndicatorInput;
use crate::models::status::DbEnum;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

fn to_input(args: &IndicatorArgs) -> AppResult<IndicatorInput> {
    Ok(IndicatorInput {
        instansi_id: args.instansi_id,
        program_id: args.program_id,
        kegiatan_id: args.kegiatan_id,
        code: args.code.clone(),
        name: args.name.clone(),
        description: args.description.clone(),
        measurement_unit: args.measurement_unit.clone(),
        data_source: args.data_source.clone(),
        collection_method: args.collection_method.clone(),
        frequency: parse_opt(&args.frequency)?,
        category: parse_opt(&args.category)?,
        weight: args.weight,
        is_mandatory: args.mandatory,
    })
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Indicator { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            IndicatorAction::List {
                instansi_id,
                category,
            } => {
                let rows = IndicatorLogic::list(conn, *instansi_id, parse_opt(category)?)?;
                if rows.is_empty() {
                    info("No indicators found.");
                    return Ok(());
                }
                let mut table = Table::new(&[
                    "ID", "Instansi", "Code", "Name", "Unit", "Category", "Frequency", "Weight",
                    "Mandatory",
                ]);
                for r in &rows {
                    table.add_row(vec![
                        r.id.to_string(),
                        r.instansi_id.to_string(),
                        r.code.clone(),
                        r.name.clone(),
                        r.measurement_unit.clone(),
                        r.category.to_db_str().to_string(),
                        r.frequency.to_db_str().to_string(),
                        format!("{:.2}", r.weight),
                        if r.is_mandatory { "yes" } else { "no" }.to_string(),
                    ]);
                }
                table.print();
            }
            IndicatorAction::Show { id } => print_json(&IndicatorLogic::get(conn, *id)?)?,
            IndicatorAction::Add { fields } => {
                let row = IndicatorLogic::create(conn, to_input(fields)?)?;
                success(format!("Indicator #{} created: {}", row.id, row.code));
            }
            IndicatorAction::Edit { id, fields } => {
                let row = IndicatorLogic::update(conn, *id, to_input(fields)?)?;
                success(format!("Indicator #{} updated: {}", row.id, row.name));
            }
            IndicatorAction::Del { id } => {
                IndicatorLogic::delete(conn, *id)?;
                success(format!("Indicator #{id} deleted"));
            }
        }
    }
    Ok(())
}
