use crate::cli::commands::{parse_opt, print_json};
use crate::cli::parser::{Commands, ProgramAction, ProgramArgs};
use crate::config::Config;
use crate::core::program::ProgramLogic;
use crate::db;
use crate::errors::AppResult;
use crate::models::program::ProgramInput;
use crate::models::status::DbEnum;
use crate::ui::messages::{info, success};
use crate::utils::colors::colorize_status;
use crate::utils::formatting::format_rupiah;
use crate::utils::table::Table;

fn to_input(args: &ProgramArgs) -> AppResult<ProgramInput> {
    Ok(ProgramInput {
        instansi_id: args.instansi_id,
        kode_program: args.kode.clone(),
        nama_program: args.nama.clone(),
        deskripsi: args.deskripsi.clone(),
        anggaran: args.anggaran,
        tahun: args.tahun,
        status: parse_opt(&args.status)?,
    })
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Program { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            ProgramAction::List { instansi_id, tahun } => {
                let rows = ProgramLogic::list(conn, *instansi_id, *tahun)?;
                if rows.is_empty() {
                    info("No programs found.");
                    return Ok(());
                }
                let mut table =
                    Table::new(&["ID", "Instansi", "Kode", "Nama", "Tahun", "Anggaran", "Status"]);
                for r in &rows {
                    table.add_row(vec![
                        r.id.to_string(),
                        r.instansi_id.to_string(),
                        r.kode_program.clone(),
                        r.nama_program.clone(),
                        r.tahun.to_string(),
                        format_rupiah(r.anggaran),
                        colorize_status(r.status.to_db_str()),
                    ]);
                }
                table.print();
            }
            ProgramAction::Show { id } => print_json(&ProgramLogic::get(conn, *id)?)?,
            ProgramAction::Add { fields } => {
                let row = ProgramLogic::create(conn, to_input(fields)?)?;
                success(format!("Program #{} created: {}", row.id, row.kode_program));
            }
            ProgramAction::Edit { id, fields } => {
                let row = ProgramLogic::update(conn, *id, to_input(fields)?)?;
                success(format!("Program #{} updated: {}", row.id, row.nama_program));
            }
            ProgramAction::Del { id } => {
                ProgramLogic::delete(conn, *id)?;
                success(format!("Program #{id} deleted"));
            }
        }
    }
    Ok(())
}
