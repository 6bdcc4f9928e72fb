use crate::cli::commands::{parse_opt, print_json};
use crate::cli::parser::{Commands, InstansiAction, InstansiArgs};
use crate::config::Config;
use crate::core::instansi::InstansiLogic;
use crate::db;
use crate::errors::AppResult;
use crate::models::instansi::{Instansi, InstansiInput};
use crate::models::status::DbEnum;
use crate::ui::messages::{info, success};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::table::Table;

fn to_input(args: &InstansiArgs) -> AppResult<InstansiInput> {
    Ok(InstansiInput {
        kode_instansi: args.kode.clone(),
        nama_instansi: args.nama.clone(),
        alamat: args.alamat.clone(),
        telepon: args.telepon.clone(),
        email: args.email.clone(),
        website: args.website.clone(),
        kepala_instansi: args.kepala.clone(),
        nip_kepala: args.nip_kepala.clone(),
        status: parse_opt(&args.status)?,
    })
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Instansi { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            InstansiAction::List { json } => {
                let rows = InstansiLogic::list(conn)?;
                if *json {
                    return print_json(&rows);
                }
                print_table(&rows);
            }
            InstansiAction::Show { id } => print_json(&InstansiLogic::get(conn, *id)?)?,
            InstansiAction::Add { fields } => {
                let row = InstansiLogic::create(conn, to_input(fields)?)?;
                success(format!("Instansi #{} created: {}", row.id, row.kode_instansi));
            }
            InstansiAction::Edit { id, fields } => {
                let row = InstansiLogic::update(conn, *id, to_input(fields)?)?;
                success(format!("Instansi #{} updated: {}", row.id, row.nama_instansi));
            }
            InstansiAction::Del { id } => {
                InstansiLogic::delete(conn, *id)?;
                success(format!("Instansi #{id} deleted"));
            }
        }
    }
    Ok(())
}

fn print_table(rows: &[Instansi]) {
    if rows.is_empty() {
        info("No instansi found.");
        return;
    }
    let mut table = Table::new(&["ID", "Kode", "Nama", "Kepala", "Status"]);
    for r in rows {
        table.add_row(vec![
            r.id.to_string(),
            r.kode_instansi.clone(),
            r.nama_instansi.clone(),
            colorize_optional(r.kepala_instansi.as_deref()),
            colorize_status(r.status.to_db_str()),
        ]);
    }
    table.print();
}
