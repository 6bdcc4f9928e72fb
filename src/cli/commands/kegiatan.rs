use crate::cli::commands::{parse_opt, print_json};
use crate::cli::parser::{Commands, KegiatanAction, KegiatanArgs};
use crate::config::Config;
use crate::core::kegiatan::KegiatanLogic;
use crate::db;
use crate::errors::AppResult;
use crate::models::kegiatan::KegiatanInput;
use crate::models::status::DbEnum;
use crate::ui::messages::{info, success};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::formatting::format_rupiah;
use crate::utils::table::Table;

fn to_input(args: &KegiatanArgs) -> AppResult<KegiatanInput> {
    Ok(KegiatanInput {
        program_id: args.program_id,
        kode_kegiatan: args.kode.clone(),
        nama_kegiatan: args.nama.clone(),
        deskripsi: args.deskripsi.clone(),
        anggaran: args.anggaran,
        tanggal_mulai: args.tanggal_mulai.clone(),
        tanggal_selesai: args.tanggal_selesai.clone(),
        penanggung_jawab: args.penanggung_jawab.clone(),
        status: parse_opt(&args.status)?,
    })
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Kegiatan { action } = cmd {
        let pool = db::open(cfg)?;
        let conn = &pool.conn;

        match action {
            KegiatanAction::List { program_id } => {
                let rows = KegiatanLogic::list(conn, *program_id)?;
                if rows.is_empty() {
                    info("No kegiatan found.");
                    return Ok(());
                }
                let mut table = Table::new(&[
                    "ID", "Program", "Kode", "Nama", "Mulai", "Selesai", "Anggaran", "Status",
                ]);
                for r in &rows {
                    table.add_row(vec![
                        r.id.to_string(),
                        r.program_id.to_string(),
                        r.kode_kegiatan.clone(),
                        r.nama_kegiatan.clone(),
                        colorize_optional(r.tanggal_mulai.as_deref()),
                        colorize_optional(r.tanggal_selesai.as_deref()),
                        format_rupiah(r.anggaran),
                        colorize_status(r.status.to_db_str()),
                    ]);
                }
                table.print();
            }
            KegiatanAction::Show { id } => print_json(&KegiatanLogic::get(conn, *id)?)?,
            KegiatanAction::Add { fields } => {
                let row = KegiatanLogic::create(conn, to_input(fields)?)?;
                success(format!("Kegiatan #{} created: {}", row.id, row.kode_kegiatan));
            }
            KegiatanAction::Edit { id, fields } => {
                let row = KegiatanLogic::update(conn, *id, to_input(fields)?)?;
                success(format!("Kegiatan #{} updated: {}", row.id, row.nama_kegiatan));
            }
            KegiatanAction::Del { id } => {
                KegiatanLogic::delete(conn, *id)?;
                success(format!("Kegiatan #{id} deleted"));
            }
        }
    }
    Ok(())
}
