use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db;
use crate::errors::AppResult;
use crate::export::range::parse_period_range;
use crate::export::{ExportFilter, ExportLogic};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        kind,
        format,
        file,
        year,
        instansi_id,
        range,
        force,
    } = cmd
    {
        let filter = ExportFilter {
            year: *year,
            instansi_id: *instansi_id,
            period: range.as_deref().map(parse_period_range).transpose()?,
        };

        let pool = db::open(cfg)?;
        ExportLogic::export(&pool.conn, cfg, *kind, *format, file, &filter, *force)?;
    }
    Ok(())
}
