use crate::api;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve { host, port } = cmd {
        let host = host.clone().unwrap_or_else(|| cfg.server.host.clone());
        let port = port.unwrap_or(cfg.server.port);

        info(format!("Serving the SAKIP API on http://{host}:{port}/api/v1"));
        api::serve(cfg.clone(), &host, port)?;
    }
    Ok(())
}
