//! sakip library root.
//! Exposes the CLI parser, the JSON API, the high-level run() function and
//! the internal modules.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod security;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let cmd = &cli.command;
    match cmd {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(cmd, cfg),
        Commands::Db { .. } => commands::db::handle(cmd, cfg),
        Commands::Log { .. } => commands::log::handle(cmd, cfg),
        Commands::Backup { .. } => commands::backup::handle(cmd, cfg),
        Commands::Export { .. } => commands::export::handle(cmd, cfg),
        Commands::Instansi { .. } => commands::instansi::handle(cmd, cfg),
        Commands::Program { .. } => commands::program::handle(cmd, cfg),
        Commands::Kegiatan { .. } => commands::kegiatan::handle(cmd, cfg),
        Commands::Indicator { .. } => commands::indicator::handle(cmd, cfg),
        Commands::Target { .. } => commands::target::handle(cmd, cfg),
        Commands::Data { .. } => commands::data::handle(cmd, cfg),
        Commands::Assessment { .. } => commands::assessment::handle(cmd, cfg),
        Commands::Report { .. } => commands::report::handle(cmd, cfg),
        Commands::Dashboard { .. } => commands::dashboard::handle(cmd, cfg),
        Commands::User { .. } => commands::user::handle(cmd, cfg),
        Commands::Role { .. } => commands::role::handle(cmd, cfg),
        Commands::AddPermissions { .. } => commands::permissions::handle(cmd, cfg),
        Commands::RemoveTestUsers { .. } => commands::test_users::handle(cmd, cfg),
        Commands::CheckMissingClasses { .. } => commands::classes::handle(cmd, cfg),
        Commands::Seed => commands::seed::handle(cmd, cfg),
        Commands::ValidateUpload { .. } => commands::upload::handle(cmd, cfg),
        Commands::Serve { .. } => commands::serve::handle(cmd, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // Load the configuration once; `--db` overrides the database for this run.
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
