use crate::cli::parser::Commands;
use crate::config::{Config, check};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, header, success, warning};
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            header("Current configuration");
            println!("{}", cfg.to_yaml()?);
        }

        if *check {
            let report = check::validate(cfg);
            for w in &report.warnings {
                warning(w);
            }
            for e in &report.errors {
                error(e);
            }
            if !report.is_valid() {
                return Err(AppError::Config(format!(
                    "{} configuration error(s)",
                    report.errors.len()
                )));
            }
            success("Configuration is valid");
        }

        if *edit_config {
            let default_editor = std::env::var("EDITOR")
                .or_else(|_| std::env::var("VISUAL"))
                .unwrap_or_else(|_| {
                    if cfg!(target_os = "windows") {
                        "notepad".to_string()
                    } else {
                        "nano".to_string()
                    }
                });
            let editor_to_use = editor.clone().unwrap_or_else(|| default_editor.clone());

            match Command::new(&editor_to_use).arg(&path).status() {
                Ok(s) if s.success() => {
                    success(format!("Configuration edited with '{editor_to_use}'"));
                }
                _ => {
                    warning(format!(
                        "Editor '{editor_to_use}' not available, falling back to '{default_editor}'"
                    ));
                    match Command::new(&default_editor).arg(&path).status() {
                        Ok(s) if s.success() => {
                            success(format!("Configuration edited with '{default_editor}'"));
                        }
                        _ => {
                            return Err(AppError::Config(format!(
                                "failed to edit {} with '{default_editor}'",
                                path.display()
                            )));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
