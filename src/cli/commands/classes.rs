use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::class_check::{ClassChecker, IssueKind};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{header, info, success};
use crate::utils::colors::{GREY, RESET, YELLOW};
use std::path::PathBuf;

pub fn handle(cmd: &Commands, _cfg: &Config) -> AppResult<()> {
    if let Commands::CheckMissingClasses { path, root, fix } = cmd {
        let root = match root {
            Some(r) => PathBuf::from(r),
            None => std::env::current_dir()?,
        };
        let checker = ClassChecker::new(&root)?;

        header(format!("Checking PHP classes under {path}"));
        let issues = checker.scan(path)?;
        if issues.is_empty() {
            success("No missing classes found");
            return Ok(());
        }

        for issue in &issues {
            println!(
                "{YELLOW}{}:{}{RESET} {}",
                checker.relative(&issue.file).display(),
                issue.line,
                issue.class
            );
            println!("    {GREY}{}{RESET}", issue.content);
            match &issue.kind {
                IssueKind::WrongNamespace { current, suggested } => {
                    println!("    wrong namespace: {current} → {suggested}");
                }
                IssueKind::MissingImport { suggestions } => {
                    println!("    missing import, found in: {}", suggestions.join(", "));
                }
            }
        }

        if *fix {
            let fixed = checker.fix(&issues)?;
            success(format!("Fixed {} issue(s)", fixed.len()));
        } else {
            info("Run with --fix to rewrite wrong namespaces");
        }

        return Err(AppError::Validation(format!(
            "{} class issue(s) found",
            issues.len()
        )));
    }
    Ok(())
}
