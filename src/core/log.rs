use crate::errors::AppResult;
use ansi_term::Colour;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

/// Colour of an audit operation in `sakip log --print`.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "add" | "upload" | "login" | "activate" => Colour::Green,
        "del" | "reject" | "deactivate" | "revoke" => Colour::Red,
        "edit" | "revise" | "password" => Colour::Yellow,
        "submit" | "assess" | "complete" => Colour::Cyan,
        "validate" | "approve" => Colour::Fixed(34),
        "grant" | "assign" | "permission" | "seed" => Colour::Purple,
        "migration_applied" => Colour::Purple,
        "backup" | "export" | "report" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

pub struct LogLogic;

impl LogLogic {
    /// Audit rows, oldest first. `limit` keeps only the latest N.
    pub fn entries(conn: &Connection, limit: Option<usize>) -> AppResult<Vec<LogEntry>> {
        let mut stmt = conn.prepare_cached(
            "SELECT id, date, operation, COALESCE(target, ''), message FROM log ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let raw_date: String = row.get(1)?;
            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%F %T").to_string())
                .unwrap_or(raw_date);
            Ok(LogEntry {
                id: row.get(0)?,
                date,
                operation: row.get(2)?,
                target: row.get(3)?,
                message: row.get(4)?,
            })
        })?;

        let mut entries = rows.collect::<Result<Vec<_>, _>>()?;
        if let Some(n) = limit {
            let skip = entries.len().saturating_sub(n);
            entries.drain(..skip);
        }
        Ok(entries)
    }

    pub fn print_log(conn: &Connection, limit: Option<usize>) -> AppResult<()> {
        let entries = Self::entries(conn, limit)?;
        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let id_w = entries.iter().map(|e| e.id.to_string().len()).max().unwrap_or(1);
        let op_w = entries
            .iter()
            .map(|e| label(e).chars().count())
            .max()
            .unwrap_or(10)
            .min(60);

        println!("📜 Internal log:\n");
        for e in &entries {
            let mut text = label(e);
            if text.chars().count() > 60 {
                text = text.chars().take(57).collect::<String>() + "...";
            }
            let padding = " ".repeat(op_w.saturating_sub(text.chars().count()));

            // only the operation word is coloured
            let coloured = match text.split_once(' ') {
                Some((op, rest)) => format!("{} {rest}", color_for_operation(&e.operation).paint(op)),
                None => color_for_operation(&e.operation).paint(text.as_str()).to_string(),
            };

            println!(
                "{:>id_w$}: {} | {}{} => {}",
                e.id, e.date, coloured, padding, e.message
            );
        }
        Ok(())
    }
}

/// `operation (target)`, or just the operation.
fn label(e: &LogEntry) -> String {
    if e.target.is_empty() {
        e.operation.clone()
    } else {
        format!("{} ({})", e.operation, e.target)
    }
}
