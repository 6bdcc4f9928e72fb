use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

const COUNTED_TABLES: &[(&str, &str)] = &[
    ("instansi", "Instansi"),
    ("programs", "Programs"),
    ("kegiatan", "Kegiatan"),
    ("performance_indicators", "Indicators"),
    ("targets", "Targets"),
    ("performance_data", "Performance data"),
    ("evidence_documents", "Evidence documents"),
    ("assessments", "Assessments"),
    ("reports", "Reports"),
    ("users", "Users"),
    ("roles", "Roles"),
    ("permissions", "Permissions"),
];

/// Row count per table, in display order.
pub fn table_counts(pool: &DbPool) -> AppResult<Vec<(&'static str, i64)>> {
    let mut out = Vec::new();
    for (table, label) in COUNTED_TABLES {
        let count: i64 =
            pool.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        out.push((*label, count));
    }
    Ok(out)
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROWS PER TABLE
    //
    println!("{}• Rows:{}", CYAN, RESET);
    for (label, count) in table_counts(pool)? {
        let colour = if count > 0 { GREEN } else { GREY };
        println!("    {:<20} {}{}{}", label, colour, count, RESET);
    }

    //
    // 3) REPORTING PERIODS
    //
    let first: Option<String> = pool
        .conn
        .query_row("SELECT MIN(period) FROM performance_data", [], |row| row.get(0))
        .optional()?
        .flatten();
    let last: Option<String> = pool
        .conn
        .query_row("SELECT MAX(period) FROM performance_data", [], |row| row.get(0))
        .optional()?
        .flatten();

    let fmt = |p: Option<String>| p.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Reporting periods:{}", CYAN, RESET);
    println!("    from: {}", fmt(first));
    println!("    to:   {}", fmt(last));

    println!();
    Ok(())
}
