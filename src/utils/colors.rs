/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

/// Colour for a performance status label.
pub fn color_for_status(status: &str) -> &'static str {
    match status {
        "excellent" | "validated" | "approved" | "completed" | "aktif" | "selesai" => GREEN,
        "good" | "submitted" | "in_review" | "berjalan" => CYAN,
        "satisfactory" | "fair" | "draft" | "pending" | "generating" | "revised" => YELLOW,
        "needs_improvement" | "poor" | "rejected" | "failed" | "nonaktif" | "tunda" => RED,
        _ => RESET,
    }
}

/// Achievement colour: ≥100 green, ≥60 yellow, otherwise red.
pub fn color_for_achievement(value: f64) -> &'static str {
    if value >= 100.0 {
        GREEN
    } else if value >= 60.0 {
        YELLOW
    } else {
        RED
    }
}

pub fn colorize_status(status: &str) -> String {
    format!("{}{}{}", color_for_status(status), status, RESET)
}

/// Grey out an empty optional value.
pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--{RESET}"),
    }
}
