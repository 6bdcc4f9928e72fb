//! Icon-prefixed console lines shared by every command.

use ansi_term::{Colour, Style};
use std::fmt;

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";
const ICON_HINT: &str = "👉";

fn icon(colour: Colour, glyph: &str) -> ansi_term::ANSIString<'_> {
    Style::new().bold().fg(colour).paint(glyph)
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", icon(Colour::Blue, ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", icon(Colour::Green, ICON_OK), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", icon(Colour::Yellow, ICON_WARN), msg);
}

/// Goes to stderr so scripted runs can tell findings from progress lines.
pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", icon(Colour::Red, ICON_ERR), msg);
}

/// Follow-up command the user is expected to run next.
pub fn hint<T: fmt::Display>(msg: T) {
    println!("{} {}", icon(Colour::Cyan, ICON_HINT), Colour::Cyan.dimmed().paint(msg.to_string()));
}

pub fn header<T: fmt::Display>(msg: T) {
    let title = format!("==== {msg} ");
    println!("{}", Style::new().bold().fg(Colour::Blue).paint(title));
}
