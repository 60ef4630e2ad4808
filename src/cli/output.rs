//! Output formatting infrastructure for CLI commands.

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::outcome::OpResult;

/// Output mode for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

/// Print a single item as pretty-printed JSON.
pub fn output_json<T: Serialize>(item: &T) {
    match serde_json::to_string_pretty(item) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize to JSON: {}", e)),
    }
}

/// Render a table with headers and rows, or a dimmed note when there are no rows.
pub fn format_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "No results found.".dimmed().to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers);

    for row in rows {
        table.add_row(row);
    }

    table.to_string()
}

/// Print a formatted table with headers and rows.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    println!("{}", format_table(headers, rows));
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "OK".green().bold(), msg)
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{}", format_success(msg));
}

/// Print a warning to stderr.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), msg);
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn format_header(title: &str) -> String {
    format!("\n{}\n", title.bold())
}

pub fn format_kv(key: &str, value: &str) -> String {
    format!("  {}: {}", key.dimmed(), value)
}

/// Print a key-value pair line.
pub fn print_kv(key: &str, value: &str) {
    println!("{}", format_kv(key, value));
}

/// Print a dimmed hint/suggestion message.
pub fn print_hint(msg: &str) {
    println!("{}", msg.dimmed());
}

/// Report the status line of an operation result in human mode.
///
/// Returns true when the result carries an error.
pub fn print_outcome_status<T>(result: &OpResult<T>) -> bool {
    if result.is_error {
        print_error(&result.message);
    } else if result.is_warning {
        print_warning(&result.message);
    } else if !result.message.is_empty() {
        print_success(&result.message);
    }
    result.is_error
}
