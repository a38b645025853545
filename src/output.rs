//! Table and JSON rendering for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON
    Json,
}

/// Print rows as a table, or the underlying values as a JSON array.
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if items.is_empty() => println!("No results found."),
        OutputFormat::Table => println!("{}", Table::new(items)),
        OutputFormat::Json => print_json(&items),
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Failed to render JSON: {e}")),
    }
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print an aligned key-value pair.
pub fn print_kv(key: &str, value: impl std::fmt::Display) {
    println!("  {:<20} {}", format!("{key}:"), value);
}
