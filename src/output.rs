//! Terminal rendering for CLI results.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use seatbook_core::result::AppResult;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table plus status lines
    #[default]
    Table,
    /// Pretty-printed JSON only, for scripting
    Json,
}

/// Render rows as a table, or as a JSON array.
///
/// `empty` is printed in table mode when there are no rows.
pub fn print_rows<T: Serialize + Tabled>(
    rows: &[T],
    format: OutputFormat,
    empty: &str,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Table if rows.is_empty() => println!("{empty}"),
        OutputFormat::Table => println!("{}", Table::new(rows).with(Style::rounded())),
    }
    Ok(())
}

/// In JSON mode print `value` and return `true`; in table mode do nothing.
pub fn print_json<T: Serialize>(value: &T, format: OutputFormat) -> AppResult<bool> {
    if format != OutputFormat::Json {
        return Ok(false);
    }
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(true)
}

pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// One `label: value` line, labels padded to a common column.
pub fn print_kv(label: &str, value: impl std::fmt::Display) {
    println!("  {:<12} {value}", format!("{label}:"));
}
