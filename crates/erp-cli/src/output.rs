//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use erp_core::types::pagination::Paginator;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print one page of rows in the selected format.
///
/// JSON output carries the paginator next to the rows.
pub fn print_page<T: Serialize + Tabled>(rows: &[T], paginator: &Paginator, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(rows));
            }
            println!(
                "Page {}/{} ({} total)",
                paginator.current_page, paginator.total_pages, paginator.total_count
            );
        }
        OutputFormat::Json => {
            let page = serde_json::json!({ "paginator": paginator, "items": rows });
            let json = serde_json::to_string_pretty(&page).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{item:#?}");
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a bare value, quoted in JSON mode.
pub fn print_value(value: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{value}"),
        OutputFormat::Json => println!("{}", serde_json::Value::from(value)),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
