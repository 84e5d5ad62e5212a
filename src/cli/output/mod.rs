//! CLI output formatting module
//!
//! Provides various output formatters for terminal display.

pub mod table;

pub use table::TableFormatter;

/// Dual-format command output: every command result renders both for humans
/// and as JSON (selected by the global `--json` flag).
pub trait CommandOutput {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

/// Print a command result in the requested format.
pub fn output<T: CommandOutput>(data: &T, json_mode: bool) {
    if json_mode {
        println!("{}", data.to_json());
    } else {
        println!("{}", data.to_human());
    }
}
