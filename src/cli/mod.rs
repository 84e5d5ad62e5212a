//! Command-line interface.
//!
//! Clap command structures plus the command implementations and output
//! formatting. Every command takes the global `--json` flag for
//! machine-readable output.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

pub use output::TableFormatter;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence - appointment scheduling and follow-up automation", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize Cadence configuration and database
    Init(commands::init::InitArgs),

    /// Run the follow-up worker (due executions and reminders)
    Worker(commands::worker::WorkerArgs),

    /// Appointment commands
    #[command(subcommand)]
    Appointment(commands::appointment::AppointmentCommands),

    /// Follow-up sequence commands
    #[command(subcommand)]
    Sequence(commands::sequence::SequenceCommands),
}

/// Report a command failure in the requested format and exit nonzero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        let payload = serde_json::json!({
            "success": false,
            "error": format!("{:#}", err),
        });
        eprintln!("{}", payload);
    } else {
        eprintln!("Error: {:#}", err);
    }
    std::process::exit(1);
}
