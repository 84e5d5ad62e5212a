//! Cadence CLI entry point.

use clap::Parser;

use cadence::cli::{Cli, Commands};
use cadence::domain::models::LoggingConfig;
use cadence::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The worker initializes logging from its loaded configuration; every
    // other command gets the default stderr subscriber (RUST_LOG still
    // applies).
    if !matches!(cli.command, Commands::Worker(_)) {
        let _ = init_logging(&LoggingConfig::default());
    }

    let result = match cli.command {
        Commands::Init(args) => cadence::cli::commands::init::execute(args, cli.json).await,
        Commands::Worker(args) => cadence::cli::commands::worker::execute(args, cli.json).await,
        Commands::Appointment(command) => {
            cadence::cli::commands::appointment::execute(command, cli.json).await
        }
        Commands::Sequence(command) => {
            cadence::cli::commands::sequence::execute(command, cli.json).await
        }
    };

    if let Err(err) = result {
        cadence::cli::handle_error(err, cli.json);
    }
}
