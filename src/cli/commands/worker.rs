//! Implementation of the `cadence worker` command.
//!
//! Wires the SQLite adapters into the sequence engine and runs the poller
//! until interrupted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::adapters::sqlite::{
    create_pool, initialize_database, PoolConfig, SqliteCrmLookup, SqliteExecutionRepository,
    SqliteReminderRepository, SqliteSequenceRepository,
};
use crate::application::FollowUpPoller;
use crate::domain::ports::{NullDispatcher, SystemClock};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::init_logging;
use crate::services::{SequenceEngine, TemplateCatalog};

#[derive(Args, Debug)]
pub struct WorkerArgs {
    /// Load configuration from a specific file instead of .cadence/
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: WorkerArgs, _json_mode: bool) -> Result<()> {
    let config = match args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    init_logging(&config.logging).context("Failed to initialize logging")?;

    // Apply pending migrations before serving, then open the working pool
    // with the configured connection limit.
    initialize_database(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    let pool = create_pool(
        &config.database.url,
        Some(PoolConfig {
            max_connections: config.database.max_connections,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(3),
        }),
    )
    .await
    .context("Failed to open database pool")?;

    let sequences = Arc::new(SqliteSequenceRepository::new(pool.clone()));
    let executions = Arc::new(SqliteExecutionRepository::new(pool.clone()));
    let reminders = Arc::new(SqliteReminderRepository::new(pool.clone()));
    let crm = Arc::new(SqliteCrmLookup::new(pool.clone()));
    let dispatcher = Arc::new(NullDispatcher);
    let clock = Arc::new(SystemClock);

    let engine = Arc::new(SequenceEngine::new(
        sequences,
        Arc::clone(&executions),
        crm,
        Arc::clone(&dispatcher),
        TemplateCatalog::builtin(),
        Arc::clone(&clock),
    ));

    let poller = FollowUpPoller::new(
        engine,
        executions,
        reminders,
        dispatcher,
        clock,
        config.poller.clone(),
    );

    info!("worker starting; press Ctrl-C to stop");
    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            poller.stop();
            info!("shutdown requested");
        }
    }

    Ok(())
}
