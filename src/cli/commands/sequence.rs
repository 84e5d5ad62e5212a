//! Implementation of the `cadence sequence` commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use uuid::Uuid;

use crate::adapters::sqlite::{create_pool, SqliteSequenceRepository};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::Sequence;
use crate::domain::ports::{SequenceFilter, SequenceRepository};
use crate::infrastructure::config::ConfigLoader;

#[derive(Subcommand, Debug)]
pub enum SequenceCommands {
    /// List follow-up sequences for an organization
    List {
        /// Organization ID
        #[arg(long)]
        org: Uuid,

        /// Only show active sequences
        #[arg(short, long)]
        active: bool,

        /// Filter by trigger event (e.g. lead_created)
        #[arg(short = 'e', long)]
        trigger_event: Option<String>,
    },
}

struct ListOutput {
    sequences: Vec<Sequence>,
}

impl CommandOutput for ListOutput {
    fn to_human(&self) -> String {
        if self.sequences.is_empty() {
            return "No sequences found.".to_string();
        }
        TableFormatter::new().format_sequences(&self.sequences)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.sequences).unwrap_or_default()
    }
}

pub async fn execute(command: SequenceCommands, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = create_pool(&config.database.url, None)
        .await
        .context("Failed to open database pool")?;
    let repo = SqliteSequenceRepository::new(pool);

    match command {
        SequenceCommands::List {
            org,
            active,
            trigger_event,
        } => {
            let filter = SequenceFilter {
                active: active.then_some(true),
                trigger_event,
            };
            let sequences = repo.list(org, &filter).await?;
            output(&ListOutput { sequences }, json_mode);
        }
    }

    Ok(())
}
