//! Implementation of the `cadence appointment` commands.

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use uuid::Uuid;

use crate::adapters::sqlite::{create_pool, SqliteAppointmentRepository};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{AppointmentFilters, AppointmentStatus, AppointmentType};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{AppointmentListing, compute_insights, summarize};

#[derive(Subcommand, Debug)]
pub enum AppointmentCommands {
    /// List appointments for an organization
    List {
        /// Organization ID
        #[arg(long)]
        org: Uuid,

        /// Filter by status (pending, confirmed, completed, cancelled)
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by type (showing, meeting, call, other)
        #[arg(short = 't', long)]
        appointment_type: Option<String>,
    },
}

struct ListOutput {
    listing: AppointmentListing,
}

impl CommandOutput for ListOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut out = formatter.format_appointments(&self.listing.appointments);

        let summary = &self.listing.summary;
        out.push_str(&format!(
            "\n{} total: {} pending, {} confirmed, {} completed, {} cancelled",
            summary.total, summary.pending, summary.confirmed, summary.completed, summary.cancelled
        ));

        let insights = &self.listing.insights;
        if insights.high_activity {
            out.push_str(&format!(
                "\nHigh activity: {} appointments this week",
                insights.appointments_this_week
            ));
        }
        if insights.high_cancellation_rate {
            out.push_str(&format!(
                "\nHigh cancellation rate: {:.0}%",
                insights.cancellation_rate * 100.0
            ));
        }
        out
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.listing).unwrap_or_default()
    }
}

pub async fn execute(command: AppointmentCommands, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = create_pool(&config.database.url, None)
        .await
        .context("Failed to open database pool")?;
    let repo = SqliteAppointmentRepository::new(pool);

    match command {
        AppointmentCommands::List {
            org,
            status,
            appointment_type,
        } => {
            let status = status
                .map(|s| {
                    AppointmentStatus::from_str(&s).ok_or_else(|| anyhow!("unknown status: {}", s))
                })
                .transpose()?;
            let appointment_type = appointment_type
                .map(|t| {
                    AppointmentType::from_str(&t).ok_or_else(|| anyhow!("unknown type: {}", t))
                })
                .transpose()?;

            let filters = AppointmentFilters {
                status,
                appointment_type,
                ..Default::default()
            };

            use crate::domain::ports::AppointmentRepository;
            let appointments = repo.list(org, &filters).await?;
            let insights = compute_insights(&appointments, chrono::Utc::now());
            let summary = summarize(&appointments);
            output(
                &ListOutput {
                    listing: AppointmentListing {
                        appointments,
                        insights,
                        summary,
                    },
                },
                json_mode,
            );
        }
    }

    Ok(())
}
