//! Cadence - Appointment Scheduling & Follow-Up Automation
//!
//! Cadence is a scheduling and sequenced-automation engine for real-estate
//! CRM workloads: conflict-free appointment booking with suggested
//! alternatives, tiered reminders, and multi-step follow-up sequences with
//! conditional, personalized messaging.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic and domain models
//! - **Application Layer** (`application`): The follow-up poller driving due work
//! - **Service Layer** (`services`): Booking, conflict resolution, and the sequence engine
//! - **Adapters Layer** (`adapters`): SQLite implementations of the domain ports
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use cadence::services::AppointmentService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire repositories and book appointments
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::FollowUpPoller;
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Appointment, AppointmentFilters, AppointmentPatch, AppointmentStatus, AppointmentType,
    Conditions, Config, CreateAppointmentRequest, DatabaseConfig, ExecutionStatus,
    FollowUpExecution, FollowUpTarget, LoggingConfig, PollerConfig, ReminderKind, Sequence,
    SequenceStep, StepAction,
};
pub use domain::ports::{
    ActionDispatcher, AppointmentRepository, Clock, CrmLookup, ExecutionRepository,
    ReminderRepository, SequenceRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::init_logging;
pub use services::{AppointmentService, ConflictResolver, SequenceEngine};
