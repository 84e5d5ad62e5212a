//! Port trait definitions (hexagonal architecture).
//!
//! Async contracts the infrastructure adapters implement:
//! - Repository ports for appointments, sequences, executions, reminders
//! - `CrmLookup`: read-only contact/lead access
//! - `ActionDispatcher` / `AppointmentHooks`: outbound side effects
//! - `Clock` / `TokenGenerator`: injectable nondeterminism
//!
//! These traits keep the domain independent of specific infrastructure.

pub mod action_dispatcher;
pub mod appointment_hooks;
pub mod appointment_repository;
pub mod clock;
pub mod crm_lookup;
pub mod execution_repository;
pub mod reminder_repository;
pub mod sequence_repository;
pub mod token_generator;

pub use action_dispatcher::{
    ActionDispatcher, DispatchAction, DispatchEnvelope, DispatchError, NullDispatcher,
};
pub use appointment_hooks::{AppointmentHooks, NullHooks};
pub use appointment_repository::{AppointmentInsert, AppointmentRepository};
pub use clock::{Clock, FixedClock, SystemClock};
pub use crm_lookup::{CrmLookup, LookupError};
pub use execution_repository::{ExecutionInsert, ExecutionRepository};
pub use reminder_repository::ReminderRepository;
pub use sequence_repository::{SequenceFilter, SequenceRepository};
pub use token_generator::{RandTokenGenerator, TokenGenerator};
