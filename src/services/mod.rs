//! Service layer: booking, conflict resolution, reminders, and the
//! follow-up sequence state machine.

pub mod appointment_service;
pub mod condition_evaluator;
pub mod conflict_resolver;
pub mod insights;
pub mod personalization;
pub mod reminder_scheduler;
pub mod sequence_engine;
pub mod template_catalog;

pub use appointment_service::{AppointmentListing, AppointmentService};
pub use condition_evaluator::ConditionEvaluator;
pub use conflict_resolver::{windows_overlap, ConflictResolver};
pub use insights::{compute_insights, summarize, AppointmentInsights, AppointmentSummary};
pub use personalization::PersonalizationEngine;
pub use reminder_scheduler::ReminderScheduler;
pub use sequence_engine::SequenceEngine;
pub use template_catalog::{SequenceTemplate, StepTemplate, TemplateCatalog};
