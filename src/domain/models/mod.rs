pub mod appointment;
pub mod conditions;
pub mod config;
pub mod crm;
pub mod execution;
pub mod reminder;
pub mod sequence;

pub use appointment::{
    Appointment, AppointmentFilters, AppointmentPatch, AppointmentStatus, AppointmentType,
    CreateAppointmentRequest,
};
pub use conditions::{Conditions, TimeOfDayWindow};
pub use config::{Config, DatabaseConfig, LoggingConfig, PollerConfig};
pub use crm::{Contact, Lead};
pub use execution::{ExecutionStatus, FollowUpExecution, FollowUpTarget};
pub use reminder::{ReminderKind, ReminderWorkItem};
pub use sequence::{parse_delay_minutes, Sequence, SequenceStep, StepAction};
