//! Table output formatting for CLI commands
//!
//! Formatted table output for appointments and sequences using comfy-table.
//! Supports color-coded cells, automatic column sizing, and accessibility
//! fallbacks when colors are disabled.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{Appointment, AppointmentStatus, Sequence};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<usize>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<usize>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format a list of appointments as a table
    pub fn format_appointments(&self, appointments: &[Appointment]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Scheduled").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Property").add_attribute(Attribute::Bold),
        ]);

        for appointment in appointments {
            let id_short = &appointment.id.to_string()[..8];
            let scheduled = appointment.scheduled_at.format("%Y-%m-%d %H:%M").to_string();
            let duration = format!("{}m", appointment.duration_minutes);
            let property = appointment
                .property_address
                .as_deref()
                .map(|p| truncate_text(p, 30))
                .unwrap_or_else(|| "-".to_string());

            let status_cell = if self.use_colors {
                Cell::new(appointment.status.as_str()).fg(status_color(&appointment.status))
            } else {
                Cell::new(appointment.status.as_str())
            };

            table.add_row(vec![
                Cell::new(id_short),
                Cell::new(appointment.appointment_type.as_str()),
                Cell::new(scheduled),
                Cell::new(duration),
                status_cell,
                Cell::new(property),
            ]);
        }

        table.to_string()
    }

    /// Format a list of sequences as a table
    pub fn format_sequences(&self, sequences: &[Sequence]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Trigger").add_attribute(Attribute::Bold),
            Cell::new("Steps").add_attribute(Attribute::Bold),
            Cell::new("Active").add_attribute(Attribute::Bold),
        ]);

        for sequence in sequences {
            let id_short = &sequence.id.to_string()[..8];
            let name = truncate_text(&sequence.name, 40);

            let active_cell = if sequence.active {
                if self.use_colors {
                    Cell::new("yes").fg(Color::Green)
                } else {
                    Cell::new("yes")
                }
            } else {
                Cell::new("no")
            };

            table.add_row(vec![
                Cell::new(id_short),
                Cell::new(name),
                Cell::new(&sequence.trigger_event),
                Cell::new(sequence.steps.len()),
                active_cell,
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width as u16);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn status_color(status: &AppointmentStatus) -> Color {
    match status {
        AppointmentStatus::Pending => Color::Yellow,
        AppointmentStatus::Confirmed => Color::Green,
        AppointmentStatus::Completed => Color::Blue,
        AppointmentStatus::Cancelled => Color::Red,
    }
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    env::var("TERM").map(|t| t != "dumb").unwrap_or(false)
}

fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::domain::models::{AppointmentType, SequenceStep, StepAction};

    fn sample_appointment() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            appointment_type: AppointmentType::Showing,
            scheduled_at: Utc::now(),
            duration_minutes: 60,
            location: None,
            property_address: Some("123 Main Street".to_string()),
            attendees: vec![],
            requirements: None,
            status: AppointmentStatus::Confirmed,
            notes: None,
            contact_id: None,
            lead_id: None,
            thread_id: None,
            confirmation_token: "tok".to_string(),
            reschedule_token: "tok".to_string(),
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn formats_appointment_table() {
        let formatter = TableFormatter::with_config(false, None);
        let rendered = formatter.format_appointments(&[sample_appointment()]);
        assert!(rendered.contains("123 Main Street"));
        assert!(rendered.contains("showing"));
        assert!(rendered.contains("confirmed"));
    }

    #[test]
    fn formats_sequence_table() {
        let sequence = Sequence::new(
            Uuid::new_v4(),
            "New Lead Nurturing",
            "lead_created",
            vec![SequenceStep {
                step_number: 1,
                delay: "15 minutes".to_string(),
                action: StepAction::SendEmail,
                content: "hello".to_string(),
                subject: None,
                conditions: None,
                personalize: true,
            }],
            Utc::now(),
        );
        let formatter = TableFormatter::with_config(false, None);
        let rendered = formatter.format_sequences(&[sequence]);
        assert!(rendered.contains("New Lead Nurturing"));
        assert!(rendered.contains("lead_created"));
        assert!(rendered.contains("yes"));
    }

    #[test]
    fn truncates_long_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a very long piece of text", 10), "a very ...");
    }
}
