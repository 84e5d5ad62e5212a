//! Side-effect-free insights over a set of appointments.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use crate::domain::models::{Appointment, AppointmentStatus, AppointmentType};

/// Week-volume threshold above which activity is flagged.
const HIGH_ACTIVITY_THRESHOLD: usize = 10;

/// Cancellation-rate threshold above which churn is flagged.
const HIGH_CANCELLATION_RATE: f64 = 0.2;

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentInsights {
    /// More than 10 appointments fall in the current Sunday-Saturday week.
    pub high_activity: bool,
    pub appointments_this_week: usize,
    /// Cancelled / total exceeds 0.2.
    pub high_cancellation_rate: bool,
    pub cancellation_rate: f64,
    /// Distinct property addresses among showing-type appointments.
    pub showing_properties: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentSummary {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
}

/// Start of the Sunday-based calendar week containing `now`.
fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_sunday = i64::from(now.weekday().num_days_from_sunday());
    (now - Duration::days(days_from_sunday))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc()
}

pub fn compute_insights(appointments: &[Appointment], now: DateTime<Utc>) -> AppointmentInsights {
    let start = week_start(now);
    let end = start + Duration::days(7);

    let appointments_this_week = appointments
        .iter()
        .filter(|a| a.scheduled_at >= start && a.scheduled_at < end)
        .count();

    let cancelled = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Cancelled)
        .count();
    let cancellation_rate = if appointments.is_empty() {
        0.0
    } else {
        cancelled as f64 / appointments.len() as f64
    };

    let mut showing_properties: Vec<String> = Vec::new();
    for appt in appointments {
        if appt.appointment_type != AppointmentType::Showing {
            continue;
        }
        if let Some(address) = &appt.property_address {
            if !showing_properties.contains(address) {
                showing_properties.push(address.clone());
            }
        }
    }

    AppointmentInsights {
        high_activity: appointments_this_week > HIGH_ACTIVITY_THRESHOLD,
        appointments_this_week,
        high_cancellation_rate: cancellation_rate > HIGH_CANCELLATION_RATE,
        cancellation_rate,
        showing_properties,
    }
}

pub fn summarize(appointments: &[Appointment]) -> AppointmentSummary {
    let mut summary = AppointmentSummary {
        total: appointments.len(),
        ..Default::default()
    };
    for appt in appointments {
        match appt.status {
            AppointmentStatus::Pending => summary.pending += 1,
            AppointmentStatus::Confirmed => summary.confirmed += 1,
            AppointmentStatus::Completed => summary.completed += 1,
            AppointmentStatus::Cancelled => summary.cancelled += 1,
        }
    }
    summary
}
