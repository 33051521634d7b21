use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How far ahead of the appointment the reminder email goes out.
pub const REMINDER_LEAD_HOURS: i64 = 24;

/// Lifecycle of an appointment. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Booked,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "Booked",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Booked, AppointmentStatus::Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Booked" => Ok(AppointmentStatus::Booked),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub appointment_date: NaiveDate,
    /// Time of day as entered at booking, e.g. "02:00 PM".
    pub appointment_time: String,
    pub reason_for_visit: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// The instant the appointment starts when its wall-clock date and time
    /// are read in `zone`.
    pub fn starts_at(&self, zone: Tz) -> Option<DateTime<Utc>> {
        appointment_instant(self.appointment_date, &self.appointment_time, zone)
    }

    /// When the 24-hour reminder for this appointment should fire.
    pub fn reminder_at(&self, zone: Tz) -> Option<DateTime<Utc>> {
        self.starts_at(zone)
            .map(|start| start - Duration::hours(REMINDER_LEAD_HOURS))
    }
}

/// Parses a booking time string. The booking form sends `HH:MM AM/PM`;
/// 24-hour `HH:MM` is accepted as well.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Combines a calendar date and a booking time string into a UTC instant.
///
/// Returns `None` when the time string does not parse or when the local
/// time does not exist in `zone` (a DST gap).
pub fn appointment_instant(date: NaiveDate, time: &str, zone: Tz) -> Option<DateTime<Utc>> {
    let time = parse_time_of_day(time)?;
    zone.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub phone: String,
    pub email: String,
    /// `YYYY-MM-DD`; required, and only checked, when no patient matches
    /// the contact.
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub aadhar: Option<String>,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// `HH:MM AM/PM`, or 24-hour `HH:MM`. Anything else fails the booking
    /// with a validation error before any write.
    pub time: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl BookAppointmentRequest {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.trim(),
            self.last_name.as_deref().unwrap_or("").trim()
        )
        .trim_end()
        .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    /// True when the booking created a patient account; the caller should
    /// tell the user their date of birth is their login secret.
    pub new_user: bool,
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentResponse {
    pub success: bool,
    pub message: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
}
