//! Email rendering for the appointment lifecycle.

use medsync_core::models::appointment::Appointment;

use crate::gateway::EmailMessage;

/// Confirmation sent right after a booking commits. `hospital_name` is
/// `None` when the hospital lookup failed; the subject then omits it.
pub fn confirmation_email(appointment: &Appointment, hospital_name: Option<&str>) -> EmailMessage {
    let subject = match hospital_name {
        Some(name) => format!("Appointment Confirmed at {}", name),
        None => "Appointment Confirmed".to_string(),
    };

    let html_body = format!(
        "<p>Dear {name},</p>\
         <p>Your appointment{at} is confirmed for <strong>{date} at {time}</strong>.</p>\
         {reason}\
         <p>Reference: {id}</p>",
        name = escape(&appointment.patient_name),
        at = hospital_name
            .map(|h| format!(" at {}", escape(h)))
            .unwrap_or_default(),
        date = appointment.appointment_date.format("%A, %d %B %Y"),
        time = escape(&appointment.appointment_time),
        reason = reason_line(appointment),
        id = appointment.id,
    );

    EmailMessage {
        to: appointment.patient_email.clone(),
        subject,
        html_body,
    }
}

/// Reminder delivered by the scheduler a day ahead.
pub fn reminder_email(appointment: &Appointment) -> EmailMessage {
    let html_body = format!(
        "<p>Dear {name},</p>\
         <p>This is a reminder that you have an appointment tomorrow, \
         <strong>{date} at {time}</strong>.</p>\
         {reason}\
         <p>If you can no longer attend, please cancel from your dashboard.</p>",
        name = escape(&appointment.patient_name),
        date = appointment.appointment_date.format("%A, %d %B %Y"),
        time = escape(&appointment.appointment_time),
        reason = reason_line(appointment),
    );

    EmailMessage {
        to: appointment.patient_email.clone(),
        subject: "Appointment Reminder".to_string(),
        html_body,
    }
}

fn reason_line(appointment: &Appointment) -> String {
    match appointment.reason_for_visit.as_deref().map(str::trim) {
        Some(reason) if !reason.is_empty() => {
            format!("<p>Reason for visit: {}</p>", escape(reason))
        }
        _ => String::new(),
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
