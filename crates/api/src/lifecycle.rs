//! # Appointment Lifecycle
//!
//! Booking and cancellation. The primary write commits first; the
//! confirmation email and the 24-hour reminder are dispatched afterwards and
//! cannot undo it.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use medsync_core::{
    errors::{ClinicError, ClinicResult},
    models::appointment::{
        parse_time_of_day, Appointment, AppointmentStatus, BookAppointmentRequest,
        BookingResponse, CancelAppointmentResponse,
    },
};
use medsync_db::{
    models::{NewAppointment, NewBooking, NewPatient, NewProfile, PatientSelection},
    DirectoryStore,
};
use medsync_notify::{
    templates::{confirmation_email, reminder_email},
    NotificationGateway, ReminderScheduler, ScheduleOutcome,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::middleware::auth::hash_password;

pub const BOOKING_SUCCESS: &str =
    "Appointment booked successfully! A confirmation email has been sent.";
pub const BOOKING_FAILURE: &str =
    "An error occurred while booking. Please check your details and try again.";
pub const DOB_REQUIRED: &str = "Date of Birth is required for new patients.";
pub const CANCEL_NOT_FOUND: &str =
    "Appointment not found or you do not have permission to cancel it.";

/// Booking input after validation.
struct ValidBooking {
    name: String,
    phone: String,
    email: String,
    /// Raw date of birth. Parsed only when a new patient is created.
    dob: Option<String>,
    aadhar: Option<String>,
    reason: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate(request: &BookAppointmentRequest) -> ClinicResult<ValidBooking> {
    let required = |value: &str, field: &str| {
        let value = value.trim();
        if value.is_empty() {
            Err(ClinicError::Validation(format!("{} is required.", field)))
        } else {
            Ok(value.to_string())
        }
    };

    required(&request.first_name, "First name")?;
    let phone = required(&request.phone, "Phone")?;
    let email = required(&request.email, "Email")?;

    if parse_time_of_day(&request.time).is_none() {
        return Err(ClinicError::Validation(format!(
            "Invalid appointment time '{}'. Use HH:MM AM/PM.",
            request.time.trim()
        )));
    }

    Ok(ValidBooking {
        name: request.full_name(),
        phone,
        email,
        dob: non_empty(request.dob.as_deref()),
        aadhar: non_empty(request.aadhar.as_deref()),
        reason: non_empty(request.reason.as_deref()),
    })
}

fn parse_dob(raw: &str) -> ClinicResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ClinicError::Validation("Date of Birth must be in YYYY-MM-DD format.".to_string())
    })
}

fn persistence_failure(context: &str, err: eyre::Report) -> ClinicError {
    error!("{}: {:?}", context, err);
    ClinicError::Database(err)
}

/// Orchestrates booking and cancellation over the Directory Store and the
/// notification side channel.
#[derive(Clone)]
pub struct AppointmentLifecycle {
    store: Arc<dyn DirectoryStore>,
    gateway: Arc<dyn NotificationGateway>,
    scheduler: ReminderScheduler,
    timezone: Tz,
}

impl AppointmentLifecycle {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        gateway: Arc<dyn NotificationGateway>,
        timezone: Tz,
    ) -> Self {
        let scheduler = ReminderScheduler::new(Arc::clone(&gateway));
        Self {
            store,
            gateway,
            scheduler,
            timezone,
        }
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Books an appointment, creating the patient on first contact.
    ///
    /// A patient is matched by phone or email; when none matches, the
    /// date of birth becomes the new account's login secret. A returning
    /// patient's date of birth is ignored. Validation happens before any
    /// write, and the patient and appointment rows are committed together.
    pub async fn book(&self, request: BookAppointmentRequest) -> ClinicResult<BookingResponse> {
        let booking = validate(&request)?;

        let existing = self
            .store
            .find_patient_by_contact(&booking.phone, &booking.email)
            .await
            .map_err(|e| persistence_failure("Patient lookup failed", e))?;

        let (patient, new_user) = match existing {
            Some(patient) => {
                debug!("Booking for existing patient {}", patient.id);
                (PatientSelection::Existing(patient.id), false)
            }
            None => {
                let secret = booking
                    .dob
                    .clone()
                    .ok_or_else(|| ClinicError::Validation(DOB_REQUIRED.to_string()))?;
                let date_of_birth = parse_dob(&secret)?;
                let password_hash =
                    hash_password(&secret).map_err(|e| ClinicError::Internal(e.into()))?;

                let new_patient = NewPatient {
                    name: booking.name.clone(),
                    phone: booking.phone.clone(),
                    email: booking.email.clone(),
                    password_hash,
                    profile: NewProfile {
                        profile_name: format!("{}'s Profile", booking.name),
                        date_of_birth: Some(date_of_birth),
                        aadhar_no: booking.aadhar.clone(),
                        age: None,
                        gender: None,
                    },
                };
                (PatientSelection::New(new_patient), true)
            }
        };

        let row = self
            .store
            .book_appointment(&NewBooking {
                patient,
                appointment: NewAppointment {
                    doctor_id: request.doctor_id,
                    patient_name: booking.name,
                    patient_email: booking.email,
                    patient_phone: booking.phone,
                    appointment_date: request.date,
                    appointment_time: request.time.trim().to_string(),
                    reason_for_visit: booking.reason,
                },
            })
            .await
            .map_err(|e| persistence_failure("Booking failed", e))?;

        let appointment = row
            .into_appointment()
            .map_err(|e| persistence_failure("Booked row is unreadable", e))?;

        info!(
            "Booked appointment {} for patient {} with doctor {} on {} at {}",
            appointment.id,
            appointment.patient_id,
            appointment.doctor_id,
            appointment.appointment_date,
            appointment.appointment_time
        );

        self.dispatch_side_effects(&appointment);

        Ok(BookingResponse {
            success: true,
            message: BOOKING_SUCCESS.to_string(),
            new_user,
            appointment_id: appointment.id,
        })
    }

    /// Cancels a patient's own appointment. Appointments belonging to
    /// someone else are reported as not found.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
    ) -> ClinicResult<CancelAppointmentResponse> {
        let appointment = self
            .store
            .find_patient_appointment(appointment_id, patient_id)
            .await
            .map_err(|e| persistence_failure("Appointment lookup failed", e))?
            .ok_or_else(|| ClinicError::NotFound(CANCEL_NOT_FOUND.to_string()))?
            .into_appointment()?;

        if !appointment.status.can_transition_to(AppointmentStatus::Cancelled) {
            debug!("Appointment {} is already {}", appointment.id, appointment.status);
            return Ok(CancelAppointmentResponse {
                success: true,
                message: "Appointment is already cancelled.".to_string(),
                status: appointment.status,
            });
        }

        self.store
            .set_appointment_status(appointment.id, AppointmentStatus::Cancelled)
            .await
            .map_err(|e| persistence_failure("Cancelling appointment failed", e))?;

        info!("Cancelled appointment {} for patient {}", appointment.id, patient_id);

        if !self.scheduler.cancel(appointment.id) {
            debug!("Appointment {} had no pending reminder", appointment.id);
        }

        Ok(CancelAppointmentResponse {
            success: true,
            message: "Appointment cancelled successfully.".to_string(),
            status: AppointmentStatus::Cancelled,
        })
    }

    /// Runs after the booking has committed. Nothing here can fail the
    /// booking.
    fn dispatch_side_effects(&self, appointment: &Appointment) {
        self.send_confirmation(appointment);
        self.schedule_reminder(appointment);
    }

    fn send_confirmation(&self, appointment: &Appointment) {
        let store = Arc::clone(&self.store);
        let gateway = Arc::clone(&self.gateway);
        let appointment = appointment.clone();

        tokio::spawn(async move {
            let hospital = match store.find_hospital_for_doctor(appointment.doctor_id).await {
                Ok(hospital) => hospital.map(|h| h.name),
                Err(e) => {
                    warn!(
                        "Hospital lookup for confirmation of {} failed: {}",
                        appointment.id, e
                    );
                    None
                }
            };

            let message = confirmation_email(&appointment, hospital.as_deref());
            match gateway.send(&message).await {
                Ok(()) => debug!("Confirmation for {} sent to {}", appointment.id, message.to),
                Err(e) => warn!(
                    "Confirmation email for appointment {} failed: {}",
                    appointment.id, e
                ),
            }
        });
    }

    fn schedule_reminder(&self, appointment: &Appointment) {
        let Some(fire_at) = appointment.reminder_at(self.timezone) else {
            warn!(
                "Appointment {} has no valid start time in {}; reminder not scheduled",
                appointment.id, self.timezone
            );
            return;
        };

        match self
            .scheduler
            .schedule(appointment.id, fire_at, reminder_email(appointment))
        {
            Ok(ScheduleOutcome::SkippedPastDue) => info!(
                "Appointment {} is less than 24 hours away; no reminder scheduled",
                appointment.id
            ),
            Ok(_) => info!(
                "Scheduled 24-hour reminder for appointment {} at {}",
                appointment.id, fire_at
            ),
            Err(e) => warn!(
                "Failed to schedule reminder for appointment {}: {}",
                appointment.id, e
            ),
        }
    }
}
