use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use medsync_core::{
    errors::ClinicError,
    models::{
        auth::UserRole,
        medical_record::{CreateMedicalRecordRequest, MedicalRecord, PatientRecordsResponse},
    },
};
use medsync_db::{is_unique_violation, models::NewMedicalRecord};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    handlers::required,
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

const EXISTING_RECORD: &str = "A medical record already exists for this appointment";

/// Records the outcome of one of the doctor's appointments. Each
/// appointment gets at most one record.
#[axum::debug_handler]
pub async fn create_medical_record(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(payload): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<MedicalRecord>), AppError> {
    let doctor_id = user.require(UserRole::Doctor)?;
    let notes = required(&payload.notes, "Notes")?;

    let appointment = state
        .store
        .find_doctor_appointment(payload.appointment_id, doctor_id)
        .await?
        .ok_or_else(|| ClinicError::NotFound("Appointment not found".into()))?;

    if state
        .store
        .find_medical_record_for_appointment(appointment.id)
        .await?
        .is_some()
    {
        return Err(ClinicError::Conflict(EXISTING_RECORD.into()).into());
    }

    let record = state
        .store
        .create_medical_record(&NewMedicalRecord {
            notes,
            prescription: payload.prescription.filter(|p| !p.trim().is_empty()),
            doctor_id,
            patient_id: appointment.patient_id,
            appointment_id: appointment.id,
        })
        .await
        .map_err(|e| {
            // A concurrent create can win the race past the check above.
            if is_unique_violation(&e) {
                ClinicError::Conflict(EXISTING_RECORD.into())
            } else {
                ClinicError::Database(e)
            }
        })?;

    info!(
        "Doctor {} added medical record {} for appointment {}",
        doctor_id, record.id, appointment.id
    );

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// The patient's history, as seen by the doctor holding the appointment.
#[axum::debug_handler]
pub async fn patient_records(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<PatientRecordsResponse>, AppError> {
    let doctor_id = user.require(UserRole::Doctor)?;

    let appointment = state
        .store
        .find_doctor_appointment(appointment_id, doctor_id)
        .await?
        .ok_or_else(|| ClinicError::NotFound("Appointment not found".into()))?;

    let records = state
        .store
        .list_medical_records_for_patient(appointment.patient_id)
        .await?;

    Ok(Json(PatientRecordsResponse {
        patient_id: appointment.patient_id,
        records: records.into_iter().map(Into::into).collect(),
    }))
}
