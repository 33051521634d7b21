use axum::{extract::State, http::StatusCode, Json};
use medsync_core::{
    errors::ClinicError,
    models::{
        appointment::AppointmentListResponse,
        auth::{LoginRequest, LoginResponse, UserRole},
        directory::{Doctor, RegisterDoctorRequest},
    },
};
use medsync_db::models::{DbAppointment, NewDoctor};
use std::sync::Arc;
use tracing::info;

use crate::{
    handlers::{complete_login, invalid_credentials, required},
    middleware::{
        auth::{self, AuthUser},
        error_handling::AppError,
    },
    ApiState,
};

/// Adds a doctor to the calling hospital.
#[axum::debug_handler]
pub async fn register_doctor(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(payload): Json<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    let hospital_id = user.require(UserRole::Hospital)?;

    let name = required(&payload.name, "Doctor name")?;
    let email = required(&payload.email, "Email")?;
    let phone = required(&payload.phone, "Phone")?;
    let password = required(&payload.password, "Password")?;

    if state.store.doctor_contact_taken(&email, &phone).await? {
        return Err(ClinicError::Conflict(
            "A doctor with this email or phone number already exists".into(),
        )
        .into());
    }

    let doctor = state
        .store
        .create_doctor(&NewDoctor {
            name,
            email,
            phone,
            password_hash: auth::hash_password(&password)?,
            specialization: payload.specialization.filter(|s| !s.trim().is_empty()),
            hospital_id,
        })
        .await?;

    info!("Hospital {} registered doctor {}", hospital_id, doctor.id);

    Ok((StatusCode::CREATED, Json(doctor.into())))
}

#[axum::debug_handler]
pub async fn login_doctor(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let doctor = state
        .store
        .find_doctor_by_identifier(payload.identifier.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let response = complete_login(
        &state,
        &payload.secret,
        &doctor.password_hash,
        doctor.id,
        UserRole::Doctor,
        doctor.name,
    )?;

    Ok(Json(response))
}

/// The doctor's dashboard: every appointment from today on, cancelled ones
/// included.
#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
) -> Result<Json<AppointmentListResponse>, AppError> {
    let doctor_id = user.require(UserRole::Doctor)?;

    let appointments = state
        .store
        .upcoming_appointments_for_doctor(doctor_id, state.today())
        .await?
        .into_iter()
        .map(DbAppointment::into_appointment)
        .collect::<eyre::Result<Vec<_>>>()?;

    Ok(Json(AppointmentListResponse { appointments }))
}
