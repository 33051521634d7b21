use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use medsync_core::{
    errors::ClinicError,
    models::{
        auth::{LoginRequest, LoginResponse, UserRole},
        directory::{
            DoctorListResponse, HospitalListResponse, RegisterHospitalRequest, RegisterResponse,
        },
    },
};
use medsync_db::models::NewHospital;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    handlers::{complete_login, invalid_credentials, required},
    middleware::{auth, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn register_hospital(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterHospitalRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let name = required(&payload.name, "Hospital name")?;
    let email = required(&payload.email, "Email")?;
    let password = required(&payload.password, "Password")?;

    if state.store.find_hospital_by_email(&email).await?.is_some() {
        return Err(ClinicError::Conflict("A hospital with this email already exists".into()).into());
    }

    let hospital = state
        .store
        .create_hospital(&NewHospital {
            name,
            address: payload.address.filter(|a| !a.trim().is_empty()),
            email,
            password_hash: auth::hash_password(&password)?,
        })
        .await?;

    info!("Registered hospital {} ({})", hospital.name, hospital.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: hospital.id,
            name: hospital.name,
            created_at: hospital.created_at,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login_hospital(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let hospital = state
        .store
        .find_hospital_by_email(payload.identifier.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let response = complete_login(
        &state,
        &payload.secret,
        &hospital.password_hash,
        hospital.id,
        UserRole::Hospital,
        hospital.name,
    )?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn list_hospitals(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<HospitalListResponse>, AppError> {
    let hospitals = state.store.list_hospitals().await?;

    Ok(Json(HospitalListResponse {
        hospitals: hospitals.into_iter().map(Into::into).collect(),
    }))
}

/// Doctors at a hospital, as offered on the booking form.
#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<ApiState>>,
    Path(hospital_id): Path<Uuid>,
) -> Result<Json<DoctorListResponse>, AppError> {
    let doctors = state.store.list_doctors_for_hospital(hospital_id).await?;

    Ok(Json(DoctorListResponse {
        doctors: doctors.into_iter().map(Into::into).collect(),
    }))
}
