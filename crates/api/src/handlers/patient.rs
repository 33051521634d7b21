use axum::{extract::State, http::StatusCode, Json};
use medsync_core::{
    errors::ClinicError,
    models::{
        auth::{LoginRequest, LoginResponse, UserRole},
        directory::{
            PatientDashboardResponse, PatientProfile, RegisterPatientRequest, RegisterResponse,
            UpdateMedicalHistoryRequest,
        },
    },
};
use medsync_db::models::{DbAppointment, NewPatient, NewProfile};
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

#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let name = required(&payload.name, "Name")?;
    let phone = required(&payload.phone, "Phone")?;
    let email = required(&payload.email, "Email")?;
    let password = required(&payload.password, "Password")?;

    if state
        .store
        .find_patient_by_contact(&phone, &email)
        .await?
        .is_some()
    {
        return Err(ClinicError::Conflict(
            "A patient with this phone number or email already exists".into(),
        )
        .into());
    }

    let patient = state
        .store
        .create_patient(&NewPatient {
            profile: NewProfile {
                profile_name: format!("{}'s Profile", name),
                date_of_birth: None,
                aadhar_no: None,
                age: payload.age,
                gender: payload.gender.filter(|g| !g.trim().is_empty()),
            },
            name,
            phone,
            email,
            password_hash: auth::hash_password(&password)?,
        })
        .await?;

    info!("Registered patient {}", patient.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: patient.id,
            name: patient.name,
            created_at: patient.created_at,
        }),
    ))
}

/// Patients sign in with their email or phone. Accounts created while
/// booking use the date of birth as the secret.
#[axum::debug_handler]
pub async fn login_patient(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let patient = state
        .store
        .find_patient_by_identifier(payload.identifier.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let response = complete_login(
        &state,
        payload.secret.trim(),
        &patient.password_hash,
        patient.id,
        UserRole::Patient,
        patient.name,
    )?;

    Ok(Json(response))
}

/// The patient's dashboard: their profile and booked appointments from
/// today on.
#[axum::debug_handler]
pub async fn patient_dashboard(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
) -> Result<Json<PatientDashboardResponse>, AppError> {
    let patient_id = user.require(UserRole::Patient)?;

    let profile = state
        .store
        .find_patient_profile(patient_id)
        .await?
        .map(PatientProfile::from);

    let appointments = state
        .store
        .upcoming_appointments_for_patient(patient_id, state.today())
        .await?
        .into_iter()
        .map(DbAppointment::into_appointment)
        .collect::<eyre::Result<Vec<_>>>()?;

    Ok(Json(PatientDashboardResponse {
        profile,
        appointments,
    }))
}

#[axum::debug_handler]
pub async fn update_medical_history(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(payload): Json<UpdateMedicalHistoryRequest>,
) -> Result<Json<PatientProfile>, AppError> {
    let patient_id = user.require(UserRole::Patient)?;
    let history = payload
        .medical_history
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());

    let profile = state
        .store
        .update_patient_medical_history(patient_id, history)
        .await?
        .ok_or_else(|| ClinicError::NotFound("Could not find your profile.".into()))?;

    info!("Updated medical history for patient {}", patient_id);

    Ok(Json(profile.into()))
}
