use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use medsync_core::models::{
    appointment::{BookAppointmentRequest, BookingResponse, CancelAppointmentResponse},
    auth::UserRole,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    lifecycle::BOOKING_FAILURE,
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

/// Public booking form. Creates the patient on first contact.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let response = state
        .lifecycle
        .book(payload)
        .await
        .map_err(|e| AppError::new(e).with_fallback(BOOKING_FAILURE))?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<CancelAppointmentResponse>, AppError> {
    let patient_id = user.require(UserRole::Patient)?;
    let response = state.lifecycle.cancel(appointment_id, patient_id).await?;

    Ok(Json(response))
}
