//! # Error Handling Middleware
//!
//! Maps [`ClinicError`] to HTTP status codes and a JSON body of the form
//! `{"success": false, "code": "...", "error": "..."}`.
//!
//! Persistence and internal failures are logged in full and reach the client
//! only as a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medsync_core::errors::ClinicError;
use serde_json::json;
use tracing::error;

const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again later.";

/// Wraps a domain error so handlers can return it directly.
///
/// ```ignore
/// async fn handler() -> Result<Json<Hospital>, AppError> {
///     Err(ClinicError::NotFound("Hospital not found".into()).into())
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    pub error: ClinicError,
    fallback: &'static str,
}

impl AppError {
    pub fn new(error: ClinicError) -> Self {
        Self {
            error,
            fallback: GENERIC_FAILURE,
        }
    }

    /// Replaces the generic message shown for persistence and internal
    /// failures.
    pub fn with_fallback(mut self, message: &'static str) -> Self {
        self.fallback = message;
        self
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicError::Validation(_) => StatusCode::BAD_REQUEST,
            ClinicError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ClinicError::Authorization(_) => StatusCode::FORBIDDEN,
            ClinicError::Conflict(_) => StatusCode::CONFLICT,
            ClinicError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ClinicError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the client sees.
    fn public_message(&self) -> String {
        match &self.error {
            ClinicError::NotFound(msg)
            | ClinicError::Validation(msg)
            | ClinicError::Authentication(msg)
            | ClinicError::Authorization(msg)
            | ClinicError::Conflict(msg) => msg.clone(),
            ClinicError::Database(report) => {
                error!("Persistence failure: {:?}", report);
                self.fallback.to_string()
            }
            ClinicError::Internal(err) => {
                error!("Internal failure: {}", err);
                self.fallback.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "success": false,
            "code": self.error.code(),
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}

impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        AppError::new(err)
    }
}

/// Lets handlers use `?` on store calls, which return `eyre::Result`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError::new(ClinicError::Database(err))
    }
}

pub fn map_error(err: ClinicError) -> Response {
    AppError::new(err).into_response()
}
