pub mod appointment;
pub mod doctor;
pub mod hospital;
pub mod medical_record;
pub mod patient;

use medsync_core::{
    errors::{ClinicError, ClinicResult},
    models::auth::{LoginResponse, UserRole},
};
use uuid::Uuid;

use crate::{middleware::auth, ApiState};

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn required(value: &str, field: &str) -> ClinicResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClinicError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Checks a login secret and issues a token for the account.
pub(crate) fn complete_login(
    state: &ApiState,
    secret: &str,
    stored_hash: &str,
    user_id: Uuid,
    role: UserRole,
    name: String,
) -> ClinicResult<LoginResponse> {
    if !auth::verify_password(secret, stored_hash)? {
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(user_id, role)?;
    tracing::info!("{} {} logged in", role, user_id);

    Ok(LoginResponse {
        token,
        user_id,
        role,
        name,
    })
}

pub(crate) fn invalid_credentials() -> ClinicError {
    ClinicError::Authentication("Invalid credentials".to_string())
}
