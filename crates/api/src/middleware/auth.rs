//! # Authentication Module
//!
//! Password hashing with Argon2 and bearer-token sessions signed with
//! HS256. Handlers take an [`AuthUser`] argument and call
//! [`AuthUser::require`] with the role the route is for.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use eyre::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use medsync_core::{
    errors::{ClinicError, ClinicResult},
    models::auth::UserRole,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::ApiConfig, middleware::error_handling::AppError, ApiState};

/// Hashes a password (or a date-of-birth secret) with a fresh random salt.
///
/// The result is a PHC string that carries the algorithm, parameters and
/// salt alongside the hash.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks `password` against a stored PHC hash. A malformed stored hash is
/// an error; a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| eyre::eyre!("Stored password hash is malformed: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys for login tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Uses `JWT_SECRET` when set. Otherwise generates a secret that lives
    /// as long as the process, so tokens stop working after a restart.
    pub fn from_config(config: &ApiConfig) -> Self {
        match &config.jwt_secret {
            Some(secret) => Self::new(secret.as_bytes(), config.token_ttl_hours),
            None => {
                warn!("JWT_SECRET not set; generating a per-process signing secret");
                let mut secret = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                Self::new(&secret, config.token_ttl_hours)
            }
        }
    }

    pub fn issue(&self, user_id: Uuid, role: UserRole) -> ClinicResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ClinicError::Internal(Box::new(e)))
    }

    pub fn verify(&self, token: &str) -> ClinicResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                ClinicError::Authentication("Invalid or expired token".to_string())
            })
    }
}

/// The caller identified by the request's bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    /// Returns the caller's id if they hold `role`.
    pub fn require(&self, role: UserRole) -> ClinicResult<Uuid> {
        if self.role == role {
            Ok(self.user_id)
        } else {
            Err(ClinicError::Authorization(format!(
                "This action requires a {} account",
                role
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClinicError::Authentication("Missing bearer token".to_string()))?;

        let claims = state.tokens.verify(token)?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
