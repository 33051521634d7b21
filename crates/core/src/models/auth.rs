use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three kinds of account that can sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Hospital,
    Doctor,
    Patient,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Hospital => write!(f, "hospital"),
            UserRole::Doctor => write!(f, "doctor"),
            UserRole::Patient => write!(f, "patient"),
        }
    }
}

/// Sign-in payload shared by all roles. Hospitals sign in by email, doctors
/// and patients by email or phone. A patient's secret is the date of birth
/// they booked with, unless they registered with a password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub role: UserRole,
    pub name: String,
}
