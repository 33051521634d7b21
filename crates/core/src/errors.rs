use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ClinicError {
    /// Stable machine-readable name for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ClinicError::NotFound(_) => "not_found",
            ClinicError::Validation(_) => "validation",
            ClinicError::Authentication(_) => "authentication",
            ClinicError::Authorization(_) => "authorization",
            ClinicError::Conflict(_) => "conflict",
            ClinicError::Database(_) => "persistence",
            ClinicError::Internal(_) => "internal",
        }
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;
