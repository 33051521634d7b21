use eyre::Report;
use thiserror::Error;

/// A write rejected by a UNIQUE constraint.
#[derive(Debug, Error)]
#[error("duplicate key value violates unique constraint \"{constraint}\"")]
pub struct UniqueViolation {
    pub constraint: String,
}

impl UniqueViolation {
    pub fn new(constraint: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
        }
    }
}

/// Whether a store error came from a UNIQUE constraint, so callers can
/// report a conflict instead of a failure.
pub fn is_unique_violation(err: &Report) -> bool {
    err.downcast_ref::<UniqueViolation>().is_some()
}

/// Converts a sqlx error, lifting unique violations into [`UniqueViolation`].
pub(crate) fn classify(err: sqlx::Error) -> Report {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return UniqueViolation::new(constraint).into();
        }
    }
    err.into()
}
