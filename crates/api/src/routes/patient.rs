use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/patients", post(handlers::patient::register_patient))
        .route("/api/patients/login", post(handlers::patient::login_patient))
        .route(
            "/api/patients/me/appointments",
            get(handlers::patient::patient_dashboard),
        )
        .route(
            "/api/patients/me/medical-history",
            post(handlers::patient::update_medical_history),
        )
}
