use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/medical-records",
            post(handlers::medical_record::create_medical_record),
        )
        .route(
            "/api/appointments/:id/patient-records",
            get(handlers::medical_record::patient_records),
        )
}
