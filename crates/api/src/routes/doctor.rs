use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/doctors", post(handlers::doctor::register_doctor))
        .route("/api/doctors/login", post(handlers::doctor::login_doctor))
        .route(
            "/api/doctors/me/appointments",
            get(handlers::doctor::doctor_appointments),
        )
}
