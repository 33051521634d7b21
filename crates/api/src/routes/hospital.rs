use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/hospitals",
            post(handlers::hospital::register_hospital).get(handlers::hospital::list_hospitals),
        )
        .route("/api/hospitals/login", post(handlers::hospital::login_hospital))
        .route(
            "/api/hospitals/:id/doctors",
            get(handlers::hospital::list_doctors),
        )
}
