use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            post(handlers::appointment::book_appointment),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(handlers::appointment::cancel_appointment),
        )
}
