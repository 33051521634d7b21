//! # MedSync API
//!
//! The web server for MedSync: account registration and login for
//! hospitals, doctors and patients, appointment booking and cancellation,
//! dashboards and medical records.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into store and lifecycle calls
//! - **Lifecycle**: Booking and cancellation with their email side effects
//! - **Middleware**: Authentication and error mapping
//! - **Config**: Environment configuration
//!
//! The API uses Axum as the web framework and talks to storage only through
//! the [`DirectoryStore`] trait.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Appointment booking and cancellation
pub mod lifecycle;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use chrono::{NaiveDate, Utc};
use eyre::{Result, WrapErr};
use medsync_db::DirectoryStore;
use medsync_notify::NotificationGateway;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::{lifecycle::AppointmentLifecycle, middleware::auth::TokenKeys};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Directory Store for every persistent record
    pub store: Arc<dyn DirectoryStore>,
    /// Booking and cancellation, including the reminder scheduler
    pub lifecycle: AppointmentLifecycle,
    /// Login token keys
    pub tokens: TokenKeys,
}

impl ApiState {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        gateway: Arc<dyn NotificationGateway>,
        tokens: TokenKeys,
        timezone: chrono_tz::Tz,
    ) -> Self {
        let lifecycle = AppointmentLifecycle::new(Arc::clone(&store), gateway, timezone);
        Self {
            store,
            lifecycle,
            tokens,
        }
    }

    /// Today's date on the clinic's calendar.
    pub fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.lifecycle.timezone())
            .date_naive()
    }
}

/// Builds the application router with every route and the shared state.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Hospital accounts and listings
        .merge(routes::hospital::routes())
        // Doctor accounts and dashboard
        .merge(routes::doctor::routes())
        // Patient accounts and dashboard
        .merge(routes::patient::routes())
        // Booking and cancellation
        .merge(routes::appointment::routes())
        // Medical records
        .merge(routes::medical_record::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and store
///
/// Sets up logging, builds the mail gateway and application state, and
/// serves until the listener fails. Pending reminders are dropped when the
/// server stops.
pub async fn start_server(
    config: config::ApiConfig,
    store: Arc<dyn DirectoryStore>,
) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let gateway =
        medsync_notify::build_gateway(&config.notify).wrap_err("Failed to build mail gateway")?;
    let tokens = TokenKeys::from_config(&config);

    info!("Interpreting appointment times in {}", config.clinic_timezone);
    let state = Arc::new(ApiState::new(store, gateway, tokens, config.clinic_timezone));

    let app = build_router(Arc::clone(&state));

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<axum::http::HeaderValue>()
                    .wrap_err_with(|| format!("Invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>>>()?;

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request tracing and timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(tower_http::timeout::TimeoutLayer::new(
                std::time::Duration::from_secs(config.request_timeout),
            )),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    let served = axum::serve(listener, app).await;

    state.lifecycle.scheduler().shutdown();
    served?;

    Ok(())
}
