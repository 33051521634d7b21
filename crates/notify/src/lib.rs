//! # MedSync Notifications
//!
//! Outbound email and the in-process reminder scheduler.
//!
//! - **Gateway**: the [`NotificationGateway`] seam and its implementations
//! - **Templates**: subject and body rendering for confirmation and reminder mail
//! - **Scheduler**: one-shot reminder jobs keyed by appointment
//!
//! Every failure in this crate belongs to the best-effort side channel:
//! callers log it and carry on.

pub mod config;
pub mod error;
pub mod gateway;
pub mod scheduler;
pub mod templates;

pub mod mock;

use std::sync::Arc;

use tracing::info;

pub use error::NotifyError;
pub use gateway::{EmailMessage, HttpMailGateway, LogOnlyGateway, NotificationGateway};
pub use scheduler::{ReminderScheduler, ScheduleOutcome};

/// Builds the gateway the configuration asks for: the HTTP mail relay when
/// `MAIL_API_URL` is set, otherwise a gateway that only logs.
pub fn build_gateway(
    config: &config::NotifyConfig,
) -> Result<Arc<dyn NotificationGateway>, NotifyError> {
    match &config.mail_api_url {
        Some(url) => {
            info!("Mail relay configured at {}", url);
            Ok(Arc::new(HttpMailGateway::new(config)?))
        }
        None => {
            info!("MAIL_API_URL not set; emails will be logged instead of sent");
            Ok(Arc::new(LogOnlyGateway))
        }
    }
}
