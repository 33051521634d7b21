//! Test doubles for the notification side channel.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::Notify;

use crate::{
    error::NotifyError,
    gateway::{EmailMessage, NotificationGateway},
};

mock! {
    pub NotificationGateway {}

    #[async_trait]
    impl NotificationGateway for NotificationGateway {
        async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
    }
}

/// Gateway that keeps every message it is asked to send. In failing mode it
/// still records the attempt, then reports a relay rejection.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<EmailMessage>>,
    fail: AtomicBool,
    delivered: Notify,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let gateway = Self::default();
        gateway.set_failing(true);
        gateway
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolves once at least `count` send attempts have been recorded.
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.delivered.notified();
            if self.sent.lock().unwrap_or_else(PoisonError::into_inner).len() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        self.delivered.notify_waiters();

        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected {
                status: 503,
                body: "relay unavailable".to_string(),
            });
        }
        Ok(())
    }
}
