//! In-process reminder scheduler.
//!
//! Each pending reminder is a tokio task sleeping until its fire time. The
//! job table maps a deterministic job id to the live task so a reminder can
//! be replaced or cancelled by appointment id. Pending jobs live only in
//! memory and are dropped on restart.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use chrono::{DateTime, Utc};
use tokio::{runtime::Handle, task::AbortHandle};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    error::NotifyError,
    gateway::{EmailMessage, NotificationGateway},
};

/// What `schedule` did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled,
    /// A live job with the same id existed and was superseded.
    Replaced,
    /// The fire time was not in the future; nothing was registered.
    SkippedPastDue,
}

struct ScheduledJob {
    fire_at: DateTime<Utc>,
    generation: u64,
    handle: AbortHandle,
}

struct Inner {
    jobs: Mutex<HashMap<String, ScheduledJob>>,
    gateway: Arc<dyn NotificationGateway>,
    next_generation: AtomicU64,
}

impl Inner {
    fn jobs(&self) -> MutexGuard<'_, HashMap<String, ScheduledJob>> {
        // The table holds no invariants a panicking holder could break.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cheap to clone; clones share one job table.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<Inner>,
}

impl ReminderScheduler {
    pub fn new(gateway: Arc<dyn NotificationGateway>) -> Self {
        Self {
            inner: Arc::new(Inner {
                jobs: Mutex::new(HashMap::new()),
                gateway,
                next_generation: AtomicU64::new(1),
            }),
        }
    }

    /// Job id used for an appointment's 24-hour reminder.
    pub fn job_id(appointment_id: Uuid) -> String {
        format!("appt_{}_reminder_24h", appointment_id)
    }

    /// Registers a one-shot job that sends `message` at `fire_at`, replacing
    /// any live job for the same appointment.
    pub fn schedule(
        &self,
        appointment_id: Uuid,
        fire_at: DateTime<Utc>,
        message: EmailMessage,
    ) -> Result<ScheduleOutcome, NotifyError> {
        let job_id = Self::job_id(appointment_id);

        let delay = match (fire_at - Utc::now()).to_std() {
            Ok(delay) if !delay.is_zero() => delay,
            _ => {
                debug!("Reminder {} is past due ({}); skipping", job_id, fire_at);
                return Ok(ScheduleOutcome::SkippedPastDue);
            }
        };

        let runtime = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);

        // Spawning under the lock guarantees the entry exists before the task
        // can look for it.
        let mut jobs = self.inner.jobs();
        let task = runtime.spawn(run_job(
            Arc::clone(&self.inner),
            job_id.clone(),
            generation,
            delay,
            message,
        ));

        let previous = jobs.insert(
            job_id.clone(),
            ScheduledJob {
                fire_at,
                generation,
                handle: task.abort_handle(),
            },
        );
        drop(jobs);

        match previous {
            Some(old) => {
                old.handle.abort();
                info!("Replaced reminder {} (now fires at {})", job_id, fire_at);
                Ok(ScheduleOutcome::Replaced)
            }
            None => {
                info!("Scheduled reminder {} at {}", job_id, fire_at);
                Ok(ScheduleOutcome::Scheduled)
            }
        }
    }

    /// Removes the appointment's pending job. Returns false when there was
    /// nothing to remove, including when the job already fired.
    pub fn cancel(&self, appointment_id: Uuid) -> bool {
        let job_id = Self::job_id(appointment_id);
        let removed = self.inner.jobs().remove(&job_id);

        match removed {
            Some(job) => {
                job.handle.abort();
                info!("Cancelled reminder {}", job_id);
                true
            }
            None => {
                debug!("No pending reminder {} to cancel", job_id);
                false
            }
        }
    }

    pub fn exists(&self, appointment_id: Uuid) -> bool {
        self.inner.jobs().contains_key(&Self::job_id(appointment_id))
    }

    pub fn fire_time(&self, appointment_id: Uuid) -> Option<DateTime<Utc>> {
        self.inner
            .jobs()
            .get(&Self::job_id(appointment_id))
            .map(|job| job.fire_at)
    }

    /// Number of jobs that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.inner.jobs().len()
    }

    /// Aborts every pending job.
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.inner.jobs().drain().collect();
        if !drained.is_empty() {
            info!("Dropping {} pending reminder(s) on shutdown", drained.len());
        }
        for (_, job) in drained {
            job.handle.abort();
        }
    }
}

async fn run_job(
    inner: Arc<Inner>,
    job_id: String,
    generation: u64,
    delay: std::time::Duration,
    message: EmailMessage,
) {
    tokio::time::sleep(delay).await;

    let still_current = {
        let mut jobs = inner.jobs();
        match jobs.get(&job_id) {
            Some(job) if job.generation == generation => {
                jobs.remove(&job_id);
                true
            }
            _ => false,
        }
    };

    if !still_current {
        debug!("Reminder {} was superseded before firing", job_id);
        return;
    }

    match inner.gateway.send(&message).await {
        Ok(()) => info!("Reminder {} sent to {}", job_id, message.to),
        Err(e) => error!("Reminder {} failed to send: {}", job_id, e),
    }
}
