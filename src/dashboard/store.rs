use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::dashboard::evaluation::Evaluation;
use crate::models::AccountStatus;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    Synced {
        at: DateTime<Utc>,
        status: AccountStatus,
    },
    StatusChanged {
        from: AccountStatus,
        to: AccountStatus,
    },
    SyncFailed {
        reason: String,
    },
}

/// Owns the dashboard state. Readers use the accessors; every mutation is
/// announced on the event channel.
pub struct DashboardStore {
    latest: Option<Arc<Evaluation>>,
    last_sync: Option<DateTime<Utc>>,
    last_error: Option<String>,
    consecutive_failures: u32,
    events: broadcast::Sender<DashboardEvent>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            latest: None,
            last_sync: None,
            last_error: None,
            consecutive_failures: 0,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub fn latest(&self) -> Option<Arc<Evaluation>> {
        self.latest.clone()
    }

    pub fn status(&self) -> Option<AccountStatus> {
        self.latest.as_ref().map(|e| e.status)
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Replace the evaluation with the result of a sync. `failures` lists the
    /// endpoints that could not be read during that sync.
    pub fn apply_sync(&mut self, evaluation: Evaluation, failures: Vec<String>) -> Arc<Evaluation> {
        if failures.is_empty() {
            self.consecutive_failures = 0;
            self.last_error = None;
        } else {
            self.consecutive_failures += 1;
            self.last_error = Some(failures.join("; "));
            for reason in failures {
                self.publish(DashboardEvent::SyncFailed { reason });
            }
        }

        let previous = self.status();
        let evaluation = Arc::new(evaluation);
        self.last_sync = Some(evaluation.evaluated_at);
        self.latest = Some(evaluation.clone());

        self.publish(DashboardEvent::Synced {
            at: evaluation.evaluated_at,
            status: evaluation.status,
        });
        if let Some(from) = previous {
            if from != evaluation.status {
                self.publish(DashboardEvent::StatusChanged {
                    from,
                    to: evaluation.status,
                });
            }
        }
        evaluation
    }

    fn publish(&self, event: DashboardEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
