//! Event status sweep
//!
//! Promotes scheduled events to ongoing once they start and ongoing events to
//! ended once they finish. Both steps apply in one pass, so an event whose
//! whole range is in the past ends up `ended` after a single run. Runs are
//! idempotent: every update is conditional on the status it moves away from.

use std::time::Duration;
use chrono::Local;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use crate::config::SweepConfig;
use crate::database::DatabaseService;
use crate::models::{EventStatus, Schedule, Slot};
use crate::utils::errors::Result;

/// Counters for one sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub started: u32,
    pub ended: u32,
    pub failed: u32,
}

/// Status transitions due for an event at `now`, in the order they apply
pub fn due_transitions(status: EventStatus, schedule: &Schedule, now: Slot) -> Vec<(EventStatus, EventStatus)> {
    let mut steps = Vec::new();
    let mut current = status;

    if current == EventStatus::Scheduled && schedule.start <= now {
        steps.push((EventStatus::Scheduled, EventStatus::Ongoing));
        current = EventStatus::Ongoing;
    }
    if current == EventStatus::Ongoing && schedule.end <= now {
        steps.push((EventStatus::Ongoing, EventStatus::Ended));
    }

    steps
}

/// Current wall-clock time as an event slot
pub fn local_now() -> Slot {
    let now = Local::now().naive_local();
    Slot::new(now.date(), now.time())
}

#[derive(Clone)]
pub struct SweepService {
    db: DatabaseService,
}

impl SweepService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Run one sweep at `now`
    pub async fn run_once(&self, now: Slot) -> Result<SweepReport> {
        let mut candidates = self.db.events.find_due(EventStatus::Scheduled, now.date, now.time).await?;
        candidates.extend(self.db.events.find_due(EventStatus::Ongoing, now.date, now.time).await?);

        let mut report = SweepReport::default();
        for event in candidates {
            for (from, to) in due_transitions(event.status, &event.schedule(), now) {
                match self.db.events.transition_status(event.id, from, to).await {
                    Ok(true) => {
                        debug!(event_id = event.id, from = %from, to = %to, "Event status advanced");
                        match to {
                            EventStatus::Ongoing => report.started += 1,
                            _ => report.ended += 1,
                        }
                    }
                    Ok(false) => break,
                    Err(e) => {
                        warn!(event_id = event.id, from = %from, to = %to, error = %e, "Failed to advance event status");
                        report.failed += 1;
                        break;
                    }
                }
            }
        }

        if report != SweepReport::default() {
            info!(started = report.started, ended = report.ended, failed = report.failed, "Event sweep finished");
        }
        Ok(report)
    }

    /// Run the sweep on an interval until `shutdown` flips to true
    pub fn spawn(self, config: &SweepConfig, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let period = Duration::from_secs(config.interval_seconds.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(interval_seconds = period.as_secs(), "Event sweep started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once(local_now()).await {
                            warn!(error = %e, "Event sweep run failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Event sweep stopped");
        })
    }
}
