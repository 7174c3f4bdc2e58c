//! Background publisher for due events.
//!
//! Each tick snapshots the due events under the store lock, publishes them
//! with the lock released, then evicts what the broker accepted. A failed
//! publish leaves the event in place for the next tick.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use observability::SchedulerMetrics;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::context::SchedulerContext;
use crate::error::EventError;
use crate::models::NotificationKind;
use crate::service::notification_message;

/// Outcome of one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub published: usize,
    pub failed: usize,
}

pub struct Scheduler {
    ctx: Arc<SchedulerContext>,
}

impl Scheduler {
    pub fn new(ctx: Arc<SchedulerContext>) -> Self {
        Self { ctx }
    }

    /// Sweep every tick until `shutdown` turns true or its sender is dropped.
    ///
    /// A sweep in progress always completes before the loop exits.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let tick = self.ctx.config.tick;
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(tick_ms = tick.as_millis() as u64, "Scheduler started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    let report = self.sweep_once(Utc::now()).await;
                    if report.failed > 0 {
                        warn!(
                            published = report.published,
                            failed = report.failed,
                            "Some due events could not be published, retrying next tick"
                        );
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }

    /// Publish everything due at `now` once.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> SweepReport {
        let started = Instant::now();
        let due = self.ctx.store.due(now);
        let mut report = SweepReport::default();

        for event in &due {
            let result = match notification_message(event, NotificationKind::Fired, self.ctx.instance_id) {
                Ok(message) => self.ctx.broker.publish(message).await.map_err(EventError::from),
                Err(err) => Err(err),
            };

            match result {
                Ok(()) => {
                    // no-op when a handler deleted it while we were publishing
                    self.ctx.store.remove(event.id);
                    report.published += 1;
                    SchedulerMetrics::record_event_published();
                    debug!(
                        event_id = %event.id,
                        sender_id = %event.sender_id,
                        "Event fired"
                    );
                }
                Err(err) => {
                    report.failed += 1;
                    SchedulerMetrics::record_publish_failure(NotificationKind::Fired.as_str());
                    error!(
                        event_id = %event.id,
                        sender_id = %event.sender_id,
                        error = %err,
                        "Failed to publish due event"
                    );
                }
            }
        }

        if !due.is_empty() {
            SchedulerMetrics::set_pending_events(self.ctx.store.len());
            SchedulerMetrics::record_sweep(due.len(), started.elapsed());
        }

        report
    }
}
