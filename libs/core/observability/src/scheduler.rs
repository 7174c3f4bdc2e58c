//! Scheduler metrics.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Scheduler metrics recorder
pub struct SchedulerMetrics;

impl SchedulerMetrics {
    /// `fresh` is true when a new sender id was issued
    pub fn record_sender_registered(fresh: bool) {
        let identity = if fresh { "issued" } else { "returning" };
        counter!("scheduler_senders_registered_total", "identity" => identity).increment(1);
    }

    pub fn record_event_created() {
        counter!("scheduler_events_created_total").increment(1);
    }

    pub fn record_event_deleted() {
        counter!("scheduler_events_deleted_total").increment(1);
    }

    pub fn record_event_published() {
        counter!("scheduler_events_published_total").increment(1);
    }

    /// `kind` is `fired` or `announced`
    pub fn record_publish_failure(kind: &'static str) {
        counter!("scheduler_publish_failures_total", "kind" => kind).increment(1);
    }

    pub fn record_capacity_rejected() {
        counter!("scheduler_capacity_rejections_total").increment(1);
    }

    pub fn set_pending_events(count: usize) {
        gauge!("scheduler_pending_events").set(count as f64);
    }

    /// One scheduler tick that found `due` events
    pub fn record_sweep(due: usize, elapsed: Duration) {
        histogram!("scheduler_sweep_duration_seconds").record(elapsed.as_secs_f64());

        tracing::trace!(
            due = due,
            elapsed_ms = elapsed.as_millis() as u64,
            "Sweep finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_counters_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            SchedulerMetrics::record_event_created();
            SchedulerMetrics::record_event_created();
            SchedulerMetrics::record_publish_failure("fired");
            SchedulerMetrics::record_sender_registered(true);
            SchedulerMetrics::set_pending_events(2);
        });

        let output = handle.render();
        assert!(output.contains("scheduler_events_created_total 2"));
        assert!(output.contains(r#"scheduler_publish_failures_total{kind="fired"} 1"#));
        assert!(output.contains(r#"scheduler_senders_registered_total{identity="issued"} 1"#));
        assert!(output.contains("scheduler_pending_events 2"));
    }
}
