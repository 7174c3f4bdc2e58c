//! Observability utilities for the event scheduler.
//!
//! This crate provides:
//! - Prometheus recorder installation, optionally with its own HTTP listener
//! - [`SchedulerMetrics`], the counters and gauges the scheduler records
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics_with_listener, SchedulerMetrics};
//!
//! init_metrics_with_listener(9090)?;
//! SchedulerMetrics::record_event_created();
//! ```

pub mod scheduler;

pub use scheduler::SchedulerMetrics;

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use std::net::{Ipv4Addr, SocketAddr};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder without an exporter.
///
/// Later calls return the handle from the first one. Render with
/// [`render_metrics`].
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Install the recorder and serve `/metrics` on `0.0.0.0:port`.
///
/// Must be called from within a tokio runtime; the listener runs as a
/// background task for the life of the process.
pub fn init_metrics_with_listener(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    info!(%addr, "Prometheus exporter listening");
    register_metric_descriptions();
    Ok(())
}

/// Get the metrics handle (only set by [`init_metrics`])
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Text exposition of everything recorded so far
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        "scheduler_senders_registered_total",
        "GreetSender calls by whether a new identity was issued"
    );
    describe_counter!(
        "scheduler_events_created_total",
        "Events accepted into the registry"
    );
    describe_counter!(
        "scheduler_events_deleted_total",
        "Events removed by their sender before firing"
    );
    describe_counter!(
        "scheduler_events_published_total",
        "Due events published and evicted"
    );
    describe_counter!(
        "scheduler_publish_failures_total",
        "Publishes that failed, by notification kind"
    );
    describe_counter!(
        "scheduler_capacity_rejections_total",
        "Creates rejected because the registry was full"
    );
    describe_gauge!(
        "scheduler_pending_events",
        "Events currently waiting to fire"
    );
    describe_histogram!(
        "scheduler_sweep_duration_seconds",
        "Time spent publishing due events in one tick"
    );
}
