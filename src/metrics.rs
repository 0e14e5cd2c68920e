//! Prometheus metrics for resolver operations.
//!
//! The recorder is installed once; `/metrics` renders through the stored
//! handle. Recording before installation is a no-op, which keeps tests quiet.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const OPERATIONS_TOTAL: &str = "cat_api_operations_total";
pub const OPERATION_DURATION_SECONDS: &str = "cat_api_operation_duration_seconds";

/// Install the global Prometheus recorder. Idempotent.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Prometheus handle was already stored");
            }
            describe_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Text exposition of all recorded metrics, if the recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

fn describe_metrics() {
    metrics::describe_counter!(
        OPERATIONS_TOTAL,
        "Cat resolver invocations by operation and outcome"
    );
    metrics::describe_histogram!(
        OPERATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Cat resolver latency including the store round-trip"
    );
}

pub struct CatMetrics;

impl CatMetrics {
    pub fn record(operation: &'static str, outcome: &'static str, elapsed: Duration) {
        metrics::counter!(OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
            .increment(1);
        metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
            .record(elapsed.as_secs_f64());
    }
}
