//! Prometheus metrics for stream workers

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::info;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize Prometheus metrics.
///
/// Call this once at startup. Subsequent calls are no-ops.
pub fn init_metrics() {
    let _ = PROMETHEUS_HANDLE.get_or_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus recorder");
        info!("Prometheus metrics initialized");
        handle
    });
}

/// Render metrics in Prometheus text format.
pub fn render_metrics() -> String {
    PROMETHEUS_HANDLE.get().map(|h| h.render()).unwrap_or_default()
}

/// Per-stream worker metrics helper.
#[derive(Clone)]
pub struct WorkerMetrics {
    stream_name: String,
    processor_name: String,
}

impl WorkerMetrics {
    pub fn new(stream_name: impl Into<String>, processor_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            processor_name: processor_name.into(),
        }
    }

    /// Record a message read from a partition.
    pub fn message_received(&self) {
        counter!(
            "stream_worker_messages_received_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);
    }

    /// Record a terminal outcome with total attempts and wall time.
    pub fn message_finished(&self, outcome: &'static str, attempts: u32, duration: Duration) {
        counter!(
            "stream_worker_messages_finished_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "outcome" => outcome
        )
        .increment(1);

        if attempts > 1 {
            counter!(
                "stream_worker_message_retries_total",
                "stream" => self.stream_name.clone(),
                "processor" => self.processor_name.clone()
            )
            .increment((attempts - 1) as u64);
        }

        histogram!(
            "stream_worker_message_duration_seconds",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .record(duration.as_secs_f64());
    }

    /// Record a message handed to the recovery stream.
    pub fn recovery_dispatched(&self) {
        counter!(
            "stream_worker_recovery_dispatched_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_calls_do_not_panic_without_recorder() {
        let metrics = WorkerMetrics::new("test:events", "TestProcessor");
        metrics.message_received();
        metrics.message_finished("succeeded", 1, Duration::from_millis(5));
        metrics.message_finished("recovery_dispatched", 3, Duration::from_secs(2));
        metrics.recovery_dispatched();
    }

    #[test]
    fn test_render_metrics_empty_without_init() {
        // Rendering before init_metrics must not panic.
        let _ = render_metrics();
    }
}
