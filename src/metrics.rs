use crate::ToolError;
use metrics::{Counter, Histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use tracing::info;

/// Per-tool usage counters.
///
/// Handles are registered against whatever recorder is installed when the
/// struct is built; without one they are no-ops.
pub struct Metrics {
    pub hashes_computed: Counter,
    pub bytes_hashed: Counter,
    pub encodings: Counter,
    pub passwords_generated: Counter,
    pub files_accepted: Counter,
    pub files_rejected: Counter,
    pub simulated_requests: Counter,
    pub simulated_duration: Histogram,
    pub error_count: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            hashes_computed: metrics::register_counter!("toolbench_hashes_computed_total"),
            bytes_hashed: metrics::register_counter!("toolbench_bytes_hashed_total"),
            encodings: metrics::register_counter!("toolbench_base64_operations_total"),
            passwords_generated: metrics::register_counter!("toolbench_passwords_generated_total"),
            files_accepted: metrics::register_counter!("toolbench_files_accepted_total"),
            files_rejected: metrics::register_counter!("toolbench_files_rejected_total"),
            simulated_requests: metrics::register_counter!("toolbench_simulated_requests_total"),
            simulated_duration: metrics::register_histogram!("toolbench_simulated_duration_seconds"),
            error_count: metrics::register_counter!("toolbench_errors_total"),
        }
    }

    pub fn noop() -> Self {
        Self {
            hashes_computed: Counter::noop(),
            bytes_hashed: Counter::noop(),
            encodings: Counter::noop(),
            passwords_generated: Counter::noop(),
            files_accepted: Counter::noop(),
            files_rejected: Counter::noop(),
            simulated_requests: Counter::noop(),
            simulated_duration: Histogram::noop(),
            error_count: Counter::noop(),
        }
    }

    pub fn record_hash(&self, bytes: usize) {
        self.hashes_computed.increment(1);
        self.bytes_hashed.increment(bytes as u64);
    }

    pub fn record_encoding(&self) {
        self.encodings.increment(1);
    }

    pub fn record_password(&self) {
        self.passwords_generated.increment(1);
    }

    pub fn record_intake(&self, accepted: usize, rejected: usize) {
        self.files_accepted.increment(accepted as u64);
        self.files_rejected.increment(rejected as u64);
    }

    pub fn record_simulated(&self, duration: Duration) {
        self.simulated_requests.increment(1);
        self.simulated_duration.record(duration.as_secs_f64());
    }

    pub fn record_error(&self, error: &ToolError) {
        self.error_count.increment(1);
        tracing::debug!("Recorded error: {}", error);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a Prometheus recorder as the global metrics sink.
///
/// Must run before `Metrics::new` for the counters to be captured. The
/// returned handle renders the text exposition format.
pub fn install_prometheus() -> Result<PrometheusHandle, ToolError> {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::set_boxed_recorder(Box::new(recorder))
        .map_err(|e| ToolError::ConfigurationError(e.to_string()))?;

    info!("Prometheus metrics recorder installed");
    Ok(handle)
}
