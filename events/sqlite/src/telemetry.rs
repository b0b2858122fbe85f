//! Prometheus metrics for events backend operations.
use once_cell::sync::Lazy;
use prometheus::HistogramOpts;
use prometheus::HistogramTimer;
use prometheus::HistogramVec;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;

static OPS_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "events_sqlite_operation_duration",
            "Duration (in seconds) of events backend operations",
        ),
        &["op"],
    )
    .expect("failed to initialise OPS_DURATION histogram")
});

static OPS_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "events_sqlite_operation_errors",
            "Number of failed events backend operations",
        ),
        &["op"],
    )
    .expect("failed to initialise OPS_ERRORS counter")
});

/// Register the backend metrics with the process registry.
pub fn register_metrics(registry: &Registry) -> anyhow::Result<()> {
    registry.register(Box::new(OPS_DURATION.clone()))?;
    registry.register(Box::new(OPS_ERRORS.clone()))?;
    Ok(())
}

/// Observe an events backend operation.
///
/// Returns the error counter for the operation, to increment on failure,
/// and a timer recording the operation duration when dropped.
pub(crate) fn observe_op(op: &str) -> (IntCounter, HistogramTimer) {
    let err_count = OPS_ERRORS.with_label_values(&[op]);
    let timer = OPS_DURATION.with_label_values(&[op]).start_timer();
    (err_count, timer)
}
