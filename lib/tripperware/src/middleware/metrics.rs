//! Retry metrics sinks.
//!
//! [`RetryMetrics`] is the narrow interface the retry middleware reports to.
//! With the `metrics` feature, [`RetryMiddlewareMetrics`] records on the
//! `metrics` crate facade, which allows integration with various metrics
//! backends (Prometheus, `StatsD`, etc.).

/// Sink for retry events.
///
/// A single sink is usually shared by every request going through the
/// middleware, so implementations must tolerate concurrent calls.
pub trait RetryMetrics: Send + Sync {
    /// Record one retry, issued after a retriable failure.
    fn record_retry(&self);

    /// Record how many attempts a request took once it is finished.
    fn observe_tries(&self, _tries: u32) {}
}

#[cfg(feature = "metrics")]
pub use facade::RetryMiddlewareMetrics;

#[cfg(feature = "metrics")]
mod facade {
    use super::RetryMetrics;

    /// Metric names.
    const METRIC_RETRY_EVENTS_TOTAL: &str = "query_frontend_retry_events_total";
    const METRIC_RETRIES: &str = "query_frontend_retries";

    /// [`RetryMetrics`] on the `metrics` facade.
    ///
    /// Records the following metrics:
    /// - `query_frontend_retry_events_total` (counter): retries issued
    /// - `query_frontend_retries` (histogram): attempts made per request
    ///
    /// Nothing is recorded until a global recorder is installed.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RetryMiddlewareMetrics {
        _private: (),
    }

    impl RetryMiddlewareMetrics {
        /// Create a new metrics sink.
        #[must_use]
        pub fn new() -> Self {
            Self { _private: () }
        }
    }

    impl RetryMetrics for RetryMiddlewareMetrics {
        fn record_retry(&self) {
            metrics::counter!(METRIC_RETRY_EVENTS_TOTAL).increment(1);
        }

        fn observe_tries(&self, tries: u32) {
            metrics::histogram!(METRIC_RETRIES).record(f64::from(tries));
        }
    }

}
