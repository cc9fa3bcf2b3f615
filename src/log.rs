//! Caller-supplied diagnostic sink. Never affects a run's result.

/// Receives progress and failure notices from the pipeline.
pub trait LogSink: Send + Sync {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, err: &(dyn std::error::Error + 'static));
}

/// Forwards to `tracing` events under the `sugarcoat` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn info(&self, msg: &str) {
        tracing::info!(target: "sugarcoat", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "sugarcoat", "{}", msg);
    }

    fn error(&self, err: &(dyn std::error::Error + 'static)) {
        tracing::error!(target: "sugarcoat", error = %err, "run failed");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl LogSink for NullLog {
    fn info(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn error(&self, _: &(dyn std::error::Error + 'static)) {}
}
