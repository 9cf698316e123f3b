//! Progress reporting for batch classification.
//!
//! The orchestrator reports after each comment completes. The CLI plugs in
//! a spinner; library callers and tests use [`NoopProgressReporter`].

use std::sync::Arc;

use async_trait::async_trait;

/// Receives progress updates from long-running operations.
///
/// `current` goes from 0.0 to `total`. Implementations must never fail the
/// caller.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, current: f64, total: f64, message: Option<String>);

    /// Report `done` finished items out of `total_items`.
    async fn items(&self, done: usize, total_items: usize, message: &str) {
        let current = if total_items == 0 {
            1.0
        } else {
            done as f64 / total_items as f64
        };
        self.report(current, 1.0, Some(message.to_string())).await;
    }
}

/// Reporter that drops every update.
pub struct NoopProgressReporter;

#[async_trait]
impl ProgressReporter for NoopProgressReporter {
    async fn report(&self, _current: f64, _total: f64, _message: Option<String>) {}
}

pub fn noop_progress() -> Arc<dyn ProgressReporter> {
    Arc::new(NoopProgressReporter)
}
