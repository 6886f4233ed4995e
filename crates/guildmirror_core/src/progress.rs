//! Human-readable progress reporting.

use async_trait::async_trait;
use tracing::info;

/// Sink for progress lines emitted during a clone run.
///
/// The engine sends a line at each phase boundary and for notable
/// per-entity events (failures, skips). Front-ends relay these wherever
/// the operator is watching; sink errors must be swallowed by the
/// implementation, never surfaced into the run.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Deliver one progress line.
    async fn send(&self, line: &str);
}

/// Progress sink that writes lines to the process log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl ProgressSink for LogSink {
    async fn send(&self, line: &str) {
        info!("{line}");
    }
}
