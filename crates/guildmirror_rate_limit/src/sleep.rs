//! Injectable sleep abstraction.
//!
//! The retry wrapper and the orchestration engine both wait on fixed
//! timers. Routing those waits through a trait keeps the backoff logic
//! testable: production code uses [`TokioSleeper`], tests substitute a
//! recording or no-op implementation.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Asynchronous sleep provider.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the current task for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by `tokio::time::sleep`. The production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately, recording each requested duration.
///
/// Intended for tests that assert on backoff behavior without waiting out
/// real delays.
#[derive(Debug, Default)]
pub struct InstantSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl InstantSleeper {
    /// Create a new recording sleeper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in call order.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().expect("sleeper lock poisoned").clone()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .expect("sleeper lock poisoned")
            .push(duration);
    }
}
