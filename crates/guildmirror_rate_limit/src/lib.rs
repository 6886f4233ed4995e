//! Rate-limit handling for bulk Discord operations.
//!
//! Discord enforces per-route rate limits, and a guild clone is an
//! inherently bursty workload: hundreds of create/delete calls back to
//! back. This crate provides the two halves of the strategy that keeps
//! such a run converging:
//!
//! - [`retry_rate_limited`] — an unbounded retry driver that absorbs
//!   rate-limit errors with a fixed backoff and propagates everything
//!   else immediately.
//! - [`Pacing`] — the fixed inter-operation pauses inserted between
//!   entity operations so the aggregate request rate stays under typical
//!   limits without tracking per-route budgets.
//!
//! Sleeping goes through the [`Sleeper`] trait so tests can simulate
//! elapsed backoff without wall-clock delay.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod pacing;
mod retry;
mod sleep;

pub use pacing::Pacing;
pub use retry::{RetryPolicy, retry_rate_limited};
pub use sleep::{InstantSleeper, Sleeper, TokioSleeper};
