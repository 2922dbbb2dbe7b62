//! Time-related abstractions.
//!
//! Re-exports `tokio::time` plus [`sleep_or_cancel`], the cancellable wait used
//! for retry backoff and parse-trigger pacing.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(5)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(5));
//! }
//! ```

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
pub use tokio::time::{sleep, timeout};

use crate::sync::CancellationToken;

/// Sleeps for `duration` unless `token` fires first.
///
/// Returns `true` when the full delay elapsed and `false` when the wait was
/// cut short by cancellation. A zero duration never yields to the timer but
/// still reports an already-cancelled token.
pub async fn sleep_or_cancel(duration: Duration, token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return false;
    }
    if duration.is_zero() {
        return true;
    }

    tokio::select! {
        _ = token.cancelled() => false,
        _ = sleep(duration) => true,
    }
}
