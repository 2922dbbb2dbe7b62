//! Async runtime facade for DocSync.
//!
//! Every `core-*` and `provider-*` crate reaches the executor through this
//! crate instead of naming Tokio directly, so the runtime choice lives in one
//! place.
//!
//! # Modules
//!
//! - `sync`: locks and the cooperative [`CancellationToken`](sync::CancellationToken)
//! - `time`: sleeping, timeouts and durations
//! - `fs`: async file access used by the hasher and the state store
//! - `io`: async read/write extension traits
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::time::{sleep_or_cancel, Duration};
//!
//! async fn pace(token: &CancellationToken) -> bool {
//!     // Returns false when the token fired before the delay elapsed
//!     sleep_or_cancel(Duration::from_millis(10), token).await
//! }
//! ```

pub mod fs;
pub mod io;
pub mod sync;
pub mod time;

pub use time::{sleep, Duration, Instant};
