//! Synchronization primitives.
//!
//! - Async-aware locks from `tokio::sync`; holding a guard across an `.await`
//!   does not block the executor.
//! - [`CancellationToken`] from `tokio-util`, the signal a caller hands to the
//!   sync engine and the remote gateway to stop paging, retrying and pacing.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{CancellationToken, Mutex};
//!
//! async fn example() {
//!     let state = Mutex::new(Vec::<String>::new());
//!     state.lock().await.push("notes.md".to_string());
//!
//!     let token = CancellationToken::new();
//!     let child = token.child_token();
//!     token.cancel();
//!     assert!(child.is_cancelled());
//! }
//! ```

pub use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, Semaphore};
pub use tokio_util::sync::CancellationToken;
