//! Async I/O traits re-exported from the underlying runtime.

pub use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
