//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` (rustls, multipart uploads)
//! - `FileDiscovery` using `tokio::fs` recursive directory walks
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{LocalFileDiscovery, ReqwestHttpClient};
//! use bridge_traits::FileDiscovery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let files = LocalFileDiscovery::new()
//!         .discover("/home/me/Logseq".as_ref(), &[".md".to_string()])
//!         .await?;
//!     Ok(())
//! }
//! ```

mod filesystem;
mod http;

pub use filesystem::LocalFileDiscovery;
pub use http::ReqwestHttpClient;
