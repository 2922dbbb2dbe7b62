//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the DocSync crates:
//! - Sync configuration ([`config::SyncConfig`]) with a validating builder
//! - Logging and tracing setup ([`logging`])
//!
//! Nothing in here performs I/O beyond installing the global subscriber.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{SyncConfig, SyncConfigBuilder};
pub use error::{Error, Result};
