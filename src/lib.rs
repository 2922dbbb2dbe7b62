//! Command-line front end for docsync.
//!
//! Parses arguments into a [`SyncConfig`](core_runtime::config::SyncConfig)
//! and logging settings, and renders service results for the terminal. The
//! binary in `main.rs` only wires these to [`core_service::CoreService`].

pub mod cli;
pub mod render;
