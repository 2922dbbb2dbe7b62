//! # RAGFlow Provider
//!
//! Implements the `DocumentStore` trait for the RAGFlow HTTP API (`/api/v1`).
//!
//! ## Overview
//!
//! This module provides:
//! - Dataset lookup, creation, rename and parser configuration
//! - Multipart document upload
//! - Paginated document listing with bounded, cancellable retries
//! - Parse triggers and metadata tagging
//!
//! All traffic goes through an injected `HttpClient`, so tests drive the
//! connector with a mock instead of a live server.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::RagflowConnector;
pub use error::{RagflowError, Result};
