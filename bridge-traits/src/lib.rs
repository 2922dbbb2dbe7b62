//! # Host Bridge Traits
//!
//! Contracts between the sync core and the outside world.
//!
//! ## Overview
//!
//! The sync engine never talks to the network or walks directories itself. It
//! depends on the traits in this crate, and concrete adapters are injected at
//! startup:
//!
//! | Trait                                   | Desktop adapter                    |
//! |-----------------------------------------|------------------------------------|
//! | [`HttpClient`](http::HttpClient)        | `bridge_desktop::ReqwestHttpClient`|
//! | [`FileDiscovery`](storage::FileDiscovery)| `bridge_desktop::LocalFileDiscovery`|
//! | [`DocumentStore`](storage::DocumentStore)| `provider_ragflow::RagflowConnector`|
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should:
//!
//! - Map connect failures and timeouts to `Transport`
//! - Map unexpected statuses and response shapes to `Protocol`
//! - Include context (URL, dataset id, file path) in the message
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so the engine can share them across
//! its bounded upload pool.

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartFile, RetryPolicy};
pub use storage::{
    DatasetSpec, DocumentMetadata, DocumentStore, ExtractError, FileDiscovery, ParserConfig,
    RemoteDocument, UploadResponse,
};
