//! Storage Abstractions
//!
//! Contracts the sync engine depends on but does not implement:
//! - [`DocumentStore`]: the remote document-ingestion service (datasets,
//!   uploads, paginated listings, parse triggers, metadata tags)
//! - [`FileDiscovery`]: enumeration of candidate local files

use async_trait::async_trait;
use core_async::sync::CancellationToken;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::Result;

/// Key-value tags attached to a remote document
pub type DocumentMetadata = BTreeMap<String, String>;

/// Parameters for creating a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    pub description: Option<String>,
    pub embedding_model: String,
    pub chunk_method: String,
    pub chunk_token_number: u32,
}

/// Chunking parameters applied to an existing dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub chunk_token_number: u32,
    pub delimiter: String,
}

/// A document as reported by the remote listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: String,
    pub name: String,
    /// Unix timestamp (seconds)
    pub created_at: Option<i64>,
    /// Unix timestamp (seconds)
    pub updated_at: Option<i64>,
    pub metadata: DocumentMetadata,
}

/// Why a document id could not be read from an upload response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("upload response has no `data` array")]
    MissingData,

    #[error("upload response `data` array is empty")]
    EmptyData,

    #[error("uploaded document entry has no string `id`")]
    MissingId,
}

/// Raw body returned by a document upload.
///
/// The assigned id is not trusted until [`UploadResponse::document_id`]
/// succeeds; a malformed body is an explicit [`ExtractError`], never an empty
/// default.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub raw: serde_json::Value,
}

impl UploadResponse {
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }

    /// Reads `data[0].id` from the response body.
    pub fn document_id(&self) -> std::result::Result<String, ExtractError> {
        let data = self
            .raw
            .get("data")
            .and_then(|data| data.as_array())
            .ok_or(ExtractError::MissingData)?;

        let first = data.first().ok_or(ExtractError::EmptyData)?;

        first
            .get("id")
            .and_then(|id| id.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(ExtractError::MissingId)
    }
}

/// Remote document store (the "gateway")
///
/// Every method is a network call and may fail with a transport or protocol
/// error. Listing methods absorb failures up to their retry bound and return
/// whatever they accumulated instead of erroring.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::DocumentStore;
///
/// async fn ensure(store: &dyn DocumentStore, spec: DatasetSpec) -> Result<String> {
///     match store.find_dataset_id(&spec.name).await? {
///         Some(id) => Ok(id),
///         None => store.create_dataset(&spec).await,
///     }
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Look up a dataset id by exact name
    async fn find_dataset_id(&self, name: &str) -> Result<Option<String>>;

    /// Create a dataset and return its id
    async fn create_dataset(&self, spec: &DatasetSpec) -> Result<String>;

    /// Apply chunking parameters; a missing dataset id is a logged no-op
    async fn update_parser_config(
        &self,
        dataset_id: Option<&str>,
        config: &ParserConfig,
    ) -> Result<()>;

    /// Rename a dataset
    async fn rename_dataset(&self, dataset_id: &str, name: &str) -> Result<()>;

    /// Upload one local file as a new, unparsed document
    async fn upload_document(&self, dataset_id: &str, path: &Path) -> Result<UploadResponse>;

    /// Page through every document in the dataset
    async fn list_documents(
        &self,
        dataset_id: &str,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> Vec<RemoteDocument>;

    /// Page through every document id in the dataset, in listing order
    async fn list_all_document_ids(
        &self,
        dataset_id: &str,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> Vec<String> {
        self.list_documents(dataset_id, page_size, cancel)
            .await
            .into_iter()
            .map(|document| document.id)
            .collect()
    }

    /// Ask the store to start chunking one document; completion is not awaited
    async fn trigger_parse(&self, dataset_id: &str, document_id: &str) -> Result<()>;

    /// Attach key-value tags to a document
    async fn update_document_metadata(
        &self,
        dataset_id: &str,
        document_id: &str,
        metadata: &DocumentMetadata,
    ) -> Result<()>;
}

/// Local file enumeration
///
/// Implementations return absolute paths of regular files under `root` whose
/// names end with one of `extensions` (e.g. `.md`). Order is not significant.
#[async_trait]
pub trait FileDiscovery: Send + Sync {
    async fn discover(&self, root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_extracted() {
        let response = UploadResponse::new(json!({
            "code": 0,
            "data": [{ "id": "doc-1", "name": "notes.md" }]
        }));

        assert_eq!(response.document_id(), Ok("doc-1".to_string()));
    }

    #[test]
    fn test_document_id_missing_data() {
        let response = UploadResponse::new(json!({ "code": 102, "message": "bad" }));
        assert_eq!(response.document_id(), Err(ExtractError::MissingData));
    }

    #[test]
    fn test_document_id_empty_data() {
        let response = UploadResponse::new(json!({ "code": 0, "data": [] }));
        assert_eq!(response.document_id(), Err(ExtractError::EmptyData));
    }

    #[test]
    fn test_document_id_not_a_string() {
        let response = UploadResponse::new(json!({ "data": [{ "id": 42 }] }));
        assert_eq!(response.document_id(), Err(ExtractError::MissingId));

        let response = UploadResponse::new(json!({ "data": [{ "id": "" }] }));
        assert_eq!(response.document_id(), Err(ExtractError::MissingId));
    }
}
