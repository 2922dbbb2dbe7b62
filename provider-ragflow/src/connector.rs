//! RAGFlow API connector implementation
//!
//! Implements the `DocumentStore` trait over the RAGFlow `/api/v1` endpoints.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::storage::{
    DatasetSpec, DocumentMetadata, DocumentStore, ParserConfig, RemoteDocument, UploadResponse,
};
use bytes::Bytes;
use core_async::sync::CancellationToken;
use core_async::time::sleep_or_cancel;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::RagflowError;
use crate::types::{
    CreateDatasetRequest, DatasetEntry, DocumentEntry, DocumentPage, Envelope, MetadataRequest,
    ParseRequest, ParserConfigBody, UpdateDatasetRequest,
};

/// Default per-request timeout
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Uploads move whole files, so they get more room than JSON calls
const UPLOAD_TIMEOUT_FACTOR: u32 = 4;

/// Form field RAGFlow reads the uploaded file from
const UPLOAD_FIELD: &str = "file";

/// RAGFlow API connector
///
/// Implements [`DocumentStore`] for a RAGFlow server.
///
/// # Features
///
/// - Bearer authentication on every call
/// - `{code, message, data}` envelope checking
/// - Paginated listing that stops on the first short page
/// - Bounded per-page retries with a fixed backoff, abortable through a
///   [`CancellationToken`]
///
/// Writes (create, upload, parse, tag) are issued once and never retried.
///
/// # Example
///
/// ```ignore
/// use provider_ragflow::RagflowConnector;
/// use bridge_traits::storage::DocumentStore;
///
/// let connector = RagflowConnector::new(http_client, "http://localhost:9380/api/v1", api_key);
/// let ids = connector.list_all_document_ids(&dataset_id, 30, &token).await;
/// ```
pub struct RagflowConnector {
    http_client: Arc<dyn HttpClient>,

    /// API root, e.g. `http://localhost:9380/api/v1`
    api_base: String,

    api_key: String,

    retry: RetryPolicy,

    request_timeout: Duration,
}

impl RagflowConnector {
    /// Create a new connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `api_base` - API root including `/api/v1`
    /// * `api_key` - RAGFlow API key
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound used by paginated listings
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .bearer_token(&self.api_key)
            .header("Accept", "application/json")
            .timeout(self.request_timeout)
    }

    /// Send one request and reject non-2xx statuses
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, RagflowError> {
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            return Err(RagflowError::HttpStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        Ok(response)
    }

    /// Parse the envelope and reject a non-zero `code`
    fn decode<T: DeserializeOwned>(
        response: &HttpResponse,
    ) -> std::result::Result<Option<T>, RagflowError> {
        let envelope: Envelope<T> = serde_json::from_slice(&response.body)
            .map_err(|e| RagflowError::ParseError(format!("Invalid response envelope: {}", e)))?;

        if envelope.code != 0 {
            return Err(RagflowError::ApiError {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }

        Ok(envelope.data)
    }

    /// Issue a write whose `data` is not needed
    async fn send_command(&self, request: HttpRequest) -> std::result::Result<(), RagflowError> {
        let response = self.send(request).await?;
        Self::decode::<serde_json::Value>(&response)?;
        Ok(())
    }

    async fn put_dataset(
        &self,
        dataset_id: &str,
        body: &UpdateDatasetRequest<'_>,
    ) -> std::result::Result<(), RagflowError> {
        let url = self.url(&format!("/datasets/{}", dataset_id));
        let request = self.request(HttpMethod::Put, url).json(body)?;
        self.send_command(request).await
    }

    async fn fetch_page(
        &self,
        dataset_id: &str,
        page: u32,
        page_size: u32,
    ) -> std::result::Result<Vec<DocumentEntry>, RagflowError> {
        let url = self.url(&format!(
            "/datasets/{}/documents?page={}&page_size={}",
            dataset_id, page, page_size
        ));

        let response = self.send(self.request(HttpMethod::Get, url)).await?;
        let data: DocumentPage =
            Self::decode(&response)?.ok_or(RagflowError::MissingData("document page"))?;

        Ok(data.docs)
    }

    /// Fetch one page, retrying failed or malformed responses up to the
    /// policy bound.
    ///
    /// `None` means the page could not be obtained (bound exhausted, a
    /// non-retryable error, or cancellation) and paging should stop.
    #[instrument(skip(self, cancel))]
    async fn fetch_page_with_retry(
        &self,
        dataset_id: &str,
        page: u32,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> Option<Vec<DocumentEntry>> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                debug!(page, "Listing cancelled");
                return None;
            }

            attempt += 1;
            match self.fetch_page(dataset_id, page, page_size).await {
                Ok(docs) => {
                    debug!(page, count = docs.len(), "Fetched document page");
                    return Some(docs);
                }
                Err(e) if !e.is_retryable() => {
                    warn!(page, error = %e, "Document page rejected, not retrying");
                    return None;
                }
                Err(e) if attempt >= max_attempts => {
                    warn!(
                        page,
                        attempts = attempt,
                        error = %e,
                        "Giving up on document page"
                    );
                    return None;
                }
                Err(e) => {
                    warn!(
                        page,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Document page failed, retrying in {:?}",
                        self.retry.backoff
                    );
                    if !sleep_or_cancel(self.retry.backoff, cancel).await {
                        debug!(page, "Retry backoff cancelled");
                        return None;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl DocumentStore for RagflowConnector {
    #[instrument(skip(self))]
    async fn find_dataset_id(&self, name: &str) -> Result<Option<String>> {
        let url = self.url(&format!("/datasets?name={}", urlencoding::encode(name)));
        let response = self.send(self.request(HttpMethod::Get, url)).await?;

        // RAGFlow reports an unknown name as a non-zero code, not an empty list
        let datasets = match Self::decode::<Vec<DatasetEntry>>(&response) {
            Ok(data) => data.unwrap_or_default(),
            Err(RagflowError::ApiError { code, message }) => {
                debug!(code, %message, "Dataset lookup returned no match");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let id = datasets.into_iter().next().map(|dataset| dataset.id);
        match &id {
            Some(id) => debug!(dataset_id = %id, "Found dataset"),
            None => debug!("Dataset not found"),
        }
        Ok(id)
    }

    #[instrument(skip(self, spec), fields(name = %spec.name))]
    async fn create_dataset(&self, spec: &DatasetSpec) -> Result<String> {
        let body = CreateDatasetRequest {
            name: &spec.name,
            description: spec.description.as_deref(),
            embedding_model: &spec.embedding_model,
            chunk_method: &spec.chunk_method,
            parser_config: ParserConfigBody {
                chunk_token_num: spec.chunk_token_number,
                delimiter: None,
            },
        };

        let request = self
            .request(HttpMethod::Post, self.url("/datasets"))
            .json(&body)?;
        let response = self.send(request).await?;
        let dataset: DatasetEntry =
            Self::decode(&response)?.ok_or(RagflowError::MissingData("created dataset"))?;

        info!(dataset_id = %dataset.id, "Created dataset");
        Ok(dataset.id)
    }

    #[instrument(skip(self, config))]
    async fn update_parser_config(
        &self,
        dataset_id: Option<&str>,
        config: &ParserConfig,
    ) -> Result<()> {
        let Some(dataset_id) = dataset_id else {
            warn!("No dataset id, skipping parser configuration");
            return Ok(());
        };

        let body = UpdateDatasetRequest {
            parser_config: Some(ParserConfigBody {
                chunk_token_num: config.chunk_token_number,
                delimiter: Some(config.delimiter.clone()),
            }),
            ..Default::default()
        };

        self.put_dataset(dataset_id, &body).await?;
        debug!(
            dataset_id,
            chunk_token_num = config.chunk_token_number,
            "Applied parser configuration"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rename_dataset(&self, dataset_id: &str, name: &str) -> Result<()> {
        let body = UpdateDatasetRequest {
            name: Some(name),
            ..Default::default()
        };

        self.put_dataset(dataset_id, &body).await?;
        info!("Renamed dataset");
        Ok(())
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn upload_document(&self, dataset_id: &str, path: &Path) -> Result<UploadResponse> {
        let content = core_async::fs::read(path)
            .await
            .map_err(|source| RagflowError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = content.len();

        let url = self.url(&format!("/datasets/{}/documents", dataset_id));
        let request = self
            .request(HttpMethod::Post, url)
            .timeout(self.request_timeout * UPLOAD_TIMEOUT_FACTOR)
            .multipart_file(UPLOAD_FIELD, file_name, Bytes::from(content));

        let response = self.send(request).await?;
        let raw: serde_json::Value = response.json()?;

        if let Some(code) = raw.get("code").and_then(|code| code.as_i64()) {
            if code != 0 {
                let message = raw
                    .get("message")
                    .and_then(|message| message.as_str())
                    .unwrap_or_default()
                    .to_string();
                return Err(RagflowError::ApiError { code, message }.into());
            }
        }

        debug!(bytes = size, "Uploaded document");
        Ok(UploadResponse::new(raw))
    }

    #[instrument(skip(self, cancel))]
    async fn list_documents(
        &self,
        dataset_id: &str,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> Vec<RemoteDocument> {
        let page_size = page_size.max(1);
        let mut documents = Vec::new();
        let mut page = 1;

        loop {
            let Some(docs) = self
                .fetch_page_with_retry(dataset_id, page, page_size, cancel)
                .await
            else {
                break;
            };

            let count = docs.len();
            documents.extend(docs.into_iter().map(DocumentEntry::into_remote_document));

            if count < page_size as usize {
                break;
            }
            page += 1;
        }

        info!(count = documents.len(), pages = page, "Listed documents");
        documents
    }

    #[instrument(skip(self))]
    async fn trigger_parse(&self, dataset_id: &str, document_id: &str) -> Result<()> {
        let url = self.url(&format!("/datasets/{}/chunks", dataset_id));
        let body = ParseRequest {
            document_ids: vec![document_id],
        };

        let request = self.request(HttpMethod::Post, url).json(&body)?;
        self.send_command(request).await?;
        debug!("Parse triggered");
        Ok(())
    }

    #[instrument(skip(self, metadata))]
    async fn update_document_metadata(
        &self,
        dataset_id: &str,
        document_id: &str,
        metadata: &DocumentMetadata,
    ) -> Result<()> {
        let url = self.url(&format!("/datasets/{}/documents/{}", dataset_id, document_id));
        let body = MetadataRequest {
            meta_fields: metadata,
        };

        let request = self.request(HttpMethod::Put, url).json(&body)?;
        self.send_command(request).await?;
        debug!(fields = metadata.len(), "Updated document metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use mockall::mock;
    use mockall::Sequence;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    const API_BASE: &str = "http://localhost:9380/api/v1";

    fn json_response(body: serde_json::Value) -> Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn docs_page(start: usize, count: usize) -> serde_json::Value {
        let docs: Vec<_> = (start..start + count)
            .map(|i| json!({ "id": format!("doc-{}", i), "name": format!("file-{}.md", i) }))
            .collect();
        json!({ "code": 0, "data": { "docs": docs, "total": 0 } })
    }

    fn page_param(url: &str) -> usize {
        url.split("page=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .and_then(|page| page.parse().ok())
            .unwrap()
    }

    fn connector(mock: MockHttpClient) -> RagflowConnector {
        RagflowConnector::new(Arc::new(mock), API_BASE, "test_key")
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
    }

    /// Mock server holding `total` documents
    fn paging_server(total: usize, page_size: usize, calls: Arc<AtomicU32>) -> MockHttpClient {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().returning(move |req| {
            calls.fetch_add(1, Ordering::SeqCst);
            let page = page_param(&req.url);
            let start = (page - 1) * page_size;
            let count = total.saturating_sub(start).min(page_size);
            json_response(docs_page(start, count))
        });
        mock_http
    }

    #[tokio::test]
    async fn test_pagination_stops_on_short_page() {
        let calls = Arc::new(AtomicU32::new(0));
        let connector = connector(paging_server(65, 30, calls.clone()));

        let ids = connector
            .list_all_document_ids("ds-1", 30, &CancellationToken::new())
            .await;

        assert_eq!(ids.len(), 65);
        assert_eq!(ids[0], "doc-0");
        assert_eq!(ids[64], "doc-64");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_one_empty_page() {
        let calls = Arc::new(AtomicU32::new(0));
        let connector = connector(paging_server(60, 30, calls.clone()));

        let ids = connector
            .list_all_document_ids("ds-1", 30, &CancellationToken::new())
            .await;

        assert_eq!(ids.len(), 60);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_dataset_single_request() {
        let calls = Arc::new(AtomicU32::new(0));
        let connector = connector(paging_server(0, 30, calls.clone()));

        let ids = connector
            .list_all_document_ids("ds-1", 30, &CancellationToken::new())
            .await;

        assert!(ids.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_persistent_failure_bounded_to_four_attempts() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(4)
            .returning(|_| Err(BridgeError::Transport("Connection refused".to_string())));

        let ids = connector(mock_http)
            .list_all_document_ids("ds-1", 30, &CancellationToken::new())
            .await;

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_failure_after_first_page_keeps_accumulated() {
        let mut seq = Sequence::new();
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| json_response(docs_page(0, 30)));
        mock_http
            .expect_execute()
            .times(4)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(HttpResponse {
                    status: 200,
                    headers: HashMap::new(),
                    body: Bytes::from_static(b"<html>gateway</html>"),
                })
            });

        let ids = connector(mock_http)
            .list_all_document_ids("ds-1", 30, &CancellationToken::new())
            .await;

        assert_eq!(ids.len(), 30);
    }

    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let mut seq = Sequence::new();
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(HttpResponse {
                    status: 503,
                    headers: HashMap::new(),
                    body: Bytes::from_static(b"busy"),
                })
            });
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| json_response(docs_page(0, 2)));

        let ids = connector(mock_http)
            .list_all_document_ids("ds-1", 30, &CancellationToken::new())
            .await;

        assert_eq!(ids, vec!["doc-0", "doc-1"]);
    }

    #[tokio::test]
    async fn test_api_error_page_retried_to_bound() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            json_response(json!({ "code": 102, "message": "no such dataset" }))
        });

        let ids = connector(mock_http)
            .list_all_document_ids("ds-missing", 30, &CancellationToken::new())
            .await;

        assert!(ids.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_client_error_status_retried_to_bound() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse {
                status: 400,
                headers: HashMap::new(),
                body: Bytes::from_static(b"bad request"),
            })
        });

        let ids = connector(mock_http)
            .list_all_document_ids("ds-1", 30, &CancellationToken::new())
            .await;

        assert!(ids.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_client_error_then_success() {
        let mut seq = Sequence::new();
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| json_response(json!({ "code": 100, "message": "busy" })));
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| json_response(docs_page(0, 1)));

        let ids = connector(mock_http)
            .list_all_document_ids("ds-1", 30, &CancellationToken::new())
            .await;

        assert_eq!(ids, vec!["doc-0"]);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_listing() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);

        let token = CancellationToken::new();
        token.cancel();

        let ids = connector(mock_http)
            .list_all_document_ids("ds-1", 30, &token)
            .await;

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_backoff_stops_retries() {
        let token = CancellationToken::new();
        let cancel_from_mock = token.clone();

        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(move |_| {
            cancel_from_mock.cancel();
            Err(BridgeError::Transport("timed out".to_string()))
        });

        let connector = RagflowConnector::new(Arc::new(mock_http), API_BASE, "test_key")
            .with_retry_policy(RetryPolicy::new(3, Duration::from_secs(3600)));

        let ids = connector.list_all_document_ids("ds-1", 30, &token).await;
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_list_documents_converts_entries() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/datasets/ds-1/documents?page=1&page_size=30"));
            assert_eq!(
                req.headers.get("Authorization"),
                Some(&"Bearer test_key".to_string())
            );
            json_response(json!({
                "code": 0,
                "data": { "docs": [{
                    "id": "doc-1",
                    "name": "notes.md",
                    "create_time": 1728900000000i64,
                    "update_time": 1728900000000i64,
                    "meta_fields": { "sha1": "a9993e36", "file_name": "notes.md" }
                }]}
            }))
        });

        let docs = connector(mock_http)
            .list_documents("ds-1", 30, &CancellationToken::new())
            .await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "notes.md");
        assert_eq!(docs[0].created_at, Some(1_728_900_000));
        assert_eq!(docs[0].metadata.get("sha1").map(String::as_str), Some("a9993e36"));
    }

    #[tokio::test]
    async fn test_find_dataset_id_success() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Get);
            assert!(req.url.ends_with("/datasets?name=logseq%20notes"));
            json_response(json!({ "code": 0, "data": [{ "id": "ds-1", "name": "logseq notes" }] }))
        });

        let id = connector(mock_http).find_dataset_id("logseq notes").await.unwrap();
        assert_eq!(id, Some("ds-1".to_string()));
    }

    #[tokio::test]
    async fn test_find_dataset_id_miss() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| json_response(json!({ "code": 102, "message": "You don't own the dataset" })));

        let id = connector(mock_http).find_dataset_id("logseq_dataset").await.unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_find_dataset_id_transport_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Transport("Connection refused".to_string())));

        let result = connector(mock_http).find_dataset_id("logseq_dataset").await;
        assert!(matches!(result, Err(BridgeError::Transport(_))));
    }

    #[tokio::test]
    async fn test_create_dataset_sends_settings() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Post);
            let body: serde_json::Value =
                serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
            assert_eq!(body["name"], "logseq_dataset");
            assert_eq!(body["embedding_model"], "BAAI/bge-large-zh-v1.5");
            assert_eq!(body["chunk_method"], "naive");
            assert_eq!(body["parser_config"]["chunk_token_num"], 128);
            json_response(json!({ "code": 0, "data": { "id": "ds-new", "name": "logseq_dataset" } }))
        });

        let spec = DatasetSpec {
            name: "logseq_dataset".to_string(),
            description: None,
            embedding_model: "BAAI/bge-large-zh-v1.5".to_string(),
            chunk_method: "naive".to_string(),
            chunk_token_number: 128,
        };

        let id = connector(mock_http).create_dataset(&spec).await.unwrap();
        assert_eq!(id, "ds-new");
    }

    #[tokio::test]
    async fn test_create_dataset_api_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| json_response(json!({ "code": 103, "message": "duplicate name" })));

        let spec = DatasetSpec {
            name: "logseq_dataset".to_string(),
            description: None,
            embedding_model: "m".to_string(),
            chunk_method: "naive".to_string(),
            chunk_token_number: 128,
        };

        let result = connector(mock_http).create_dataset(&spec).await;
        assert!(matches!(result, Err(BridgeError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_update_parser_config_without_dataset_is_noop() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);

        let config = ParserConfig {
            chunk_token_number: 128,
            delimiter: "\\n".to_string(),
        };

        connector(mock_http)
            .update_parser_config(None, &config)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_parser_config_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Put);
            assert!(req.url.ends_with("/datasets/ds-1"));
            let body: serde_json::Value =
                serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
            assert_eq!(
                body,
                json!({ "parser_config": { "chunk_token_num": 256, "delimiter": "\\n!?" } })
            );
            json_response(json!({ "code": 0 }))
        });

        let config = ParserConfig {
            chunk_token_number: 256,
            delimiter: "\\n!?".to_string(),
        };

        connector(mock_http)
            .update_parser_config(Some("ds-1"), &config)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rename_dataset() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            let body: serde_json::Value =
                serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
            assert_eq!(body, json!({ "name": "journal" }));
            json_response(json!({ "code": 0 }))
        });

        connector(mock_http)
            .rename_dataset("ds-1", "journal")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_document_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "abc").unwrap();

        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/datasets/ds-1/documents"));
            let part = req.multipart.as_ref().unwrap();
            assert_eq!(part.field_name, "file");
            assert_eq!(part.file_name, "notes.md");
            assert_eq!(&part.content[..], b"abc");
            json_response(json!({ "code": 0, "data": [{ "id": "doc-9", "name": "notes.md" }] }))
        });

        let response = connector(mock_http)
            .upload_document("ds-1", &path)
            .await
            .unwrap();

        assert_eq!(response.document_id(), Ok("doc-9".to_string()));
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);

        let dir = tempfile::tempdir().unwrap();
        let result = connector(mock_http)
            .upload_document("ds-1", &dir.path().join("gone.md"))
            .await;

        assert!(matches!(result, Err(BridgeError::Io(_))));
    }

    #[tokio::test]
    async fn test_upload_rejected_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "abc").unwrap();

        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 413,
                headers: HashMap::new(),
                body: Bytes::from_static(b"too large"),
            })
        });

        let result = connector(mock_http).upload_document("ds-1", &path).await;
        assert!(matches!(result, Err(BridgeError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_trigger_parse_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/datasets/ds-1/chunks"));
            let body: serde_json::Value =
                serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
            assert_eq!(body, json!({ "document_ids": ["doc-1"] }));
            json_response(json!({ "code": 0 }))
        });

        connector(mock_http)
            .trigger_parse("ds-1", "doc-1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_document_metadata_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Put);
            assert!(req.url.ends_with("/datasets/ds-1/documents/doc-1"));
            let body: serde_json::Value =
                serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
            assert_eq!(body["meta_fields"]["sha1"], "a9993e36");
            json_response(json!({ "code": 0 }))
        });

        let mut metadata = DocumentMetadata::new();
        metadata.insert("sha1".to_string(), "a9993e36".to_string());

        connector(mock_http)
            .update_document_metadata("ds-1", "doc-1", &metadata)
            .await
            .unwrap();
    }
}
