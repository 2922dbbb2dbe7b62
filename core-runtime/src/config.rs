//! # Sync Configuration
//!
//! Provides configuration management for DocSync.
//!
//! ## Overview
//!
//! A [`SyncConfig`] is built once at startup through [`SyncConfigBuilder`] and
//! passed by reference into the gateway and the engine. Nothing reads
//! configuration from globals. The builder fills in the defaults the original
//! import scripts used and validates everything before handing out a config,
//! so a misconfigured run fails before it touches the network.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::SyncConfig;
//! use std::time::Duration;
//!
//! let config = SyncConfig::builder()
//!     .api_key("ragflow-key")
//!     .import_dir("/home/me/LLM_RAG/Logseq")
//!     .dataset_name("logseq_dataset")
//!     .page_size(50)
//!     .retry_backoff(Duration::from_secs(2))
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.page_size, 50);
//! ```
//!
//! ## Error Handling
//!
//! The builder returns actionable messages when something is missing:
//!
//! ```should_panic
//! use core_runtime::config::SyncConfig;
//!
//! // No API key
//! let config = SyncConfig::builder()
//!     .import_dir("/tmp/docs")
//!     .build()
//!     .expect("Should fail - missing API key");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{DatasetSpec, ParserConfig, RetryPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATASET_NAME: &str = "logseq_dataset";
pub const DEFAULT_DATASET_DESCRIPTION: &str = "This is a Logseq dataset";
pub const DEFAULT_BASE_URL: &str = "http://localhost:9380";
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-large-zh-v1.5";
pub const DEFAULT_CHUNK_METHOD: &str = "naive";
pub const DEFAULT_CHUNK_TOKEN_NUMBER: u32 = 128;
pub const DEFAULT_DELIMITER: &str = "\\n!?;。；！？";
pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_PARSE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_STATE_FILE: &str = "file_state.json";
pub const DEFAULT_EXTENSIONS: &[&str] = &[".md", ".docx", ".pptx", ".pdf", ".txt"];

const MAX_PAGE_SIZE: u32 = 1024;
const MAX_CONCURRENT_UPLOADS: usize = 32;

/// Everything one sync run needs to know.
#[derive(Clone)]
pub struct SyncConfig {
    /// Name of the remote dataset to sync into
    pub dataset_name: String,

    /// Description used when the dataset has to be created
    pub dataset_description: Option<String>,

    /// Root of the local document tree
    pub import_dir: PathBuf,

    /// Remote store base URL, without the `/api/v1` suffix
    pub base_url: String,

    /// Bearer token for the remote store
    pub api_key: String,

    /// Accepted file name suffixes, each with a leading dot
    pub file_extensions: Vec<String>,

    /// Embedding model used when creating the dataset
    pub embedding_model: String,

    /// Chunking strategy used when creating the dataset
    pub chunk_method: String,

    /// Target tokens per chunk
    pub chunk_token_number: u32,

    /// Chunk delimiter characters
    pub delimiter: String,

    /// Documents per listing page
    pub page_size: u32,

    /// Additional attempts per listing page after the first failure
    pub max_retries: u32,

    /// Fixed delay before each listing retry
    pub retry_backoff: Duration,

    /// Delay between consecutive parse triggers
    pub parse_delay: Duration,

    /// Per-request network timeout
    pub request_timeout: Duration,

    /// Debug cap on the number of files considered per run
    pub max_files: Option<usize>,

    /// Upper bound on files hashed/uploaded at once
    pub max_concurrent_uploads: usize,

    /// Location of the persisted sync state snapshot
    pub state_file: PathBuf,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("dataset_name", &self.dataset_name)
            .field("dataset_description", &self.dataset_description)
            .field("import_dir", &self.import_dir)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("file_extensions", &self.file_extensions)
            .field("embedding_model", &self.embedding_model)
            .field("chunk_method", &self.chunk_method)
            .field("chunk_token_number", &self.chunk_token_number)
            .field("delimiter", &self.delimiter)
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("parse_delay", &self.parse_delay)
            .field("request_timeout", &self.request_timeout)
            .field("max_files", &self.max_files)
            .field("max_concurrent_uploads", &self.max_concurrent_uploads)
            .field("state_file", &self.state_file)
            .finish()
    }
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.dataset_name.trim().is_empty() {
            return Err(Error::Config("Dataset name must not be empty".to_string()));
        }

        if self.api_key.trim().is_empty() {
            return Err(Error::Config(
                "API key is required. Use .api_key() or set RAGFLOW_API_KEY.".to_string(),
            ));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Base URL must start with http:// or https:// (got '{}')",
                self.base_url
            )));
        }

        if self.file_extensions.is_empty() {
            return Err(Error::Config(
                "At least one file extension must be accepted".to_string(),
            ));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "Page size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, self.page_size
            )));
        }

        if self.chunk_token_number == 0 {
            return Err(Error::Config(
                "Chunk token number must be greater than zero".to_string(),
            ));
        }

        if self.max_concurrent_uploads == 0 || self.max_concurrent_uploads > MAX_CONCURRENT_UPLOADS
        {
            return Err(Error::Config(format!(
                "Concurrent uploads must be between 1 and {} (got {})",
                MAX_CONCURRENT_UPLOADS, self.max_concurrent_uploads
            )));
        }

        if self.max_files == Some(0) {
            return Err(Error::Config(
                "File cap of 0 would skip every file; omit it instead".to_string(),
            ));
        }

        Ok(())
    }

    /// Remote API root (`{base_url}/api/v1`)
    pub fn api_base(&self) -> String {
        format!("{}/api/v1", self.base_url.trim_end_matches('/'))
    }

    /// Parameters for creating the dataset on first run
    pub fn dataset_spec(&self) -> DatasetSpec {
        DatasetSpec {
            name: self.dataset_name.clone(),
            description: self.dataset_description.clone(),
            embedding_model: self.embedding_model.clone(),
            chunk_method: self.chunk_method.clone(),
            chunk_token_number: self.chunk_token_number,
        }
    }

    /// Chunking parameters re-applied on every run
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            chunk_token_number: self.chunk_token_number,
            delimiter: self.delimiter.clone(),
        }
    }

    /// Retry bound for paginated listings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_backoff)
    }
}

/// `$HOME/LLM_RAG/Logseq`, the import root the original scripts used.
pub fn default_import_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("LLM_RAG").join("Logseq"))
}

fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return None;
    }
    if ext.starts_with('.') {
        Some(ext.to_string())
    } else {
        Some(format!(".{}", ext))
    }
}

/// Builder for constructing [`SyncConfig`] instances.
#[derive(Default)]
pub struct SyncConfigBuilder {
    dataset_name: Option<String>,
    dataset_description: Option<String>,
    import_dir: Option<PathBuf>,
    base_url: Option<String>,
    api_key: Option<String>,
    file_extensions: Option<Vec<String>>,
    embedding_model: Option<String>,
    chunk_method: Option<String>,
    chunk_token_number: Option<u32>,
    delimiter: Option<String>,
    page_size: Option<u32>,
    max_retries: Option<u32>,
    retry_backoff: Option<Duration>,
    parse_delay: Option<Duration>,
    request_timeout: Option<Duration>,
    max_files: Option<usize>,
    max_concurrent_uploads: Option<usize>,
    state_file: Option<PathBuf>,
}

impl SyncConfigBuilder {
    pub fn dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = Some(name.into());
        self
    }

    pub fn dataset_description(mut self, description: impl Into<String>) -> Self {
        self.dataset_description = Some(description.into());
        self
    }

    /// Sets the import directory (defaults to `$HOME/LLM_RAG/Logseq`).
    pub fn import_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.import_dir = Some(path.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets accepted extensions; a missing leading dot is added.
    pub fn file_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.file_extensions = Some(
            extensions
                .into_iter()
                .filter_map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        );
        self
    }

    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    pub fn chunk_method(mut self, method: impl Into<String>) -> Self {
        self.chunk_method = Some(method.into());
        self
    }

    pub fn chunk_token_number(mut self, tokens: u32) -> Self {
        self.chunk_token_number = Some(tokens);
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn retry_backoff(mut self, delay: Duration) -> Self {
        self.retry_backoff = Some(delay);
        self
    }

    pub fn parse_delay(mut self, delay: Duration) -> Self {
        self.parse_delay = Some(delay);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Limits how many discovered files a run considers. Meant for debugging.
    pub fn max_files(mut self, cap: usize) -> Self {
        self.max_files = Some(cap);
        self
    }

    pub fn max_concurrent_uploads(mut self, workers: usize) -> Self {
        self.max_concurrent_uploads = Some(workers);
        self
    }

    pub fn state_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.state_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds the final `SyncConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No API key was provided
    /// - No import directory was provided and `$HOME` is unknown
    /// - Any value fails [`SyncConfig::validate`]
    pub fn build(self) -> Result<SyncConfig> {
        let import_dir = match self.import_dir {
            Some(dir) => dir,
            None => default_import_dir().ok_or_else(|| {
                Error::Config(
                    "Import directory is required. Use .import_dir() to set it.".to_string(),
                )
            })?,
        };

        let config = SyncConfig {
            dataset_name: self
                .dataset_name
                .unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string()),
            dataset_description: self
                .dataset_description
                .or_else(|| Some(DEFAULT_DATASET_DESCRIPTION.to_string())),
            import_dir,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: self.api_key.unwrap_or_default(),
            file_extensions: self.file_extensions.unwrap_or_else(|| {
                DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
            }),
            embedding_model: self
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            chunk_method: self
                .chunk_method
                .unwrap_or_else(|| DEFAULT_CHUNK_METHOD.to_string()),
            chunk_token_number: self
                .chunk_token_number
                .unwrap_or(DEFAULT_CHUNK_TOKEN_NUMBER),
            delimiter: self
                .delimiter
                .unwrap_or_else(|| DEFAULT_DELIMITER.to_string()),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_backoff: self.retry_backoff.unwrap_or(DEFAULT_RETRY_BACKOFF),
            parse_delay: self.parse_delay.unwrap_or(DEFAULT_PARSE_DELAY),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            max_files: self.max_files,
            max_concurrent_uploads: self.max_concurrent_uploads.unwrap_or(1),
            state_file: self
                .state_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> SyncConfigBuilder {
        SyncConfig::builder()
            .api_key("test-key")
            .import_dir("/tmp/docs")
    }

    #[test]
    fn test_defaults_match_import_scripts() {
        let config = minimal().build().unwrap();

        assert_eq!(config.dataset_name, "logseq_dataset");
        assert_eq!(config.base_url, "http://localhost:9380");
        assert_eq!(config.embedding_model, "BAAI/bge-large-zh-v1.5");
        assert_eq!(config.chunk_method, "naive");
        assert_eq!(config.page_size, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_backoff, Duration::from_secs(5));
        assert_eq!(config.state_file, PathBuf::from("file_state.json"));
        assert_eq!(config.max_concurrent_uploads, 1);
        assert!(config.max_files.is_none());
        assert_eq!(
            config.file_extensions,
            vec![".md", ".docx", ".pptx", ".pdf", ".txt"]
        );
    }

    #[test]
    fn test_builder_requires_api_key() {
        let result = SyncConfig::builder().import_dir("/tmp/docs").build();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key is required"));
    }

    #[test]
    fn test_validate_rejects_empty_dataset_name() {
        let result = minimal().dataset_name("  ").build();
        assert!(result.unwrap_err().to_string().contains("Dataset name"));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let result = minimal().page_size(0).build();
        assert!(result.unwrap_err().to_string().contains("Page size"));
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let result = minimal().base_url("localhost:8989").build();
        assert!(result.unwrap_err().to_string().contains("http://"));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let result = minimal().max_concurrent_uploads(0).build();
        assert!(result.unwrap_err().to_string().contains("Concurrent uploads"));
    }

    #[test]
    fn test_validate_rejects_zero_file_cap() {
        let result = minimal().max_files(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = minimal().file_extensions(["md", ".txt", " ", "."]).build().unwrap();
        assert_eq!(config.file_extensions, vec![".md", ".txt"]);
    }

    #[test]
    fn test_empty_extension_list_rejected() {
        let result = minimal().file_extensions(Vec::<String>::new()).build();
        assert!(result.unwrap_err().to_string().contains("extension"));
    }

    #[test]
    fn test_api_base_trims_trailing_slash() {
        let config = minimal().base_url("http://ragflow.local/").build().unwrap();
        assert_eq!(config.api_base(), "http://ragflow.local/api/v1");
    }

    #[test]
    fn test_derived_remote_parameters() {
        let config = minimal()
            .chunk_token_number(256)
            .delimiter("\\n")
            .max_retries(5)
            .retry_backoff(Duration::from_millis(10))
            .build()
            .unwrap();

        let spec = config.dataset_spec();
        assert_eq!(spec.name, "logseq_dataset");
        assert_eq!(spec.chunk_token_number, 256);

        let parser = config.parser_config();
        assert_eq!(parser.delimiter, "\\n");

        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.backoff, Duration::from_millis(10));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = minimal().api_key("super-secret").build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
