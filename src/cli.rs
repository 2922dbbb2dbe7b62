use clap::{Args, Parser, Subcommand};
use core_runtime::config::{SyncConfig, SyncConfigBuilder};
use core_runtime::logging::{LogFormat, LogLevel, LoggingConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Sync a local document tree into a RAGFlow dataset
#[derive(Debug, Parser)]
#[command(name = "docsync", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub sync: SyncArgs,

    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload new and changed files, then request parsing
    Sync {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List documents in the remote dataset
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show locally tracked files
    Status,
    /// Rename the remote dataset
    RenameDataset { new_name: String },
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Remote dataset name
    #[arg(long, global = true, env = "RAGFLOW_DATASET")]
    pub dataset: Option<String>,

    /// Directory to import from [default: ~/LLM_RAG/Logseq]
    #[arg(long, global = true, env = "DOCSYNC_IMPORT_DIR")]
    pub import_dir: Option<PathBuf>,

    /// RAGFlow server URL
    #[arg(long, global = true, env = "RAGFLOW_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, env = "RAGFLOW_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Accepted extensions, comma separated
    #[arg(long, global = true, value_delimiter = ',')]
    pub extensions: Vec<String>,

    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Extra attempts per listing page
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Seconds between listing retries
    #[arg(long, global = true)]
    pub retry_backoff: Option<u64>,

    /// Milliseconds between parse requests
    #[arg(long, global = true)]
    pub parse_delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[arg(long, global = true)]
    pub chunk_tokens: Option<u32>,

    /// Process at most this many files (debugging)
    #[arg(long, global = true)]
    pub max_files: Option<usize>,

    /// Concurrent uploads
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Sync state snapshot
    #[arg(long, global = true, env = "DOCSYNC_STATE_FILE")]
    pub state_file: Option<PathBuf>,
}

impl SyncArgs {
    pub fn to_config(&self) -> core_runtime::Result<SyncConfig> {
        self.apply(SyncConfig::builder()).build()
    }

    fn apply(&self, mut builder: SyncConfigBuilder) -> SyncConfigBuilder {
        if let Some(name) = &self.dataset {
            builder = builder.dataset_name(name);
        }
        if let Some(dir) = &self.import_dir {
            builder = builder.import_dir(dir);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if !self.extensions.is_empty() {
            builder = builder.file_extensions(&self.extensions);
        }
        if let Some(size) = self.page_size {
            builder = builder.page_size(size);
        }
        if let Some(retries) = self.max_retries {
            builder = builder.max_retries(retries);
        }
        if let Some(secs) = self.retry_backoff {
            builder = builder.retry_backoff(Duration::from_secs(secs));
        }
        if let Some(ms) = self.parse_delay_ms {
            builder = builder.parse_delay(Duration::from_millis(ms));
        }
        if let Some(secs) = self.timeout {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(tokens) = self.chunk_tokens {
            builder = builder.chunk_token_number(tokens);
        }
        if let Some(cap) = self.max_files {
            builder = builder.max_files(cap);
        }
        if let Some(workers) = self.workers {
            builder = builder.max_concurrent_uploads(workers);
        }
        if let Some(path) = &self.state_file {
            builder = builder.state_file(path);
        }
        builder
    }
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// trace, debug, info, warn or error
    #[arg(long, global = true, env = "DOCSYNC_LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// pretty, json or compact
    #[arg(long, global = true, env = "DOCSYNC_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Raw filter directives, overriding RUST_LOG
    #[arg(long, global = true)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    pub fn to_logging_config(&self) -> LoggingConfig {
        let mut config = LoggingConfig::default().with_level(self.log_level);
        if let Some(format) = self.log_format {
            config = config.with_format(format);
        }
        if let Some(filter) = &self.log_filter {
            config = config.with_filter(filter);
        }
        config
    }
}
