//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (document store,
//! file discovery) into the sync core and exposes the operations a front end
//! needs: run a batch, list remote documents, inspect local sync state and
//! rename the dataset. Desktop hosts enable the `desktop-shims` feature, which
//! builds the reqwest-backed RAGFlow connector and the local directory walker
//! from a [`SyncConfig`].

pub mod error;

pub use error::{CoreError, Result};

use std::path::PathBuf;
use std::sync::Arc;

use bridge_traits::storage::{DocumentStore, FileDiscovery, RemoteDocument};
use core_async::sync::CancellationToken;
use core_runtime::config::SyncConfig;
use core_sync::{FileRecord, SyncEngine, SyncReport, SyncStateStore};
use tracing::{info, instrument};

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub store: Arc<dyn DocumentStore>,
    pub discovery: Arc<dyn FileDiscovery>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(store: Arc<dyn DocumentStore>, discovery: Arc<dyn FileDiscovery>) -> Self {
        Self { store, discovery }
    }

    /// Build the desktop adapters: reqwest transport, RAGFlow connector and
    /// local directory discovery.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop(config: &SyncConfig) -> Result<Self> {
        use bridge_desktop::{LocalFileDiscovery, ReqwestHttpClient};
        use provider_ragflow::RagflowConnector;

        let http_client = ReqwestHttpClient::with_timeout(config.request_timeout)
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

        let connector = RagflowConnector::new(
            Arc::new(http_client),
            config.api_base(),
            config.api_key.clone(),
        )
        .with_retry_policy(config.retry_policy())
        .with_request_timeout(config.request_timeout);

        Ok(Self::new(
            Arc::new(connector),
            Arc::new(LocalFileDiscovery::new()),
        ))
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<SyncConfig>,
    deps: Arc<CoreDependencies>,
    state: Arc<SyncStateStore>,
}

impl CoreService {
    /// Create a new service, loading the sync state snapshot named in `config`.
    pub async fn new(config: SyncConfig, deps: CoreDependencies) -> Self {
        let state = SyncStateStore::load(&config.state_file).await;
        Self {
            config: Arc::new(config),
            deps: Arc::new(deps),
            state: Arc::new(state),
        }
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one sync batch.
    pub async fn sync(&self, cancel: &CancellationToken) -> Result<SyncReport> {
        let engine = SyncEngine::new(
            (*self.config).clone(),
            Arc::clone(&self.deps.store),
            Arc::clone(&self.deps.discovery),
            Arc::clone(&self.state),
        );
        Ok(engine.run_batch(cancel).await?)
    }

    /// Every document currently in the configured dataset.
    #[instrument(skip(self, cancel), fields(dataset = %self.config.dataset_name))]
    pub async fn list_documents(&self, cancel: &CancellationToken) -> Result<Vec<RemoteDocument>> {
        let dataset_id = self.dataset_id().await?;
        let documents = self
            .deps
            .store
            .list_documents(&dataset_id, self.config.page_size, cancel)
            .await;
        info!(count = documents.len(), "Listed documents");
        Ok(documents)
    }

    /// Locally tracked files, in path order.
    pub async fn status(&self) -> Vec<(PathBuf, FileRecord)> {
        self.state.records().await
    }

    /// Rename the configured dataset. Returns the dataset id.
    ///
    /// The service keeps using the configured name afterwards, so later
    /// calls on this instance will not find the renamed dataset.
    #[instrument(skip(self), fields(dataset = %self.config.dataset_name))]
    pub async fn rename_dataset(&self, new_name: &str) -> Result<String> {
        let dataset_id = self.dataset_id().await?;
        self.deps.store.rename_dataset(&dataset_id, new_name).await?;
        info!(dataset_id = %dataset_id, new_name, "Renamed dataset");
        Ok(dataset_id)
    }

    async fn dataset_id(&self) -> Result<String> {
        self.deps
            .store
            .find_dataset_id(&self.config.dataset_name)
            .await?
            .ok_or_else(|| CoreError::DatasetNotFound(self.config.dataset_name.clone()))
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use core_runtime::config::SyncConfig;
/// use core_service::bootstrap_desktop;
///
/// let config = SyncConfig::builder()
///     .api_key("ragflow-key")
///     .import_dir("/home/me/notes")
///     .build()?;
/// let core = bootstrap_desktop(config).await?;
/// println!("{} files tracked", core.status().await.len());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(config: SyncConfig) -> Result<CoreService> {
    let deps = CoreDependencies::desktop(&config)?;
    Ok(CoreService::new(config, deps).await)
}
