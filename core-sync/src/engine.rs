//! # Sync Engine
//!
//! Runs one synchronization batch from a local directory into a remote
//! dataset.
//!
//! ## Workflow
//!
//! 1. **Dataset**: look the dataset up by name, create it on a miss, then
//!    re-apply the parser configuration. Failing to resolve or create the
//!    dataset aborts the batch.
//! 2. **Discovery**: enumerate candidate files (optionally capped).
//! 3. **Files**: for each file, skip it if its fingerprint is unchanged;
//!    otherwise upload, record and tag it. Failures stay with that file.
//! 4. **Parse**: if anything was uploaded, list every document id in the
//!    dataset and request parsing for each, one call per `parse_delay`.
//!
//! Cancellation is checked between files, between pages and between parse
//! triggers. A cancelled batch returns a partial [`SyncReport`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! let engine = SyncEngine::new(config, store, discovery, state);
//! let report = engine.run_batch(&CancellationToken::new()).await?;
//! println!("{} uploaded", report.uploaded_count());
//! ```

use crate::job::{FileJob, FileOutcome};
use crate::state::SyncStateStore;
use crate::{Result, SyncError};
use bridge_traits::storage::{DocumentMetadata, DocumentStore, FileDiscovery};
use core_async::sync::CancellationToken;
use core_async::time::sleep_or_cancel;
use core_runtime::config::SyncConfig;
use core_runtime::logging::file_label;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Metadata key holding the content fingerprint
pub const METADATA_SHA1: &str = "sha1";

/// Metadata key holding the file name
pub const METADATA_FILE_NAME: &str = "file_name";

// ============================================================================
// Report Types
// ============================================================================

/// Outcome of one file in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Result of [`SyncEngine::run_batch`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub dataset_id: String,
    /// Files in path order; files not reached before cancellation are absent
    pub files: Vec<FileReport>,
    pub parse_triggers_attempted: usize,
    pub parse_triggers_succeeded: usize,
    pub cancelled: bool,
}

impl SyncReport {
    fn count(&self, label: &str) -> usize {
        self.files
            .iter()
            .filter(|file| file.outcome.label() == label)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.count("skipped")
    }

    pub fn uploaded_count(&self) -> usize {
        self.count("uploaded")
    }

    pub fn failed_count(&self) -> usize {
        self.count("failed")
    }
}

#[derive(Debug, Default)]
struct ParseSummary {
    attempted: usize,
    succeeded: usize,
    triggered: HashSet<String>,
}

// ============================================================================
// Engine
// ============================================================================

/// Orchestrates one batch over injected collaborators.
pub struct SyncEngine {
    config: SyncConfig,
    store: Arc<dyn DocumentStore>,
    discovery: Arc<dyn FileDiscovery>,
    state: Arc<SyncStateStore>,
}

impl SyncEngine {
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn DocumentStore>,
        discovery: Arc<dyn FileDiscovery>,
        state: Arc<SyncStateStore>,
    ) -> Self {
        Self {
            config,
            store,
            discovery,
            state,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<SyncStateStore> {
        &self.state
    }

    /// Run one batch.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Cancelled`] if `cancel` fired before the batch started
    /// - [`SyncError::DatasetUnavailable`] if the dataset cannot be resolved
    ///   or created
    /// - [`SyncError::Discovery`] if the import directory cannot be read
    ///
    /// Per-file, metadata and parse failures never surface here; they are
    /// logged and reported in the returned [`SyncReport`].
    #[instrument(skip(self, cancel), fields(dataset = %self.config.dataset_name))]
    pub async fn run_batch(&self, cancel: &CancellationToken) -> Result<SyncReport> {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        info!("Phase 1: Resolving dataset");
        let dataset_id = self.ensure_dataset().await?;

        info!("Phase 2: Discovering files");
        let files = self.discover_files().await?;

        info!(
            "Phase 3: Processing {} files with {} worker(s)",
            files.len(),
            self.config.max_concurrent_uploads
        );
        let mut jobs: Vec<FileJob> = stream::iter(files)
            .map(|path| self.process_file(&dataset_id, path, cancel))
            .buffer_unordered(self.config.max_concurrent_uploads.max(1))
            .filter_map(|job| async move { job })
            .collect()
            .await;
        jobs.sort_by(|a, b| a.path.cmp(&b.path));

        let uploads = jobs.iter().filter(|job| job.upload_accepted).count();
        let mut summary = ParseSummary::default();

        if cancel.is_cancelled() {
            warn!("Batch cancelled, skipping parse triggers");
        } else if uploads == 0 {
            info!("No uploads this batch, skipping parse triggers");
        } else {
            info!("Phase 4: Triggering parse after {} upload(s)", uploads);
            summary = self.trigger_parse_all(&dataset_id, cancel).await;
        }

        for job in jobs.iter_mut() {
            let triggered = job
                .document_id
                .as_ref()
                .is_some_and(|id| summary.triggered.contains(id));
            if triggered {
                if let Err(e) = job.mark_parse_triggered() {
                    debug!(path = ?job.path, error = %e, "Parse state not updated");
                }
            }
        }

        let report = SyncReport {
            dataset_id,
            files: jobs
                .iter()
                .map(|job| FileReport {
                    path: job.path.clone(),
                    outcome: job.outcome(),
                })
                .collect(),
            parse_triggers_attempted: summary.attempted,
            parse_triggers_succeeded: summary.succeeded,
            cancelled: cancel.is_cancelled(),
        };

        info!(
            uploaded = report.uploaded_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            parse_triggers = report.parse_triggers_attempted,
            cancelled = report.cancelled,
            "Batch finished"
        );

        Ok(report)
    }

    /// Look up the dataset, creating it when missing, and apply parser settings.
    #[instrument(skip(self))]
    pub async fn ensure_dataset(&self) -> Result<String> {
        let name = &self.config.dataset_name;
        let unavailable = |reason: String| SyncError::DatasetUnavailable {
            name: name.clone(),
            reason,
        };

        let dataset_id = match self.store.find_dataset_id(name).await {
            Ok(Some(id)) => {
                info!(dataset_id = %id, "Using existing dataset");
                id
            }
            Ok(None) => {
                let id = self
                    .store
                    .create_dataset(&self.config.dataset_spec())
                    .await
                    .map_err(|e| unavailable(format!("creation failed: {}", e)))?;
                info!(dataset_id = %id, "Created dataset");
                id
            }
            Err(e) => {
                error!(error = %e, "Dataset lookup failed");
                return Err(unavailable(format!("lookup failed: {}", e)));
            }
        };

        if let Err(e) = self
            .store
            .update_parser_config(Some(&dataset_id), &self.config.parser_config())
            .await
        {
            warn!(error = %e, "Failed to apply parser configuration, continuing");
        }

        Ok(dataset_id)
    }

    async fn discover_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = self
            .discovery
            .discover(&self.config.import_dir, &self.config.file_extensions)
            .await
            .map_err(|e| SyncError::Discovery(e.to_string()))?;

        info!("Discovered {} candidate files", files.len());

        if let Some(cap) = self.config.max_files {
            if files.len() > cap {
                info!("Limiting batch to the first {} files", cap);
                files.truncate(cap);
            }
        }

        Ok(files)
    }

    /// Run one file through skip/upload/record/tag. `None` if cancelled first.
    #[instrument(skip(self, dataset_id, cancel), fields(file = %file_label(&path)))]
    async fn process_file(
        &self,
        dataset_id: &str,
        path: PathBuf,
        cancel: &CancellationToken,
    ) -> Option<FileJob> {
        if cancel.is_cancelled() {
            return None;
        }

        let mut job = FileJob::new(path);
        if let Err(e) = self.advance(&mut job, dataset_id).await {
            error!(error = %e, "File job left in an unexpected state");
        }
        Some(job)
    }

    async fn advance(&self, job: &mut FileJob, dataset_id: &str) -> Result<()> {
        if !self.state.should_upload(&job.path).await {
            debug!("Unchanged, skipping");
            return job.skip();
        }

        job.begin_upload()?;

        let response = match self.store.upload_document(dataset_id, &job.path).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Upload failed");
                return job.fail(format!("upload failed: {}", e));
            }
        };
        job.mark_upload_accepted();

        let document_id = match response.document_id() {
            Ok(id) => id,
            Err(e) => {
                // Without an id nothing is recorded, so the next run retries the file
                warn!(error = %e, response = %response.raw, "Upload response has no document id");
                return job.fail(format!("no document id in upload response: {}", e));
            }
        };

        let fingerprint = match self
            .state
            .add_file(&job.path, Some(document_id.clone()), None)
            .await
        {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                warn!(error = %e, "Uploaded but sync state not saved");
                None
            }
        };

        let metadata = document_metadata(&job.path, fingerprint.as_deref());
        let metadata_applied = match self
            .store
            .update_document_metadata(dataset_id, &document_id, &metadata)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(document_id = %document_id, error = %e, "Metadata update failed");
                false
            }
        };

        info!(document_id = %document_id, "Uploaded");
        job.tag(document_id, fingerprint, metadata_applied)
    }

    /// Request parsing for every document in the dataset.
    async fn trigger_parse_all(&self, dataset_id: &str, cancel: &CancellationToken) -> ParseSummary {
        let ids = self
            .store
            .list_all_document_ids(dataset_id, self.config.page_size, cancel)
            .await;
        info!("Requesting parse for {} documents", ids.len());

        let mut summary = ParseSummary::default();
        for (index, id) in ids.into_iter().enumerate() {
            if index > 0 && !sleep_or_cancel(self.config.parse_delay, cancel).await {
                warn!("Parse triggers interrupted by cancellation");
                break;
            }
            if cancel.is_cancelled() {
                break;
            }

            summary.attempted += 1;
            match self.store.trigger_parse(dataset_id, &id).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    summary.triggered.insert(id);
                }
                Err(e) => warn!(document_id = %id, error = %e, "Parse trigger failed"),
            }
        }

        summary
    }
}

/// Tags attached to every uploaded document
pub fn document_metadata(path: &Path, fingerprint: Option<&str>) -> DocumentMetadata {
    let mut metadata = DocumentMetadata::new();
    metadata.insert(METADATA_FILE_NAME.to_string(), file_label(path));
    if let Some(fingerprint) = fingerprint {
        metadata.insert(METADATA_SHA1.to_string(), fingerprint.to_string());
    }
    metadata
}
