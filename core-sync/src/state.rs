//! # Sync State Store
//!
//! Remembers, per local file path, which content was last uploaded and which
//! remote document it became.
//!
//! ## Persistence
//!
//! The whole map is written as one JSON object keyed by path:
//!
//! ```json
//! {
//!   "/home/me/LLM_RAG/Logseq/notes.md": {
//!     "basename": "notes.md",
//!     "sha1": "a9993e364706816aba3e25717850c26c9cd0d89d",
//!     "document_id": "doc-1",
//!     "cosine_similarity": null
//!   }
//! }
//! ```
//!
//! Every mutation rewrites the snapshot (temporary file, then rename), so a
//! crash mid-batch loses at most the file that was in flight. A missing or
//! unreadable snapshot starts an empty state instead of failing the run.

use crate::hasher::fingerprint;
use crate::{Result, SyncError};
use core_async::fs;
use core_async::sync::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What is known about one previously synced file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub basename: String,

    /// Hex digest of the content at the last successful upload
    #[serde(rename = "sha1")]
    pub fingerprint: String,

    /// Assigned by the remote store; `None` means "unknown id", not "untracked"
    #[serde(rename = "document_id", default)]
    pub remote_document_id: Option<String>,

    #[serde(rename = "cosine_similarity", default)]
    pub similarity_score: Option<f64>,
}

type Snapshot = BTreeMap<String, FileRecord>;

fn record_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| record_key(path))
}

/// Persisted path → [`FileRecord`] map.
///
/// All access goes through an async mutex; writes are serialized and each one
/// is flushed before the lock is released.
#[derive(Debug)]
pub struct SyncStateStore {
    snapshot_path: PathBuf,
    records: Mutex<Snapshot>,
}

impl SyncStateStore {
    /// Load the snapshot at `snapshot_path`, or start empty.
    pub async fn load(snapshot_path: impl Into<PathBuf>) -> Self {
        let snapshot_path = snapshot_path.into();

        let records = match fs::read(&snapshot_path).await {
            Ok(bytes) => match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(records) => {
                    info!(path = ?snapshot_path, records = records.len(), "Loaded sync state");
                    records
                }
                Err(e) => {
                    error!(
                        path = ?snapshot_path,
                        error = %e,
                        "Sync state is corrupt, starting from an empty state"
                    );
                    Snapshot::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = ?snapshot_path, "No sync state yet, starting fresh");
                Snapshot::new()
            }
            Err(e) => {
                warn!(
                    path = ?snapshot_path,
                    error = %e,
                    "Cannot read sync state, starting from an empty state"
                );
                Snapshot::new()
            }
        };

        Self {
            snapshot_path,
            records: Mutex::new(records),
        }
    }

    /// Where the snapshot is written
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Whether `path` needs uploading.
    ///
    /// True when the file is untracked, its content changed, or it cannot be
    /// hashed (an unreadable file is assumed changed).
    pub async fn should_upload(&self, path: &Path) -> bool {
        let current = match fingerprint(path).await {
            Ok(digest) => digest,
            Err(e) => {
                warn!(error = %e, "Cannot fingerprint file, assuming it changed");
                return true;
            }
        };

        let records = self.records.lock().await;
        match records.get(&record_key(path)) {
            None => true,
            Some(record) => record.fingerprint != current,
        }
    }

    /// Record `path` with its current fingerprint and persist.
    ///
    /// Returns the fingerprint that was stored, or `None` when the file could
    /// not be hashed (nothing is recorded in that case).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StatePersistence`] if the snapshot cannot be
    /// written. Nothing is recorded in memory either, so the file is still
    /// treated as changed.
    pub async fn add_file(
        &self,
        path: &Path,
        remote_document_id: Option<String>,
        similarity_score: Option<f64>,
    ) -> Result<Option<String>> {
        let digest = match fingerprint(path).await {
            Ok(digest) => digest,
            Err(e) => {
                warn!(error = %e, "Cannot fingerprint file, not recording it");
                return Ok(None);
            }
        };

        let mut records = self.records.lock().await;
        let mut next = records.clone();
        next.insert(
            record_key(path),
            FileRecord {
                basename: basename(path),
                fingerprint: digest.clone(),
                remote_document_id,
                similarity_score,
            },
        );
        self.persist(&next).await?;
        *records = next;

        debug!(path = ?path, sha1 = %digest, "Recorded file");
        Ok(Some(digest))
    }

    /// Replace the remote id of a tracked file and persist.
    ///
    /// Returns `false` (and logs) when `path` is not tracked.
    pub async fn update_document_id(&self, path: &Path, new_document_id: String) -> Result<bool> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        let Some(record) = next.get_mut(&record_key(path)) else {
            warn!(path = ?path, "Cannot update document id of an untracked file");
            return Ok(false);
        };

        record.remote_document_id = Some(new_document_id);
        self.persist(&next).await?;
        *records = next;
        Ok(true)
    }

    pub async fn get_document_id(&self, path: &Path) -> Option<String> {
        self.records
            .lock()
            .await
            .get(&record_key(path))
            .and_then(|record| record.remote_document_id.clone())
    }

    pub async fn get(&self, path: &Path) -> Option<FileRecord> {
        self.records.lock().await.get(&record_key(path)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Tracked paths in sorted order
    pub async fn paths(&self) -> Vec<PathBuf> {
        self.records
            .lock()
            .await
            .keys()
            .map(PathBuf::from)
            .collect()
    }

    /// All records in path order
    pub async fn records(&self) -> Vec<(PathBuf, FileRecord)> {
        self.records
            .lock()
            .await
            .iter()
            .map(|(path, record)| (PathBuf::from(path), record.clone()))
            .collect()
    }

    /// Write the snapshot through a sibling temp file and rename it into place.
    /// Callers hold the records lock.
    async fn persist(&self, records: &Snapshot) -> Result<()> {
        let persistence_error = |reason: String| SyncError::StatePersistence {
            path: self.snapshot_path.clone(),
            reason,
        };

        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| persistence_error(format!("serialization failed: {}", e)))?;

        if let Some(parent) = self
            .snapshot_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence_error(e.to_string()))?;
        }

        let mut temp_name = self
            .snapshot_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "sync_state".into());
        temp_name.push(".tmp");
        let temp_path = self.snapshot_path.with_file_name(temp_name);

        fs::write(&temp_path, &json)
            .await
            .map_err(|e| persistence_error(e.to_string()))?;
        fs::rename(&temp_path, &self.snapshot_path)
            .await
            .map_err(|e| persistence_error(e.to_string()))?;

        Ok(())
    }
}
