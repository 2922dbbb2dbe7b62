//! # Per-file Sync State Machine
//!
//! Tracks one candidate file through a batch with validated transitions.
//!
//! ## State Machine
//!
//! ```text
//! Unseen → Uploading → Tagged → ParseTriggered
//!    ↓         ↓
//! Skipped    Failed
//! ```
//!
//! `Tagged` means the upload was accepted and recorded and metadata tagging
//! was attempted; whether tagging succeeded is kept on the job.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut job = FileJob::new(path);
//! job.begin_upload()?;
//! job.mark_upload_accepted();
//! job.tag("doc-1".into(), Some(digest), true)?;
//! job.mark_parse_triggered()?;
//! ```

use crate::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Status Types
// ============================================================================

/// Where a file is in the current batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSyncState {
    /// Discovered, not yet examined
    Unseen,
    /// Content changed or untracked; upload in flight
    Uploading,
    /// Uploaded, recorded and tagged
    Tagged,
    /// Remote parsing was requested
    ParseTriggered,
    /// Unchanged since the last sync
    Skipped,
    /// Upload or id extraction failed; retried next run
    Failed,
}

impl FileSyncState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FileSyncState::ParseTriggered | FileSyncState::Skipped | FileSyncState::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileSyncState::Unseen => "unseen",
            FileSyncState::Uploading => "uploading",
            FileSyncState::Tagged => "tagged",
            FileSyncState::ParseTriggered => "parse_triggered",
            FileSyncState::Skipped => "skipped",
            FileSyncState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for FileSyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Outcome Types
// ============================================================================

/// Summary of what happened to one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Skipped,
    Uploaded {
        document_id: String,
        metadata_applied: bool,
        parse_triggered: bool,
    },
    Failed {
        reason: String,
    },
}

impl FileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Skipped => "skipped",
            FileOutcome::Uploaded { .. } => "uploaded",
            FileOutcome::Failed { .. } => "failed",
        }
    }
}

// ============================================================================
// File Job Entity
// ============================================================================

/// One file's progress through a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileJob {
    pub path: PathBuf,
    pub state: FileSyncState,
    /// The remote store accepted the upload request, even if its response
    /// could not be used
    pub upload_accepted: bool,
    pub document_id: Option<String>,
    pub fingerprint: Option<String>,
    pub metadata_applied: bool,
    pub error_message: Option<String>,
}

impl FileJob {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: FileSyncState::Unseen,
            upload_accepted: false,
            document_id: None,
            fingerprint: None,
            metadata_applied: false,
            error_message: None,
        }
    }

    /// Content unchanged since the last sync
    pub fn skip(&mut self) -> Result<()> {
        self.transition(FileSyncState::Skipped)
    }

    pub fn begin_upload(&mut self) -> Result<()> {
        self.transition(FileSyncState::Uploading)
    }

    /// The store answered the upload with a success status
    pub fn mark_upload_accepted(&mut self) {
        self.upload_accepted = true;
    }

    /// Upload recorded locally and metadata tagging attempted
    pub fn tag(
        &mut self,
        document_id: String,
        fingerprint: Option<String>,
        metadata_applied: bool,
    ) -> Result<()> {
        self.transition(FileSyncState::Tagged)?;
        self.document_id = Some(document_id);
        self.fingerprint = fingerprint;
        self.metadata_applied = metadata_applied;
        Ok(())
    }

    pub fn mark_parse_triggered(&mut self) -> Result<()> {
        self.transition(FileSyncState::ParseTriggered)
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(FileSyncState::Failed)?;
        self.error_message = Some(reason.into());
        Ok(())
    }

    pub fn outcome(&self) -> FileOutcome {
        match (self.state, &self.document_id) {
            (FileSyncState::Tagged | FileSyncState::ParseTriggered, Some(document_id)) => {
                FileOutcome::Uploaded {
                    document_id: document_id.clone(),
                    metadata_applied: self.metadata_applied,
                    parse_triggered: self.state == FileSyncState::ParseTriggered,
                }
            }
            (FileSyncState::Skipped, _) => FileOutcome::Skipped,
            _ => FileOutcome::Failed {
                reason: self
                    .error_message
                    .clone()
                    .unwrap_or_else(|| format!("stopped while {}", self.state)),
            },
        }
    }

    fn transition(&mut self, to: FileSyncState) -> Result<()> {
        self.validate_transition(to)?;
        self.state = to;
        Ok(())
    }

    fn validate_transition(&self, to: FileSyncState) -> Result<()> {
        let valid = match (self.state, to) {
            // From Unseen
            (FileSyncState::Unseen, FileSyncState::Skipped) => true,
            (FileSyncState::Unseen, FileSyncState::Uploading) => true,

            // From Uploading
            (FileSyncState::Uploading, FileSyncState::Tagged) => true,
            (FileSyncState::Uploading, FileSyncState::Failed) => true,

            // From Tagged
            (FileSyncState::Tagged, FileSyncState::ParseTriggered) => true,

            _ => false,
        };

        if !valid {
            return Err(SyncError::InvalidStateTransition {
                from: self.state.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!(
                    "Cannot transition from {} to {}",
                    self.state.as_str(),
                    to.as_str()
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> FileJob {
        FileJob::new(PathBuf::from("/docs/notes.md"))
    }

    #[test]
    fn test_full_upload_lifecycle() {
        let mut job = job();
        assert_eq!(job.state, FileSyncState::Unseen);

        job.begin_upload().unwrap();
        job.mark_upload_accepted();
        job.tag("doc-1".to_string(), Some("a9993e36".to_string()), true)
            .unwrap();
        assert_eq!(job.state, FileSyncState::Tagged);
        assert!(!job.state.is_terminal());

        job.mark_parse_triggered().unwrap();
        assert!(job.state.is_terminal());
        assert_eq!(
            job.outcome(),
            FileOutcome::Uploaded {
                document_id: "doc-1".to_string(),
                metadata_applied: true,
                parse_triggered: true,
            }
        );
    }

    #[test]
    fn test_skip_is_terminal() {
        let mut job = job();
        job.skip().unwrap();

        assert_eq!(job.outcome(), FileOutcome::Skipped);
        assert!(job.begin_upload().is_err());
    }

    #[test]
    fn test_failure_keeps_reason() {
        let mut job = job();
        job.begin_upload().unwrap();
        job.fail("connection refused").unwrap();

        assert_eq!(
            job.outcome(),
            FileOutcome::Failed {
                reason: "connection refused".to_string()
            }
        );
        assert_eq!(job.outcome().label(), "failed");
    }

    #[test]
    fn test_cannot_tag_without_upload() {
        let mut job = job();
        let result = job.tag("doc-1".to_string(), None, false);

        assert!(matches!(
            result,
            Err(SyncError::InvalidStateTransition { .. })
        ));
        assert_eq!(job.state, FileSyncState::Unseen);
    }

    #[test]
    fn test_cannot_trigger_parse_twice() {
        let mut job = job();
        job.begin_upload().unwrap();
        job.tag("doc-1".to_string(), None, false).unwrap();
        job.mark_parse_triggered().unwrap();

        assert!(job.mark_parse_triggered().is_err());
    }

    #[test]
    fn test_unseen_cannot_fail_directly() {
        let mut job = job();
        assert!(job.fail("nope").is_err());
    }

    #[test]
    fn test_tagged_without_parse_is_uploaded() {
        let mut job = job();
        job.begin_upload().unwrap();
        job.tag("doc-1".to_string(), None, false).unwrap();

        assert_eq!(
            job.outcome(),
            FileOutcome::Uploaded {
                document_id: "doc-1".to_string(),
                metadata_applied: false,
                parse_triggered: false,
            }
        );
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&FileSyncState::ParseTriggered).unwrap();
        assert_eq!(json, "\"parse_triggered\"");
    }
}
