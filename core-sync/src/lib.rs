//! # Sync Engine
//!
//! Keeps a remote document dataset in step with a local directory tree.
//!
//! ## Overview
//!
//! Each unique file content is uploaded and processed exactly once, and is
//! re-uploaded only when its content changes. Change detection is content
//! addressed: a file's SHA-1 is compared against the one recorded at its last
//! successful upload.
//!
//! ## Components
//!
//! - **Content Hasher** (`hasher`): streamed SHA-1 fingerprints
//! - **Sync State Store** (`state`): persisted path → record map
//! - **File Job** (`job`): per-file state machine with validated transitions
//! - **Sync Engine** (`engine`): batch orchestration over a `DocumentStore`
//!   and a `FileDiscovery`

pub mod engine;
pub mod error;
pub mod hasher;
pub mod job;
pub mod state;

pub use engine::{document_metadata, FileReport, SyncEngine, SyncReport};
pub use error::{Result, SyncError};
pub use hasher::fingerprint;
pub use job::{FileJob, FileOutcome, FileSyncState};
pub use state::{FileRecord, SyncStateStore};
