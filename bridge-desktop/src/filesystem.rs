//! Local File Discovery using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileDiscovery,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Tokio-based recursive directory walker
///
/// Walks the import directory depth-first and keeps regular files whose names
/// end with one of the accepted extensions. Paths are returned absolute and
/// sorted so repeated runs visit files in the same order.
///
/// Unreadable subdirectories are logged and skipped; only an unreadable root
/// is an error.
#[derive(Debug, Clone, Default)]
pub struct LocalFileDiscovery {
    follow_symlinks: bool,
}

impl LocalFileDiscovery {
    /// Create a walker that does not descend into symlinked directories
    pub fn new() -> Self {
        Self::default()
    }

    /// Also descend into symlinked directories
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    fn matches_extension(path: &Path, extensions: &[String]) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    async fn is_directory(&self, entry: &fs::DirEntry) -> bool {
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => true,
            Ok(file_type) if file_type.is_symlink() && self.follow_symlinks => {
                fs::metadata(entry.path())
                    .await
                    .map(|metadata| metadata.is_dir())
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    async fn is_regular_file(entry: &fs::DirEntry) -> bool {
        match entry.file_type().await {
            Ok(file_type) if file_type.is_file() => true,
            Ok(file_type) if file_type.is_symlink() => fs::metadata(entry.path())
                .await
                .map(|metadata| metadata.is_file())
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[async_trait]
impl FileDiscovery for LocalFileDiscovery {
    async fn discover(&self, root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
        let root = fs::canonicalize(root).await.map_err(|e| {
            BridgeError::OperationFailed(format!(
                "Cannot open import directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let mut files = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let mut read_dir = match fs::read_dir(&dir).await {
                Ok(read_dir) => read_dir,
                Err(e) if dir == root => return Err(BridgeError::Io(e)),
                Err(e) => {
                    warn!(path = ?dir, error = %e, "Skipping unreadable directory");
                    continue;
                }
            };

            loop {
                let entry = match read_dir.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(path = ?dir, error = %e, "Directory listing interrupted");
                        break;
                    }
                };

                let path = entry.path();
                if self.is_directory(&entry).await {
                    pending.push(path);
                } else if Self::is_regular_file(&entry).await
                    && Self::matches_extension(&path, extensions)
                {
                    files.push(path);
                }
            }
        }

        files.sort();
        debug!(root = ?root, count = files.len(), "Discovered candidate files");
        Ok(files)
    }
}
