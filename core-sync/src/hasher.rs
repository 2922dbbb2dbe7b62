//! Content fingerprints
//!
//! Files are hashed with SHA-1 in fixed 4096-byte blocks, so memory use does
//! not depend on file size. The digest is only used to notice that content
//! changed between runs.

use crate::{Result, SyncError};
use core_async::fs::File;
use core_async::io::AsyncReadExt;
use sha1::{Digest, Sha1};
use std::path::Path;

/// Read size used while hashing
pub const BLOCK_SIZE: usize = 4096;

/// Lowercase hex SHA-1 of the file at `path`.
///
/// # Errors
///
/// Returns [`SyncError::Io`] if the file cannot be opened or read.
pub async fn fingerprint(path: &Path) -> Result<String> {
    let io_error = |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).await.map_err(io_error)?;
    let mut hasher = Sha1::new();
    let mut block = [0u8; BLOCK_SIZE];

    loop {
        let read = file.read(&mut block).await.map_err(io_error)?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hash_bytes(content: &[u8]) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        std::fs::write(&path, content).unwrap();
        fingerprint(&path).await.unwrap()
    }

    #[tokio::test]
    async fn test_known_digests() {
        assert_eq!(
            hash_bytes(b"abc").await,
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hash_bytes(b"abcd").await,
            "81fe8bfe87576c3ecb22426f8e57847382917acf"
        );
        assert_eq!(
            hash_bytes(b"").await,
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[tokio::test]
    async fn test_multi_block_matches_one_shot_digest() {
        let content: Vec<u8> = (0..BLOCK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        let expected = hex::encode(Sha1::digest(&content));

        assert_eq!(hash_bytes(&content).await, expected);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = fingerprint(&dir.path().join("missing.md")).await;

        assert!(matches!(result, Err(SyncError::Io { .. })));
    }
}
