//! Async entry points that run the blocking operations on tokio's blocking
//! pool.

use std::path::PathBuf;

use crate::progress::ProgressSink;
use crate::{ChunkScanner, ContentHasher, FileDigest, HashAlgorithm, MissingSet, TransferError};

/// Hashes `path` on a blocking thread.
pub async fn hash_file_async(
    hasher: ContentHasher,
    path: PathBuf,
    algorithm: HashAlgorithm,
    progress: Option<Box<dyn ProgressSink + Send>>,
) -> Result<FileDigest, TransferError> {
    tokio::task::spawn_blocking(move || {
        let mut progress = progress;
        let sink = progress
            .as_deref_mut()
            .map(|sink| sink as &mut dyn ProgressSink);
        hasher.hash(&path, algorithm, sink)
    })
    .await
    .map_err(|e| TransferError::Task(e.to_string()))?
}

/// Scans `path` for missing chunks on a blocking thread.
pub async fn scan_async(
    scanner: ChunkScanner,
    path: PathBuf,
    expected_size: u64,
    chunk_size: u64,
) -> Result<MissingSet, TransferError> {
    tokio::task::spawn_blocking(move || scanner.scan(&path, expected_size, chunk_size))
        .await
        .map_err(|e| TransferError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallbackProgress, hash_file};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[tokio::test]
    async fn async_hash_matches_blocking() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, vec![7u8; 100_000]).unwrap();

        let seen = Arc::new(Mutex::new(0u64));
        let s = Arc::clone(&seen);
        let sink = CallbackProgress::for_path(
            &path,
            Box::new(move |p| *s.lock().unwrap() = p.processed_bytes),
        );

        let digest = hash_file_async(
            ContentHasher::default(),
            path.clone(),
            HashAlgorithm::Keyed,
            Some(Box::new(sink)),
        )
        .await
        .unwrap();

        assert_eq!(digest, hash_file(&path, HashAlgorithm::Keyed).unwrap());
        assert_eq!(*seen.lock().unwrap(), 100_000);
    }

    #[tokio::test]
    async fn async_scan_reports_missing_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dest.bin");
        let mut data = vec![1u8; 400];
        data[200..300].fill(0);
        std::fs::write(&path, &data).unwrap();

        let result = scan_async(ChunkScanner::new(), path, 400, 100)
            .await
            .unwrap();
        assert_eq!(result, MissingSet::Offsets(vec![200]));
    }

    #[tokio::test]
    async fn async_hash_propagates_errors() {
        let dir = TempDir::new().unwrap();
        let err = hash_file_async(
            ContentHasher::default(),
            dir.path().join("missing"),
            HashAlgorithm::Sha256,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)));
    }
}
