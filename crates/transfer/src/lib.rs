//! Integrity side of resumable transfers.
//!
//! - [`ContentHasher`] digests a file (or a symlink's target path) under one
//!   of the [`HashAlgorithm`] strategies.
//! - [`ChunkScanner`] finds the chunks of a pre-sized destination file that
//!   were never written.
//! - [`encode_ranges`] / [`decode_ranges`] turn the missing offsets into the
//!   run-length [`CompactRange`] that crosses the wire, and back.

mod config;
mod digest;
mod hasher;
mod progress;
mod ranges;
mod scanner;
mod tasks;
mod types;
mod validation;

use std::io;
use std::path::{Path, PathBuf};

pub use config::{HashConfig, SampleConfig};
pub use digest::{ContentDigest, IncrementalHasher};
pub use ferry_protocol::{ChunkRun, CompactRange, HashAlgorithm, MissingChunks};
pub use hasher::{ContentHasher, hash_file};
pub use progress::{
    ByteCounter, CallbackProgress, ProgressCallback, ProgressReader, ProgressSink, format_bytes,
    hash_description,
};
pub use ranges::{MAX_DECODED_CHUNKS, decode_ranges, encode_ranges, range_offsets};
pub use scanner::{ChunkScanner, scan_missing_chunks};
pub use tasks::{hash_file_async, scan_async};
pub use types::{FileDigest, MissingSet};
pub use validation::validate_file_name;

/// Default read block size for hashing: 64 KiB.
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("unsupported hash algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("read failed at offset {offset}: {source}")]
    ReadFailure {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(u64),

    #[error("invalid chunk range: {0}")]
    InvalidRange(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("cancelled")]
    Cancelled,

    #[error("background task failed: {0}")]
    Task(String),
}

impl TransferError {
    /// Classifies an error from opening or stat-ing `path`.
    pub(crate) fn from_open(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }
}

impl From<ferry_protocol::ProtocolError> for TransferError {
    fn from(err: ferry_protocol::ProtocolError) -> Self {
        match err {
            ferry_protocol::ProtocolError::UnsupportedAlgorithm(name) => {
                Self::UnsupportedAlgorithm(name)
            }
            ferry_protocol::ProtocolError::MalformedRange(msg) => Self::InvalidRange(msg),
        }
    }
}
