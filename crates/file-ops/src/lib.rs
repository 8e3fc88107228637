//! File-system helpers used around a transfer.
//!
//! Keeps track of partially received files that must be cleaned up if a
//! transfer is abandoned.

mod removal;

pub use removal::{DEFAULT_REMOVAL_FILE, RemovalList};

use std::path::{Path, PathBuf};

/// Errors produced by file operations.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path cannot be recorded: {0}")]
    InvalidPath(String),
}

/// Reports whether `path` exists.
///
/// Only a definite "not found" counts as absent; a path that cannot be
/// inspected for another reason (permissions, I/O) is assumed to exist.
pub fn exists(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}
