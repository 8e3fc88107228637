use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{MissingSet, TransferError};

/// Finds the chunks of a pre-sized destination file that were never written.
///
/// Unwritten regions of a sparse or zero-preallocated file read back as
/// zeros, so an all-zero chunk counts as missing.
#[derive(Debug, Clone, Default)]
pub struct ChunkScanner {
    cancel: Option<CancellationToken>,
}

impl ChunkScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aborts the scan with [`TransferError::Cancelled`] once `token` fires.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Scans `path`, expected to be `expected_size` bytes long.
    ///
    /// A missing file or one of a different size yields
    /// [`MissingSet::AllMissing`].
    pub fn scan(
        &self,
        path: &Path,
        expected_size: u64,
        chunk_size: u64,
    ) -> Result<MissingSet, TransferError> {
        check_chunk_size(chunk_size)?;

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "destination absent, all chunks missing");
                return Ok(MissingSet::AllMissing);
            }
            Err(e) => return Err(TransferError::from_open(path, e)),
        };

        let actual = file
            .metadata()
            .map_err(|e| TransferError::from_open(path, e))?
            .len();
        if actual != expected_size {
            debug!(
                path = %path.display(),
                actual,
                expected_size,
                "destination size mismatch, all chunks missing"
            );
            return Ok(MissingSet::AllMissing);
        }

        let missing = self.scan_reader(file, expected_size, chunk_size)?;
        if let MissingSet::Offsets(offsets) = &missing {
            debug!(path = %path.display(), missing = offsets.len(), "scanned destination");
        }
        Ok(missing)
    }

    /// Scans exactly `size` bytes from `reader` in `chunk_size` blocks.
    ///
    /// Running out of data before `size` bytes is a read failure, not a
    /// shorter result.
    pub fn scan_reader<R: Read>(
        &self,
        mut reader: R,
        size: u64,
        chunk_size: u64,
    ) -> Result<MissingSet, TransferError> {
        check_chunk_size(chunk_size)?;

        let block_len = usize::try_from(chunk_size.min(size))
            .map_err(|_| TransferError::InvalidChunkSize(chunk_size))?;
        let mut buf = vec![0u8; block_len];
        let mut offsets = Vec::new();
        let mut offset = 0u64;

        while offset < size {
            if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                return Err(TransferError::Cancelled);
            }

            // `block_len` bounds this, so the cast cannot truncate.
            let len = chunk_size.min(size - offset) as usize;
            let block = &mut buf[..len];
            reader
                .read_exact(block)
                .map_err(|source| TransferError::ReadFailure { offset, source })?;

            if block.iter().all(|&b| b == 0) {
                offsets.push(offset);
            }
            offset += len as u64;
        }

        Ok(MissingSet::from_offsets(offsets))
    }
}

fn check_chunk_size(chunk_size: u64) -> Result<(), TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::InvalidChunkSize(chunk_size));
    }
    Ok(())
}

/// Scans `path` with a default [`ChunkScanner`].
pub fn scan_missing_chunks(
    path: &Path,
    expected_size: u64,
    chunk_size: u64,
) -> Result<MissingSet, TransferError> {
    ChunkScanner::new().scan(path, expected_size, chunk_size)
}
