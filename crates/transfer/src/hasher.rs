use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::digest::{ContentDigest, IncrementalHasher, sha256_bytes};
use crate::progress::{ProgressReader, ProgressSink};
use crate::{FileDigest, HashAlgorithm, HashConfig, TransferError};

/// Computes content digests for files and symlinks.
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    config: HashConfig,
    cancel: Option<CancellationToken>,
}

impl ContentHasher {
    /// Creates a hasher after validating `config`.
    pub fn new(config: HashConfig) -> Result<Self, TransferError> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Aborts hashing with [`TransferError::Cancelled`] once `token` fires.
    ///
    /// The token is checked between blocks.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Hashes `path` with an algorithm named by its wire identifier.
    pub fn hash_named(
        &self,
        path: &Path,
        algorithm: &str,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<FileDigest, TransferError> {
        let algorithm: HashAlgorithm = algorithm.parse()?;
        self.hash(path, algorithm, progress)
    }

    /// Hashes the file at `path`.
    ///
    /// A symlink is never followed: its identity is the SHA-256 of its
    /// target path, whatever `algorithm` was asked for.
    pub fn hash(
        &self,
        path: &Path,
        algorithm: HashAlgorithm,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<FileDigest, TransferError> {
        let meta =
            std::fs::symlink_metadata(path).map_err(|e| TransferError::from_open(path, e))?;
        if meta.file_type().is_symlink() {
            let target = std::fs::read_link(path).map_err(|e| TransferError::from_open(path, e))?;
            debug!(path = %path.display(), target = %target.display(), "hashing symlink target");
            let identity = sha256_bytes(target.as_os_str().as_encoded_bytes());
            return Ok(FileDigest::new(HashAlgorithm::Sha256, identity));
        }

        let file = File::open(path).map_err(|e| TransferError::from_open(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| TransferError::from_open(path, e))?
            .len();

        let digest = self.hash_reader(file, len, algorithm, progress)?;
        debug!(path = %path.display(), %algorithm, len, "hashed file");
        Ok(digest)
    }

    /// Hashes `len` bytes of `reader` under `algorithm`.
    ///
    /// `len` is the content size: it sizes the progress sink, seeds the
    /// sampled algorithm's length prefix and decides whether sampling
    /// applies, so the result equals [`hash`](Self::hash) on the same bytes.
    pub fn hash_reader<R: Read + Seek>(
        &self,
        reader: R,
        len: u64,
        algorithm: HashAlgorithm,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<FileDigest, TransferError> {
        let digest = if algorithm == HashAlgorithm::Sampled && self.config.sampling.applies_to(len)
        {
            self.hash_sampled(reader, len, progress)?
        } else {
            self.hash_stream(reader, len, algorithm, progress)?
        };
        Ok(FileDigest::new(algorithm, digest))
    }

    fn hash_stream<R: Read>(
        &self,
        reader: R,
        len: u64,
        algorithm: HashAlgorithm,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<Vec<u8>, TransferError> {
        let mut state = ContentDigest::new(algorithm, len);
        let mut reader = ProgressReader::new(reader, progress);
        reader.start(len);

        let mut buf = vec![0u8; self.config.block_size];
        let mut offset = 0u64;
        loop {
            self.check_cancelled()?;
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(TransferError::ReadFailure { offset, source }),
            };
            state.update(&buf[..n]);
            offset += n as u64;
        }

        reader.finish();
        Ok(state.finalize())
    }

    fn hash_sampled<R: Read + Seek>(
        &self,
        reader: R,
        len: u64,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<Vec<u8>, TransferError> {
        let sampling = &self.config.sampling;
        let mut state = ContentDigest::new(HashAlgorithm::Sampled, len);
        let mut reader = ProgressReader::new(reader, progress);
        reader.start(sampling.sampled_bytes());

        let mut buf = vec![0u8; sampling.block_size];
        for index in 0..sampling.samples {
            self.check_cancelled()?;
            let offset = sample_offset(index, sampling.samples, len, sampling.block_size as u64);
            trace!(index, offset, "reading sample");
            reader
                .seek(SeekFrom::Start(offset))
                .and_then(|_| reader.read_exact(&mut buf))
                .map_err(|source| TransferError::ReadFailure { offset, source })?;
            state.update(&buf);
        }

        reader.finish();
        Ok(state.finalize())
    }

    fn check_cancelled(&self) -> Result<(), TransferError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(TransferError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Start of sample `index` of `samples`: evenly spaced, the first at byte 0
/// and the last ending exactly at `len`.
fn sample_offset(index: usize, samples: usize, len: u64, block: u64) -> u64 {
    if samples <= 1 {
        return 0;
    }
    let span = u128::from(len.saturating_sub(block));
    (span * index as u128 / (samples as u128 - 1)) as u64
}

/// Hashes `path` with the default configuration and no progress reporting.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<FileDigest, TransferError> {
    ContentHasher::default().hash(path, algorithm, None)
}
