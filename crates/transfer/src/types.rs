use std::fmt;

use crate::HashAlgorithm;

/// Digest of a file's content, tagged with the algorithm that produced it.
///
/// Equality covers the algorithm too, so digests from different algorithms
/// never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileDigest {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl FileDigest {
    pub(crate) fn new(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// Algorithm that produced the digest.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the digest and returns its raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Lowercase hex rendering of the digest bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Chunks of a destination file that still have to be received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingSet {
    /// Every chunk is present.
    NoneMissing,
    /// The destination is absent or has the wrong size; request everything.
    AllMissing,
    /// Ascending, unique, chunk-aligned byte offsets of the missing chunks.
    Offsets(Vec<u64>),
}

impl MissingSet {
    /// Wraps scanned offsets, mapping an empty list to [`MissingSet::NoneMissing`].
    pub fn from_offsets(offsets: Vec<u64>) -> Self {
        if offsets.is_empty() {
            Self::NoneMissing
        } else {
            Self::Offsets(offsets)
        }
    }

    /// Returns `true` when nothing is left to transfer.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::NoneMissing)
    }

    /// Number of chunks still to transfer for a file of `file_size` bytes.
    pub fn missing_chunks(&self, file_size: u64, chunk_size: u64) -> u64 {
        match self {
            Self::NoneMissing => 0,
            Self::AllMissing if chunk_size == 0 => 0,
            Self::AllMissing => file_size.div_ceil(chunk_size),
            Self::Offsets(offsets) => offsets.len() as u64,
        }
    }

    /// Number of bytes still to transfer for a file of `file_size` bytes.
    ///
    /// The final chunk only counts the bytes that exist.
    pub fn missing_bytes(&self, file_size: u64, chunk_size: u64) -> u64 {
        match self {
            Self::NoneMissing => 0,
            Self::AllMissing => file_size,
            Self::Offsets(offsets) => offsets
                .iter()
                .map(|&offset| chunk_size.min(file_size.saturating_sub(offset)))
                .sum(),
        }
    }
}
