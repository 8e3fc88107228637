use serde::{Deserialize, Serialize};

use crate::{DEFAULT_BLOCK_SIZE, TransferError};

/// Default size above which the sampled algorithm stops reading every byte: 8 MiB.
const DEFAULT_SAMPLE_THRESHOLD: u64 = 8 * 1024 * 1024;

/// Default size of one sampled block: 256 KiB.
const DEFAULT_SAMPLE_BLOCK: usize = 256 * 1024;

/// Default number of sampled blocks.
const DEFAULT_SAMPLES: usize = 5;

/// Settings for [`ContentHasher`](crate::ContentHasher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HashConfig {
    /// Bytes read per block when consuming a whole file.
    pub block_size: usize,
    /// Sampling layout for [`HashAlgorithm::Sampled`](crate::HashAlgorithm::Sampled).
    pub sampling: SampleConfig,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            sampling: SampleConfig::default(),
        }
    }
}

impl HashConfig {
    /// Rejects configurations that would read nothing or overlap samples.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.block_size == 0 {
            return Err(TransferError::InvalidConfig("block size is zero".into()));
        }
        self.sampling.validate()
    }
}

/// Sampling layout for the sampled algorithm.
///
/// Files larger than `threshold` are identified by their length plus
/// `samples` blocks of `block_size` bytes, spread evenly from the first byte
/// to the last. Smaller files are hashed in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SampleConfig {
    pub threshold: u64,
    pub block_size: usize,
    pub samples: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SAMPLE_THRESHOLD,
            block_size: DEFAULT_SAMPLE_BLOCK,
            samples: DEFAULT_SAMPLES,
        }
    }
}

impl SampleConfig {
    /// A layout that never samples: every file is hashed in full.
    pub fn disabled() -> Self {
        Self {
            threshold: u64::MAX,
            ..Self::default()
        }
    }

    /// Whether a file of `len` bytes is sampled rather than fully read.
    pub fn applies_to(&self, len: u64) -> bool {
        len > self.threshold
    }

    /// Total bytes read when a file is sampled.
    pub fn sampled_bytes(&self) -> u64 {
        (self.block_size as u64).saturating_mul(self.samples as u64)
    }

    fn validate(&self) -> Result<(), TransferError> {
        if self.block_size == 0 || self.samples == 0 {
            return Err(TransferError::InvalidConfig(format!(
                "sampling needs a non-zero block size and count (block {}, samples {})",
                self.block_size, self.samples
            )));
        }
        let covered = (self.block_size as u64).checked_mul(self.samples as u64);
        match covered {
            Some(bytes) if bytes <= self.threshold => Ok(()),
            _ => Err(TransferError::InvalidConfig(format!(
                "sample threshold {} is smaller than {} samples of {} bytes",
                self.threshold, self.samples, self.block_size
            ))),
        }
    }
}
