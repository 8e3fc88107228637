//! Compact description of the chunks a receiver still needs.
//!
//! # Wire forms
//!
//! Tagged JSON (default):
//!
//! ```text
//! {"kind":"all"}
//! {"kind":"ranges","chunkSize":100,"runs":[{"offset":0,"count":4}]}
//! ```
//!
//! Legacy flat form, a sequence of signed 64-bit integers:
//!
//! ```text
//! ALL MISSING:   []
//! NONE MISSING:  [chunk_size]
//! RUNS:          [chunk_size, start_0, count_0, start_1, count_1, ...]
//! ```

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// A run of `count` consecutive chunks starting at byte `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRun {
    pub offset: u64,
    pub count: u64,
}

/// Run-length encoded list of chunk offsets.
///
/// An empty `runs` list means no chunk is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactRange {
    pub chunk_size: u64,
    #[serde(default)]
    pub runs: Vec<ChunkRun>,
}

impl CompactRange {
    /// Creates a range with no runs.
    pub fn empty(chunk_size: u64) -> Self {
        Self {
            chunk_size,
            runs: Vec::new(),
        }
    }

    /// Returns `true` when no chunk is listed.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total number of chunks across all runs.
    pub fn chunk_count(&self) -> u64 {
        self.runs
            .iter()
            .fold(0u64, |acc, run| acc.saturating_add(run.count))
    }
}

/// Missing-chunk report sent from the receiver to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingChunks {
    /// The destination cannot be trusted; every chunk must be sent.
    All,
    /// Only the listed chunks must be sent (none if the list is empty).
    Ranges(CompactRange),
}

impl MissingChunks {
    /// Flattens the report into the legacy integer sequence.
    pub fn to_flat(&self) -> Result<Vec<i64>, ProtocolError> {
        let range = match self {
            Self::All => return Ok(Vec::new()),
            Self::Ranges(range) => range,
        };
        if range.chunk_size == 0 {
            return Err(ProtocolError::MalformedRange("chunk size is zero".into()));
        }

        let mut flat = Vec::with_capacity(1 + range.runs.len() * 2);
        flat.push(to_wire_int(range.chunk_size, "chunk size")?);
        for run in &range.runs {
            flat.push(to_wire_int(run.offset, "run offset")?);
            flat.push(to_wire_int(run.count, "run length")?);
        }
        Ok(flat)
    }

    /// Parses the legacy integer sequence.
    ///
    /// Only the shape is checked here (sign, parity, non-zero sizes); run
    /// ordering is the decoder's concern.
    pub fn from_flat(flat: &[i64]) -> Result<Self, ProtocolError> {
        let Some((&chunk_size, pairs)) = flat.split_first() else {
            return Ok(Self::All);
        };
        if chunk_size <= 0 {
            return Err(ProtocolError::MalformedRange(format!(
                "chunk size must be positive, got {chunk_size}"
            )));
        }
        if pairs.len() % 2 != 0 {
            return Err(ProtocolError::MalformedRange(format!(
                "odd number of run values: {}",
                pairs.len()
            )));
        }

        let mut runs = Vec::with_capacity(pairs.len() / 2);
        for pair in pairs.chunks_exact(2) {
            let (offset, count) = (pair[0], pair[1]);
            if offset < 0 {
                return Err(ProtocolError::MalformedRange(format!(
                    "negative run offset: {offset}"
                )));
            }
            if count <= 0 {
                return Err(ProtocolError::MalformedRange(format!(
                    "run length must be positive, got {count}"
                )));
            }
            runs.push(ChunkRun {
                offset: offset as u64,
                count: count as u64,
            });
        }

        Ok(Self::Ranges(CompactRange {
            chunk_size: chunk_size as u64,
            runs,
        }))
    }
}

fn to_wire_int(value: u64, what: &str) -> Result<i64, ProtocolError> {
    i64::try_from(value)
        .map_err(|_| ProtocolError::MalformedRange(format!("{what} {value} exceeds i64")))
}
