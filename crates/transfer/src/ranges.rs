//! Run-length codec between explicit missing-chunk offsets and
//! [`CompactRange`].

use ferry_protocol::{ChunkRun, CompactRange, MissingChunks};

use crate::{MissingSet, TransferError};

/// Most chunks [`MissingSet::from_wire`] expands into explicit offsets.
pub const MAX_DECODED_CHUNKS: u64 = 1 << 24;

/// Groups ascending, chunk-aligned `offsets` into maximal runs.
///
/// Two offsets share a run when the second is exactly `chunk_size` past the
/// first. Unsorted, duplicated or misaligned input is rejected.
pub fn encode_ranges(offsets: &[u64], chunk_size: u64) -> Result<CompactRange, TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::InvalidChunkSize(chunk_size));
    }

    let mut runs: Vec<ChunkRun> = Vec::new();
    let mut prev: Option<u64> = None;
    for &offset in offsets {
        if offset % chunk_size != 0 {
            return Err(TransferError::InvalidRange(format!(
                "offset {offset} is not a multiple of chunk size {chunk_size}"
            )));
        }
        if let Some(prev) = prev {
            if offset <= prev {
                return Err(TransferError::InvalidRange(format!(
                    "offsets not strictly ascending: {offset} after {prev}"
                )));
            }
        }

        match runs.last_mut() {
            Some(run) if prev.and_then(|p| p.checked_add(chunk_size)) == Some(offset) => {
                run.count += 1;
            }
            _ => runs.push(ChunkRun { offset, count: 1 }),
        }
        prev = Some(offset);
    }

    Ok(CompactRange { chunk_size, runs })
}

/// Expands `range` back into explicit ascending offsets.
pub fn decode_ranges(range: &CompactRange) -> Result<Vec<u64>, TransferError> {
    Ok(range_offsets(range)?.collect())
}

/// Lazily iterates the offsets described by `range` after validating it.
///
/// Runs must be non-empty, chunk-aligned, ordered and non-overlapping, and
/// every offset must fit in a `u64`.
pub fn range_offsets(
    range: &CompactRange,
) -> Result<impl Iterator<Item = u64> + '_, TransferError> {
    validate_runs(range)?;
    let chunk_size = range.chunk_size;
    Ok(range
        .runs
        .iter()
        .flat_map(move |run| (0..run.count).map(move |k| run.offset + k * chunk_size)))
}

fn validate_runs(range: &CompactRange) -> Result<(), TransferError> {
    let chunk_size = range.chunk_size;
    if chunk_size == 0 {
        return Err(TransferError::InvalidChunkSize(chunk_size));
    }

    // First byte offset the next run may start at.
    let mut next_free = 0u64;
    for run in &range.runs {
        if run.count == 0 {
            return Err(TransferError::InvalidRange(format!(
                "empty run at offset {}",
                run.offset
            )));
        }
        if run.offset % chunk_size != 0 {
            return Err(TransferError::InvalidRange(format!(
                "run offset {} is not a multiple of chunk size {chunk_size}",
                run.offset
            )));
        }
        if run.offset < next_free {
            return Err(TransferError::InvalidRange(format!(
                "run at offset {} overlaps or precedes the previous run",
                run.offset
            )));
        }
        // The last offset of the run must be representable.
        let last = (run.count - 1)
            .checked_mul(chunk_size)
            .and_then(|span| run.offset.checked_add(span))
            .ok_or_else(|| {
                TransferError::InvalidRange(format!(
                    "run at offset {} with {} chunks overflows",
                    run.offset, run.count
                ))
            })?;
        next_free = last.saturating_add(chunk_size);
    }
    Ok(())
}

impl MissingSet {
    /// Encodes the set for transmission with the agreed `chunk_size`.
    pub fn to_wire(&self, chunk_size: u64) -> Result<MissingChunks, TransferError> {
        match self {
            Self::AllMissing => Ok(MissingChunks::All),
            Self::NoneMissing if chunk_size == 0 => {
                Err(TransferError::InvalidChunkSize(chunk_size))
            }
            Self::NoneMissing => Ok(MissingChunks::Ranges(CompactRange::empty(chunk_size))),
            Self::Offsets(offsets) => {
                let range = encode_ranges(offsets, chunk_size)?;
                Ok(MissingChunks::Ranges(range))
            }
        }
    }

    /// Decodes a report received from the other side.
    ///
    /// Reports listing more than [`MAX_DECODED_CHUNKS`] chunks are rejected
    /// before any offset is materialized; use [`range_offsets`] to walk
    /// such a report lazily.
    pub fn from_wire(report: &MissingChunks) -> Result<Self, TransferError> {
        match report {
            MissingChunks::All => Ok(Self::AllMissing),
            MissingChunks::Ranges(range) => {
                let count = range.chunk_count();
                if count > MAX_DECODED_CHUNKS {
                    return Err(TransferError::InvalidRange(format!(
                        "report lists {count} chunks, more than {MAX_DECODED_CHUNKS}"
                    )));
                }
                Ok(Self::from_offsets(decode_ranges(range)?))
            }
        }
    }
}
