//! Wire types exchanged between the receiving and sending side of a
//! resumable transfer.
//!
//! Nothing here touches the file system; the types only describe what
//! crosses the transport: the hash algorithm a peer asked for, the set of
//! chunks still missing on the receiver, and progress snapshots.

pub mod algorithm;
pub mod error;
pub mod ranges;
pub mod types;

// Re-export primary types for convenience.
pub use algorithm::HashAlgorithm;
pub use error::ProtocolError;
pub use ranges::{ChunkRun, CompactRange, MissingChunks};
pub use types::HashProgress;
