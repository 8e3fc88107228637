use serde::{Deserialize, Serialize};

/// Progress snapshot for a running hash computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashProgress {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub total_bytes: u64,
    pub processed_bytes: u64,
}

impl HashProgress {
    /// Returns the progress as a percentage (0-100).
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.processed_bytes as f64 / self.total_bytes as f64 * 100.0
    }

    /// Returns `true` once every byte has been processed.
    pub fn is_complete(&self) -> bool {
        self.processed_bytes >= self.total_bytes
    }
}
