use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Hash algorithm used to identify file content.
///
/// The set is closed: peers name an algorithm by its identifier string and
/// anything outside this enum is rejected with
/// [`ProtocolError::UnsupportedAlgorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// Sampled XXH3-128; near-constant time on large files.
    #[serde(rename = "sampled", alias = "sampled-fast", alias = "imohash")]
    Sampled,
    /// Whole-file SHA-256. Also used for symlink identity.
    #[serde(rename = "sha256", alias = "cryptographic")]
    Sha256,
    /// Whole-file keyed BLAKE3 with a process-constant key.
    #[serde(rename = "keyed", alias = "high-throughput-keyed", alias = "highway")]
    Keyed,
    /// Whole-file XXH64, seed 0.
    #[serde(rename = "xxhash", alias = "high-throughput-unkeyed")]
    Xxhash,
}

impl HashAlgorithm {
    /// Every supported algorithm, in declaration order.
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sampled,
        HashAlgorithm::Sha256,
        HashAlgorithm::Keyed,
        HashAlgorithm::Xxhash,
    ];

    /// Canonical identifier sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sampled => "sampled",
            Self::Sha256 => "sha256",
            Self::Keyed => "keyed",
            Self::Xxhash => "xxhash",
        }
    }

    /// Length in bytes of the digests this algorithm produces.
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sampled => 16,
            Self::Sha256 | Self::Keyed => 32,
            Self::Xxhash => 8,
        }
    }

    /// Whether the algorithm is collision resistant.
    pub fn is_cryptographic(self) -> bool {
        matches!(self, Self::Sha256)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sampled" | "sampled-fast" | "imohash" => Ok(Self::Sampled),
            "sha256" | "cryptographic" => Ok(Self::Sha256),
            "keyed" | "high-throughput-keyed" | "highway" => Ok(Self::Keyed),
            "xxhash" | "high-throughput-unkeyed" => Ok(Self::Xxhash),
            other => Err(ProtocolError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_names() {
        for algo in HashAlgorithm::ALL {
            assert_eq!(algo.as_str().parse::<HashAlgorithm>().unwrap(), algo);
        }
    }

    #[test]
    fn parse_descriptive_aliases() {
        assert_eq!(
            "sampled-fast".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sampled
        );
        assert_eq!(
            "cryptographic".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            "high-throughput-keyed".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Keyed
        );
        assert_eq!(
            "high-throughput-unkeyed".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Xxhash
        );
    }

    #[test]
    fn legacy_selector_names_resolve() {
        assert_eq!(
            "imohash".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sampled
        );
        assert_eq!(
            "highway".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Keyed
        );
        let parsed: HashAlgorithm = serde_json::from_str("\"highway\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Keyed);
        // Re-serialized under the canonical name.
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"keyed\"");
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "md5".parse::<HashAlgorithm>().unwrap_err();
        assert_eq!(err, ProtocolError::UnsupportedAlgorithm("md5".into()));
        assert!("".parse::<HashAlgorithm>().is_err());
        // Names are case sensitive.
        assert!("SHA256".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn serialization_uses_canonical_name() {
        assert_eq!(
            serde_json::to_string(&HashAlgorithm::Keyed).unwrap(),
            "\"keyed\""
        );
        let parsed: HashAlgorithm = serde_json::from_str("\"cryptographic\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Sha256);
        assert!(serde_json::from_str::<HashAlgorithm>("\"crc32\"").is_err());
    }

    #[test]
    fn only_sha256_is_cryptographic() {
        let crypto: Vec<_> = HashAlgorithm::ALL
            .into_iter()
            .filter(|a| a.is_cryptographic())
            .collect();
        assert_eq!(crypto, vec![HashAlgorithm::Sha256]);
    }
}
