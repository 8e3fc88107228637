use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::Xxh3;
use xxhash_rust::xxh64::Xxh64;

use crate::HashAlgorithm;

/// Process-constant key for [`HashAlgorithm::Keyed`].
const KEYED_HASH_KEY: [u8; 32] = [
    0x15, 0x53, 0xc5, 0x38, 0x3f, 0xb0, 0xb8, 0x65, 0x78, 0xc3, 0x31, 0x0d, 0xa6, 0x65, 0xb4,
    0xf6, 0xe0, 0x52, 0x1a, 0xcf, 0x22, 0xeb, 0x58, 0xa9, 0x95, 0x32, 0xff, 0xed, 0x02, 0xa6,
    0xb1, 0x15,
];

/// Streaming digest capability shared by every algorithm.
pub trait IncrementalHasher {
    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Consumes the state and returns the raw digest bytes.
    fn finalize(self) -> Vec<u8>;
}

/// Digest state for one of the supported algorithms.
pub enum ContentDigest {
    Sampled(Xxh3),
    Sha256(Sha256),
    Keyed(Box<blake3::Hasher>),
    Xxhash(Xxh64),
}

impl ContentDigest {
    /// Starts a digest for a file of `len` bytes.
    ///
    /// The sampled algorithm mixes the length in first, so two files that
    /// only differ in size never share a digest even when every sampled block
    /// matches.
    pub fn new(algorithm: HashAlgorithm, len: u64) -> Self {
        match algorithm {
            HashAlgorithm::Sampled => {
                let mut state = Xxh3::new();
                state.update(&len.to_le_bytes());
                Self::Sampled(state)
            }
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Keyed => {
                Self::Keyed(Box::new(blake3::Hasher::new_keyed(&KEYED_HASH_KEY)))
            }
            HashAlgorithm::Xxhash => Self::Xxhash(Xxh64::new(0)),
        }
    }

    /// The algorithm this state belongs to.
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Sampled(_) => HashAlgorithm::Sampled,
            Self::Sha256(_) => HashAlgorithm::Sha256,
            Self::Keyed(_) => HashAlgorithm::Keyed,
            Self::Xxhash(_) => HashAlgorithm::Xxhash,
        }
    }
}

impl IncrementalHasher for ContentDigest {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sampled(state) => state.update(data),
            Self::Sha256(state) => Digest::update(state, data),
            Self::Keyed(state) => {
                state.update(data);
            }
            Self::Xxhash(state) => state.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sampled(state) => state.digest128().to_be_bytes().to_vec(),
            Self::Sha256(state) => state.finalize().to_vec(),
            Self::Keyed(state) => state.finalize().as_bytes().to_vec(),
            // Big-endian, the byte order other XXH64 implementations print.
            Self::Xxhash(state) => state.digest().to_be_bytes().to_vec(),
        }
    }
}

/// SHA-256 of `data`; used for symlink identity.
pub(crate) fn sha256_bytes(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}
