/// Errors produced while parsing wire values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unsupported hash algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("malformed chunk range: {0}")]
    MalformedRange(String),
}
