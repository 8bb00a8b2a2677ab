//! Key material and envelope error types.

use thiserror::Error;

/// Result type for key material and envelope operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by the key generator, key serializer, and envelope codec.
///
/// Messages never carry secret payload text, so every variant is safe to
/// surface to a user or a log.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("secure entropy source unavailable: {0}")]
    EntropySourceUnavailable(String),

    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    #[error("key generation context not initialized")]
    ContextNotInitialized,

    #[error("public key not available")]
    PublicKeyMissing,

    #[error("secret key required for decryption")]
    SecretKeyMissing,

    #[error("malformed secret key: {0}")]
    MalformedKey(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("scheme mismatch: envelope is {envelope}, key is {key}")]
    SchemeMismatch { envelope: String, key: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CryptoError {
    fn from(e: serde_json::Error) -> Self {
        CryptoError::Serialization(e.to_string())
    }
}
