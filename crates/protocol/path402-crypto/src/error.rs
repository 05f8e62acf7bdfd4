//! Error types for path402-crypto

use thiserror::Error;

/// Result type alias for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signing secret is empty or otherwise unusable
    #[error("Invalid signing secret: {0}")]
    InvalidSecret(String),

    /// Token does not have three dot-separated segments or a segment fails to decode
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Token header names an algorithm other than HS256
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature verification failed
    #[error("Token signature verification failed")]
    SignatureVerificationFailed,

    /// Token expiry claim has passed
    #[error("Token expired at {expired_at}")]
    TokenExpired { expired_at: u64 },

    /// JSON encoding of a token segment failed
    #[error("Token encoding error: {0}")]
    Encoding(String),
}
