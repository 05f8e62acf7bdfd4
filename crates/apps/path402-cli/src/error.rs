//! CLI error types.

use thiserror::Error;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error enum wrapping all crate errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gate error.
    #[error("{0}")]
    Gate(#[from] path402_gate::GateError),

    /// Store error.
    #[error("{0}")]
    Store(#[from] path402_store::StoreError),

    /// Economics error (ratio validation).
    #[error("{0}")]
    Econ(#[from] path402_econ::EconError),

    /// Token or secret error.
    #[error("{0}")]
    Crypto(#[from] path402_crypto::CryptoError),

    /// Chain RPC client error.
    #[error("{0}")]
    ChainRpc(#[from] path402_gate::ChainRpcError),

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// User-facing error with actionable message.
    #[error("{0}")]
    User(String),

    /// No offering at the given path.
    #[error("No offering configured at {0}")]
    UnknownPath(String),

    /// Configuration file already exists.
    #[error("Configuration already exists at {0}. Remove it or pass --force.")]
    ConfigExists(String),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a user-facing error.
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors: 1
            Self::User(_) | Self::ConfigExists(_) => 1,
            // Not found: 2
            Self::UnknownPath(_) => 2,
            // Config errors: 3
            Self::Config(_) | Self::Toml(_) | Self::Econ(_) => 3,
            // Token errors: 4
            Self::Crypto(_) => 4,
            // Chain errors: 5
            Self::ChainRpc(_) => 5,
            // Store errors: 6
            Self::Store(_) => 6,
            // Gate errors: 8
            Self::Gate(_) => 8,
            // IO errors: 9
            Self::Io(_) => 9,
            // JSON/format errors: 10
            Self::Json(_) => 10,
        }
    }

    /// Short recovery hint, if one applies.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Config(_) | Self::Toml(_) | Self::Econ(_) => {
                Some("Check config.toml, or run 'path402 init' for a fresh one")
            }
            Self::UnknownPath(_) => Some("Add a [[paths]] entry for it in config.toml"),
            Self::Crypto(path402_crypto::CryptoError::TokenExpired { .. }) => {
                Some("The token has expired; pay again for a fresh one")
            }
            Self::Crypto(path402_crypto::CryptoError::SignatureVerificationFailed) => {
                Some("Check that [security].signing_secret matches the issuing node")
            }
            Self::Store(_) => Some("Check the database path in [storage]"),
            Self::Gate(e) => Some(e.suggestion()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::user("x").exit_code(), 1);
        assert_eq!(CliError::UnknownPath("/$x".into()).exit_code(), 2);
        assert_eq!(CliError::config("x").exit_code(), 3);
        assert_eq!(
            CliError::Crypto(path402_crypto::CryptoError::SignatureVerificationFailed).exit_code(),
            4
        );
    }

    #[test]
    fn test_suggestions() {
        assert!(CliError::config("bad ratio").suggestion().is_some());
        assert!(CliError::user("x").suggestion().is_none());
    }
}
