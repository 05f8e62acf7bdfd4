//! Error types for the payment gate.

use path402_crypto::CryptoError;
use path402_store::StoreError;
use path402_types::Amount;
use thiserror::Error;

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

/// Result type for payment verification.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Result type for chain RPC calls.
pub type ChainRpcResult<T> = Result<T, ChainRpcError>;

/// Errors that can occur while handling a gated request.
#[derive(Debug, Error)]
pub enum GateError {
    /// No offering is configured at the requested path.
    #[error("no offering at {path}")]
    NotFound {
        /// The requested path
        path: String,
    },

    /// Presented nonce is unknown, expired, or was minted for another path.
    #[error("invoice not found, expired, or issued for another path")]
    InvoiceInvalid,

    /// Payment proof failed verification.
    #[error("payment verification failed: {0}")]
    Verification(#[from] VerifyError),

    /// Served bytes do not match the configured integrity hash.
    #[error("integrity check failed for {path}: expected {expected}, got {actual}")]
    IntegrityFailure {
        /// Path whose content failed the check
        path: String,
        /// Configured hash
        expected: String,
        /// Hash of the resolved bytes
        actual: String,
    },

    /// Ledger read or write failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Content could not be resolved.
    #[error("content unavailable for {path}: {reason}")]
    Content {
        /// Path whose content was requested
        path: String,
        /// Description of the failure
        reason: String,
    },

    /// Proof-of-service token could not be issued.
    #[error("token error: {0}")]
    Token(#[from] CryptoError),

    /// Gate was constructed with inconsistent settings.
    #[error("invalid gate configuration: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal gate error: {0}")]
    Internal(String),
}

impl GateError {
    /// Create a content error.
    pub fn content(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Content {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if this error is answered with a fresh challenge.
    ///
    /// The client cannot tell an unknown nonce from a failed verification:
    /// both get a new invoice.
    pub fn is_rechallenge(&self) -> bool {
        matches!(self, Self::InvoiceInvalid | Self::Verification(_))
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::NotFound { .. } => "Check the path against /.well-known/402.json",
            Self::InvoiceInvalid => "Request a fresh challenge and pay the new invoice",
            Self::Verification(e) => e.suggestion(),
            Self::IntegrityFailure { .. } => {
                "Source content is corrupted; restore it or update content_hash"
            }
            Self::Storage(_) => "Check the ledger database file and its permissions",
            Self::Content { .. } => "Check the content source configured for this path",
            Self::Token(_) => "Check the configured signing secret",
            Self::Config(_) => "Fix the node configuration and restart",
            Self::Internal(_) => "This is an internal error; please report it",
        }
    }

    /// Returns the HTTP status code appropriate for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvoiceInvalid | Self::Verification(_) => 402,
            _ => 500,
        }
    }

    /// Message safe to send to clients.
    ///
    /// Server-side failures collapse to a generic message; the detail stays
    /// in the node's logs.
    pub fn public_message(&self) -> String {
        if self.http_status() >= 500 {
            "internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Reasons a payment proof is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// No transaction identifier was presented.
    #[error("missing transaction id")]
    MissingTransactionId,

    /// Transaction identifier has the wrong length.
    #[error("transaction id must be 64 characters, got {len}")]
    MalformedTransactionId {
        /// Length of the presented identifier
        len: usize,
    },

    /// Chain RPC call failed.
    #[error("chain rpc error: {0}")]
    Rpc(String),

    /// Chain has no transaction with this identifier.
    #[error("transaction not found")]
    TransactionNotFound,

    /// Transaction is not buried deeply enough.
    #[error("insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations {
        /// Confirmations reported by the chain
        have: u64,
        /// Configured minimum
        need: u64,
    },

    /// Outputs to the receiving address do not cover the invoice.
    #[error("insufficient amount: required {required}, received {received}")]
    InsufficientAmount {
        /// Invoice amount
        required: Amount,
        /// Sum of matching outputs
        received: Amount,
    },
}

impl VerifyError {
    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::MissingTransactionId => "Send the payment transaction id in X-402-Payment",
            Self::MalformedTransactionId { .. } => "Send the 64-character hex transaction id",
            Self::Rpc(_) => "Retry once the chain node is reachable",
            Self::TransactionNotFound => "Wait for the transaction to propagate, then retry",
            Self::InsufficientConfirmations { .. } => "Wait for more confirmations, then retry",
            Self::InsufficientAmount { .. } => "Pay at least the invoiced amount",
        }
    }
}

/// Errors from the chain RPC collaborator.
#[derive(Debug, Error)]
pub enum ChainRpcError {
    /// Transport-level failure talking to the node.
    #[error("chain rpc transport error: {0}")]
    Transport(String),

    /// Node returned a non-success HTTP status without a JSON-RPC body.
    #[error("chain rpc returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Node returned a JSON-RPC error object.
    #[error("chain rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// Response could not be decoded.
    #[error("invalid chain rpc response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ChainRpcError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
