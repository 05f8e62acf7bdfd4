//! Cryptographic primitives for the path402 payment-required protocol.
//!
//! This crate provides:
//! - Invoice nonce generation (128-bit, OS randomness)
//! - Content integrity hashing (hex SHA-256)
//! - Proof-of-service tokens (HMAC-SHA256 signed claims)
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use path402_crypto::{SigningSecret, TokenIssuer, verify_token_at};
//!
//! let secret = SigningSecret::from_bytes(b"shared-secret".to_vec()).unwrap();
//! let issuer = TokenIssuer::new(secret.clone(), Duration::from_secs(60));
//!
//! let token = issuer.issue_at("/$doc", "txid", 1000, "node-1", 1_000).unwrap();
//! let claims = verify_token_at(&token, &secret, 1_030).unwrap();
//! assert_eq!(claims.path, "/$doc");
//! ```

pub mod error;
pub mod hash;
pub mod nonce;
pub mod secret;
pub mod token;

pub use error::{CryptoError, CryptoResult};
pub use hash::{content_hash, verify_content};
pub use nonce::generate_nonce;
pub use secret::SigningSecret;
pub use token::{
    verify_token, verify_token_at, ServiceClaims, TokenHeader, TokenIssuer, TOKEN_ALGORITHM,
    TOKEN_TYPE,
};
