//! Payment-required request handling for path402.
//!
//! This crate turns the pricing, ledger and token crates into the
//! request-level protocol:
//!
//! 1. **Challenge**: an unpaid request gets a priced, time-bound invoice
//! 2. **Claim**: a paid request redeems its invoice nonce exactly once
//! 3. **Verify**: the payment proof is checked by the configured strategy
//! 4. **Serve**: revenue is recorded, content released, a token stamped
//!
//! Verification runs either as a trusted stub (length check only) or as a
//! chain query through a [`ChainRpc`] collaborator.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use path402_crypto::{SigningSecret, TokenIssuer};
//! use path402_gate::{
//!     ContentSource, GateConfig, GateLedgers, GateRequest, PaymentGate, PaymentVerifier,
//!     SourceMapResolver,
//! };
//! use path402_store::LedgerState;
//! use path402_types::{Curve, PathOffering};
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let state = LedgerState::open_in_memory().unwrap();
//! let config = GateConfig::new("node-1", "1PayeeAddress")
//!     .with_offering(PathOffering::new("/$doc", 1000, Curve::SqrtDecay, "1Issuer"));
//! let content = SourceMapResolver::new().with_source("/$doc", ContentSource::Inline("hi".into()));
//!
//! let gate = PaymentGate::new(
//!     config,
//!     GateLedgers::new(Arc::new(state.invoices), Arc::new(state.serves)),
//!     PaymentVerifier::TrustedStub,
//!     Arc::new(content),
//!     TokenIssuer::new(SigningSecret::generate(), Duration::from_secs(3600)),
//! )
//! .unwrap();
//!
//! let response = gate.handle(GateRequest::new("/$doc", "client")).await.unwrap();
//! assert_eq!(response.as_challenge().unwrap().price, 1000);
//! # }
//! ```

pub mod chain;
pub mod content;
pub mod error;
pub mod gate;
#[cfg(feature = "axum")]
pub mod http;
pub mod types;
pub mod verifier;

pub use chain::{ChainOutput, ChainRpc, ChainTransaction, JsonRpcChainClient, RpcAuth};
pub use content::{ContentResolver, ContentSource, SourceMapResolver};
pub use error::{
    ChainRpcError, ChainRpcResult, GateError, GateResult, VerifyError, VerifyResult,
};
pub use gate::{now_millis, GateLedgers, GateObserver, PaymentGate};
#[cfg(feature = "axum")]
pub use http::{router, STATS_PATH};
pub use types::*;
pub use verifier::{amount_paid_to, coins_to_minor, ChainQueryVerifier, PaymentVerifier};
