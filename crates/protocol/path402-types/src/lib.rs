//! Data structures for the path402 payment-required protocol.
//!
//! This crate holds the data model shared by the pricing engine, the
//! ledgers, and the payment gate. It contains no business logic beyond
//! small accessors.
//!
//! # Module Organization
//!
//! - [`constants`] - Protocol defaults (timing, economics, wire widths)
//! - [`curve`] - Pricing curve identifiers and parameters
//! - [`offering`] - Priced resources and their permission flags
//! - [`invoice`] - Pending payment invoices
//! - [`serve`] - Serve events, revenue splits, ledger aggregates
//! - [`payment`] - Client payment claims
//!
//! # Example
//!
//! ```
//! use path402_types::{Curve, PathOffering};
//!
//! let offering = PathOffering::new("/$doc", 1000, Curve::from_id("sqrt_decay", 0, 0), "1Issuer");
//! assert_eq!(offering.curve, Curve::SqrtDecay);
//! ```

/// Protocol crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constants;
pub mod curve;
pub mod invoice;
pub mod offering;
pub mod payment;
pub mod serve;

/// Monetary amount in the smallest currency unit (satoshis).
pub type Amount = u64;

/// Unix timestamp in milliseconds.
pub type Timestamp = u64;

pub use constants::*;
pub use curve::Curve;
pub use invoice::Invoice;
pub use offering::{PathOffering, Permissions};
pub use payment::PaymentClaim;
pub use serve::{LedgerStats, RevenueSplit, ServeEvent};
