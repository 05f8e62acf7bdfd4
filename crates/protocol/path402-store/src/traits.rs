//! Ledger traits.
//!
//! Both ledgers take `&self`: they are shared by every in-flight request,
//! and correctness under concurrency comes from atomic statements at the
//! storage layer rather than exclusive access.

use std::time::Duration;

use path402_types::{Amount, Invoice, LedgerStats, ServeEvent, Timestamp};

use crate::error::Result;

/// Durable store of pending invoices keyed by nonce.
pub trait InvoiceLedger: Send + Sync {
    /// Mint and persist a fresh invoice for `path` expiring `ttl` after `now`.
    fn mint(&self, path: &str, amount: Amount, ttl: Duration, now: Timestamp) -> Result<Invoice>;

    /// Atomically claim an invoice.
    ///
    /// Returns the invoice and deletes it only if `nonce` exists, was minted
    /// for `path`, and has not expired at `now`. Every other case returns
    /// `None` and leaves the ledger untouched. At most one caller can ever
    /// receive `Some` for a given nonce.
    fn claim(&self, nonce: &str, path: &str, now: Timestamp) -> Result<Option<Invoice>>;

    /// Delete every invoice whose expiry is at or before `now`.
    ///
    /// Returns the number of rows removed.
    fn prune(&self, now: Timestamp) -> Result<usize>;

    /// Number of invoices currently stored, expired or not.
    fn pending_count(&self) -> Result<u64>;
}

/// Durable append-only serve log with per-path supply counters.
pub trait ServeLedger: Send + Sync {
    /// Append `event` and increment its path's supply by one, atomically.
    ///
    /// Returns the path's supply after the increment.
    fn record_serve(&self, event: &ServeEvent) -> Result<u64>;

    /// Completed serves for `path`; zero for an unknown path.
    fn supply(&self, path: &str) -> Result<u64>;

    /// Up to `limit` events for `path`, most recent first.
    fn events(&self, path: &str, limit: usize) -> Result<Vec<ServeEvent>>;

    /// Sum of the server share over every event served by `served_by`.
    fn earnings(&self, served_by: &str) -> Result<Amount>;

    /// Aggregate totals across the whole ledger.
    fn stats(&self) -> Result<LedgerStats>;
}
