//! Ledgers and content sources with scripted behavior.

use async_trait::async_trait;
use path402_gate::{ContentResolver, GateResult};
use path402_store::{InvoiceLedger, Result, ServeLedger, StoreError};
use path402_types::{Amount, Invoice, LedgerStats, ServeEvent, Timestamp};
use std::collections::HashMap;
use std::time::Duration;

/// Serve ledger whose writes always fail.
///
/// Reads delegate to the wrapped ledger so tests can observe that nothing
/// was recorded.
pub struct FailingServeLedger<L> {
    inner: L,
}

impl<L: ServeLedger> FailingServeLedger<L> {
    /// Wrap `inner`.
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<L: ServeLedger> ServeLedger for FailingServeLedger<L> {
    fn record_serve(&self, _event: &ServeEvent) -> Result<u64> {
        Err(StoreError::schema("disk full"))
    }

    fn supply(&self, path: &str) -> Result<u64> {
        self.inner.supply(path)
    }

    fn events(&self, path: &str, limit: usize) -> Result<Vec<ServeEvent>> {
        self.inner.events(path, limit)
    }

    fn earnings(&self, served_by: &str) -> Result<Amount> {
        self.inner.earnings(served_by)
    }

    fn stats(&self) -> Result<LedgerStats> {
        self.inner.stats()
    }
}

/// Invoice ledger where every operation fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingInvoiceLedger;

impl InvoiceLedger for FailingInvoiceLedger {
    fn mint(&self, _path: &str, _amount: Amount, _ttl: Duration, _now: Timestamp) -> Result<Invoice> {
        Err(StoreError::schema("invoice table unavailable"))
    }

    fn claim(&self, _nonce: &str, _path: &str, _now: Timestamp) -> Result<Option<Invoice>> {
        Err(StoreError::schema("invoice table unavailable"))
    }

    fn prune(&self, _now: Timestamp) -> Result<usize> {
        Err(StoreError::schema("invoice table unavailable"))
    }

    fn pending_count(&self) -> Result<u64> {
        Err(StoreError::schema("invoice table unavailable"))
    }
}

/// In-memory content resolver.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    content: HashMap<String, Vec<u8>>,
}

impl StaticContent {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` at `path`.
    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.content.insert(path.into(), bytes.into());
        self
    }
}

#[async_trait]
impl ContentResolver for StaticContent {
    async fn resolve(&self, path: &str) -> GateResult<Vec<u8>> {
        self.content
            .get(path)
            .cloned()
            .ok_or_else(|| path402_gate::GateError::content(path, "not in static content"))
    }
}
