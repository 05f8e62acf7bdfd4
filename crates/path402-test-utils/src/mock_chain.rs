//! Mock implementation of the `ChainRpc` trait for testing.
//!
//! Holds transactions in memory and records every lookup.

use async_trait::async_trait;
use path402_gate::{ChainOutput, ChainRpc, ChainRpcError, ChainRpcResult, ChainTransaction};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

struct MockChainInner {
    /// Known transactions: tx_id -> transaction.
    transactions: HashMap<String, ChainTransaction>,
    /// Every tx_id looked up, in order.
    lookups: Vec<String>,
    /// When true, every lookup returns a transport error.
    should_fail: bool,
}

/// A mock chain node.
///
/// Uses `Arc<RwLock<...>>` internally, so it is cheap to clone and all
/// clones share the same state.
#[derive(Clone)]
pub struct MockChainRpc {
    inner: Arc<RwLock<MockChainInner>>,
}

impl Default for MockChainRpc {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainRpc {
    /// Create an empty mock chain.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockChainInner {
                transactions: HashMap::new(),
                lookups: Vec::new(),
                should_fail: false,
            })),
        }
    }

    /// Register a transaction.
    pub fn with_transaction(self, tx_id: impl Into<String>, tx: ChainTransaction) -> Self {
        self.insert(tx_id, tx);
        self
    }

    /// Register a transaction paying `coins` to `address`.
    pub fn with_payment(
        self,
        tx_id: impl Into<String>,
        address: &str,
        coins: f64,
        confirmations: u64,
    ) -> Self {
        self.with_transaction(
            tx_id,
            ChainTransaction {
                confirmations,
                outputs: vec![ChainOutput::to_address(address, coins)],
            },
        )
    }

    /// Register or replace a transaction at runtime.
    pub fn insert(&self, tx_id: impl Into<String>, tx: ChainTransaction) {
        self.inner
            .write()
            .unwrap()
            .transactions
            .insert(tx_id.into(), tx);
    }

    /// Configure the mock to fail all lookups.
    pub fn with_failure(self) -> Self {
        self.inner.write().unwrap().should_fail = true;
        self
    }

    /// Set the failure mode at runtime.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.write().unwrap().should_fail = should_fail;
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// Every tx_id looked up so far.
    pub fn lookups(&self) -> Vec<String> {
        self.inner.read().unwrap().lookups.clone()
    }

    /// Number of lookups so far.
    pub fn lookup_count(&self) -> usize {
        self.inner.read().unwrap().lookups.len()
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn get_transaction(&self, tx_id: &str) -> ChainRpcResult<Option<ChainTransaction>> {
        let mut inner = self.inner.write().unwrap();
        inner.lookups.push(tx_id.to_string());
        if inner.should_fail {
            return Err(ChainRpcError::Transport("mock chain unavailable".into()));
        }
        Ok(inner.transactions.get(tx_id).cloned())
    }
}
