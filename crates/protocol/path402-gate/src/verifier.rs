//! Payment verification strategies.
//!
//! The strategy is picked once when the gate is built. Neither variant has
//! side effects or retries.

use std::sync::Arc;

use path402_types::{Amount, PaymentClaim, MINOR_UNITS_PER_COIN, TX_ID_LENGTH};
use tracing::debug;

use crate::chain::{ChainRpc, ChainTransaction};
use crate::error::{VerifyError, VerifyResult};

/// Verifies payment claims against an expected amount.
#[derive(Clone)]
pub enum PaymentVerifier {
    /// Accepts any well-formed 64-character transaction id without looking
    /// it up. Only for development or a trusted internal boundary.
    TrustedStub,
    /// Looks the transaction up on chain and checks depth and amount.
    ChainQuery(ChainQueryVerifier),
}

impl PaymentVerifier {
    /// Build a chain-query verifier.
    pub fn chain_query(
        rpc: Arc<dyn ChainRpc>,
        receiving_address: impl Into<String>,
        min_confirmations: u64,
    ) -> Self {
        Self::ChainQuery(ChainQueryVerifier::new(rpc, receiving_address, min_confirmations))
    }

    /// Name of the active strategy.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::TrustedStub => "stub",
            Self::ChainQuery(_) => "chain",
        }
    }

    /// Check that `claim` pays at least `expected`.
    pub async fn verify(&self, claim: &PaymentClaim, expected: Amount) -> VerifyResult<()> {
        match self {
            Self::TrustedStub => verify_stub(claim),
            Self::ChainQuery(verifier) => verifier.verify(claim, expected).await,
        }
    }
}

impl std::fmt::Debug for PaymentVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrustedStub => write!(f, "PaymentVerifier::TrustedStub"),
            Self::ChainQuery(v) => f
                .debug_struct("PaymentVerifier::ChainQuery")
                .field("receiving_address", &v.receiving_address)
                .field("min_confirmations", &v.min_confirmations)
                .finish(),
        }
    }
}

fn verify_stub(claim: &PaymentClaim) -> VerifyResult<()> {
    let len = claim.tx_id.chars().count();
    if len == 0 {
        return Err(VerifyError::MissingTransactionId);
    }
    if len != TX_ID_LENGTH {
        return Err(VerifyError::MalformedTransactionId { len });
    }
    Ok(())
}

/// Chain-backed verification settings.
#[derive(Clone)]
pub struct ChainQueryVerifier {
    rpc: Arc<dyn ChainRpc>,
    receiving_address: String,
    min_confirmations: u64,
}

impl ChainQueryVerifier {
    /// Create a verifier expecting payment to `receiving_address`.
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        receiving_address: impl Into<String>,
        min_confirmations: u64,
    ) -> Self {
        Self {
            rpc,
            receiving_address: receiving_address.into(),
            min_confirmations,
        }
    }

    /// Address payments must be sent to.
    pub fn receiving_address(&self) -> &str {
        &self.receiving_address
    }

    async fn verify(&self, claim: &PaymentClaim, expected: Amount) -> VerifyResult<()> {
        if claim.tx_id.is_empty() {
            return Err(VerifyError::MissingTransactionId);
        }

        let tx = self
            .rpc
            .get_transaction(&claim.tx_id)
            .await
            .map_err(|e| VerifyError::Rpc(e.to_string()))?
            .ok_or(VerifyError::TransactionNotFound)?;

        if tx.confirmations < self.min_confirmations {
            return Err(VerifyError::InsufficientConfirmations {
                have: tx.confirmations,
                need: self.min_confirmations,
            });
        }

        let received = amount_paid_to(&tx, &self.receiving_address);
        debug!(
            tx_id = %claim.tx_id,
            confirmations = tx.confirmations,
            received,
            expected,
            "Chain payment located"
        );

        if received < expected {
            return Err(VerifyError::InsufficientAmount {
                required: expected,
                received,
            });
        }

        Ok(())
    }
}

/// Sum of every output paying `address`, in minor units.
///
/// Each output is converted with round-to-nearest before summing.
pub fn amount_paid_to(tx: &ChainTransaction, address: &str) -> Amount {
    tx.outputs
        .iter()
        .filter(|out| out.pays(address))
        .map(|out| coins_to_minor(out.value))
        .fold(0, Amount::saturating_add)
}

/// Convert a native coin value to minor units, rounding to nearest.
///
/// Negative and non-finite values convert to zero.
pub fn coins_to_minor(value: f64) -> Amount {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value * MINOR_UNITS_PER_COIN as f64).round() as Amount
}
