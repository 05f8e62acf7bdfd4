//! Client payment claims.

use serde::{Deserialize, Serialize};

/// Proof of payment presented by a client against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentClaim {
    /// Transaction identifier of the payment.
    pub tx_id: String,
    /// Optional client signature. Not checked by any verifier today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl PaymentClaim {
    /// Create a claim for a transaction identifier.
    pub fn new(tx_id: impl Into<String>) -> Self {
        Self {
            tx_id: tx_id.into(),
            signature: None,
        }
    }

    /// Attach a client signature.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}
