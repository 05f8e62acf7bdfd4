//! Pending payment invoices.

use serde::{Deserialize, Serialize};

use crate::{Amount, Timestamp};

/// A minted, time-bound, single-use payment request.
///
/// `amount` is frozen when the invoice is minted; later supply changes
/// never alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique claim token (32 hex characters).
    pub nonce: String,
    /// Path the invoice was minted for.
    pub path: String,
    /// Price owed, in minor units.
    pub amount: Amount,
    /// Expiry time (Unix milliseconds). Claims at or after this instant fail.
    pub expires_at: Timestamp,
    /// Mint time (Unix milliseconds).
    pub created_at: Timestamp,
}

impl Invoice {
    /// Check whether the invoice is still claimable at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_live_boundary() {
        let invoice = Invoice {
            nonce: "00".repeat(16),
            path: "/$doc".to_string(),
            amount: 500,
            expires_at: 2_000,
            created_at: 1_000,
        };
        assert!(invoice.is_live(1_999));
        assert!(!invoice.is_live(2_000));
    }
}
