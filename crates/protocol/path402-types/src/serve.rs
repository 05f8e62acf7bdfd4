//! Completed serves and revenue accounting types.

use serde::{Deserialize, Serialize};

use crate::{Amount, Timestamp};

/// Revenue split of a single payment.
///
/// Invariant: `issuer_share + server_share == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSplit {
    pub total: Amount,
    pub issuer_share: Amount,
    pub server_share: Amount,
}

/// Immutable record of a paid resource release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServeEvent {
    /// Path that was served.
    pub path: String,
    /// Identity of the serving node.
    pub served_by: String,
    /// Identity of the paying client.
    pub served_to: String,
    /// Invoice amount that was paid.
    pub price_paid: Amount,
    /// Issuer's portion of `price_paid`.
    pub issuer_share: Amount,
    /// Server's portion of `price_paid`.
    pub server_share: Amount,
    /// Transaction identifier presented as proof of payment.
    pub payment_proof_id: String,
    /// Serve time (Unix milliseconds).
    pub timestamp: Timestamp,
}

impl ServeEvent {
    /// Build an event from a computed revenue split.
    pub fn from_split(
        path: impl Into<String>,
        served_by: impl Into<String>,
        served_to: impl Into<String>,
        split: RevenueSplit,
        payment_proof_id: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            path: path.into(),
            served_by: served_by.into(),
            served_to: served_to.into(),
            price_paid: split.total,
            issuer_share: split.issuer_share,
            server_share: split.server_share,
            payment_proof_id: payment_proof_id.into(),
            timestamp,
        }
    }

    /// Get the revenue split recorded on this event.
    pub fn split(&self) -> RevenueSplit {
        RevenueSplit {
            total: self.price_paid,
            issuer_share: self.issuer_share,
            server_share: self.server_share,
        }
    }
}

/// Aggregate snapshot of the serve ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_serves: u64,
    pub total_revenue: Amount,
    pub distinct_paths: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_from_split() {
        let split = RevenueSplit {
            total: 101,
            issuer_share: 20,
            server_share: 81,
        };
        let event = ServeEvent::from_split("/$doc", "node-a", "client-b", split, "ab", 42);
        assert_eq!(event.price_paid, 101);
        assert_eq!(event.split(), split);
    }
}
