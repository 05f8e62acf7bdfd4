//! Request, response and configuration types for the payment gate.

use std::time::Duration;

use path402_econ::SplitRatios;
use path402_types::{
    Amount, PathOffering, Permissions, Timestamp, DEFAULT_CURRENCY, DEFAULT_PAYMENT_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Header names
// =============================================================================

/// Protocol version, sent on every response.
pub const HEADER_VERSION: &str = "X-402-Version";
/// Payment transaction identifier presented by the client.
pub const HEADER_PAYMENT: &str = "X-402-Payment";
/// Invoice nonce presented by the client.
pub const HEADER_NONCE: &str = "X-402-Nonce";
/// Optional client signature over the payment.
pub const HEADER_SIGNATURE: &str = "X-402-Signature";
/// Optional client identity recorded as `served_to`.
pub const HEADER_PAYER: &str = "X-402-Payer";
/// Identity of the serving node.
pub const HEADER_SERVED_BY: &str = "X-402-Served-By";
/// Amount paid for the served content.
pub const HEADER_PRICE_PAID: &str = "X-402-Price-Paid";
/// Proof-of-service token.
pub const HEADER_TOKEN: &str = "X-402-Token";

/// Well-known path of the discovery document.
pub const DISCOVERY_PATH: &str = "/.well-known/402.json";

// =============================================================================
// Configuration
// =============================================================================

/// Settings for a [`PaymentGate`](crate::PaymentGate).
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Identity recorded as `served_by` and used as the token issuer.
    pub identity: String,
    /// Payee address advertised in challenges.
    pub pay_to: String,
    /// Currency label advertised in challenges.
    pub currency: String,
    /// Lifetime of a minted invoice.
    pub payment_timeout: Duration,
    /// Issuer/server revenue split.
    pub ratios: SplitRatios,
    /// Offerings served by this gate.
    pub offerings: Vec<PathOffering>,
}

impl GateConfig {
    /// Create a configuration with default economics and no offerings.
    pub fn new(identity: impl Into<String>, pay_to: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            pay_to: pay_to.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            payment_timeout: Duration::from_secs(DEFAULT_PAYMENT_TIMEOUT_SECS),
            ratios: SplitRatios::default(),
            offerings: Vec::new(),
        }
    }

    /// Add an offering.
    pub fn with_offering(mut self, offering: PathOffering) -> Self {
        self.offerings.push(offering);
        self
    }

    /// Set the invoice lifetime.
    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }

    /// Set the revenue split.
    pub fn with_ratios(mut self, ratios: SplitRatios) -> Self {
        self.ratios = ratios;
        self
    }

    /// Set the currency label.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Payment headers presented with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentHeaders {
    /// Payment transaction identifier.
    pub tx_id: String,
    /// Nonce of the invoice being paid.
    pub nonce: String,
    /// Optional client signature.
    pub signature: Option<String>,
}

impl PaymentHeaders {
    /// Build from raw header values.
    ///
    /// Returns `None` unless both the payment and nonce headers are present;
    /// a request carrying only one of them is treated as unpaid.
    pub fn from_parts(
        tx_id: Option<&str>,
        nonce: Option<&str>,
        signature: Option<&str>,
    ) -> Option<Self> {
        match (tx_id, nonce) {
            (Some(tx_id), Some(nonce)) => Some(Self {
                tx_id: tx_id.trim().to_string(),
                nonce: nonce.trim().to_string(),
                signature: signature.map(|s| s.trim().to_string()),
            }),
            _ => None,
        }
    }
}

/// A request for a gated path.
#[derive(Debug, Clone)]
pub struct GateRequest {
    /// Requested path.
    pub path: String,
    /// Payment headers, if the client is paying.
    pub payment: Option<PaymentHeaders>,
    /// Identity recorded as `served_to`.
    pub client: String,
}

impl GateRequest {
    /// Create an unpaid request.
    pub fn new(path: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            payment: None,
            client: client.into(),
        }
    }

    /// Attach payment headers.
    pub fn with_payment(mut self, payment: PaymentHeaders) -> Self {
        self.payment = Some(payment);
        self
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Priced, time-bound invoice returned to an unpaid request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Requested path.
    pub path: String,
    /// Invoice amount, in minor units.
    pub price: Amount,
    /// Currency label.
    pub currency: String,
    /// Curve identifier in effect for the path.
    pub curve: String,
    /// Supply at the time of pricing.
    pub supply: u64,
    /// Payee address.
    pub pay_to: String,
    /// Invoice nonce to echo in `X-402-Nonce`.
    pub nonce: String,
    /// Invoice expiry (Unix milliseconds).
    pub expires: Timestamp,
    /// Configured issuer ratio.
    pub issuer_share: f64,
    /// Configured server ratio.
    pub server_share: f64,
}

/// Content released against a verified payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    /// Served path.
    pub path: String,
    /// Content bytes.
    pub content: Vec<u8>,
    /// Amount paid.
    pub price_paid: Amount,
    /// Serving node identity.
    pub served_by: String,
    /// Proof-of-service token.
    pub token: String,
    /// Supply after this serve, if the ledger write succeeded.
    pub supply: Option<u64>,
}

/// Outcome of a gated request.
#[derive(Debug, Clone, PartialEq)]
pub enum GateResponse {
    /// Payment required.
    Challenge(Challenge),
    /// Content released.
    Served(Served),
}

impl GateResponse {
    /// Returns the challenge, if this is one.
    pub fn as_challenge(&self) -> Option<&Challenge> {
        match self {
            Self::Challenge(c) => Some(c),
            Self::Served(_) => None,
        }
    }

    /// Returns the served content, if this is a serve.
    pub fn as_served(&self) -> Option<&Served> {
        match self {
            Self::Served(s) => Some(s),
            Self::Challenge(_) => None,
        }
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Public summary of one offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingSummary {
    pub path: String,
    pub curve: String,
    pub base_price: Amount,
    pub supply: u64,
    pub current_price: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub issuer_address: String,
    pub permissions: Permissions,
}

/// Document published at [`DISCOVERY_PATH`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    pub version: String,
    pub served_by: String,
    pub pay_to: String,
    pub currency: String,
    pub issuer_share: f64,
    pub server_share: f64,
    pub offerings: Vec<OfferingSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_headers_need_both_parts() {
        assert!(PaymentHeaders::from_parts(Some("tx"), None, None).is_none());
        assert!(PaymentHeaders::from_parts(None, Some("n"), None).is_none());

        let headers = PaymentHeaders::from_parts(Some(" tx "), Some("n"), Some("sig")).unwrap();
        assert_eq!(headers.tx_id, "tx");
        assert_eq!(headers.nonce, "n");
        assert_eq!(headers.signature.as_deref(), Some("sig"));
    }

    #[test]
    fn test_challenge_json_fields() {
        let challenge = Challenge {
            path: "/$doc".into(),
            price: 1000,
            currency: "SAT".into(),
            curve: "sqrt_decay".into(),
            supply: 0,
            pay_to: "1Pay".into(),
            nonce: "ab".into(),
            expires: 1,
            issuer_share: 0.7,
            server_share: 0.3,
        };
        let json = serde_json::to_value(&challenge).unwrap();
        for field in [
            "path",
            "price",
            "currency",
            "curve",
            "supply",
            "pay_to",
            "nonce",
            "expires",
            "issuer_share",
            "server_share",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = GateConfig::new("node", "1Pay");
        assert_eq!(config.currency, "SAT");
        assert_eq!(config.payment_timeout, Duration::from_secs(300));
        assert!(config.offerings.is_empty());
    }
}
