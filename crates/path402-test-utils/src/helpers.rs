//! Helper functions for creating test fixtures.
//!
//! Provides deterministic secrets, transaction ids, offerings, and
//! pre-wired `PaymentGate`s over in-memory ledgers.

use path402_crypto::{SigningSecret, TokenIssuer};
use path402_gate::{
    ContentResolver, GateConfig, GateLedgers, GateRequest, PaymentGate, PaymentHeaders,
    PaymentVerifier,
};
use path402_store::{InvoiceLedger, LedgerState, ServeLedger, SqliteInvoiceLedger, SqliteServeLedger};
use path402_types::{Curve, PathOffering};
use std::sync::Arc;
use std::time::Duration;

use crate::StaticContent;

/// Server identity used by helper-built gates.
pub const TEST_SERVER: &str = "node-test";

/// Payee address used by helper-built gates.
pub const TEST_PAY_TO: &str = "1TestPayeeAddress";

/// Deterministic signing secret.
pub fn test_secret() -> SigningSecret {
    SigningSecret::from_bytes(b"path402-test-secret".to_vec()).unwrap()
}

/// Token issuer over [`test_secret`] with a one-hour lifetime.
pub fn test_token_issuer() -> TokenIssuer {
    TokenIssuer::new(test_secret(), Duration::from_secs(3600))
}

/// A well-formed 64-character transaction id derived from `n`.
pub fn tx_id(n: u64) -> String {
    format!("{:064x}", n)
}

/// `/$doc`: base price 1000 on the sqrt_decay curve.
pub fn doc_offering() -> PathOffering {
    PathOffering::new("/$doc", 1000, Curve::SqrtDecay, "1IssuerAddress")
}

/// Payment headers answering `nonce` with transaction `tx_id`.
pub fn paid(nonce: &str, tx_id: &str) -> PaymentHeaders {
    PaymentHeaders {
        tx_id: tx_id.to_string(),
        nonce: nonce.to_string(),
        signature: None,
    }
}

/// A paid request for `path`.
pub fn paid_request(path: &str, nonce: &str, tx_id: &str) -> GateRequest {
    GateRequest::new(path, "client-test").with_payment(paid(nonce, tx_id))
}

/// A gate plus direct handles to the ledgers behind it.
pub struct TestGate {
    pub gate: PaymentGate,
    pub invoices: SqliteInvoiceLedger,
    pub serves: SqliteServeLedger,
}

/// Builder for [`TestGate`].
pub struct TestGateBuilder {
    config: GateConfig,
    verifier: PaymentVerifier,
    content: Option<Arc<dyn ContentResolver>>,
    invoices: Option<Arc<dyn InvoiceLedger>>,
    serves: Option<Arc<dyn ServeLedger>>,
}

impl TestGateBuilder {
    /// Start from a stub-verified gate with no offerings.
    pub fn new() -> Self {
        Self {
            config: GateConfig::new(TEST_SERVER, TEST_PAY_TO),
            verifier: PaymentVerifier::TrustedStub,
            content: None,
            invoices: None,
            serves: None,
        }
    }

    /// Add an offering.
    pub fn offering(mut self, offering: PathOffering) -> Self {
        self.config = self.config.with_offering(offering);
        self
    }

    /// Replace the gate configuration, keeping its offerings.
    pub fn configure(mut self, f: impl FnOnce(GateConfig) -> GateConfig) -> Self {
        self.config = f(self.config);
        self
    }

    /// Use `verifier`.
    pub fn verifier(mut self, verifier: PaymentVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// Use `content` instead of the default static payloads.
    pub fn content(mut self, content: impl ContentResolver + 'static) -> Self {
        self.content = Some(Arc::new(content));
        self
    }

    /// Route invoice calls to `ledger` instead of the in-memory one.
    pub fn invoice_ledger(mut self, ledger: impl InvoiceLedger + 'static) -> Self {
        self.invoices = Some(Arc::new(ledger));
        self
    }

    /// Route serve calls to `ledger` instead of the in-memory one.
    pub fn serve_ledger(mut self, ledger: impl ServeLedger + 'static) -> Self {
        self.serves = Some(Arc::new(ledger));
        self
    }

    /// Build the gate over fresh in-memory ledgers.
    ///
    /// Unless overridden, each offering serves the bytes `payload:<path>`.
    pub fn build(self) -> TestGate {
        let state = LedgerState::open_in_memory().unwrap();

        let content: Arc<dyn ContentResolver> = match self.content {
            Some(content) => content,
            None => Arc::new(
                self.config
                    .offerings
                    .iter()
                    .fold(StaticContent::new(), |c, o| {
                        c.with(o.path.clone(), static_payload(&o.path))
                    }),
            ),
        };

        let invoices: Arc<dyn InvoiceLedger> = match self.invoices {
            Some(ledger) => ledger,
            None => Arc::new(state.invoices.clone()),
        };
        let serves: Arc<dyn ServeLedger> = match self.serves {
            Some(ledger) => ledger,
            None => Arc::new(state.serves.clone()),
        };
        let ledgers = GateLedgers::new(invoices, serves);

        let gate = PaymentGate::new(
            self.config,
            ledgers,
            self.verifier,
            content,
            test_token_issuer(),
        )
        .unwrap();

        TestGate {
            gate,
            invoices: state.invoices,
            serves: state.serves,
        }
    }
}

impl Default for TestGateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes served at `path` by default.
pub fn static_payload(path: &str) -> Vec<u8> {
    format!("payload:{}", path).into_bytes()
}

/// A stub-verified gate serving [`doc_offering`].
pub fn stub_gate() -> TestGate {
    TestGateBuilder::new().offering(doc_offering()).build()
}
