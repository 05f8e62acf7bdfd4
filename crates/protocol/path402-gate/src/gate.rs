//! Payment gate for path402-protected resources.
//!
//! The `PaymentGate` drives each request through the protocol:
//! 1. Unpaid request: price at current supply, mint an invoice, challenge
//! 2. Paid request: claim the invoice once, verify the payment
//! 3. Record the serve (best effort) and bump supply
//! 4. Resolve content and check its integrity hash
//! 5. Stamp a proof-of-service token
//!
//! Any invoice or verification problem falls back to step 1 with a fresh
//! invoice. The gate holds no mutable state of its own; single-use nonces
//! and supply counts are enforced by the ledgers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use path402_crypto::{content_hash, verify_content, TokenIssuer};
use path402_econ::{offering_price, SplitRatios};
use path402_store::{InvoiceLedger, ServeLedger};
use path402_types::{
    Amount, Invoice, LedgerStats, PathOffering, PaymentClaim, ServeEvent, Timestamp,
    PROTOCOL_VERSION,
};
use tracing::{debug, error, info, warn};

use crate::content::ContentResolver;
use crate::error::{GateError, GateResult};
use crate::types::{
    Challenge, DiscoveryDocument, GateConfig, GateRequest, GateResponse, OfferingSummary,
    PaymentHeaders, Served,
};
use crate::verifier::PaymentVerifier;

/// Hooks for counting gate outcomes.
///
/// Every method defaults to a no-op.
pub trait GateObserver: Send + Sync {
    fn challenge_issued(&self, _path: &str) {}
    fn served(&self, _path: &str, _price_paid: Amount) {}
    fn verification_failed(&self, _path: &str) {}
    fn integrity_failed(&self, _path: &str) {}
    fn ledger_write_failed(&self, _path: &str) {}
}

struct NoopObserver;

impl GateObserver for NoopObserver {}

/// The two ledgers a gate writes to.
#[derive(Clone)]
pub struct GateLedgers {
    pub invoices: Arc<dyn InvoiceLedger>,
    pub serves: Arc<dyn ServeLedger>,
}

impl GateLedgers {
    /// Bundle two ledgers.
    pub fn new(invoices: Arc<dyn InvoiceLedger>, serves: Arc<dyn ServeLedger>) -> Self {
        Self { invoices, serves }
    }
}

/// Request coordinator for priced paths.
pub struct PaymentGate {
    identity: String,
    pay_to: String,
    currency: String,
    payment_timeout: std::time::Duration,
    ratios: SplitRatios,
    offerings: HashMap<String, PathOffering>,
    ledgers: GateLedgers,
    verifier: PaymentVerifier,
    content: Arc<dyn ContentResolver>,
    tokens: TokenIssuer,
    observer: Arc<dyn GateObserver>,
}

impl PaymentGate {
    /// Create a new payment gate.
    ///
    /// Fails if two offerings share a path or the payment timeout is zero.
    pub fn new(
        config: GateConfig,
        ledgers: GateLedgers,
        verifier: PaymentVerifier,
        content: Arc<dyn ContentResolver>,
        tokens: TokenIssuer,
    ) -> GateResult<Self> {
        if config.payment_timeout.is_zero() {
            return Err(GateError::config("payment timeout must be non-zero"));
        }

        let mut offerings = HashMap::with_capacity(config.offerings.len());
        for offering in config.offerings {
            let path = offering.path.clone();
            if offerings.insert(path.clone(), offering).is_some() {
                return Err(GateError::config(format!("duplicate offering path {}", path)));
            }
        }

        Ok(Self {
            identity: config.identity,
            pay_to: config.pay_to,
            currency: config.currency,
            payment_timeout: config.payment_timeout,
            ratios: config.ratios,
            offerings,
            ledgers,
            verifier,
            content,
            tokens,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Attach an outcome observer.
    pub fn with_observer(mut self, observer: Arc<dyn GateObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Identity of this node.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Active verification strategy.
    pub fn verifier(&self) -> &PaymentVerifier {
        &self.verifier
    }

    /// Look up the offering at `path`.
    pub fn offering(&self, path: &str) -> Option<&PathOffering> {
        self.offerings.get(path)
    }

    /// Handle one request for a gated path.
    ///
    /// Returns a challenge or the served content. Errors are terminal for
    /// the request: unknown path, integrity failure, or invoice storage
    /// failure.
    pub async fn handle(&self, request: GateRequest) -> GateResult<GateResponse> {
        let offering = self
            .offerings
            .get(&request.path)
            .ok_or_else(|| GateError::NotFound {
                path: request.path.clone(),
            })?;

        if let Some(payment) = &request.payment {
            match self.redeem(offering, payment, &request.client).await {
                Ok(served) => return Ok(GateResponse::Served(served)),
                Err(e) if e.is_rechallenge() => {
                    if let GateError::Verification(reason) = &e {
                        warn!(
                            path = %offering.path,
                            tx_id = %payment.tx_id,
                            reason = %reason,
                            "Payment verification failed; issuing fresh challenge"
                        );
                        self.observer.verification_failed(&offering.path);
                    } else {
                        debug!(
                            path = %offering.path,
                            nonce = %payment.nonce,
                            "Invoice claim missed; issuing fresh challenge"
                        );
                    }
                }
                Err(e) => return Err(e),
            }
        }

        let challenge = self.challenge(offering).await?;
        Ok(GateResponse::Challenge(challenge))
    }

    /// Mint a fresh invoice for `offering` at its current price.
    async fn challenge(&self, offering: &PathOffering) -> GateResult<Challenge> {
        let now = now_millis();
        let supply = self.supply(&offering.path).await?;
        let price = offering_price(offering, supply);

        let invoices = Arc::clone(&self.ledgers.invoices);
        match blocking(move || invoices.prune(now)).await {
            Ok(0) => {}
            Ok(pruned) => debug!(pruned, "Pruned expired invoices"),
            Err(e) => warn!(error = %e, "Failed to prune expired invoices"),
        }

        let invoices = Arc::clone(&self.ledgers.invoices);
        let path = offering.path.clone();
        let timeout = self.payment_timeout;
        let invoice: Invoice =
            blocking(move || invoices.mint(&path, price, timeout, now)).await?;

        debug!(
            path = %offering.path,
            nonce = %invoice.nonce,
            amount = price,
            supply,
            "Issued payment challenge"
        );
        self.observer.challenge_issued(&offering.path);

        Ok(Challenge {
            path: offering.path.clone(),
            price,
            currency: self.currency.clone(),
            curve: offering.curve.id().to_string(),
            supply,
            pay_to: self.pay_to.clone(),
            nonce: invoice.nonce,
            expires: invoice.expires_at,
            issuer_share: self.ratios.issuer(),
            server_share: self.ratios.server(),
        })
    }

    /// Claim, verify, record, resolve and stamp.
    async fn redeem(
        &self,
        offering: &PathOffering,
        payment: &PaymentHeaders,
        client: &str,
    ) -> GateResult<Served> {
        let now = now_millis();

        let invoices = Arc::clone(&self.ledgers.invoices);
        let nonce = payment.nonce.clone();
        let path = offering.path.clone();
        let invoice = blocking(move || invoices.claim(&nonce, &path, now))
            .await?
            .ok_or(GateError::InvoiceInvalid)?;

        // The invoice is consumed from here on; a failed check needs a new one.
        let claim = PaymentClaim {
            tx_id: payment.tx_id.clone(),
            signature: payment.signature.clone(),
        };
        self.verifier.verify(&claim, invoice.amount).await?;

        let split = self.ratios.split(invoice.amount);
        let event = ServeEvent::from_split(
            &offering.path,
            &self.identity,
            client,
            split,
            &payment.tx_id,
            now,
        );

        let serves = Arc::clone(&self.ledgers.serves);
        let supply = match blocking(move || serves.record_serve(&event)).await {
            Ok(supply) => Some(supply),
            Err(e) => {
                warn!(
                    path = %offering.path,
                    tx_id = %payment.tx_id,
                    error = %e,
                    "Failed to record serve; releasing content anyway"
                );
                self.observer.ledger_write_failed(&offering.path);
                None
            }
        };

        let content = self.content.resolve(&offering.path).await?;
        if let Some(expected) = &offering.content_hash {
            if !verify_content(&content, expected) {
                let actual = content_hash(&content);
                error!(
                    path = %offering.path,
                    expected = %expected,
                    actual = %actual,
                    "Content integrity check failed; withholding content"
                );
                self.observer.integrity_failed(&offering.path);
                return Err(GateError::IntegrityFailure {
                    path: offering.path.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let token = self
            .tokens
            .issue(&offering.path, &payment.tx_id, invoice.amount, &self.identity)?;

        info!(
            path = %offering.path,
            amount = invoice.amount,
            issuer_share = split.issuer_share,
            server_share = split.server_share,
            supply = ?supply,
            "Served paid content"
        );
        self.observer.served(&offering.path, invoice.amount);

        Ok(Served {
            path: offering.path.clone(),
            content,
            price_paid: invoice.amount,
            served_by: self.identity.clone(),
            token,
            supply,
        })
    }

    async fn supply(&self, path: &str) -> GateResult<u64> {
        let serves = Arc::clone(&self.ledgers.serves);
        let path = path.to_string();
        blocking(move || serves.supply(&path)).await
    }

    /// Public listing of every offering with its current price.
    pub async fn discovery(&self) -> GateResult<DiscoveryDocument> {
        let mut paths: Vec<&String> = self.offerings.keys().collect();
        paths.sort();

        let mut offerings = Vec::with_capacity(paths.len());
        for path in paths {
            let offering = &self.offerings[path];
            let supply = self.supply(path).await?;
            offerings.push(OfferingSummary {
                path: offering.path.clone(),
                curve: offering.curve.id().to_string(),
                base_price: offering.base_price,
                supply,
                current_price: offering_price(offering, supply),
                max_supply: offering.max_supply,
                content_hash: offering.content_hash.clone(),
                issuer_address: offering.issuer_address.clone(),
                permissions: offering.permissions,
            });
        }

        Ok(DiscoveryDocument {
            version: PROTOCOL_VERSION.to_string(),
            served_by: self.identity.clone(),
            pay_to: self.pay_to.clone(),
            currency: self.currency.clone(),
            issuer_share: self.ratios.issuer(),
            server_share: self.ratios.server(),
            offerings,
        })
    }

    /// Aggregate ledger totals.
    pub async fn stats(&self) -> GateResult<LedgerStats> {
        let serves = Arc::clone(&self.ledgers.serves);
        blocking(move || serves.stats()).await
    }
}

/// Run a ledger call off the async worker threads.
async fn blocking<T, F>(f: F) -> GateResult<T>
where
    F: FnOnce() -> path402_store::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GateError::Internal(format!("ledger task failed: {}", e)))?
        .map_err(GateError::from)
}

/// Current wall clock in Unix milliseconds.
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}
