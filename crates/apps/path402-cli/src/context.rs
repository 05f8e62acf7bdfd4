//! Node context: opened ledgers plus everything needed to build a gate.

use std::sync::Arc;

use path402_crypto::{SigningSecret, TokenIssuer};
use path402_gate::{
    GateLedgers, GateObserver, JsonRpcChainClient, PaymentGate, PaymentVerifier, RpcAuth,
};
use path402_store::{LedgerConfig, LedgerState};
use tracing::{info, warn};

use crate::config::{CliConfig, VerificationMode};
use crate::error::{CliError, CliResult};

/// Configuration plus the ledger database it points at.
pub struct NodeContext {
    pub config: CliConfig,
    pub ledgers: LedgerState,
}

impl NodeContext {
    /// Open the ledger database named by `config`.
    pub fn open(config: CliConfig) -> CliResult<Self> {
        let ledger_config =
            LedgerConfig::new(config.base_dir()).with_database_path(&config.storage.database);
        let ledgers = LedgerState::open(ledger_config)?;
        Ok(Self { config, ledgers })
    }

    /// The configured token secret, or a fresh random one.
    ///
    /// Tokens signed with a random secret stop verifying once the process
    /// exits.
    pub fn signing_secret(&self) -> CliResult<SigningSecret> {
        match &self.config.security.signing_secret {
            Some(secret) => Ok(SigningSecret::from_bytes(secret.as_bytes().to_vec())?),
            None => {
                warn!("No [security].signing_secret configured; using an ephemeral secret");
                Ok(SigningSecret::generate())
            }
        }
    }

    /// Build the configured payment verifier.
    pub fn verifier(&self) -> CliResult<PaymentVerifier> {
        let verification = &self.config.verification;
        match verification.mode {
            VerificationMode::Stub => {
                warn!("Stub verification accepts any well-formed transaction id");
                Ok(PaymentVerifier::TrustedStub)
            }
            VerificationMode::Chain => {
                let url = verification.rpc_url.as_deref().ok_or_else(|| {
                    CliError::config("verification.rpc_url is required when mode = \"chain\"")
                })?;
                let auth = verification.rpc_user.as_ref().map(|user| RpcAuth {
                    user: user.clone(),
                    password: verification.rpc_password.clone(),
                });
                let client = JsonRpcChainClient::new(url, auth)?;
                info!(
                    rpc_url = %url,
                    min_confirmations = verification.min_confirmations,
                    "Using chain-query verification"
                );
                Ok(PaymentVerifier::chain_query(
                    Arc::new(client),
                    self.config.receiving_address(),
                    verification.min_confirmations,
                ))
            }
        }
    }

    /// Wire a gate over this context's ledgers.
    pub fn build_gate(&self, observer: Option<Arc<dyn GateObserver>>) -> CliResult<PaymentGate> {
        let ledgers = GateLedgers::new(
            Arc::new(self.ledgers.invoices.clone()),
            Arc::new(self.ledgers.serves.clone()),
        );
        let tokens = TokenIssuer::new(self.signing_secret()?, self.config.economics.token_ttl());

        let gate = PaymentGate::new(
            self.config.gate_config()?,
            ledgers,
            self.verifier()?,
            Arc::new(self.config.content_resolver()),
            tokens,
        )?;

        Ok(match observer {
            Some(observer) => gate.with_observer(observer),
            None => gate,
        })
    }
}
