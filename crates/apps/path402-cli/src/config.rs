//! Node configuration.
//!
//! Loaded from `<data_dir>/config.toml` (override with `--config`). A missing
//! file yields defaults with no offerings.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use path402_econ::SplitRatios;
use path402_gate::{ContentSource, GateConfig, SourceMapResolver};
use path402_types::{
    Amount, Curve, PathOffering, Permissions, DEFAULT_CURRENCY, DEFAULT_ISSUER_RATIO,
    DEFAULT_PAYMENT_TIMEOUT_SECS, DEFAULT_SERVER_RATIO, DEFAULT_TOKEN_TTL_SECS,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CliError, CliResult};

/// Default HTTP listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:4020";

/// Upper bound for `payment_timeout_secs` and `token_ttl_secs` (one year).
pub const MAX_LIFETIME_SECS: u64 = 365 * 86_400;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern is valid")
    })
}

/// Expand environment variables in a string.
/// Supports `${VAR_NAME}` syntax; unset variables are left as written.
fn expand_env_vars(input: &str) -> String {
    env_var_pattern()
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
}

fn expand_opt(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        *v = expand_env_vars(v);
    }
}

/// CLI configuration loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// HTTP server and node identity.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Revenue split and lifetimes.
    pub economics: EconomicsConfig,
    /// Payment verification strategy.
    pub verification: VerificationConfig,
    /// Token signing.
    pub security: SecurityConfig,
    /// Rate limiting placeholder.
    pub rate_limit: RateLimitConfig,
    /// Priced paths.
    pub paths: Vec<PathConfig>,
}

impl Default for CliConfig {
    fn default() -> Self {
        let base_dir = default_base_dir();
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::new(&base_dir),
            economics: EconomicsConfig::default(),
            verification: VerificationConfig::default(),
            security: SecurityConfig::default(),
            rate_limit: RateLimitConfig::default(),
            paths: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Load and validate configuration from a file.
    ///
    /// Environment variables in `${VAR}` form are expanded in the signing
    /// secret and RPC settings.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;

        expand_opt(&mut config.security.signing_secret);
        expand_opt(&mut config.verification.rpc_url);
        expand_opt(&mut config.verification.rpc_user);
        expand_opt(&mut config.verification.rpc_password);

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// A starter configuration rooted at `base_dir` with one example offering.
    pub fn example(base_dir: &Path) -> Self {
        Self {
            storage: StorageConfig::new(base_dir),
            paths: vec![PathConfig {
                path: "/$hello".to_string(),
                base_price: 1000,
                curve: Curve::SQRT_DECAY.to_string(),
                floor: 0,
                decay_rate: 0,
                max_supply: None,
                issuer_address: "1ReplaceWithIssuerAddress".to_string(),
                content_hash: None,
                content: ContentSource::Inline("Hello from path402.".to_string()),
                permissions: Permissions::default(),
            }],
            ..Self::default()
        }
    }

    /// Get the base directory for node data (parent of the database).
    pub fn base_dir(&self) -> PathBuf {
        self.storage
            .database
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(default_base_dir)
    }

    /// Check cross-field invariants.
    ///
    /// Unknown curve identifiers are accepted with a warning; they price as
    /// `sqrt_decay`.
    pub fn validate(&self) -> CliResult<()> {
        self.server.listen_addr()?;
        self.economics.ratios()?;

        if self.economics.payment_timeout_secs == 0 {
            return Err(CliError::config("economics.payment_timeout_secs must be non-zero"));
        }
        if self.economics.token_ttl_secs == 0 {
            return Err(CliError::config("economics.token_ttl_secs must be non-zero"));
        }
        if self.economics.payment_timeout_secs > MAX_LIFETIME_SECS {
            return Err(CliError::config(format!(
                "economics.payment_timeout_secs must be at most {}",
                MAX_LIFETIME_SECS
            )));
        }
        if self.economics.token_ttl_secs > MAX_LIFETIME_SECS {
            return Err(CliError::config(format!(
                "economics.token_ttl_secs must be at most {}",
                MAX_LIFETIME_SECS
            )));
        }
        if let Some(secret) = &self.security.signing_secret {
            if env_var_pattern().is_match(secret) {
                return Err(CliError::config(
                    "security.signing_secret references an unset environment variable",
                ));
            }
        }

        if self.verification.mode == VerificationMode::Chain {
            if self.verification.rpc_url.is_none() {
                return Err(CliError::config(
                    "verification.rpc_url is required when mode = \"chain\"",
                ));
            }
            if self.receiving_address().is_empty() {
                return Err(CliError::config(
                    "chain verification needs verification.receiving_address or server.pay_to",
                ));
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.paths {
            if !entry.path.starts_with('/') {
                return Err(CliError::config(format!(
                    "path {:?} must start with '/'",
                    entry.path
                )));
            }
            if !seen.insert(entry.path.as_str()) {
                return Err(CliError::config(format!("duplicate path {}", entry.path)));
            }
            if let Some(hash) = &entry.content_hash {
                if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(CliError::config(format!(
                        "content_hash for {} must be 64 hex characters",
                        entry.path
                    )));
                }
            }
            if !Curve::is_known_id(&entry.curve) {
                warn!(
                    path = %entry.path,
                    curve = %entry.curve,
                    "Unknown curve identifier; pricing as sqrt_decay"
                );
            }
        }

        Ok(())
    }

    /// Address payments are checked against in chain mode.
    pub fn receiving_address(&self) -> &str {
        self.verification
            .receiving_address
            .as_deref()
            .unwrap_or(&self.server.pay_to)
    }

    /// Build the gate settings described by this configuration.
    pub fn gate_config(&self) -> CliResult<GateConfig> {
        let config = GateConfig::new(&self.server.identity, &self.server.pay_to)
            .with_currency(&self.server.currency)
            .with_payment_timeout(self.economics.payment_timeout())
            .with_ratios(self.economics.ratios()?);

        Ok(self
            .paths
            .iter()
            .fold(config, |config, entry| config.with_offering(entry.to_offering())))
    }

    /// Content sources for every configured path.
    pub fn content_resolver(&self) -> SourceMapResolver {
        self.paths
            .iter()
            .fold(SourceMapResolver::new(), |resolver, entry| {
                resolver.with_source(entry.path.clone(), entry.content.clone())
            })
    }

    /// Find the configured path `path`.
    pub fn path(&self, path: &str) -> Option<&PathConfig> {
        self.paths.iter().find(|p| p.path == path)
    }
}

/// HTTP server and node identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub listen: String,
    /// Identity recorded as `served_by` and stamped into tokens.
    pub identity: String,
    /// Payee address advertised in challenges.
    pub pay_to: String,
    /// Currency label advertised in challenges.
    pub currency: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            identity: "path402-node".to_string(),
            pay_to: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse the listen address.
    pub fn listen_addr(&self) -> CliResult<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| CliError::config(format!("server.listen {:?}: {}", self.listen, e)))
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database.
    pub database: PathBuf,
}

impl StorageConfig {
    fn new(base_dir: &Path) -> Self {
        Self {
            database: base_dir.join(path402_store::DATABASE_FILE),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(&default_base_dir())
    }
}

/// Economics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicsConfig {
    /// Issuer share of every payment.
    pub issuer_ratio: f64,
    /// Serving node share of every payment.
    pub server_ratio: f64,
    /// Invoice lifetime in seconds.
    pub payment_timeout_secs: u64,
    /// Proof-of-service token lifetime in seconds.
    pub token_ttl_secs: u64,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            issuer_ratio: DEFAULT_ISSUER_RATIO,
            server_ratio: DEFAULT_SERVER_RATIO,
            payment_timeout_secs: DEFAULT_PAYMENT_TIMEOUT_SECS,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl EconomicsConfig {
    /// Validated revenue split.
    pub fn ratios(&self) -> CliResult<SplitRatios> {
        Ok(SplitRatios::new(self.issuer_ratio, self.server_ratio)?)
    }

    pub fn payment_timeout(&self) -> Duration {
        Duration::from_secs(self.payment_timeout_secs)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

/// How payment proofs are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Length check only.
    #[default]
    Stub,
    /// Look the transaction up over JSON-RPC.
    Chain,
}

/// Payment verification configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub mode: VerificationMode,
    /// JSON-RPC endpoint (chain mode).
    pub rpc_url: Option<String>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    /// Address that must receive payments. Defaults to `server.pay_to`.
    pub receiving_address: Option<String>,
    /// Confirmations required before a payment counts.
    pub min_confirmations: u64,
}

/// Token signing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret for proof-of-service tokens. Unset means a random
    /// per-process secret.
    pub signing_secret: Option<String>,
}

/// Rate limiting configuration.
///
/// Accepted and reported at startup; requests are never throttled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests_per_minute: Option<u32>,
}

/// One priced path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Resource path, e.g. `/$doc`.
    pub path: String,
    /// Price at zero supply, in minor units.
    pub base_price: Amount,
    /// Curve identifier.
    #[serde(default = "default_curve")]
    pub curve: String,
    /// Lowest price (`linear_floor` only).
    #[serde(default)]
    pub floor: Amount,
    /// Price drop per serve (`linear_floor` only).
    #[serde(default)]
    pub decay_rate: Amount,
    /// Advisory supply cap, published in discovery.
    #[serde(default)]
    pub max_supply: Option<u64>,
    /// Issuer payee address.
    pub issuer_address: String,
    /// Expected hex SHA-256 of the served bytes.
    #[serde(default)]
    pub content_hash: Option<String>,
    /// Where the bytes come from.
    pub content: ContentSource,
    #[serde(default)]
    pub permissions: Permissions,
}

fn default_curve() -> String {
    Curve::SQRT_DECAY.to_string()
}

impl PathConfig {
    /// Resolve the curve, falling back to `sqrt_decay` for unknown ids.
    pub fn curve(&self) -> Curve {
        Curve::from_id(&self.curve, self.floor, self.decay_rate)
    }

    /// Convert to the protocol offering.
    pub fn to_offering(&self) -> PathOffering {
        let mut offering = PathOffering::new(
            &self.path,
            self.base_price,
            self.curve(),
            &self.issuer_address,
        )
        .with_permissions(self.permissions);
        if let Some(hash) = &self.content_hash {
            offering = offering.with_content_hash(hash.to_lowercase());
        }
        if let Some(max) = self.max_supply {
            offering = offering.with_max_supply(max);
        }
        offering
    }
}

/// Get the default base directory for path402 data.
///
/// Delegates to [`path402_store::default_data_dir`] so the CLI and the
/// ledger always agree on the storage location.
pub fn default_base_dir() -> PathBuf {
    path402_store::default_data_dir()
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    default_base_dir().join("config.toml")
}
