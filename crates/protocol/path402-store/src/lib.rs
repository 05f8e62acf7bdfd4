//! Ledger layer for the path402 payment-required protocol.
//!
//! This crate persists the two pieces of cross-request state the protocol
//! depends on:
//!
//! - **Invoice ledger**: pending challenges keyed by nonce, claimable once
//! - **Serve ledger**: append-only revenue log plus a supply counter per path
//!
//! Both live in one SQLite database. Every cross-request invariant (single
//! use nonces, no lost supply increments) is enforced by an atomic SQL
//! statement or transaction, so several processes may share the database.
//!
//! # Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── config.toml              # Node configuration
//! └── path402.db               # SQLite: invoices, serve_events, supply
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use path402_store::{InvoiceLedger, LedgerState};
//!
//! let state = LedgerState::open_in_memory().unwrap();
//! let invoice = state.invoices.mint("/$doc", 500, Duration::from_secs(1), 0).unwrap();
//!
//! assert!(state.invoices.claim(&invoice.nonce, "/$doc", 10).unwrap().is_some());
//! assert!(state.invoices.claim(&invoice.nonce, "/$doc", 10).unwrap().is_none());
//! ```

pub mod error;
pub mod invoice;
pub mod schema;
pub mod serve;
pub mod traits;

pub use error::{Result, StoreError};
pub use invoice::SqliteInvoiceLedger;
pub use serve::SqliteServeLedger;
pub use traits::{InvoiceLedger, ServeLedger};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

/// Default database file name inside the data directory.
pub const DATABASE_FILE: &str = "path402.db";

/// Get the default data directory for path402 node state.
///
/// Priority:
/// 1. `PATH402_DATA_DIR` environment variable (if set)
/// 2. Platform-specific data directory
/// 3. Fallback to `$HOME/.path402`
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PATH402_DATA_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("org", "path402", "path402")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".path402")
        })
}

/// Configuration for [`LedgerState`].
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Base directory for node data.
    pub base_dir: PathBuf,
    /// Database file path (default: base_dir/path402.db).
    pub database_path: Option<PathBuf>,
}

impl LedgerConfig {
    /// Create a new configuration with the given base directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            database_path: None,
        }
    }

    /// Set the database path.
    pub fn with_database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Get the database path.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join(DATABASE_FILE))
    }
}

/// Both ledgers opened against one database connection.
pub struct LedgerState {
    /// Pending invoices.
    pub invoices: SqliteInvoiceLedger,
    /// Serve log and supply counters.
    pub serves: SqliteServeLedger,
}

impl LedgerState {
    /// Open ledger state with the given configuration.
    ///
    /// Creates the base directory and database file if needed and
    /// initializes the schema.
    pub fn open(config: LedgerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.base_dir)?;
        let db_path = config.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(db_path = %db_path.display(), "Opening ledger database");
        let conn = Connection::open(&db_path)?;
        schema::initialize_schema(&conn)?;

        Ok(Self::from_connection(conn))
    }

    /// Open ledger state in memory.
    ///
    /// Nothing survives the process; intended for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let conn = Arc::new(Mutex::new(conn));
        Self {
            invoices: SqliteInvoiceLedger::new(Arc::clone(&conn)),
            serves: SqliteServeLedger::new(conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_database_path() {
        let config = LedgerConfig::new("/tmp/node");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/node/path402.db"));

        let config = config.with_database_path("/var/lib/ledger.db");
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/ledger.db"));
    }

    #[test]
    fn test_open_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested");
        let config = LedgerConfig::new(&base);

        let state = LedgerState::open(config.clone()).unwrap();
        assert!(config.database_path().exists());
        assert_eq!(state.serves.supply("/$doc").unwrap(), 0);
    }

    #[test]
    fn test_state_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = LedgerConfig::new(temp_dir.path());

        let nonce = {
            let state = LedgerState::open(config.clone()).unwrap();
            state
                .invoices
                .mint("/$doc", 500, std::time::Duration::from_secs(60), 0)
                .unwrap()
                .nonce
        };

        let state = LedgerState::open(config).unwrap();
        assert!(state.invoices.claim(&nonce, "/$doc", 1).unwrap().is_some());
    }
}
