//! SQLite invoice ledger.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use path402_crypto::generate_nonce;
use path402_types::{Amount, Invoice, Timestamp};

use crate::error::{Result, StoreError};
use crate::traits::InvoiceLedger;

/// SQLite-based invoice ledger.
#[derive(Clone)]
pub struct SqliteInvoiceLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteInvoiceLedger {
    /// Create a new invoice ledger with the given database connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))
    }

    fn deserialize_invoice(row: &rusqlite::Row) -> rusqlite::Result<Invoice> {
        let amount: i64 = row.get(2)?;
        let expires_at: i64 = row.get(3)?;
        let created_at: i64 = row.get(4)?;

        Ok(Invoice {
            nonce: row.get(0)?,
            path: row.get(1)?,
            amount: amount as Amount,
            expires_at: expires_at as Timestamp,
            created_at: created_at as Timestamp,
        })
    }
}

impl InvoiceLedger for SqliteInvoiceLedger {
    fn mint(&self, path: &str, amount: Amount, ttl: Duration, now: Timestamp) -> Result<Invoice> {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let invoice = Invoice {
            nonce: generate_nonce(),
            path: path.to_string(),
            amount,
            expires_at: now.saturating_add(ttl_ms),
            created_at: now,
        };

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO invoices (nonce, path, amount, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                invoice.nonce,
                invoice.path,
                to_sql_int(invoice.amount, "amount")?,
                to_sql_int(invoice.expires_at, "expires_at")?,
                to_sql_int(invoice.created_at, "created_at")?,
            ],
        )?;

        Ok(invoice)
    }

    fn claim(&self, nonce: &str, path: &str, now: Timestamp) -> Result<Option<Invoice>> {
        let now = to_sql_int(now, "now")?;
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Match and removal happen in one statement, so two concurrent
        // claims for one nonce cannot both see the row.
        let invoice = tx
            .query_row(
                "DELETE FROM invoices
                 WHERE nonce = ?1 AND path = ?2 AND expires_at > ?3
                 RETURNING nonce, path, amount, expires_at, created_at",
                params![nonce, path, now],
                Self::deserialize_invoice,
            )
            .optional()?;

        tx.commit()?;
        Ok(invoice)
    }

    fn prune(&self, now: Timestamp) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM invoices WHERE expires_at <= ?1",
            [to_sql_int(now, "now")?],
        )?;
        Ok(removed)
    }

    fn pending_count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM invoices", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Convert an unsigned amount or timestamp to SQLite's signed integer.
pub(crate) fn to_sql_int(value: u64, field: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::invalid_data(format!("{} {} exceeds i64 range", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::initialize_schema;

    const TTL: Duration = Duration::from_secs(1);

    fn create_test_ledger() -> SqliteInvoiceLedger {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        SqliteInvoiceLedger::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_mint_persists_invoice() {
        let ledger = create_test_ledger();
        let invoice = ledger.mint("/$doc", 500, TTL, 10_000).unwrap();

        assert_eq!(invoice.nonce.len(), 32);
        assert_eq!(invoice.amount, 500);
        assert_eq!(invoice.created_at, 10_000);
        assert_eq!(invoice.expires_at, 11_000);
        assert_eq!(ledger.pending_count().unwrap(), 1);
    }

    #[test]
    fn test_claim_succeeds_exactly_once() {
        let ledger = create_test_ledger();
        let invoice = ledger.mint("/$doc", 500, TTL, 10_000).unwrap();

        let claimed = ledger.claim(&invoice.nonce, "/$doc", 10_001).unwrap();
        assert_eq!(claimed, Some(invoice.clone()));

        let again = ledger.claim(&invoice.nonce, "/$doc", 10_002).unwrap();
        assert!(again.is_none());
        assert_eq!(ledger.pending_count().unwrap(), 0);
    }

    #[test]
    fn test_claim_wrong_path_leaves_invoice() {
        let ledger = create_test_ledger();
        let invoice = ledger.mint("/$doc", 500, TTL, 10_000).unwrap();

        assert!(ledger.claim(&invoice.nonce, "/$other", 10_001).unwrap().is_none());
        assert_eq!(ledger.pending_count().unwrap(), 1);
        assert!(ledger.claim(&invoice.nonce, "/$doc", 10_001).unwrap().is_some());
    }

    #[test]
    fn test_claim_expired_fails() {
        let ledger = create_test_ledger();
        let invoice = ledger.mint("/$doc", 500, TTL, 10_000).unwrap();

        assert!(ledger.claim(&invoice.nonce, "/$doc", 11_000).unwrap().is_none());
    }

    #[test]
    fn test_claim_unknown_nonce() {
        let ledger = create_test_ledger();
        assert!(ledger.claim("deadbeef", "/$doc", 0).unwrap().is_none());
    }

    #[test]
    fn test_prune_removes_only_expired() {
        let ledger = create_test_ledger();
        let short = ledger.mint("/$doc", 500, TTL, 10_000).unwrap();
        let long = ledger
            .mint("/$doc", 500, Duration::from_secs(60), 10_000)
            .unwrap();

        assert_eq!(ledger.prune(10_999).unwrap(), 0);
        assert_eq!(ledger.prune(11_000).unwrap(), 1);
        assert_eq!(ledger.prune(11_000).unwrap(), 0);

        assert!(ledger.claim(&short.nonce, "/$doc", 10_500).unwrap().is_none());
        assert!(ledger.claim(&long.nonce, "/$doc", 11_000).unwrap().is_some());
    }

    #[test]
    fn test_prune_empty_ledger() {
        let ledger = create_test_ledger();
        assert_eq!(ledger.prune(u64::MAX >> 1).unwrap(), 0);
    }

    #[test]
    fn test_nonces_unique_per_mint() {
        let ledger = create_test_ledger();
        let a = ledger.mint("/$doc", 500, TTL, 0).unwrap();
        let b = ledger.mint("/$doc", 500, TTL, 0).unwrap();
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn test_timestamp_out_of_range() {
        let ledger = create_test_ledger();
        assert!(matches!(
            ledger.claim("n", "/$doc", u64::MAX),
            Err(StoreError::InvalidData(_))
        ));
    }
}
