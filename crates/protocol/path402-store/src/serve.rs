//! SQLite serve ledger.
//!
//! Each recorded serve appends one row to `serve_events` and bumps the
//! path's row in `supply` inside a single `IMMEDIATE` transaction. The bump
//! is an upsert evaluated by SQLite, so writers on separate connections
//! (or separate processes) never lose an increment.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::{Arc, Mutex};

use path402_types::{Amount, LedgerStats, ServeEvent, Timestamp};

use crate::error::{Result, StoreError};
use crate::invoice::to_sql_int;
use crate::traits::ServeLedger;

/// SQLite-based serve ledger.
#[derive(Clone)]
pub struct SqliteServeLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteServeLedger {
    /// Create a new serve ledger with the given database connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))
    }

    fn deserialize_event(row: &rusqlite::Row) -> rusqlite::Result<ServeEvent> {
        let price_paid: i64 = row.get(3)?;
        let issuer_share: i64 = row.get(4)?;
        let server_share: i64 = row.get(5)?;
        let timestamp: i64 = row.get(7)?;

        Ok(ServeEvent {
            path: row.get(0)?,
            served_by: row.get(1)?,
            served_to: row.get(2)?,
            price_paid: price_paid as Amount,
            issuer_share: issuer_share as Amount,
            server_share: server_share as Amount,
            payment_proof_id: row.get(6)?,
            timestamp: timestamp as Timestamp,
        })
    }
}

impl ServeLedger for SqliteServeLedger {
    fn record_serve(&self, event: &ServeEvent) -> Result<u64> {
        if event.issuer_share.checked_add(event.server_share) != Some(event.price_paid) {
            return Err(StoreError::invalid_data(format!(
                "shares {} + {} do not sum to price {}",
                event.issuer_share, event.server_share, event.price_paid
            )));
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO serve_events
                (path, served_by, served_to, price_paid, issuer_share, server_share, payment_proof_id, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event.path,
                event.served_by,
                event.served_to,
                to_sql_int(event.price_paid, "price_paid")?,
                to_sql_int(event.issuer_share, "issuer_share")?,
                to_sql_int(event.server_share, "server_share")?,
                event.payment_proof_id,
                to_sql_int(event.timestamp, "timestamp")?,
            ],
        )?;

        let supply: i64 = tx.query_row(
            "INSERT INTO supply (path, supply) VALUES (?1, 1)
             ON CONFLICT(path) DO UPDATE SET supply = supply + 1
             RETURNING supply",
            [&event.path],
            |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(supply as u64)
    }

    fn supply(&self, path: &str) -> Result<u64> {
        let conn = self.lock()?;
        let supply: Option<i64> = conn
            .query_row("SELECT supply FROM supply WHERE path = ?1", [path], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(supply.unwrap_or(0) as u64)
    }

    fn events(&self, path: &str, limit: usize) -> Result<Vec<ServeEvent>> {
        let conn = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(
            "SELECT path, served_by, served_to, price_paid, issuer_share, server_share, payment_proof_id, timestamp
             FROM serve_events WHERE path = ?1
             ORDER BY timestamp DESC, id DESC LIMIT ?2",
        )?;

        let events = stmt
            .query_map(params![path, limit], Self::deserialize_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(events)
    }

    fn earnings(&self, served_by: &str) -> Result<Amount> {
        let conn = self.lock()?;
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(server_share), 0) FROM serve_events WHERE served_by = ?1",
            [served_by],
            |row| row.get(0),
        )?;
        Ok(total as Amount)
    }

    fn stats(&self) -> Result<LedgerStats> {
        let conn = self.lock()?;
        let (total_serves, total_revenue, distinct_paths): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(price_paid), 0), COUNT(DISTINCT path) FROM serve_events",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(LedgerStats {
            total_serves: total_serves as u64,
            total_revenue: total_revenue as Amount,
            distinct_paths: distinct_paths as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::initialize_schema;
    use path402_types::RevenueSplit;

    fn create_test_ledger() -> SqliteServeLedger {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        SqliteServeLedger::new(Arc::new(Mutex::new(conn)))
    }

    fn event(path: &str, served_by: &str, total: Amount, timestamp: Timestamp) -> ServeEvent {
        let issuer_share = total * 7 / 10;
        ServeEvent::from_split(
            path,
            served_by,
            "client",
            RevenueSplit {
                total,
                issuer_share,
                server_share: total - issuer_share,
            },
            "ab".repeat(32),
            timestamp,
        )
    }

    #[test]
    fn test_unknown_path_has_zero_supply() {
        let ledger = create_test_ledger();
        assert_eq!(ledger.supply("/$nothing").unwrap(), 0);
        assert!(ledger.events("/$nothing", 10).unwrap().is_empty());
    }

    #[test]
    fn test_record_serve_increments_supply() {
        let ledger = create_test_ledger();
        assert_eq!(ledger.record_serve(&event("/$doc", "node", 1000, 1)).unwrap(), 1);
        assert_eq!(ledger.record_serve(&event("/$doc", "node", 707, 2)).unwrap(), 2);
        assert_eq!(ledger.record_serve(&event("/$other", "node", 10, 3)).unwrap(), 1);

        assert_eq!(ledger.supply("/$doc").unwrap(), 2);
        assert_eq!(ledger.supply("/$other").unwrap(), 1);
    }

    #[test]
    fn test_events_most_recent_first() {
        let ledger = create_test_ledger();
        for ts in [10, 30, 20] {
            ledger.record_serve(&event("/$doc", "node", ts, ts)).unwrap();
        }

        let events = ledger.events("/$doc", 10).unwrap();
        let stamps: Vec<Timestamp> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![30, 20, 10]);

        let limited = ledger.events("/$doc", 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].timestamp, 30);
    }

    #[test]
    fn test_event_roundtrip_fields() {
        let ledger = create_test_ledger();
        let original = event("/$doc", "node", 101, 42);
        ledger.record_serve(&original).unwrap();

        let stored = ledger.events("/$doc", 1).unwrap();
        assert_eq!(stored, vec![original]);
    }

    #[test]
    fn test_earnings_by_server() {
        let ledger = create_test_ledger();
        ledger.record_serve(&event("/$doc", "node-a", 1000, 1)).unwrap();
        ledger.record_serve(&event("/$doc", "node-a", 100, 2)).unwrap();
        ledger.record_serve(&event("/$doc", "node-b", 1000, 3)).unwrap();

        assert_eq!(ledger.earnings("node-a").unwrap(), 300 + 30);
        assert_eq!(ledger.earnings("node-b").unwrap(), 300);
        assert_eq!(ledger.earnings("node-c").unwrap(), 0);
    }

    #[test]
    fn test_stats() {
        let ledger = create_test_ledger();
        assert_eq!(ledger.stats().unwrap(), LedgerStats::default());

        ledger.record_serve(&event("/$a", "node", 1000, 1)).unwrap();
        ledger.record_serve(&event("/$a", "node", 500, 2)).unwrap();
        ledger.record_serve(&event("/$b", "node", 250, 3)).unwrap();

        let stats = ledger.stats().unwrap();
        assert_eq!(stats.total_serves, 3);
        assert_eq!(stats.total_revenue, 1750);
        assert_eq!(stats.distinct_paths, 2);
    }

    #[test]
    fn test_unbalanced_split_rejected_without_side_effects() {
        let ledger = create_test_ledger();
        let mut bad = event("/$doc", "node", 100, 1);
        bad.server_share += 1;

        assert!(matches!(
            ledger.record_serve(&bad),
            Err(StoreError::InvalidData(_))
        ));
        assert_eq!(ledger.supply("/$doc").unwrap(), 0);
        assert_eq!(ledger.stats().unwrap().total_serves, 0);
    }

    #[test]
    fn test_failed_supply_bump_rolls_back_event() {
        let ledger = create_test_ledger();
        ledger
            .conn
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE supply;")
            .unwrap();

        assert!(ledger.record_serve(&event("/$doc", "node", 100, 1)).is_err());
        assert_eq!(ledger.stats().unwrap().total_serves, 0);
    }
}
