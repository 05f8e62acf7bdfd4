//! Ledger behavior under concurrent writers.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use path402_store::{InvoiceLedger, LedgerConfig, LedgerState, ServeLedger};
use path402_types::{RevenueSplit, ServeEvent};
use tempfile::TempDir;

const PATH: &str = "/$doc";

fn serve_event(i: u64) -> ServeEvent {
    ServeEvent::from_split(
        PATH,
        "node",
        format!("client-{}", i),
        RevenueSplit {
            total: 100,
            issuer_share: 70,
            server_share: 30,
        },
        format!("{:064x}", i),
        1_000 + i,
    )
}

#[test]
fn shared_connection_records_every_serve() {
    const WRITERS: u64 = 8;
    const PER_WRITER: u64 = 25;

    let temp_dir = TempDir::new().unwrap();
    let state = LedgerState::open(LedgerConfig::new(temp_dir.path())).unwrap();
    let ledger = Arc::new(state.serves);
    let barrier = Arc::new(Barrier::new(WRITERS as usize));

    let handles: Vec<_> = (0..WRITERS)
        .map(|w| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_WRITER {
                    ledger.record_serve(&serve_event(w * PER_WRITER + i)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let total = WRITERS * PER_WRITER;
    assert_eq!(ledger.supply(PATH).unwrap(), total);
    assert_eq!(ledger.stats().unwrap().total_serves, total);
    assert_eq!(ledger.events(PATH, 1_000).unwrap().len() as u64, total);
}

#[test]
fn separate_connections_never_lose_increments() {
    const WRITERS: usize = 6;
    const PER_WRITER: u64 = 20;

    let temp_dir = TempDir::new().unwrap();
    let config = LedgerConfig::new(temp_dir.path());

    // One connection per writer, opened up front so schema setup is not raced.
    let states: Vec<LedgerState> = (0..WRITERS)
        .map(|_| LedgerState::open(config.clone()).unwrap())
        .collect();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = states
        .into_iter()
        .enumerate()
        .map(|(w, state)| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut seen = Vec::new();
                for i in 0..PER_WRITER {
                    let supply = state
                        .serves
                        .record_serve(&serve_event(w as u64 * PER_WRITER + i))
                        .unwrap();
                    seen.push(supply);
                }
                seen
            })
        })
        .collect();

    let mut returned: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    returned.sort_unstable();

    let total = WRITERS as u64 * PER_WRITER;
    // Every increment observed a distinct post-increment value.
    assert_eq!(returned, (1..=total).collect::<Vec<_>>());

    let reader = LedgerState::open(config).unwrap();
    assert_eq!(reader.serves.supply(PATH).unwrap(), total);
    assert_eq!(reader.serves.events(PATH, 1_000).unwrap().len() as u64, total);
}

#[test]
fn concurrent_claims_redeem_a_nonce_once() {
    const CLAIMERS: usize = 8;

    let temp_dir = TempDir::new().unwrap();
    let config = LedgerConfig::new(temp_dir.path());

    let minter = LedgerState::open(config.clone()).unwrap();
    let invoice = minter
        .invoices
        .mint(PATH, 500, Duration::from_secs(60), 0)
        .unwrap();

    let states: Vec<LedgerState> = (0..CLAIMERS)
        .map(|_| LedgerState::open(config.clone()).unwrap())
        .collect();
    let barrier = Arc::new(Barrier::new(CLAIMERS));

    let handles: Vec<_> = states
        .into_iter()
        .map(|state| {
            let barrier = Arc::clone(&barrier);
            let nonce = invoice.nonce.clone();
            thread::spawn(move || {
                barrier.wait();
                state.invoices.claim(&nonce, PATH, 1).unwrap().is_some()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(minter.invoices.pending_count().unwrap(), 0);
}

#[test]
fn invoice_lifecycle_with_expiry() {
    let state = LedgerState::open_in_memory().unwrap();
    let ttl = Duration::from_secs(1);

    let first = state.invoices.mint(PATH, 500, ttl, 5_000).unwrap();
    assert_eq!(state.invoices.claim(&first.nonce, PATH, 5_000).unwrap(), Some(first.clone()));
    assert!(state.invoices.claim(&first.nonce, PATH, 5_000).unwrap().is_none());

    let second = state.invoices.mint(PATH, 500, ttl, 5_000).unwrap();
    assert_eq!(state.invoices.prune(6_000).unwrap(), 1);
    assert!(state.invoices.claim(&second.nonce, PATH, 5_500).unwrap().is_none());
}
