//! Prometheus metrics for a path402 node.
//!
//! [`Metrics`] doubles as the gate's [`GateObserver`], so every protocol
//! outcome is counted without the gate knowing about Prometheus.

use path402_gate::GateObserver;
use path402_types::Amount;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics registry and definitions for a path402 node.
pub struct Metrics {
    /// The Prometheus registry containing all metrics.
    pub registry: Registry,

    // =========================================================================
    // Protocol Metrics
    // =========================================================================
    /// Payment challenges issued, by path.
    pub challenges_total: IntCounterVec,

    /// Paid serves completed, by path.
    pub serves_total: IntCounterVec,

    /// Revenue released against verified payments, in minor units.
    pub revenue_total: IntCounter,

    /// Payment verifications that failed, by path.
    pub verification_failures_total: IntCounterVec,

    /// Content integrity failures, by path.
    pub integrity_failures_total: IntCounterVec,

    /// Serve ledger writes that failed, by path.
    pub ledger_write_failures_total: IntCounterVec,

    // =========================================================================
    // Node Metrics
    // =========================================================================
    /// Node uptime in seconds.
    pub uptime_seconds: IntGauge,

    /// Node information (version, identity).
    pub node_info: IntGaugeVec,
}

impl Metrics {
    /// Create a new Metrics instance with all metrics registered.
    pub fn new() -> Self {
        let registry = Registry::new();

        let challenges_total = IntCounterVec::new(
            Opts::new("path402_challenges_total", "Payment challenges issued"),
            &["path"],
        )
        .expect("metric creation should not fail");

        let serves_total = IntCounterVec::new(
            Opts::new("path402_serves_total", "Paid serves completed"),
            &["path"],
        )
        .expect("metric creation should not fail");

        let revenue_total = IntCounter::with_opts(Opts::new(
            "path402_revenue_total",
            "Revenue served in minor units",
        ))
        .expect("metric creation should not fail");

        let verification_failures_total = IntCounterVec::new(
            Opts::new(
                "path402_verification_failures_total",
                "Payment verifications that failed",
            ),
            &["path"],
        )
        .expect("metric creation should not fail");

        let integrity_failures_total = IntCounterVec::new(
            Opts::new(
                "path402_integrity_failures_total",
                "Content integrity check failures",
            ),
            &["path"],
        )
        .expect("metric creation should not fail");

        let ledger_write_failures_total = IntCounterVec::new(
            Opts::new(
                "path402_ledger_write_failures_total",
                "Serve ledger writes that failed",
            ),
            &["path"],
        )
        .expect("metric creation should not fail");

        let uptime_seconds = IntGauge::with_opts(Opts::new(
            "path402_uptime_seconds",
            "Node uptime in seconds",
        ))
        .expect("metric creation should not fail");

        let node_info = IntGaugeVec::new(
            Opts::new("path402_node_info", "Node information"),
            &["version", "identity"],
        )
        .expect("metric creation should not fail");

        registry
            .register(Box::new(challenges_total.clone()))
            .expect("registration should not fail");
        registry
            .register(Box::new(serves_total.clone()))
            .expect("registration should not fail");
        registry
            .register(Box::new(revenue_total.clone()))
            .expect("registration should not fail");
        registry
            .register(Box::new(verification_failures_total.clone()))
            .expect("registration should not fail");
        registry
            .register(Box::new(integrity_failures_total.clone()))
            .expect("registration should not fail");
        registry
            .register(Box::new(ledger_write_failures_total.clone()))
            .expect("registration should not fail");
        registry
            .register(Box::new(uptime_seconds.clone()))
            .expect("registration should not fail");
        registry
            .register(Box::new(node_info.clone()))
            .expect("registration should not fail");

        Self {
            registry,
            challenges_total,
            serves_total,
            revenue_total,
            verification_failures_total,
            integrity_failures_total,
            ledger_write_failures_total,
            uptime_seconds,
            node_info,
        }
    }

    /// Encode all metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GateObserver for Metrics {
    fn challenge_issued(&self, path: &str) {
        self.challenges_total.with_label_values(&[path]).inc();
    }

    fn served(&self, path: &str, price_paid: Amount) {
        self.serves_total.with_label_values(&[path]).inc();
        self.revenue_total.inc_by(price_paid);
    }

    fn verification_failed(&self, path: &str) {
        self.verification_failures_total
            .with_label_values(&[path])
            .inc();
    }

    fn integrity_failed(&self, path: &str) {
        self.integrity_failures_total.with_label_values(&[path]).inc();
    }

    fn ledger_write_failed(&self, path: &str) {
        self.ledger_write_failures_total
            .with_label_values(&[path])
            .inc();
    }
}

/// Shared metrics handle for use across async tasks.
pub type SharedMetrics = Arc<Metrics>;
