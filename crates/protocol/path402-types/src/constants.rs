//! Protocol constants.
//!
//! Defaults for timing, economics and wire formats shared by every crate.

use crate::Amount;

// =============================================================================
// Protocol Version
// =============================================================================

/// Protocol version advertised in every response.
pub const PROTOCOL_VERSION: &str = "1.0.0";

// =============================================================================
// Economics
// =============================================================================

/// Default currency label used in challenges.
pub const DEFAULT_CURRENCY: &str = "SAT";

/// Default issuer share of each payment.
pub const DEFAULT_ISSUER_RATIO: f64 = 0.7;

/// Default serving node share of each payment.
pub const DEFAULT_SERVER_RATIO: f64 = 0.3;

/// Minor units per whole coin (satoshis per BSV).
pub const MINOR_UNITS_PER_COIN: Amount = 100_000_000;

// =============================================================================
// Timing
// =============================================================================

/// Default invoice lifetime: 5 minutes (in seconds)
pub const DEFAULT_PAYMENT_TIMEOUT_SECS: u64 = 300;

/// Default proof-of-service token lifetime: 24 hours (in seconds)
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

// =============================================================================
// Wire Formats
// =============================================================================

/// Random bytes per invoice nonce (rendered as 32 hex characters).
pub const NONCE_BYTES: usize = 16;

/// Length of a transaction identifier (hex-encoded 32-byte hash).
pub const TX_ID_LENGTH: usize = 64;

/// Default page size for serve history queries.
pub const DEFAULT_EVENTS_LIMIT: u32 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratios_sum_to_one() {
        assert!((DEFAULT_ISSUER_RATIO + DEFAULT_SERVER_RATIO - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_nonce_hex_width() {
        assert_eq!(NONCE_BYTES * 2, 32);
    }
}
