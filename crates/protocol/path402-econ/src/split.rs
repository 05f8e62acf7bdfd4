//! Revenue splitting between issuer and server.
//!
//! The issuer share is rounded down and the server takes the remainder, so
//! the two shares always sum exactly to the total.

use path402_types::{Amount, RevenueSplit, DEFAULT_ISSUER_RATIO, DEFAULT_SERVER_RATIO};
use serde::{Deserialize, Serialize};

use crate::error::{EconError, EconResult};

/// Tolerance used when checking that ratios sum to one.
const RATIO_SUM_TOLERANCE: f64 = 1e-9;

/// Validated issuer/server split ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    issuer: f64,
    server: f64,
}

impl SplitRatios {
    /// Validate and build a ratio pair.
    ///
    /// Each ratio must be finite and within `[0, 1]`, and together they must
    /// sum to one.
    pub fn new(issuer: f64, server: f64) -> EconResult<Self> {
        check_range("issuer", issuer)?;
        check_range("server", server)?;
        let sum = issuer + server;
        if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(EconError::RatioSum { sum });
        }
        Ok(Self { issuer, server })
    }

    /// Issuer ratio.
    pub fn issuer(&self) -> f64 {
        self.issuer
    }

    /// Server ratio.
    pub fn server(&self) -> f64 {
        self.server
    }

    /// Split `total` using these ratios.
    pub fn split(&self, total: Amount) -> RevenueSplit {
        split_revenue(total, self.issuer, self.server)
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER_RATIO,
            server: DEFAULT_SERVER_RATIO,
        }
    }
}

fn check_range(name: &'static str, value: f64) -> EconResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EconError::RatioOutOfRange { name, value });
    }
    Ok(())
}

/// Split a payment between issuer and server.
///
/// `issuer_share = floor(total * issuer_ratio)`, `server_share = total - issuer_share`.
/// The server ratio is not consulted; the server absorbs every rounding
/// remainder. An issuer ratio outside `[0, 1]` is clamped.
///
/// # Example
/// ```
/// use path402_econ::split_revenue;
///
/// let split = split_revenue(101, 0.2, 0.8);
/// assert_eq!((split.issuer_share, split.server_share), (20, 81));
/// ```
pub fn split_revenue(total: Amount, issuer_ratio: f64, _server_ratio: f64) -> RevenueSplit {
    let ratio = if issuer_ratio.is_nan() {
        0.0
    } else {
        issuer_ratio.clamp(0.0, 1.0)
    };
    let issuer_share = ((total as f64 * ratio).floor() as Amount).min(total);
    RevenueSplit {
        total,
        issuer_share,
        server_share: total - issuer_share,
    }
}
