//! Pricing curve identifiers.

use serde::{Deserialize, Serialize};

use crate::Amount;

/// A pricing curve mapping cumulative supply to unit price.
///
/// Curve-specific parameters travel with the variant that uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    /// Price never changes.
    Fixed,
    /// `base / sqrt(supply + 1)`
    SqrtDecay,
    /// `base / ln(supply + 2)`
    LogDecay,
    /// `max(floor, base - supply * decay_rate)`
    LinearFloor {
        /// Lowest price the curve will return.
        floor: Amount,
        /// Amount subtracted per unit of supply.
        decay_rate: Amount,
    },
}

impl Curve {
    /// Identifier for the fixed curve.
    pub const FIXED: &'static str = "fixed";
    /// Identifier for the square-root decay curve.
    pub const SQRT_DECAY: &'static str = "sqrt_decay";
    /// Identifier for the logarithmic decay curve.
    pub const LOG_DECAY: &'static str = "log_decay";
    /// Identifier for the linear-with-floor curve.
    pub const LINEAR_FLOOR: &'static str = "linear_floor";

    /// Resolve a curve from its configured identifier.
    ///
    /// Unrecognized identifiers resolve to [`Curve::SqrtDecay`]. Use
    /// [`Curve::is_known_id`] at configuration time to surface typos.
    pub fn from_id(id: &str, floor: Amount, decay_rate: Amount) -> Self {
        match id {
            Self::FIXED => Self::Fixed,
            Self::LOG_DECAY => Self::LogDecay,
            Self::LINEAR_FLOOR => Self::LinearFloor { floor, decay_rate },
            _ => Self::SqrtDecay,
        }
    }

    /// Check whether an identifier names a curve without falling back.
    pub fn is_known_id(id: &str) -> bool {
        matches!(
            id,
            Self::FIXED | Self::SQRT_DECAY | Self::LOG_DECAY | Self::LINEAR_FLOOR
        )
    }

    /// Get the identifier of this curve.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Fixed => Self::FIXED,
            Self::SqrtDecay => Self::SQRT_DECAY,
            Self::LogDecay => Self::LOG_DECAY,
            Self::LinearFloor { .. } => Self::LINEAR_FLOOR,
        }
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::SqrtDecay
    }
}

impl std::fmt::Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_known() {
        assert_eq!(Curve::from_id("fixed", 0, 0), Curve::Fixed);
        assert_eq!(Curve::from_id("log_decay", 0, 0), Curve::LogDecay);
        assert_eq!(
            Curve::from_id("linear_floor", 20, 10),
            Curve::LinearFloor {
                floor: 20,
                decay_rate: 10
            }
        );
    }

    #[test]
    fn test_unknown_id_falls_back_to_sqrt_decay() {
        assert_eq!(Curve::from_id("sqrt_decai", 0, 0), Curve::SqrtDecay);
        assert_eq!(Curve::from_id("", 0, 0), Curve::SqrtDecay);
        assert!(!Curve::is_known_id("sqrt_decai"));
    }

    #[test]
    fn test_id_roundtrip() {
        for id in ["fixed", "sqrt_decay", "log_decay", "linear_floor"] {
            assert!(Curve::is_known_id(id));
            assert_eq!(Curve::from_id(id, 1, 1).id(), id);
        }
    }

    #[test]
    fn test_serde_tagged() {
        let curve = Curve::LinearFloor {
            floor: 20,
            decay_rate: 10,
        };
        let json = serde_json::to_string(&curve).unwrap();
        assert!(json.contains("\"kind\":\"linear_floor\""));
        let back: Curve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, curve);
    }
}
