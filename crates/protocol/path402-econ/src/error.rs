//! Economic error types for path402.

use thiserror::Error;

/// Result type alias for economic operations.
pub type EconResult<T> = Result<T, EconError>;

/// Errors that can occur while validating economic parameters.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EconError {
    /// A split ratio is outside `[0, 1]` or not a finite number
    #[error("{name} ratio {value} must be within [0, 1]")]
    RatioOutOfRange {
        /// Which ratio was rejected (`issuer` or `server`)
        name: &'static str,
        /// The submitted value
        value: f64,
    },

    /// Issuer and server ratios do not add up to one
    #[error("issuer and server ratios must sum to 1 (got {sum})")]
    RatioSum {
        /// The computed sum
        sum: f64,
    },
}
