//! Pricing and revenue rules for the path402 payment-required protocol.
//!
//! Everything here is a pure function of its inputs: no state, no I/O.
//!
//! - **Unit pricing**: price of the next serve as a function of supply
//! - **Schedules**: cumulative cost over a run of consecutive units
//! - **Revenue split**: issuer/server shares of a payment
//!
//! # Example
//!
//! ```
//! use path402_econ::{schedule, split_revenue, unit_price};
//! use path402_types::Curve;
//!
//! let price = unit_price(&Curve::SqrtDecay, 1000, 3);
//! assert_eq!(price, 500);
//!
//! let rows = schedule(&Curve::SqrtDecay, 1000, 0, 4);
//! assert_eq!(rows.last().map(|r| r.unit_price), Some(500));
//!
//! let split = split_revenue(price, 0.7, 0.3);
//! assert_eq!(split.issuer_share + split.server_share, price);
//! ```
//!
//! # Curves
//!
//! | Curve | Unit price |
//! |---|---|
//! | `fixed` | `base` |
//! | `sqrt_decay` | `floor(base / sqrt(supply + 1))` |
//! | `log_decay` | `floor(base / ln(supply + 2))` |
//! | `linear_floor` | `max(floor, base - supply * decay_rate)` |

pub mod error;
pub mod price;
pub mod split;

pub use error::{EconError, EconResult};
pub use price::{cumulative_cost, offering_price, schedule, unit_price, ScheduleEntry};
pub use split::{split_revenue, SplitRatios};
