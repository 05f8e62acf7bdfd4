//! Supply-driven unit pricing.
//!
//! Every curve maps the number of completed serves for a path (its supply)
//! to the price of the next serve. Prices are integer minor units; the
//! decaying curves round down.

use path402_types::{Amount, Curve, PathOffering};
use serde::{Deserialize, Serialize};

/// One row of a price schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Supply at which this unit is sold.
    pub supply: u64,
    /// Price of this unit.
    pub unit_price: Amount,
    /// Total cost of every unit from the schedule start up to and including this one.
    pub cumulative: Amount,
}

/// Price of the next unit at `supply` on `curve`.
///
/// # Example
/// ```
/// use path402_econ::unit_price;
/// use path402_types::Curve;
///
/// assert_eq!(unit_price(&Curve::SqrtDecay, 1000, 0), 1000);
/// assert_eq!(unit_price(&Curve::SqrtDecay, 1000, 3), 500);
/// assert_eq!(unit_price(&Curve::Fixed, 1000, 3), 1000);
/// ```
pub fn unit_price(curve: &Curve, base_price: Amount, supply: u64) -> Amount {
    match *curve {
        Curve::Fixed => base_price,
        Curve::SqrtDecay => {
            let divisor = (supply as f64 + 1.0).sqrt();
            (base_price as f64 / divisor).floor() as Amount
        }
        Curve::LogDecay => {
            let divisor = (supply as f64 + 2.0).ln();
            (base_price as f64 / divisor).floor() as Amount
        }
        Curve::LinearFloor { floor, decay_rate } => {
            let decayed = base_price.saturating_sub(supply.saturating_mul(decay_rate));
            decayed.max(floor)
        }
    }
}

/// Current price of an offering at `supply`.
pub fn offering_price(offering: &PathOffering, supply: u64) -> Amount {
    unit_price(&offering.curve, offering.base_price, supply)
}

/// Total cost of buying `count` consecutive units starting at `supply`.
///
/// Saturates at `Amount::MAX` rather than overflowing.
pub fn cumulative_cost(curve: &Curve, base_price: Amount, supply: u64, count: u64) -> Amount {
    (0..count)
        .map(|i| unit_price(curve, base_price, supply.saturating_add(i)))
        .fold(0, Amount::saturating_add)
}

/// Price schedule for `count` consecutive units starting at `supply`.
pub fn schedule(curve: &Curve, base_price: Amount, supply: u64, count: u64) -> Vec<ScheduleEntry> {
    let mut cumulative: Amount = 0;
    (0..count)
        .map(|i| {
            let at = supply.saturating_add(i);
            let price = unit_price(curve, base_price, at);
            cumulative = cumulative.saturating_add(price);
            ScheduleEntry {
                supply: at,
                unit_price: price,
                cumulative,
            }
        })
        .collect()
}
