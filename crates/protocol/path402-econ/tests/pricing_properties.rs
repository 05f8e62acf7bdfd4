//! Behavioral properties of the pricing curves and revenue split.

use path402_econ::{cumulative_cost, schedule, split_revenue, unit_price};
use path402_types::Curve;

const CURVES: [Curve; 4] = [
    Curve::Fixed,
    Curve::SqrtDecay,
    Curve::LogDecay,
    Curve::LinearFloor {
        floor: 20,
        decay_rate: 10,
    },
];

#[test]
fn fixed_curve_ignores_supply() {
    for supply in [0, 1, 2, 10, 1_000, 1_000_000, u64::MAX] {
        assert_eq!(unit_price(&Curve::Fixed, 1000, supply), 1000);
    }
}

#[test]
fn decaying_curves_never_increase_with_supply() {
    for curve in &CURVES {
        let mut previous = unit_price(curve, 10_000, 0);
        for supply in 1..500 {
            let price = unit_price(curve, 10_000, supply);
            assert!(
                price <= previous,
                "{} rose from {} to {} at supply {}",
                curve,
                previous,
                price,
                supply
            );
            previous = price;
        }
    }
}

#[test]
fn linear_floor_never_drops_below_floor() {
    let curve = Curve::LinearFloor {
        floor: 20,
        decay_rate: 10,
    };
    assert_eq!(unit_price(&curve, 100, 9), 20);
    for supply in 0..100 {
        assert!(unit_price(&curve, 100, supply) >= 20);
    }
}

#[test]
fn unknown_curve_id_prices_like_sqrt_decay() {
    let curve = Curve::from_id("quadratic", 0, 0);
    for supply in [0, 3, 15] {
        assert_eq!(
            unit_price(&curve, 1000, supply),
            unit_price(&Curve::SqrtDecay, 1000, supply)
        );
    }
}

#[test]
fn schedule_agrees_with_cumulative_cost() {
    for curve in &CURVES {
        for start in [0, 7] {
            let rows = schedule(curve, 1000, start, 25);
            let last = rows.last().map(|r| r.cumulative).unwrap_or(0);
            assert_eq!(last, cumulative_cost(curve, 1000, start, 25));

            let summed: u64 = rows.iter().map(|r| r.unit_price).sum();
            assert_eq!(summed, last);
        }
    }
}

#[test]
fn split_shares_always_sum_to_total() {
    let ratios = [0.0, 0.2, 0.3, 0.333, 0.5, 0.7, 0.99, 1.0];
    for total in (0..2_000u64).chain([u32::MAX as u64, 1 << 52]) {
        for ratio in ratios {
            let split = split_revenue(total, ratio, 1.0 - ratio);
            assert_eq!(split.total, total);
            assert_eq!(split.issuer_share + split.server_share, total);
            assert!(split.issuer_share <= total);
        }
    }
}

#[test]
fn split_known_values() {
    let split = split_revenue(100, 0.2, 0.8);
    assert_eq!((split.issuer_share, split.server_share), (20, 80));

    let split = split_revenue(101, 0.2, 0.8);
    assert_eq!((split.issuer_share, split.server_share), (20, 81));
}
