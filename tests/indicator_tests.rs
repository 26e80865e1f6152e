use ott_alert::error::IndicatorError;
use ott_alert::indicator::{compute_indicators, detect_signals, smooth, Direction};

const LENGTH: usize = 5;
const PERCENT: f64 = 1.5;

fn defined(prices: &[f64]) -> Vec<Option<f64>> {
    prices.iter().copied().map(Some).collect()
}

fn ramp() -> Vec<f64> {
    (0..21).map(|i| 100.0 + i as f64).collect()
}

/// 20 rising closes followed by 10 closes falling 10 points each.
fn sharp_reversal() -> Vec<f64> {
    let mut prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    prices.extend((1..=10).map(|j| 119.0 - 10.0 * j as f64));
    prices
}

/// Eight falling closes, then a steady climb.
fn dip_then_rise() -> Vec<f64> {
    let mut prices: Vec<f64> = (0..8).map(|i| 110.0 - i as f64).collect();
    prices.extend((0..15).map(|i| 103.0 + 2.0 * i as f64));
    prices
}

fn indices(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.then_some(i))
        .collect()
}

#[test]
/// Verifies the uptrend scenario: a monotonic ramp stays Long with OTT
/// below MAvg everywhere, and never produces a sell.
fn monotonic_ramp_stays_long_with_ott_below_mavg() {
    let out = compute_indicators(&defined(&ramp()), LENGTH, PERCENT).unwrap();
    assert_eq!(out.len(), 21);
    assert!(out.direction.iter().all(|d| *d == Direction::Long));
    for i in 0..out.len() {
        assert!(out.ott[i].unwrap() < out.mavg[i].unwrap(), "index {}", i);
    }
    let x = detect_signals(&out.mavg, &out.ott);
    assert!(indices(&x.sell).is_empty());
}

#[test]
/// Verifies an upward crossing: after a dip flips the tracker Short, the
/// recovery produces exactly one buy and flips back to Long right after it.
fn dip_then_rise_fires_single_buy() {
    let out = compute_indicators(&defined(&dip_then_rise()), LENGTH, PERCENT).unwrap();
    let x = detect_signals(&out.mavg, &out.ott);
    assert_eq!(indices(&x.buy), vec![12]);
    assert!(indices(&x.sell).is_empty());
    assert_eq!(out.direction[3], Direction::Long);
    assert_eq!(out.direction[4], Direction::Short);
    assert_eq!(out.direction[12], Direction::Short);
    assert!(out.direction[13..].iter().all(|d| *d == Direction::Long));
}

#[test]
/// Verifies the reversal scenario: exactly one sell at the crossing index and
/// the Long-to-Short flip happens no later than that index.
fn sharp_reversal_fires_single_sell_and_flips_short() {
    let out = compute_indicators(&defined(&sharp_reversal()), LENGTH, PERCENT).unwrap();
    let x = detect_signals(&out.mavg, &out.ott);
    let sells = indices(&x.sell);
    assert_eq!(sells, vec![21]);
    assert!(indices(&x.buy).is_empty());

    let first_short = out
        .direction
        .iter()
        .position(|d| *d == Direction::Short)
        .expect("reversal must flip Short");
    assert!(first_short <= sells[0]);
    assert!(out.direction[..first_short]
        .iter()
        .all(|d| *d == Direction::Long));
    assert!(out.direction[first_short..]
        .iter()
        .all(|d| *d == Direction::Short));
}

#[test]
/// Verifies buy and sell are mutually exclusive and direction is defined at
/// every index on an oscillating series.
fn oscillation_never_signals_both_ways_on_one_bar() {
    let prices: Vec<f64> = (0..200)
        .map(|i| 100.0 + 20.0 * (i as f64 * 0.1).sin())
        .collect();
    let out = compute_indicators(&defined(&prices), LENGTH, PERCENT).unwrap();
    assert_eq!(out.direction.len(), prices.len());
    let x = detect_signals(&out.mavg, &out.ott);
    for i in 0..prices.len() {
        assert!(!(x.buy[i] && x.sell[i]), "both signals at {}", i);
    }
    assert!(!indices(&x.buy).is_empty());
    assert!(!indices(&x.sell).is_empty());
}

#[test]
/// Verifies VAR tracks a rising series from below with a bounded lag.
fn var_lags_rising_series_by_bounded_amount() {
    let prices = ramp();
    let var = smooth(&defined(&prices), LENGTH).unwrap();
    let mut prev_gap = -1.0;
    for (i, p) in prices.iter().enumerate() {
        let v = var[i].unwrap();
        let gap = p - v;
        assert!(gap >= 0.0);
        // Steady-state lag for slope 1 and alpha 1/3 is (1 - alpha) / alpha = 2.
        assert!(gap < 2.0);
        assert!(gap >= prev_gap);
        prev_gap = gap;
    }
}

#[test]
/// Verifies VAR closes in on a plateau that follows a rally.
fn var_converges_on_plateau() {
    let mut prices: Vec<f64> = (0..11).map(|i| 100.0 + i as f64).collect();
    prices.extend(std::iter::repeat(110.0).take(20));
    let var = smooth(&defined(&prices), LENGTH).unwrap();
    let last = var.last().copied().flatten().unwrap();
    assert!(110.0 - last < 0.1, "VAR stalled at {}", last);
}

#[test]
/// Verifies a gap in the input produces undefined outputs at that bar only,
/// and the tracker keeps its direction through it.
fn gap_is_isolated_to_its_index() {
    let mut closes = defined(&ramp());
    closes[10] = None;
    let out = compute_indicators(&closes, LENGTH, PERCENT).unwrap();
    assert_eq!(out.mavg[10], None);
    assert_eq!(out.ott[10], None);
    assert_eq!(out.direction[10], Direction::Long);
    assert!(out.mavg[11].is_some());
    assert!(out.ott[11].is_some());
}

#[test]
/// Verifies short input is reported as insufficient data, not a panic.
fn too_few_points_is_insufficient_data() {
    let err = compute_indicators(&defined(&[1.0, 2.0, 3.0]), LENGTH, PERCENT).unwrap_err();
    assert_eq!(err, IndicatorError::InsufficientData { needed: 5, got: 3 });
}

#[test]
/// Verifies the whole pipeline is deterministic.
fn deterministic_output() {
    let prices: Vec<f64> = (0..120)
        .map(|i| 100.0 + 5.0 * (i as f64 * 0.3).cos() + i as f64 * 0.05)
        .collect();
    let run = || {
        let out = compute_indicators(&defined(&prices), LENGTH, PERCENT).unwrap();
        let x = detect_signals(&out.mavg, &out.ott);
        (out, x)
    };
    assert_eq!(run(), run());
}
