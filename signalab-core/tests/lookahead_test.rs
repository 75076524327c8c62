//! Look-ahead contamination tests for every indicator and the per-bar scores.
//!
//! Invariant: no indicator, signal or score at bar t may depend on bars after t.
//!
//! Method: compute on a truncated series (bars 0..100) and the full series
//! (bars 0..200). Bars 0..100 must be identical between both runs.
//! Support/resistance pivots use a centered window and are excluded.

use chrono::NaiveDate;
use signalab_core::config::IndicatorParams;
use signalab_core::domain::Bar;
use signalab_core::indicators::*;
use signalab_core::scoring::WeightedScore;
use signalab_core::signals::{SignalSet, SignalSource};

/// Generate N bars of synthetic OHLCV data with realistic variation.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        // Deterministic pseudo-random walk using a simple LCG
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05; // -5.0 to +5.0
        price += change;
        price = price.max(10.0);

        let open = price - 0.5;
        let close = price + 0.3;
        let high = open.max(close) + 2.0;
        let low = open.min(close) - 2.0;

        bars.push(Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000 + (i as u64 * 100),
        });
    }

    bars
}

/// Assert that the indicator produces identical values for bars 0..truncated_len
/// whether computed on a truncated or full series.
fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let truncated = &full_bars[..truncated_len];
    let full_result = indicator.compute(full_bars);
    let truncated_result = indicator.compute(truncated);
    let key = indicator.key();

    assert_eq!(truncated_result.len(), truncated_len, "{key}: truncated length");
    assert_eq!(full_result.len(), full_bars.len(), "{key}: full length");

    for i in 0..truncated_len {
        let t = truncated_result[i];
        let f = full_result[i];

        if t.is_nan() && f.is_nan() {
            continue;
        }

        assert!(
            !t.is_nan() && !f.is_nan(),
            "{key}: NaN mismatch at bar {i} (truncated={t}, full={f})"
        );

        assert!(
            (t - f).abs() < 1e-10,
            "{key}: look-ahead contamination at bar {i}: truncated={t}, full={f}, diff={}",
            (t - f).abs()
        );
    }
}

#[test]
fn lookahead_every_default_indicator() {
    let bars = make_test_bars(200);
    for indicator in build_indicators(&IndicatorParams::default()) {
        assert_no_lookahead(indicator.as_ref(), &bars, 100);
    }
}

#[test]
fn lookahead_short_periods() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Rsi::new(5), &bars, 100);
    assert_no_lookahead(&Macd::histogram(3, 6, 2), &bars, 100);
    assert_no_lookahead(&Bollinger::lower(5, 1.5), &bars, 100);
    assert_no_lookahead(&Stochastic::d(5, 2), &bars, 100);
    assert_no_lookahead(&WilliamsR::new(5), &bars, 100);
}

#[test]
fn lookahead_signals_and_scores() {
    let bars = make_test_bars(200);
    let params = IndicatorParams::default();
    let truncated = &bars[..100];

    let full_ind = compute_indicators(&bars, &params);
    let trunc_ind = compute_indicators(truncated, &params);

    let full_signals = SignalSet::generate(&bars, &full_ind);
    let trunc_signals = SignalSet::generate(truncated, &trunc_ind);
    let full_scores = WeightedScore::compute(&bars, &full_ind, &params);
    let trunc_scores = WeightedScore::compute(truncated, &trunc_ind, &params);

    for i in 0..100 {
        for source in SignalSource::ALL {
            assert_eq!(
                trunc_signals.get(i, source),
                full_signals.get(i, source),
                "{source} differs at bar {i}"
            );
        }
        assert_eq!(trunc_scores.composite(i), full_scores.composite(i), "bar {i}");
    }
}
