//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Oscillator bounds — RSI and %K in [0, 100], %R in [-100, 0]
//! 2. MACD identity — histogram == macd - signal exactly
//! 3. Band symmetry — upper - middle == middle - lower
//! 4. Score bounds — consolidated and weighted scores in [-1, 1]
//! 5. Classification monotonicity — a higher score never maps to a lower category
//! 6. Idempotence — the same series yields a bit-identical recommendation
//! 7. Alignment — every derived series has the input's length

use chrono::NaiveDate;
use proptest::prelude::*;
use signalab_core::config::{AnalysisConfig, IndicatorParams};
use signalab_core::domain::{Bar, Series};
use signalab_core::indicators::{compute_indicators, IndicatorKey};
use signalab_core::recommend::{classify_advanced, classify_basic};
use signalab_core::scoring::ScoreComponent;
use signalab_core::signals::{Signal, SignalSource};
use signalab_core::analyze;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Daily returns in ±5%, compounded from a positive start price.
fn arb_bars(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<Bar>> {
    (
        10.0..500.0_f64,
        prop::collection::vec((-0.05..0.05_f64, 0.0..0.02_f64, 0.0..0.02_f64), min_len..max_len),
    )
        .prop_map(|(start, steps)| {
            let base = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
            let mut prev_close: f64 = start;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (ret, up, down))| {
                    let open = prev_close;
                    let close = (prev_close * (1.0 + ret)).max(0.01);
                    prev_close = close;
                    Bar {
                        date: base + chrono::Duration::days(i as i64),
                        open,
                        high: open.max(close) * (1.0 + up),
                        low: open.min(close) * (1.0 - down),
                        close,
                        volume: 1_000_000,
                    }
                })
                .collect()
        })
}

fn arb_score() -> impl Strategy<Value = f64> {
    -1.0..=1.0_f64
}

// ── 1. Oscillator bounds ─────────────────────────────────────────────

proptest! {
    #[test]
    fn oscillators_stay_in_range(bars in arb_bars(1, 120)) {
        let set = compute_indicators(&bars, &IndicatorParams::default());
        for i in 0..bars.len() {
            if let Some(rsi) = set.get(IndicatorKey::Rsi, i) {
                prop_assert!((0.0..=100.0).contains(&rsi), "rsi {rsi} at {i}");
            }
            if let Some(k) = set.get(IndicatorKey::StochasticK, i) {
                prop_assert!((0.0..=100.0).contains(&k), "%K {k} at {i}");
            }
            if let Some(r) = set.get(IndicatorKey::WilliamsR, i) {
                prop_assert!((-100.0..=0.0).contains(&r), "%R {r} at {i}");
            }
        }
    }
}

// ── 2–3. MACD identity and band symmetry ─────────────────────────────

proptest! {
    #[test]
    fn macd_histogram_is_line_minus_signal(bars in arb_bars(1, 120)) {
        let set = compute_indicators(&bars, &IndicatorParams::default());
        for i in 0..bars.len() {
            let line = set.get(IndicatorKey::MacdLine, i).unwrap();
            let signal = set.get(IndicatorKey::MacdSignal, i).unwrap();
            let hist = set.get(IndicatorKey::MacdHistogram, i).unwrap();
            prop_assert_eq!(hist, line - signal);
        }
    }

    #[test]
    fn bollinger_bands_are_symmetric(bars in arb_bars(20, 120)) {
        let set = compute_indicators(&bars, &IndicatorParams::default());
        for i in 19..bars.len() {
            let upper = set.get(IndicatorKey::BollingerUpper, i).unwrap();
            let middle = set.get(IndicatorKey::BollingerMiddle, i).unwrap();
            let lower = set.get(IndicatorKey::BollingerLower, i).unwrap();
            prop_assert!(lower <= middle && middle <= upper);
            let tolerance = 1e-9 * upper.abs().max(1.0);
            prop_assert!(((upper - middle) - (middle - lower)).abs() < tolerance);
        }
    }
}

// ── 3b. Flat series collapse the bands ───────────────────────────────

proptest! {
    #[test]
    fn constant_price_collapses_bands(price in 0.01..10_000.0_f64, len in 20usize..60) {
        let base = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let bars: Vec<Bar> = (0..len)
            .map(|i| Bar {
                date: base + chrono::Duration::days(i as i64),
                open: price,
                high: price,
                low: price,
                close: price,
                volume: 1_000,
            })
            .collect();
        let series = Series::new("FLAT", bars).unwrap();
        let analysis = analyze(&series, &AnalysisConfig::default()).unwrap();
        let last = len - 1;
        prop_assert_eq!(analysis.indicators.last(IndicatorKey::BollingerUpper), Some(price));
        prop_assert_eq!(analysis.indicators.last(IndicatorKey::BollingerMiddle), Some(price));
        prop_assert_eq!(analysis.indicators.last(IndicatorKey::BollingerLower), Some(price));
        prop_assert_eq!(analysis.weighted.component(last, ScoreComponent::Bollinger), Some(-0.5));
        prop_assert_eq!(analysis.signals.last(SignalSource::Bollinger), Some(Signal::Sell));
    }
}

// ── 4. Score bounds ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn scores_are_bounded(bars in arb_bars(1, 150)) {
        let series = Series::new("PROP", bars).unwrap();
        let analysis = analyze(&series, &AnalysisConfig::default()).unwrap();
        for i in 0..series.len() {
            let consolidated = analysis.signals.consolidated(i).unwrap();
            let composite = analysis.weighted.composite(i).unwrap();
            prop_assert!((-1.0..=1.0).contains(&consolidated));
            prop_assert!((-1.0..=1.0).contains(&composite));
        }
        prop_assert_eq!(analysis.indicators.bar_count(), series.len());
        prop_assert_eq!(analysis.signals.len(), series.len());
        prop_assert_eq!(analysis.weighted.len(), series.len());
        prop_assert_eq!(analysis.patterns.len(), series.len());
    }
}

// ── 5. Classification monotonicity ───────────────────────────────────

proptest! {
    #[test]
    fn basic_classification_is_monotonic(a in arb_score(), b in arb_score()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify_basic(lo).0.rank() <= classify_basic(hi).0.rank());
    }

    #[test]
    fn advanced_classification_is_monotonic(a in arb_score(), b in arb_score()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (lo_cat, lo_conf) = classify_advanced(lo);
        let (hi_cat, _) = classify_advanced(hi);
        prop_assert!(lo_cat.rank() <= hi_cat.rank());
        // confidence tracks distance from neutral
        prop_assert_eq!(lo_conf, classify_advanced(-lo).1);
    }
}

// ── 6. Idempotence ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn analysis_is_idempotent(bars in arb_bars(1, 150)) {
        let series = Series::new("PROP", bars).unwrap();
        let config = AnalysisConfig::default();
        let first = analyze(&series, &config).unwrap();
        let second = analyze(&series, &config).unwrap();
        prop_assert_eq!(first.fingerprint, second.fingerprint);
        prop_assert_eq!(
            serde_json::to_string(&first.basic).unwrap(),
            serde_json::to_string(&second.basic).unwrap()
        );
        prop_assert_eq!(
            serde_json::to_string(&first.advanced).unwrap(),
            serde_json::to_string(&second.advanced).unwrap()
        );
    }
}
