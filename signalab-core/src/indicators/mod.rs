//! Indicator library.
//!
//! Every indicator implements the `Indicator` trait and is computed once per
//! analysis into an `IndicatorSet`. Multi-series indicators (MACD, Bollinger,
//! Stochastic) are exposed as separate instances per output, keeping the
//! single-series trait unchanged.

pub mod bollinger;
pub mod indicator;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod williams_r;

pub use bollinger::{Bollinger, BollingerBand, BollingerSeries};
pub use indicator::{Indicator, IndicatorKey, IndicatorSet};
pub use macd::{Macd, MacdOutput, MacdSeries};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticLine};
pub use williams_r::WilliamsR;

use crate::config::IndicatorParams;
use crate::domain::Bar;

/// Build the full indicator list described by `params`.
pub fn build_indicators(params: &IndicatorParams) -> Vec<Box<dyn Indicator>> {
    let mut indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Rsi::new(params.rsi_period)),
        Box::new(Macd::line(params.macd_fast, params.macd_slow, params.macd_signal)),
        Box::new(Macd::signal(params.macd_fast, params.macd_slow, params.macd_signal)),
        Box::new(Macd::histogram(params.macd_fast, params.macd_slow, params.macd_signal)),
        Box::new(Bollinger::upper(params.bollinger_period, params.bollinger_k)),
        Box::new(Bollinger::middle(params.bollinger_period, params.bollinger_k)),
        Box::new(Bollinger::lower(params.bollinger_period, params.bollinger_k)),
        Box::new(Stochastic::k(params.stochastic_k, params.stochastic_d)),
        Box::new(Stochastic::d(params.stochastic_k, params.stochastic_d)),
        Box::new(WilliamsR::new(params.williams_period)),
    ];
    for period in params.all_sma_periods() {
        indicators.push(Box::new(Sma::new(period)));
    }
    indicators
}

/// Compute every configured indicator over `bars`.
pub fn compute_indicators(bars: &[Bar], params: &IndicatorParams) -> IndicatorSet {
    let mut set = IndicatorSet::new(bars.len());
    for indicator in build_indicators(params) {
        set.insert(indicator.key(), indicator.compute(bars));
    }
    set
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
