//! Williams %R.
//!
//! %R = -100 * (highest_high - close) / (highest_high - lowest_low)
//! Range [-100, 0]; a flat window is undefined.
//! Lookback: period - 1.

use super::indicator::{Indicator, IndicatorKey};
use super::stochastic::range_position;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self { period }
    }
}

impl Indicator for WilliamsR {
    fn key(&self) -> IndicatorKey {
        IndicatorKey::WilliamsR
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        // (HH - close) / range == 1 - (close - LL) / range
        range_position(bars, self.period)
            .into_iter()
            .map(|k| k - 100.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars};

    #[test]
    fn williams_known_values() {
        let bars = make_ohlc_bars(&[
            (10.0, 12.0, 9.0, 11.0),
            (11.0, 15.0, 10.0, 14.0),
            (14.0, 14.0, 13.0, 13.5),
        ]);
        let r = WilliamsR::new(3).compute(&bars);
        assert!(r[1].is_nan());
        // HH 15, LL 9, close 13.5 → -100 * 1.5 / 6 = -25
        assert_approx(r[2], -25.0, 1e-9);
    }

    #[test]
    fn close_at_high_never_rounds_above_zero() {
        let (high, low) = (214.83666674738032, 193.94748773293713);
        let mut data = vec![(200.0, high, low, 200.0); 13];
        data.push((200.0, high, low, high));
        let r = WilliamsR::new(14).compute(&make_ohlc_bars(&data));
        assert_eq!(r[13], 0.0);
    }

    #[test]
    fn close_at_high_is_zero_and_at_low_is_minus_100() {
        let bars = make_ohlc_bars(&[
            (10.0, 12.0, 8.0, 9.0),
            (9.0, 12.0, 8.0, 12.0),
            (12.0, 12.0, 8.0, 8.0),
        ]);
        let r = WilliamsR::new(2).compute(&bars);
        assert_approx(r[1], 0.0, 1e-9);
        assert_approx(r[2], -100.0, 1e-9);
    }

    #[test]
    fn flat_range_is_undefined() {
        let bars = make_ohlc_bars(&[(5.0, 5.0, 5.0, 5.0); 3]);
        let r = WilliamsR::new(2).compute(&bars);
        assert!(r.iter().all(|v| v.is_nan()));
    }
}
