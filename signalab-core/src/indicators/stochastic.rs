//! Stochastic Oscillator.
//!
//! Two series (separate Indicator instances):
//! - %K: 100 * (close - lowest_low) / (highest_high - lowest_low) over `k_period`
//! - %D: SMA(%K, d_period)
//!
//! A flat window (highest_high == lowest_low) leaves %K undefined.
//! Lookback: k_period - 1 for %K, k_period + d_period - 2 for %D.

use super::indicator::{Indicator, IndicatorKey};
use super::rolling::{rolling_max, rolling_mean, rolling_min};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    line: StochasticLine,
}

impl Stochastic {
    fn with_line(k_period: usize, d_period: usize, line: StochasticLine) -> Self {
        assert!(k_period >= 1, "Stochastic %K period must be >= 1");
        assert!(d_period >= 1, "Stochastic %D period must be >= 1");
        Self {
            k_period,
            d_period,
            line,
        }
    }

    pub fn k(k_period: usize, d_period: usize) -> Self {
        Self::with_line(k_period, d_period, StochasticLine::K)
    }

    pub fn d(k_period: usize, d_period: usize) -> Self {
        Self::with_line(k_period, d_period, StochasticLine::D)
    }
}

/// Position of `close` inside the trailing high/low range, scaled to 0..=100.
///
/// Shared by %K and Williams %R. NaN when the range is zero or undefined.
/// Clamped so rounding never pushes a close at the extreme out of range.
pub(crate) fn range_position(bars: &[Bar], period: usize) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highest = rolling_max(&highs, period);
    let lowest = rolling_min(&lows, period);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = highest[i] - lowest[i];
            if range.is_nan() || range == 0.0 {
                f64::NAN
            } else {
                (100.0 * (bar.close - lowest[i]) / range).clamp(0.0, 100.0)
            }
        })
        .collect()
}

impl Indicator for Stochastic {
    fn key(&self) -> IndicatorKey {
        match self.line {
            StochasticLine::K => IndicatorKey::StochasticK,
            StochasticLine::D => IndicatorKey::StochasticD,
        }
    }

    fn lookback(&self) -> usize {
        match self.line {
            StochasticLine::K => self.k_period - 1,
            StochasticLine::D => self.k_period + self.d_period - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let k = range_position(bars, self.k_period);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => rolling_mean(&k, self.d_period),
        }
    }
}
