//! Support/resistance pivots and the rolling Fibonacci retracement ladder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LevelParams;
use crate::domain::Bar;
use crate::indicators::rolling::{centered_max, centered_min, rolling_max, rolling_min};

/// Local pivot levels, strongest first on each side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    /// Resistance prices, descending.
    pub resistances: Vec<f64>,
    /// Support prices, ascending.
    pub supports: Vec<f64>,
}

impl SupportResistance {
    /// Highest resistance and lowest support, if both sides have a pivot.
    pub fn outer_levels(&self) -> Option<(f64, f64)> {
        Some((*self.resistances.first()?, *self.supports.first()?))
    }
}

/// Indices whose value equals the centered-window extreme.
///
/// With `merge_adjacent`, a run of consecutive pivots at the same price
/// (a plateau) is reported once.
fn pivot_indices(values: &[f64], extremes: &[f64], merge_adjacent: bool) -> Vec<usize> {
    let mut pivots: Vec<usize> = Vec::new();
    for (i, (&v, &e)) in values.iter().zip(extremes).enumerate() {
        if e.is_nan() || v != e {
            continue;
        }
        if merge_adjacent {
            if let Some(last) = pivots.last_mut() {
                if *last + 1 == i && values[*last] == v {
                    // track the plateau end so the next bar still counts as adjacent
                    *last = i;
                    continue;
                }
            }
        }
        pivots.push(i);
    }
    pivots
}

pub fn support_resistance(bars: &[Bar], params: &LevelParams) -> SupportResistance {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let high_extremes = centered_max(&highs, params.pivot_window);
    let low_extremes = centered_min(&lows, params.pivot_window);

    let mut resistances: Vec<f64> =
        pivot_indices(&highs, &high_extremes, params.merge_adjacent_pivots)
            .into_iter()
            .map(|i| highs[i])
            .collect();
    let mut supports: Vec<f64> = pivot_indices(&lows, &low_extremes, params.merge_adjacent_pivots)
        .into_iter()
        .map(|i| lows[i])
        .collect();

    resistances.sort_by(|a, b| b.total_cmp(a));
    supports.sort_by(|a, b| a.total_cmp(b));
    resistances.truncate(params.max_levels);
    supports.truncate(params.max_levels);

    SupportResistance {
        resistances,
        supports,
    }
}

/// Fixed Fibonacci retracement ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FibRatio {
    R0,
    R236,
    R382,
    R500,
    R618,
    R786,
    R1000,
}

impl FibRatio {
    pub const ALL: [FibRatio; 7] = [
        Self::R0,
        Self::R236,
        Self::R382,
        Self::R500,
        Self::R618,
        Self::R786,
        Self::R1000,
    ];

    pub fn ratio(self) -> f64 {
        match self {
            Self::R0 => 0.0,
            Self::R236 => 0.236,
            Self::R382 => 0.382,
            Self::R500 => 0.5,
            Self::R618 => 0.618,
            Self::R786 => 0.786,
            Self::R1000 => 1.0,
        }
    }
}

impl fmt::Display for FibRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fib_{:.1}%", self.ratio() * 100.0)
    }
}

/// Rolling Fibonacci ladder: trailing high/low extremes recomputed every bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLadder {
    high_max: Vec<f64>,
    low_min: Vec<f64>,
}

impl FibonacciLadder {
    pub fn compute(bars: &[Bar], window: usize) -> Self {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        Self {
            high_max: rolling_max(&highs, window),
            low_min: rolling_min(&lows, window),
        }
    }

    /// Level for `ratio` at bar `index`, `None` during warm-up.
    pub fn level(&self, ratio: FibRatio, index: usize) -> Option<f64> {
        let high = *self.high_max.get(index)?;
        let low = *self.low_min.get(index)?;
        if high.is_nan() || low.is_nan() {
            return None;
        }
        Some(match ratio {
            FibRatio::R0 => high,
            FibRatio::R1000 => low,
            _ => high - ratio.ratio() * (high - low),
        })
    }

    /// Level for `ratio` at the final bar.
    pub fn last(&self, ratio: FibRatio) -> Option<f64> {
        self.high_max
            .len()
            .checked_sub(1)
            .and_then(|i| self.level(ratio, i))
    }

    /// Whether the ladder is defined at the final bar.
    pub fn is_available(&self) -> bool {
        self.last(FibRatio::R382).is_some()
    }

    /// Full series for one ratio (NaN during warm-up).
    pub fn series(&self, ratio: FibRatio) -> Vec<f64> {
        (0..self.high_max.len())
            .map(|i| self.level(ratio, i).unwrap_or(f64::NAN))
            .collect()
    }
}

/// Everything the level detector produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub pivots: SupportResistance,
    pub fibonacci: FibonacciLadder,
}

impl LevelSet {
    pub fn detect(bars: &[Bar], params: &LevelParams) -> Self {
        Self {
            pivots: support_resistance(bars, params),
            fibonacci: FibonacciLadder::compute(bars, params.fibonacci_window),
        }
    }
}
