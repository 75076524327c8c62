//! Indicator trait, typed indicator keys, and the aligned indicator container.
//!
//! Indicators are pure functions: bar history in, numeric series out. They are
//! computed once per analysis and then queried by bar index.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Every indicator series the pipeline knows about.
///
/// Lookups go through this enum rather than string column names, so a typo
/// is a compile error instead of a silently missing series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndicatorKey {
    Rsi,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
    Sma(usize),
    StochasticK,
    StochasticD,
    WilliamsR,
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsi => write!(f, "rsi"),
            Self::MacdLine => write!(f, "macd"),
            Self::MacdSignal => write!(f, "macd_signal"),
            Self::MacdHistogram => write!(f, "macd_histogram"),
            Self::BollingerUpper => write!(f, "bb_upper"),
            Self::BollingerMiddle => write!(f, "bb_middle"),
            Self::BollingerLower => write!(f, "bb_lower"),
            Self::Sma(period) => write!(f, "sma_{period}"),
            Self::StochasticK => write!(f, "stoch_k"),
            Self::StochasticD => write!(f, "stoch_d"),
            Self::WilliamsR => write!(f, "williams_r"),
        }
    }
}

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warm-up).
///
/// # Look-ahead guard
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Which series this indicator produces.
    fn key(&self) -> IndicatorKey;

    /// Number of leading bars that stay undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Indicator series aligned 1:1 with the input bars.
///
/// Undefined positions are stored as NaN and surfaced as `None` by the
/// accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    len: usize,
    series: BTreeMap<IndicatorKey, Vec<f64>>,
}

impl IndicatorSet {
    /// An empty set for a series of `len` bars.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            series: BTreeMap::new(),
        }
    }

    /// Insert a series. Panics if its length differs from the bar count.
    pub fn insert(&mut self, key: IndicatorKey, values: Vec<f64>) {
        assert_eq!(
            values.len(),
            self.len,
            "indicator '{key}' produced {} values for {} bars",
            values.len(),
            self.len
        );
        self.series.insert(key, values);
    }

    /// Number of bars every series is aligned to.
    pub fn bar_count(&self) -> usize {
        self.len
    }

    /// Value at `bar_index`, or `None` if missing or still in warm-up.
    pub fn get(&self, key: IndicatorKey, bar_index: usize) -> Option<f64> {
        self.series
            .get(&key)
            .and_then(|v| v.get(bar_index).copied())
            .filter(|v| !v.is_nan())
    }

    /// Value at the final bar.
    pub fn last(&self, key: IndicatorKey) -> Option<f64> {
        self.len.checked_sub(1).and_then(|i| self.get(key, i))
    }

    /// Full raw series (NaN for undefined positions).
    pub fn series(&self, key: IndicatorKey) -> Option<&[f64]> {
        self.series.get(&key).map(|v| v.as_slice())
    }

    /// Keys present, in stable order.
    pub fn keys(&self) -> impl Iterator<Item = IndicatorKey> + '_ {
        self.series.keys().copied()
    }

    /// Number of indicator series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
