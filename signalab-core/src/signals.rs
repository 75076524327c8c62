//! Per-bar BUY/HOLD/SELL signals and the consolidated signal score.
//!
//! Each rule is a pure function of indicator values at one bar (plus the
//! previous bar for the MACD crossover). An undefined input never fires:
//! the rule returns `Signal::Hold`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::{IndicatorKey, IndicatorSet};

/// Discrete trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Self::Sell => -1,
            Self::Hold => 0,
            Self::Buy => 1,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
            Self::Buy => write!(f, "BUY"),
        }
    }
}

/// Indicators that vote in the consolidated score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalSource {
    Rsi,
    Macd,
    Bollinger,
    Stochastic,
    Williams,
}

impl SignalSource {
    pub const ALL: [SignalSource; 5] = [
        Self::Rsi,
        Self::Macd,
        Self::Bollinger,
        Self::Stochastic,
        Self::Williams,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rsi => "signal_rsi",
            Self::Macd => "signal_macd",
            Self::Bollinger => "signal_bollinger",
            Self::Stochastic => "signal_stochastic",
            Self::Williams => "signal_williams",
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RSI below 30 buys, above 70 sells.
pub fn rsi_signal(rsi: Option<f64>) -> Signal {
    match rsi {
        Some(v) if v < 30.0 => Signal::Buy,
        Some(v) if v > 70.0 => Signal::Sell,
        _ => Signal::Hold,
    }
}

/// MACD line crossing its signal line between `previous` and `current`.
///
/// Each argument is `(macd, signal)` at that bar.
pub fn macd_crossover_signal(previous: Option<(f64, f64)>, current: Option<(f64, f64)>) -> Signal {
    let (Some((prev_macd, prev_signal)), Some((macd, signal))) = (previous, current) else {
        return Signal::Hold;
    };
    if macd > signal && prev_macd <= prev_signal {
        Signal::Buy
    } else if macd < signal && prev_macd >= prev_signal {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Close touching a band. A close at or above the upper band sells even when
/// it also touches the lower band (zero-width band).
pub fn bollinger_touch_signal(close: f64, lower: Option<f64>, upper: Option<f64>) -> Signal {
    if upper.is_some_and(|u| close >= u) {
        Signal::Sell
    } else if lower.is_some_and(|l| close <= l) {
        Signal::Buy
    } else {
        Signal::Hold
    }
}

pub fn stochastic_signal(k: Option<f64>) -> Signal {
    match k {
        Some(v) if v < 20.0 => Signal::Buy,
        Some(v) if v > 80.0 => Signal::Sell,
        _ => Signal::Hold,
    }
}

pub fn williams_signal(r: Option<f64>) -> Signal {
    match r {
        Some(v) if v < -80.0 => Signal::Buy,
        Some(v) if v > -20.0 => Signal::Sell,
        _ => Signal::Hold,
    }
}

/// Signals for every bar, aligned with the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    rows: Vec<[Signal; 5]>,
    consolidated: Vec<f64>,
}

impl SignalSet {
    pub fn generate(bars: &[Bar], indicators: &IndicatorSet) -> Self {
        let macd_pair = |i: usize| {
            Some((
                indicators.get(IndicatorKey::MacdLine, i)?,
                indicators.get(IndicatorKey::MacdSignal, i)?,
            ))
        };

        let rows: Vec<[Signal; 5]> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let previous = i.checked_sub(1).and_then(macd_pair);
                [
                    rsi_signal(indicators.get(IndicatorKey::Rsi, i)),
                    macd_crossover_signal(previous, macd_pair(i)),
                    bollinger_touch_signal(
                        bar.close,
                        indicators.get(IndicatorKey::BollingerLower, i),
                        indicators.get(IndicatorKey::BollingerUpper, i),
                    ),
                    stochastic_signal(indicators.get(IndicatorKey::StochasticK, i)),
                    williams_signal(indicators.get(IndicatorKey::WilliamsR, i)),
                ]
            })
            .collect();

        let consolidated = rows
            .iter()
            .map(|row| {
                let sum: i32 = row.iter().map(|s| i32::from(s.value())).sum();
                f64::from(sum) / row.len() as f64
            })
            .collect();

        Self { rows, consolidated }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize, source: SignalSource) -> Option<Signal> {
        self.rows.get(index).map(|row| row[source as usize])
    }

    /// Mean of the five signals at bar `index`, in [-1, 1].
    pub fn consolidated(&self, index: usize) -> Option<f64> {
        self.consolidated.get(index).copied()
    }

    pub fn last_consolidated(&self) -> Option<f64> {
        self.consolidated.last().copied()
    }

    pub fn last(&self, source: SignalSource) -> Option<Signal> {
        self.rows.last().map(|row| row[source as usize])
    }

    pub fn consolidated_series(&self) -> &[f64] {
        &self.consolidated
    }
}
