//! Weighted composite score.
//!
//! Six bucketed sub-scores in [-1, 1], combined with fixed weights that sum
//! to 1. An undefined indicator value scores 0 (neutral).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::IndicatorParams;
use crate::domain::Bar;
use crate::indicators::{IndicatorKey, IndicatorSet};

/// Sub-score components, in weight-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreComponent {
    Rsi,
    Macd,
    Bollinger,
    MovingAverages,
    Stochastic,
    Williams,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 6] = [
        Self::Rsi,
        Self::Macd,
        Self::Bollinger,
        Self::MovingAverages,
        Self::Stochastic,
        Self::Williams,
    ];

    pub fn weight(self) -> f64 {
        match self {
            Self::Rsi => 0.20,
            Self::Macd => 0.25,
            Self::Bollinger => 0.20,
            Self::MovingAverages => 0.15,
            Self::Stochastic => 0.10,
            Self::Williams => 0.10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rsi => "score_rsi",
            Self::Macd => "score_macd",
            Self::Bollinger => "score_bollinger",
            Self::MovingAverages => "score_sma",
            Self::Stochastic => "score_stochastic",
            Self::Williams => "score_williams",
        }
    }
}

impl fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn rsi_score(rsi: Option<f64>) -> f64 {
    match rsi {
        Some(v) if v < 30.0 => 1.0,
        Some(v) if v < 40.0 => 0.5,
        Some(v) if v > 70.0 => -1.0,
        Some(v) if v > 60.0 => -0.5,
        _ => 0.0,
    }
}

pub fn macd_score(macd: Option<f64>, signal: Option<f64>, histogram: Option<f64>) -> f64 {
    let (Some(macd), Some(signal), Some(hist)) = (macd, signal, histogram) else {
        return 0.0;
    };
    match (macd > signal, hist > 0.0) {
        (true, true) => 1.0,
        (true, false) => 0.3,
        (false, true) => -0.3,
        (false, false) => -1.0,
    }
}

/// Position of `close` relative to the bands. A zero-width band (flat
/// window) scores -0.5.
pub fn bollinger_score(
    close: f64,
    lower: Option<f64>,
    middle: Option<f64>,
    upper: Option<f64>,
) -> f64 {
    let (Some(lower), Some(middle), Some(upper)) = (lower, middle, upper) else {
        return 0.0;
    };
    if upper == lower {
        -0.5
    } else if close <= lower {
        1.0
    } else if close < middle {
        0.5
    } else if close < upper {
        -0.5
    } else {
        -1.0
    }
}

/// Price against the fast and slow moving averages.
pub fn moving_average_score(close: f64, fast: Option<f64>, slow: Option<f64>) -> f64 {
    let (Some(fast), Some(slow)) = (fast, slow) else {
        return 0.0;
    };
    if close > fast && close > slow && fast > slow {
        1.0
    } else if close > fast && close < slow {
        0.3
    } else if close < fast && close > slow {
        -0.3
    } else if close < fast && close < slow && fast < slow {
        -1.0
    } else {
        0.0
    }
}

pub fn stochastic_score(k: Option<f64>) -> f64 {
    match k {
        Some(v) if v < 20.0 => 1.0,
        Some(v) if v < 40.0 => 0.5,
        Some(v) if v >= 80.0 => -1.0,
        Some(v) if v >= 60.0 => -0.5,
        _ => 0.0,
    }
}

pub fn williams_score(r: Option<f64>) -> f64 {
    match r {
        Some(v) if v < -80.0 => 1.0,
        Some(v) if v < -60.0 => 0.5,
        Some(v) if v >= -20.0 => -1.0,
        Some(v) if v >= -40.0 => -0.5,
        _ => 0.0,
    }
}

/// Per-bar sub-scores and the weighted composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedScore {
    components: Vec<[f64; 6]>,
    composite: Vec<f64>,
}

impl WeightedScore {
    pub fn compute(bars: &[Bar], indicators: &IndicatorSet, params: &IndicatorParams) -> Self {
        let fast = IndicatorKey::Sma(params.trend_fast);
        let slow = IndicatorKey::Sma(params.trend_slow);

        let components: Vec<[f64; 6]> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let get = |key| indicators.get(key, i);
                [
                    rsi_score(get(IndicatorKey::Rsi)),
                    macd_score(
                        get(IndicatorKey::MacdLine),
                        get(IndicatorKey::MacdSignal),
                        get(IndicatorKey::MacdHistogram),
                    ),
                    bollinger_score(
                        bar.close,
                        get(IndicatorKey::BollingerLower),
                        get(IndicatorKey::BollingerMiddle),
                        get(IndicatorKey::BollingerUpper),
                    ),
                    moving_average_score(bar.close, get(fast), get(slow)),
                    stochastic_score(get(IndicatorKey::StochasticK)),
                    williams_score(get(IndicatorKey::WilliamsR)),
                ]
            })
            .collect();

        let composite = components
            .iter()
            .map(|row| {
                ScoreComponent::ALL
                    .iter()
                    .zip(row)
                    .map(|(c, s)| c.weight() * s)
                    .sum::<f64>()
                    // float summation can overshoot by an ulp
                    .clamp(-1.0, 1.0)
            })
            .collect();

        Self {
            components,
            composite,
        }
    }

    pub fn len(&self) -> usize {
        self.composite.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composite.is_empty()
    }

    pub fn component(&self, index: usize, component: ScoreComponent) -> Option<f64> {
        self.components.get(index).map(|row| row[component as usize])
    }

    pub fn composite(&self, index: usize) -> Option<f64> {
        self.composite.get(index).copied()
    }

    pub fn last_composite(&self) -> Option<f64> {
        self.composite.last().copied()
    }

    pub fn composite_series(&self) -> &[f64] {
        &self.composite
    }
}
