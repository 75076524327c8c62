//! Detailed sub-analyses attached to a recommendation.
//!
//! Each label is a typed reading of the final bar. The basic and advanced
//! paths read the same indicators with slightly different tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::IndicatorParams;
use crate::domain::Bar;
use crate::indicators::{IndicatorKey, IndicatorSet};

/// Indicator values at the final bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Snapshot {
    pub close: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
}

impl Snapshot {
    /// Read the final bar. `None` for an empty series.
    pub fn last(bars: &[Bar], indicators: &IndicatorSet, params: &IndicatorParams) -> Option<Self> {
        let close = bars.last()?.close;
        let last = |key| indicators.last(key);
        Some(Self {
            close,
            rsi: last(IndicatorKey::Rsi),
            macd: last(IndicatorKey::MacdLine),
            macd_signal: last(IndicatorKey::MacdSignal),
            macd_histogram: last(IndicatorKey::MacdHistogram),
            bb_upper: last(IndicatorKey::BollingerUpper),
            bb_middle: last(IndicatorKey::BollingerMiddle),
            bb_lower: last(IndicatorKey::BollingerLower),
            sma_fast: last(IndicatorKey::Sma(params.trend_fast)),
            sma_slow: last(IndicatorKey::Sma(params.trend_slow)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsiZone {
    ExtremelyOverbought,
    Overbought,
    Neutral,
    Oversold,
    ExtremelyOversold,
}

impl RsiZone {
    /// Two-tier reading: 70 / 30.
    pub fn basic(rsi: f64) -> Self {
        if rsi > 70.0 {
            Self::Overbought
        } else if rsi < 30.0 {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }

    /// Four-tier reading: 80 / 70 / 30 / 20.
    pub fn advanced(rsi: f64) -> Self {
        if rsi > 80.0 {
            Self::ExtremelyOverbought
        } else if rsi > 70.0 {
            Self::Overbought
        } else if rsi < 20.0 {
            Self::ExtremelyOversold
        } else if rsi < 30.0 {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtremelyOverbought => write!(f, "extremely overbought"),
            Self::Overbought => write!(f, "overbought"),
            Self::Neutral => write!(f, "neutral"),
            Self::Oversold => write!(f, "oversold"),
            Self::ExtremelyOversold => write!(f, "extremely oversold"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandPosition {
    AboveUpper,
    AboveMiddle,
    BelowMiddle,
    BelowLower,
}

impl BandPosition {
    /// Touching a band counts as beyond it.
    pub fn basic(close: f64, lower: f64, middle: f64, upper: f64) -> Self {
        if close >= upper {
            Self::AboveUpper
        } else if close <= lower {
            Self::BelowLower
        } else if close > middle {
            Self::AboveMiddle
        } else {
            Self::BelowMiddle
        }
    }

    /// Only a close strictly outside a band counts as a breakout.
    pub fn advanced(close: f64, lower: f64, middle: f64, upper: f64) -> Self {
        if close > upper {
            Self::AboveUpper
        } else if close < lower {
            Self::BelowLower
        } else if close > middle {
            Self::AboveMiddle
        } else {
            Self::BelowMiddle
        }
    }
}

impl fmt::Display for BandPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboveUpper => write!(f, "above upper band"),
            Self::AboveMiddle => write!(f, "above middle band"),
            Self::BelowMiddle => write!(f, "below middle band"),
            Self::BelowLower => write!(f, "below lower band"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacdMomentum {
    StrongBullish,
    WeakeningBullish,
    StrongBearish,
    WeakeningBearish,
    Bullish,
    Bearish,
    Neutral,
}

impl MacdMomentum {
    pub fn basic(macd: f64, signal: f64, histogram: f64) -> Self {
        if macd > signal && histogram > 0.0 {
            Self::Bullish
        } else if macd < signal && histogram < 0.0 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    pub fn advanced(macd: f64, signal: f64, histogram: f64) -> Self {
        if macd > signal {
            if histogram > 0.0 {
                Self::StrongBullish
            } else {
                Self::WeakeningBullish
            }
        } else if histogram < 0.0 {
            Self::StrongBearish
        } else {
            Self::WeakeningBearish
        }
    }
}

impl fmt::Display for MacdMomentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrongBullish => write!(f, "strong bullish momentum"),
            Self::WeakeningBullish => write!(f, "weakening bullish momentum"),
            Self::StrongBearish => write!(f, "strong bearish momentum"),
            Self::WeakeningBearish => write!(f, "weakening bearish momentum"),
            Self::Bullish => write!(f, "bullish momentum"),
            Self::Bearish => write!(f, "bearish momentum"),
            Self::Neutral => write!(f, "neutral momentum"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendStrength {
    StrongUptrend,
    StrongDowntrend,
    Undefined,
}

impl TrendStrength {
    pub fn classify(close: f64, fast: Option<f64>, slow: Option<f64>) -> Self {
        match (fast, slow) {
            (Some(fast), Some(slow)) if close > fast && fast > slow => Self::StrongUptrend,
            (Some(fast), Some(slow)) if close < fast && fast < slow => Self::StrongDowntrend,
            _ => Self::Undefined,
        }
    }
}

impl fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrongUptrend => write!(f, "strong uptrend"),
            Self::StrongDowntrend => write!(f, "strong downtrend"),
            Self::Undefined => write!(f, "undefined trend"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolatilityLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl VolatilityLevel {
    pub fn from_annualized_pct(pct: f64) -> Self {
        if pct > 40.0 {
            Self::VeryHigh
        } else if pct > 25.0 {
            Self::High
        } else if pct > 15.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volatility {
    /// Sample std of daily close-to-close returns, annualized, in percent.
    pub annualized_pct: f64,
    pub level: VolatilityLevel,
}

const TRADING_DAYS: f64 = 252.0;

/// Annualized volatility of daily returns. `None` with fewer than three
/// closes or when a return is not finite (zero previous close).
pub fn annualized_volatility(closes: &[f64]) -> Option<Volatility> {
    if closes.len() < 3 {
        return None;
    }
    let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
    if returns.iter().any(|r| !r.is_finite()) {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1.0);
    let annualized_pct = variance.sqrt() * TRADING_DAYS.sqrt() * 100.0;
    Some(Volatility {
        annualized_pct,
        level: VolatilityLevel::from_annualized_pct(annualized_pct),
    })
}

/// Labels for one recommendation. Trend strength and volatility are only
/// read on the advanced path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub rsi_zone: Option<RsiZone>,
    pub band_position: Option<BandPosition>,
    pub macd_momentum: Option<MacdMomentum>,
    pub trend_strength: Option<TrendStrength>,
    pub volatility: Option<Volatility>,
}

impl DetailedAnalysis {
    pub fn basic(snapshot: &Snapshot) -> Self {
        Self {
            rsi_zone: snapshot.rsi.map(RsiZone::basic),
            band_position: bands(snapshot).map(|(l, m, u)| BandPosition::basic(snapshot.close, l, m, u)),
            macd_momentum: macd(snapshot).map(|(m, s, h)| MacdMomentum::basic(m, s, h)),
            trend_strength: None,
            volatility: None,
        }
    }

    pub fn advanced(snapshot: &Snapshot, closes: &[f64]) -> Self {
        Self {
            rsi_zone: snapshot.rsi.map(RsiZone::advanced),
            band_position: bands(snapshot)
                .map(|(l, m, u)| BandPosition::advanced(snapshot.close, l, m, u)),
            macd_momentum: macd(snapshot).map(|(m, s, h)| MacdMomentum::advanced(m, s, h)),
            trend_strength: Some(TrendStrength::classify(
                snapshot.close,
                snapshot.sma_fast,
                snapshot.sma_slow,
            )),
            volatility: annualized_volatility(closes),
        }
    }
}

fn bands(s: &Snapshot) -> Option<(f64, f64, f64)> {
    Some((s.bb_lower?, s.bb_middle?, s.bb_upper?))
}

fn macd(s: &Snapshot) -> Option<(f64, f64, f64)> {
    Some((s.macd?, s.macd_signal?, s.macd_histogram?))
}
