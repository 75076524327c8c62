//! Recommendation classifier.
//!
//! Maps a score in [-1, 1] to a category and confidence, picks price targets
//! and a stop-loss from the level context, and assembles the immutable
//! `Recommendation` record.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::detail::DetailedAnalysis;
use crate::levels::{FibRatio, FibonacciLadder, SupportResistance};
use crate::patterns::PatternKind;

/// Which scoring path produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisPath {
    /// Mean of five discrete signals.
    Basic,
    /// Weighted composite of six bucketed sub-scores.
    Advanced,
}

impl fmt::Display for AnalysisPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// Recommendation category, most bullish first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    VeryStrongBuy,
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
    VeryStrongSell,
}

impl Category {
    /// Ordinal from +3 (very strong buy) to -3 (very strong sell).
    pub fn rank(self) -> i8 {
        match self {
            Self::VeryStrongBuy => 3,
            Self::StrongBuy => 2,
            Self::Buy => 1,
            Self::Neutral => 0,
            Self::Sell => -1,
            Self::StrongSell => -2,
            Self::VeryStrongSell => -3,
        }
    }

    pub fn is_bullish(self) -> bool {
        self.rank() > 0
    }

    pub fn is_bearish(self) -> bool {
        self.rank() < 0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryStrongBuy => write!(f, "VERY STRONG BUY"),
            Self::StrongBuy => write!(f, "STRONG BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Sell => write!(f, "SELL"),
            Self::StrongSell => write!(f, "STRONG SELL"),
            Self::VeryStrongSell => write!(f, "VERY STRONG SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
            Self::VeryHigh => write!(f, "Very High"),
        }
    }
}

/// Five-way classification of the consolidated signal score.
///
/// Thresholds are strict, so a score exactly on a boundary falls into the
/// less extreme category.
pub fn classify_basic(score: f64) -> (Category, Confidence) {
    if score > 0.3 {
        (Category::StrongBuy, Confidence::High)
    } else if score > 0.1 {
        (Category::Buy, Confidence::Moderate)
    } else if score < -0.3 {
        (Category::StrongSell, Confidence::High)
    } else if score < -0.1 {
        (Category::Sell, Confidence::Moderate)
    } else {
        (Category::Neutral, Confidence::Low)
    }
}

/// Seven-way classification of the weighted composite score.
pub fn classify_advanced(score: f64) -> (Category, Confidence) {
    if score > 0.6 {
        (Category::VeryStrongBuy, Confidence::VeryHigh)
    } else if score < -0.6 {
        (Category::VeryStrongSell, Confidence::VeryHigh)
    } else {
        classify_basic(score)
    }
}

/// Price targets and stop-loss. Any level can be undefined when the series
/// is too short for its source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceTargets {
    pub target: Option<f64>,
    pub secondary_target: Option<f64>,
    pub stop_loss: Option<f64>,
}

/// Highest resistance as the upside target, lowest support as the stop.
/// Both come from the Bollinger bands unless both pivot sides exist.
pub fn basic_targets(
    pivots: &SupportResistance,
    bb_upper: Option<f64>,
    bb_lower: Option<f64>,
) -> PriceTargets {
    let (target, stop_loss) = match pivots.outer_levels() {
        Some((resistance, support)) => (Some(resistance), Some(support)),
        None => (bb_upper, bb_lower),
    };
    PriceTargets {
        target,
        secondary_target: None,
        stop_loss,
    }
}

/// Fibonacci retracements when the ladder is defined at the final bar,
/// otherwise the Bollinger bands.
pub fn advanced_targets(
    score: f64,
    fibonacci: &FibonacciLadder,
    bb_upper: Option<f64>,
    bb_lower: Option<f64>,
) -> PriceTargets {
    if fibonacci.is_available() {
        let (target, secondary, stop) = if score > 0.0 {
            (FibRatio::R382, FibRatio::R236, FibRatio::R618)
        } else {
            (FibRatio::R618, FibRatio::R786, FibRatio::R236)
        };
        PriceTargets {
            target: fibonacci.last(target),
            secondary_target: fibonacci.last(secondary),
            stop_loss: fibonacci.last(stop),
        }
    } else {
        PriceTargets {
            target: bb_upper,
            secondary_target: bb_upper.map(|u| u * 1.05),
            stop_loss: bb_lower,
        }
    }
}

/// Final, immutable output of one scoring path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub path: AnalysisPath,
    /// Date of the bar the recommendation was computed at.
    pub as_of: NaiveDate,
    pub category: Category,
    pub confidence: Confidence,
    pub score: f64,
    pub price: f64,
    pub rsi: Option<f64>,
    pub targets: PriceTargets,
    pub recent_patterns: Vec<PatternKind>,
    pub detail: DetailedAnalysis,
}

impl Recommendation {
    /// Flat JSON object with enums rendered as display strings.
    pub fn to_flat_json(&self) -> serde_json::Value {
        let label = |v: Option<String>| v.map_or(serde_json::Value::Null, serde_json::Value::from);
        json!({
            "symbol": self.symbol,
            "path": self.path.to_string(),
            "as_of": self.as_of.to_string(),
            "recommendation": self.category.to_string(),
            "confidence": self.confidence.to_string(),
            "score": self.score,
            "price": self.price,
            "rsi": self.rsi,
            "target": self.targets.target,
            "secondary_target": self.targets.secondary_target,
            "stop_loss": self.targets.stop_loss,
            "recent_patterns": self
                .recent_patterns
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>(),
            "rsi_zone": label(self.detail.rsi_zone.map(|z| z.to_string())),
            "band_position": label(self.detail.band_position.map(|b| b.to_string())),
            "macd_momentum": label(self.detail.macd_momentum.map(|m| m.to_string())),
            "trend_strength": label(self.detail.trend_strength.map(|t| t.to_string())),
            "volatility": label(self.detail.volatility.map(|v| v.level.to_string())),
            "volatility_pct": self.detail.volatility.map(|v| v.annualized_pct),
        })
    }
}
