//! Analysis configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! window = "6mo"
//!
//! [indicators]
//! rsi_period = 14
//! sma_periods = [20, 50, 200]
//!
//! [levels]
//! fibonacci_window = 50
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown analysis window '{0}' (expected 1mo, 3mo, 6mo, 1y, 2y or 5y)")]
    UnknownWindow(String),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Requested history length, resolved by the data provider into a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnalysisWindow {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl AnalysisWindow {
    pub const ALL: [AnalysisWindow; 6] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::TwoYears,
        Self::FiveYears,
    ];

    /// Calendar days covered by the window.
    pub fn days(self) -> i64 {
        match self {
            Self::OneMonth => 30,
            Self::ThreeMonths => 91,
            Self::SixMonths => 182,
            Self::OneYear => 365,
            Self::TwoYears => 730,
            Self::FiveYears => 1826,
        }
    }

    /// First date of the window when it ends on `end` (inclusive).
    pub fn start_from(self, end: NaiveDate) -> NaiveDate {
        end - Duration::days(self.days())
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }
}

impl fmt::Display for AnalysisWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for AnalysisWindow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "1mo" | "1month" => Ok(Self::OneMonth),
            "3mo" | "3months" => Ok(Self::ThreeMonths),
            "6mo" | "6months" => Ok(Self::SixMonths),
            "1y" | "1year" => Ok(Self::OneYear),
            "2y" | "2years" => Ok(Self::TwoYears),
            "5y" | "5years" => Ok(Self::FiveYears),
            _ => Err(ConfigError::UnknownWindow(s.to_string())),
        }
    }
}

/// Indicator periods and spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    /// Extra moving averages to compute for charting.
    pub sma_periods: Vec<usize>,
    /// Short moving average used by the trend sub-score.
    pub trend_fast: usize,
    /// Long moving average used by the trend sub-score.
    pub trend_slow: usize,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
    pub williams_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_k: 2.0,
            sma_periods: vec![20, 50, 200],
            trend_fast: 20,
            trend_slow: 50,
            stochastic_k: 14,
            stochastic_d: 3,
            williams_period: 14,
        }
    }
}

impl IndicatorParams {
    /// Sorted, de-duplicated SMA periods including the trend pair.
    pub fn all_sma_periods(&self) -> Vec<usize> {
        let mut periods = self.sma_periods.clone();
        periods.push(self.trend_fast);
        periods.push(self.trend_slow);
        periods.sort_unstable();
        periods.dedup();
        periods
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("indicators.rsi_period", self.rsi_period),
            ("indicators.macd_fast", self.macd_fast),
            ("indicators.macd_signal", self.macd_signal),
            ("indicators.trend_fast", self.trend_fast),
            ("indicators.stochastic_k", self.stochastic_k),
            ("indicators.stochastic_d", self.stochastic_d),
            ("indicators.williams_period", self.williams_period),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be >= 1".into(),
                });
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::Invalid {
                field: "indicators.macd_slow",
                reason: format!(
                    "slow span {} must exceed fast span {}",
                    self.macd_slow, self.macd_fast
                ),
            });
        }
        if self.bollinger_period < 2 {
            return Err(ConfigError::Invalid {
                field: "indicators.bollinger_period",
                reason: "must be >= 2 for a sample standard deviation".into(),
            });
        }
        if !(self.bollinger_k > 0.0 && self.bollinger_k.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "indicators.bollinger_k",
                reason: format!("{} is not a positive finite multiplier", self.bollinger_k),
            });
        }
        if self.sma_periods.iter().any(|&p| p == 0) {
            return Err(ConfigError::Invalid {
                field: "indicators.sma_periods",
                reason: "periods must be >= 1".into(),
            });
        }
        if self.trend_fast >= self.trend_slow {
            return Err(ConfigError::Invalid {
                field: "indicators.trend_slow",
                reason: format!(
                    "slow period {} must exceed fast period {}",
                    self.trend_slow, self.trend_fast
                ),
            });
        }
        Ok(())
    }
}

/// Pattern and level detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    /// Width of the centered window used for pivot detection.
    pub pivot_window: usize,
    /// Maximum support and resistance levels reported per side.
    pub max_levels: usize,
    /// Collapse runs of adjacent pivots at the same price into one level.
    pub merge_adjacent_pivots: bool,
    /// Trailing window for the Fibonacci ladder.
    pub fibonacci_window: usize,
    /// Trailing bars scanned for "recent" candlestick patterns.
    pub pattern_lookback: usize,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            pivot_window: 20,
            max_levels: 5,
            merge_adjacent_pivots: true,
            fibonacci_window: 50,
            pattern_lookback: 5,
        }
    }
}

impl LevelParams {
    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("levels.pivot_window", self.pivot_window),
            ("levels.max_levels", self.max_levels),
            ("levels.fibonacci_window", self.fibonacci_window),
            ("levels.pattern_lookback", self.pattern_lookback),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be >= 1".into(),
                });
            }
        }
        Ok(())
    }
}

/// Complete configuration for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub window: AnalysisWindow,
    pub indicators: IndicatorParams,
    pub levels: LevelParams,
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        self.levels.validate()
    }

    pub fn with_window(mut self, window: AnalysisWindow) -> Self {
        self.window = window;
        self
    }
}
