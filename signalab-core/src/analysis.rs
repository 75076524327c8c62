//! Analysis orchestrator.
//!
//! Runs the full pipeline over one series:
//! indicators → {signals, weighted score, levels, patterns} → classifier.
//! Only this module knows the step order; every step is a pure transform.

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{AnalysisConfig, ConfigError};
use crate::detail::{DetailedAnalysis, Snapshot};
use crate::domain::Series;
use crate::indicators::{compute_indicators, IndicatorKey, IndicatorSet};
use crate::levels::LevelSet;
use crate::patterns::PatternFlags;
use crate::recommend::{
    advanced_targets, basic_targets, classify_advanced, classify_basic, AnalysisPath,
    Recommendation,
};
use crate::scoring::WeightedScore;
use crate::signals::SignalSet;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no data available for '{symbol}'")]
    NoData { symbol: String },

    #[error("invalid analysis configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Everything one analysis produces. Immutable once built.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub series: Series,
    /// BLAKE3 fingerprint of the input series.
    pub fingerprint: String,
    pub indicators: IndicatorSet,
    pub signals: SignalSet,
    pub weighted: WeightedScore,
    pub levels: LevelSet,
    pub patterns: PatternFlags,
    /// Indicators with no value at the final bar (insufficient history).
    pub unavailable: Vec<IndicatorKey>,
    pub basic: Recommendation,
    pub advanced: Recommendation,
}

impl Analysis {
    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn recommendation(&self, path: AnalysisPath) -> &Recommendation {
        match path {
            AnalysisPath::Basic => &self.basic,
            AnalysisPath::Advanced => &self.advanced,
        }
    }

    pub fn is_available(&self, key: IndicatorKey) -> bool {
        !self.unavailable.contains(&key)
    }
}

/// Run the pipeline over `series`.
///
/// An empty series is `AnalysisError::NoData`; a short series still produces
/// a result, with the indicators lacking history listed as unavailable.
pub fn analyze(series: &Series, config: &AnalysisConfig) -> Result<Analysis, AnalysisError> {
    config.validate()?;

    let symbol = series.symbol();
    let Some(last_bar) = series.last() else {
        return Err(AnalysisError::NoData {
            symbol: symbol.to_string(),
        });
    };
    let bars = series.bars();
    debug!(symbol, bars = bars.len(), "analysis started");

    let indicators = compute_indicators(bars, &config.indicators);
    let unavailable: Vec<IndicatorKey> = indicators
        .keys()
        .filter(|&key| indicators.last(key).is_none())
        .collect();
    if !unavailable.is_empty() {
        debug!(symbol, ?unavailable, "indicators without a final value");
    }

    let signals = SignalSet::generate(bars, &indicators);
    let weighted = WeightedScore::compute(bars, &indicators, &config.indicators);
    let levels = LevelSet::detect(bars, &config.levels);
    let patterns = PatternFlags::detect(bars);
    let recent_patterns = patterns.recent(config.levels.pattern_lookback);
    debug!(
        symbol,
        resistances = levels.pivots.resistances.len(),
        supports = levels.pivots.supports.len(),
        patterns = recent_patterns.len(),
        "levels and patterns detected"
    );

    let snapshot = Snapshot::last(bars, &indicators, &config.indicators).unwrap_or(Snapshot {
        close: last_bar.close,
        ..Snapshot::default()
    });

    let basic_score = signals.last_consolidated().unwrap_or(0.0);
    let (category, confidence) = classify_basic(basic_score);
    let basic = Recommendation {
        symbol: symbol.to_string(),
        path: AnalysisPath::Basic,
        as_of: last_bar.date,
        category,
        confidence,
        score: basic_score,
        price: last_bar.close,
        rsi: snapshot.rsi,
        targets: basic_targets(&levels.pivots, snapshot.bb_upper, snapshot.bb_lower),
        recent_patterns: recent_patterns.clone(),
        detail: DetailedAnalysis::basic(&snapshot),
    };

    let advanced_score = weighted.last_composite().unwrap_or(0.0);
    let (category, confidence) = classify_advanced(advanced_score);
    let advanced = Recommendation {
        symbol: symbol.to_string(),
        path: AnalysisPath::Advanced,
        as_of: last_bar.date,
        category,
        confidence,
        score: advanced_score,
        price: last_bar.close,
        rsi: snapshot.rsi,
        targets: advanced_targets(
            advanced_score,
            &levels.fibonacci,
            snapshot.bb_upper,
            snapshot.bb_lower,
        ),
        recent_patterns,
        detail: DetailedAnalysis::advanced(&snapshot, &series.closes()),
    };

    info!(
        symbol,
        basic = %basic.category,
        basic_score,
        advanced = %advanced.category,
        advanced_score,
        "analysis complete"
    );

    Ok(Analysis {
        series: series.clone(),
        fingerprint: series.fingerprint(),
        indicators,
        signals,
        weighted,
        levels,
        patterns,
        unavailable,
        basic,
        advanced,
    })
}
