//! Multi-symbol comparison batch.
//!
//! Each symbol is loaded and analysed independently on a rayon worker; the
//! rows come back in the caller's order. A symbol whose data cannot be loaded
//! becomes a skipped row instead of failing the batch.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use signalab_core::{analyze, AnalysisConfig, AnalysisPath, Category, Confidence, ConfigError, DataSource};

use crate::data_loader::DataLoader;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("comparison needs at least two symbols, got {0}")]
    TooFewSymbols(usize),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Options for one comparison run.
#[derive(Debug, Clone, Copy)]
pub struct CompareOptions {
    /// Which recommendation feeds the table.
    pub path: AnalysisPath,
    /// Worker count; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            path: AnalysisPath::Basic,
            threads: None,
        }
    }
}

/// One line of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub symbol: String,
    pub price: Option<f64>,
    pub recommendation: Option<Category>,
    pub confidence: Option<Confidence>,
    pub score: Option<f64>,
    pub rsi: Option<f64>,
    pub source: Option<DataSource>,
    /// Reason the symbol produced no analysis.
    pub skipped: Option<String>,
}

impl ComparisonRow {
    fn skipped(symbol: &str, reason: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            price: None,
            recommendation: None,
            confidence: None,
            score: None,
            rsi: None,
            source: None,
            skipped: Some(reason),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Trim, uppercase and drop blank entries.
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    symbols
        .iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Analyse every symbol and return one row per symbol, in input order.
pub fn compare<S: AsRef<str> + Sync>(
    symbols: &[S],
    loader: &DataLoader,
    config: &AnalysisConfig,
    options: CompareOptions,
) -> Result<Vec<ComparisonRow>, BatchError> {
    let symbols = normalize_symbols(symbols);
    if symbols.len() < 2 {
        return Err(BatchError::TooFewSymbols(symbols.len()));
    }
    config.validate()?;

    let run = || -> Vec<ComparisonRow> {
        symbols
            .par_iter()
            .map(|symbol| compare_one(symbol, loader, config, options.path))
            .collect()
    };

    let rows = match options.threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()?
            .install(run),
        None => run(),
    };

    let skipped = rows.iter().filter(|r| r.is_skipped()).count();
    info!(symbols = rows.len(), skipped, "comparison complete");
    Ok(rows)
}

fn compare_one(
    symbol: &str,
    loader: &DataLoader,
    config: &AnalysisConfig,
    path: AnalysisPath,
) -> ComparisonRow {
    let loaded = match loader.load(symbol, config.window) {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!(symbol, error = %e, "skipping symbol");
            return ComparisonRow::skipped(symbol, e.to_string());
        }
    };

    match analyze(&loaded.series, config) {
        Ok(analysis) => {
            let rec = analysis.recommendation(path);
            ComparisonRow {
                symbol: symbol.to_string(),
                price: Some(rec.price),
                recommendation: Some(rec.category),
                confidence: Some(rec.confidence),
                score: Some(rec.score),
                rsi: rec.rsi,
                source: Some(loaded.source),
                skipped: None,
            }
        }
        Err(e) => {
            warn!(symbol, error = %e, "skipping symbol");
            ComparisonRow::skipped(symbol, e.to_string())
        }
    }
}
