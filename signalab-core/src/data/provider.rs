//! Series provider trait and structured error types.
//!
//! The `SeriesProvider` trait abstracts over where bars come from (a CSV
//! directory, a synthetic generator) so the pipeline can be driven from any
//! source and mocked in tests. The pipeline itself only ever sees a `Series`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnalysisWindow;
use crate::domain::{Series, SeriesError};

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no bars for '{symbol}' in the last {window}")]
    EmptyWindow {
        symbol: String,
        window: AnalysisWindow,
    },

    #[error("failed to read data for '{symbol}': {reason}")]
    Io { symbol: String, reason: String },

    #[error("malformed data for '{symbol}' at record {record}: {reason}")]
    Malformed {
        symbol: String,
        record: usize,
        reason: String,
    },

    #[error("invalid series for '{symbol}': {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: SeriesError,
    },
}

impl DataError {
    /// Symbol the error refers to, when there is one.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::SymbolNotFound { symbol }
            | Self::EmptyWindow { symbol, .. }
            | Self::Io { symbol, .. }
            | Self::Malformed { symbol, .. }
            | Self::InvalidSeries { symbol, .. } => Some(symbol),
        }
    }
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    CsvImport,
    Synthetic,
}

/// Trait for series providers.
///
/// Implementations resolve the window into a trailing date range and return
/// a validated, chronological series.
pub trait SeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Fetch daily bars for `symbol` covering `window`.
    fn fetch(&self, symbol: &str, window: AnalysisWindow) -> Result<Series, DataError>;
}
