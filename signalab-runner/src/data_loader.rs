//! Series loading for the runner.
//!
//! Given a symbol and an analysis window, loads bars from a CSV directory and
//! returns a validated series. Implements the fallback policy:
//! 1. If a primary provider is configured and has the symbol → use it
//! 2. If not and synthetic data is enabled → generate synthetic bars (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only demo mode. Results produced on
//! synthetic data carry `DataSource::Synthetic`.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use signalab_core::config::AnalysisWindow;
use signalab_core::data::{DataError, DataSource, SeriesProvider};
use signalab_core::domain::{Bar, Series};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data source for '{symbol}' (pass --data-dir or --synthetic)")]
    NoSource { symbol: String },

    #[error(transparent)]
    Data(#[from] DataError),
}

impl LoadError {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::NoSource { symbol } => Some(symbol),
            Self::Data(e) => e.symbol(),
        }
    }
}

/// A loaded series with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Series,
    pub source: DataSource,
    /// BLAKE3 fingerprint of the bars, for reproducibility checks.
    pub fingerprint: String,
}

// ─── CSV directory provider ─────────────────────────────────────────

/// One row of `<SYMBOL>.csv`. Header names are matched case-insensitively
/// for the common exports (`Date`/`date`, `Close`/`close`, ...); extra
/// columns such as `Adj Close` are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

/// Reads `<dir>/<SYMBOL>.csv` with columns date,open,high,low,close,volume.
///
/// The window is resolved against the last date in the file, so stale
/// exports still produce a full window.
#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> Option<PathBuf> {
        [symbol.to_string(), symbol.to_uppercase()]
            .into_iter()
            .map(|name| self.dir.join(format!("{name}.csv")))
            .find(|p| p.is_file())
    }

    /// Read every bar in the file, without window trimming.
    pub fn read_all(&self, symbol: &str) -> Result<Series, DataError> {
        let path = self.path_for(symbol).ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;
        debug!(symbol, path = %path.display(), "reading csv");

        let mut reader = csv::Reader::from_path(&path).map_err(|e| DataError::Io {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        let mut bars = Vec::new();
        for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
            let record = i + 1;
            let malformed = |reason: String| DataError::Malformed {
                symbol: symbol.to_string(),
                record,
                reason,
            };
            let row = row.map_err(|e| malformed(e.to_string()))?;
            bars.push(Bar {
                date: parse_date(&row.date).ok_or_else(|| {
                    malformed(format!("unrecognised date '{}'", row.date))
                })?,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.max(0.0).round() as u64,
            });
        }

        Series::new(symbol, bars).map_err(|source| DataError::InvalidSeries {
            symbol: symbol.to_string(),
            source,
        })
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl SeriesProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv-dir"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(&self, symbol: &str, window: AnalysisWindow) -> Result<Series, DataError> {
        let all = self.read_all(symbol)?;
        let end = all
            .last()
            .map(|b| b.date)
            .ok_or_else(|| DataError::EmptyWindow {
                symbol: symbol.to_string(),
                window,
            })?;
        let series = all.since(window.start_from(end));
        if series.is_empty() {
            return Err(DataError::EmptyWindow {
                symbol: symbol.to_string(),
                window,
            });
        }
        Ok(series)
    }
}

// ─── Synthetic provider ─────────────────────────────────────────────

/// Deterministic random walk per symbol, ending on a fixed date.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    end: NaiveDate,
}

impl SyntheticProvider {
    pub fn new(end: NaiveDate) -> Self {
        Self { end }
    }
}

impl SeriesProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, symbol: &str, window: AnalysisWindow) -> Result<Series, DataError> {
        let bars = generate_synthetic_bars(symbol, window.start_from(self.end), self.end);
        Series::new(symbol, bars).map_err(|source| DataError::InvalidSeries {
            symbol: symbol.to_string(),
            source,
        })
    }
}

/// Generate synthetic bars for demos and tests.
///
/// Produces a random walk from a starting price of 100.0, skipping weekends.
/// The RNG is seeded from the BLAKE3 hash of the symbol, so the same symbol
/// and date range always yield the same bars.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

// ─── Loader ─────────────────────────────────────────────────────────

/// Primary provider plus optional synthetic fallback.
pub struct DataLoader {
    primary: Option<Box<dyn SeriesProvider>>,
    synthetic: Option<SyntheticProvider>,
}

impl DataLoader {
    pub fn new(primary: Option<Box<dyn SeriesProvider>>) -> Self {
        Self {
            primary,
            synthetic: None,
        }
    }

    /// Fall back to synthetic bars ending on `end` when the primary fails.
    pub fn with_synthetic_fallback(mut self, end: NaiveDate) -> Self {
        self.synthetic = Some(SyntheticProvider::new(end));
        self
    }

    /// Load `symbol` over `window` following the fallback policy.
    pub fn load(&self, symbol: &str, window: AnalysisWindow) -> Result<LoadedSeries, LoadError> {
        let mut primary_error = None;

        if let Some(provider) = &self.primary {
            match provider.fetch(symbol, window) {
                Ok(series) => return Ok(loaded(series, provider.source())),
                Err(e) => {
                    debug!(symbol, provider = provider.name(), error = %e, "primary provider failed");
                    primary_error = Some(e);
                }
            }
        }

        if let Some(synthetic) = &self.synthetic {
            warn!(symbol, "using synthetic data; results are not market data");
            let series = synthetic.fetch(symbol, window)?;
            return Ok(loaded(series, DataSource::Synthetic));
        }

        match primary_error {
            Some(e) => Err(LoadError::Data(e)),
            None => Err(LoadError::NoSource {
                symbol: symbol.to_string(),
            }),
        }
    }
}

fn loaded(series: Series, source: DataSource) -> LoadedSeries {
    LoadedSeries {
        fingerprint: series.fingerprint(),
        series,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_csv(dir: &Path, symbol: &str, body: &str) {
        let mut f = std::fs::File::create(dir.join(format!("{symbol}.csv"))).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    const SAMPLE: &str = "date,open,high,low,close,volume\n\
        2024-01-02,100.0,102.0,99.0,101.0,1000\n\
        2024-01-03,101.0,103.0,100.0,102.0,1100\n\
        2024-06-03,110.0,112.0,109.0,111.0,1200\n";

    #[test]
    fn csv_provider_reads_and_trims_to_window() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "SPY", SAMPLE);
        let provider = CsvDirProvider::new(dir.path());

        let all = provider.read_all("SPY").unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.bars()[0].volume, 1000);

        // 1mo before 2024-06-03 keeps only the last bar
        let recent = provider.fetch("SPY", AnalysisWindow::OneMonth).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent.last().unwrap().close, 111.0);

        let year = provider.fetch("SPY", AnalysisWindow::OneYear).unwrap();
        assert_eq!(year.len(), 3);
    }

    #[test]
    fn csv_provider_accepts_capitalised_headers_and_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "QQQ",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02 00:00:00-05:00,400,405,398,404,404,5000\n",
        );
        let series = CsvDirProvider::new(dir.path()).read_all("qqq").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].date, date(2024, 1, 2));
    }

    #[test]
    fn csv_provider_missing_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvDirProvider::new(dir.path()).fetch("NOPE", AnalysisWindow::OneYear);
        assert!(matches!(err, Err(DataError::SymbolNotFound { .. })));
    }

    #[test]
    fn csv_provider_rejects_unordered_dates() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "BAD",
            "date,open,high,low,close,volume\n\
             2024-01-03,1,1,1,1,1\n\
             2024-01-02,1,1,1,1,1\n",
        );
        let err = CsvDirProvider::new(dir.path()).read_all("BAD").unwrap_err();
        assert!(matches!(err, DataError::InvalidSeries { .. }));
    }

    #[test]
    fn csv_provider_reports_malformed_record() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "BAD",
            "date,open,high,low,close,volume\n\
             2024-01-02,1,1,1,1,1\n\
             not-a-date,1,1,1,1,1\n",
        );
        let err = CsvDirProvider::new(dir.path()).read_all("BAD").unwrap_err();
        assert!(matches!(err, DataError::Malformed { record: 2, .. }));
    }

    #[test]
    fn synthetic_data_is_deterministic() {
        let a = generate_synthetic_bars("SPY", date(2024, 1, 1), date(2024, 1, 31));
        let b = generate_synthetic_bars("SPY", date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(a, b);
        assert!(a.iter().all(|bar| bar.date.weekday().number_from_monday() <= 5));
    }

    #[test]
    fn different_symbols_get_different_synthetic_data() {
        let spy = generate_synthetic_bars("SPY", date(2024, 1, 1), date(2024, 1, 31));
        let qqq = generate_synthetic_bars("QQQ", date(2024, 1, 1), date(2024, 1, 31));

        // Same date range but different symbols → different prices
        assert_eq!(spy.len(), qqq.len());
        assert_ne!(spy[0].close, qqq[0].close);
    }

    #[test]
    fn loader_falls_back_to_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DataLoader::new(Some(Box::new(CsvDirProvider::new(dir.path()))))
            .with_synthetic_fallback(date(2024, 12, 31));

        let loaded = loader.load("FAKE", AnalysisWindow::ThreeMonths).unwrap();
        assert_eq!(loaded.source, DataSource::Synthetic);
        assert!(!loaded.series.is_empty());
        assert_eq!(loaded.fingerprint, loaded.series.fingerprint());
    }

    #[test]
    fn loader_without_fallback_reports_provider_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DataLoader::new(Some(Box::new(CsvDirProvider::new(dir.path()))));
        let err = loader.load("MISSING", AnalysisWindow::OneYear).unwrap_err();
        assert!(matches!(err, LoadError::Data(DataError::SymbolNotFound { .. })));
        assert_eq!(err.symbol(), Some("MISSING"));
    }

    #[test]
    fn loader_without_any_source() {
        let err = DataLoader::new(None)
            .load("SPY", AnalysisWindow::OneYear)
            .unwrap_err();
        assert!(matches!(err, LoadError::NoSource { .. }));
    }

    #[test]
    fn loader_prefers_primary() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "SPY", SAMPLE);
        let loader = DataLoader::new(Some(Box::new(CsvDirProvider::new(dir.path()))))
            .with_synthetic_fallback(date(2024, 12, 31));
        let loaded = loader.load("SPY", AnalysisWindow::OneYear).unwrap();
        assert_eq!(loaded.source, DataSource::CsvImport);
    }
}
