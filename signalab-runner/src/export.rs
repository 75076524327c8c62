//! Export — JSON recommendations and CSV tables.
//!
//! - **JSON**: flat recommendation object with enums as display strings
//! - **CSV**: per-bar analysis table (prices, indicators, signals, scores,
//!   Fibonacci ladder, pattern flags) and the comparison table
//!
//! Undefined values are written as empty CSV cells and JSON `null`.

use std::path::{Path, PathBuf};

use serde_json::json;
use thiserror::Error;
use tracing::info;

use signalab_core::levels::FibRatio;
use signalab_core::patterns::PatternKind;
use signalab_core::scoring::ScoreComponent;
use signalab_core::signals::SignalSource;
use signalab_core::{Analysis, AnalysisPath, Recommendation};

use crate::batch::ComparisonRow;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV output was not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// ─── JSON export ────────────────────────────────────────────────────

/// Pretty-printed flat JSON for one recommendation.
pub fn recommendation_json(rec: &Recommendation) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&rec.to_flat_json())?)
}

/// Both recommendations plus provenance, keyed by path.
pub fn analysis_summary_json(analysis: &Analysis) -> Result<String, ExportError> {
    let value = json!({
        "symbol": analysis.symbol(),
        "bars": analysis.series.len(),
        "fingerprint": analysis.fingerprint,
        "unavailable": analysis
            .unavailable
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>(),
        "resistances": analysis.levels.pivots.resistances,
        "supports": analysis.levels.pivots.supports,
        "basic": analysis.recommendation(AnalysisPath::Basic).to_flat_json(),
        "advanced": analysis.recommendation(AnalysisPath::Advanced).to_flat_json(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

fn pattern_column(kind: PatternKind) -> String {
    format!("pattern_{}", kind.name().to_lowercase().replace(' ', "_"))
}

/// Per-bar analysis table.
///
/// Columns: date, open, high, low, close, volume, one column per indicator
/// series, fib levels, the five signals, signal_consolidated, one column per
/// weighted sub-score, score_weighted, one 0/1 column per pattern.
pub fn export_analysis_csv(analysis: &Analysis) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let keys: Vec<_> = analysis.indicators.keys().collect();
    let fib_series: Vec<(FibRatio, Vec<f64>)> = FibRatio::ALL
        .into_iter()
        .map(|r| (r, analysis.levels.fibonacci.series(r)))
        .collect();

    // Header
    let mut header: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
        .into_iter()
        .map(String::from)
        .collect();
    header.extend(keys.iter().map(|k| k.to_string()));
    header.extend(FibRatio::ALL.iter().map(|r| r.to_string()));
    header.extend(SignalSource::ALL.iter().map(|s| s.name().to_string()));
    header.push("signal_consolidated".into());
    header.extend(ScoreComponent::ALL.iter().map(|c| c.name().to_string()));
    header.push("score_weighted".into());
    header.extend(PatternKind::ALL.into_iter().map(pattern_column));
    wtr.write_record(&header)?;

    for (i, bar) in analysis.series.bars().iter().enumerate() {
        let mut row = vec![
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ];
        row.extend(keys.iter().map(|&k| cell(analysis.indicators.get(k, i))));
        row.extend(fib_series.iter().map(|(_, s)| cell(s.get(i).copied())));
        row.extend(SignalSource::ALL.iter().map(|&s| {
            analysis
                .signals
                .get(i, s)
                .map(|sig| sig.value().to_string())
                .unwrap_or_default()
        }));
        row.push(cell(analysis.signals.consolidated(i)));
        row.extend(
            ScoreComponent::ALL
                .iter()
                .map(|&c| cell(analysis.weighted.component(i, c))),
        );
        row.push(cell(analysis.weighted.composite(i)));
        row.extend(PatternKind::ALL.into_iter().map(|k| {
            if analysis.patterns.is_set(i, k) { "1" } else { "0" }.to_string()
        }));
        wtr.write_record(&row)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(data)?)
}

/// Comparison table, one line per symbol. Skipped symbols keep their row
/// with empty values and the skip reason.
pub fn export_comparison_csv(rows: &[ComparisonRow]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "price",
        "recommendation",
        "confidence",
        "score",
        "rsi",
        "source",
        "skipped",
    ])?;

    for row in rows {
        wtr.write_record([
            row.symbol.clone(),
            cell(row.price),
            row.recommendation.map(|c| c.to_string()).unwrap_or_default(),
            row.confidence.map(|c| c.to_string()).unwrap_or_default(),
            cell(row.score),
            cell(row.rsi),
            row.source.map(|s| format!("{s:?}")).unwrap_or_default(),
            row.skipped.clone().unwrap_or_default(),
        ])?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(data)?)
}

// ─── Artifacts ──────────────────────────────────────────────────────

/// Paths written by [`save_artifacts`].
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub summary_json: PathBuf,
    pub bars_csv: PathBuf,
}

/// Write `<SYMBOL>_analysis.json` and `<SYMBOL>_bars.csv` into `dir`.
pub fn save_artifacts(analysis: &Analysis, dir: &Path) -> Result<ArtifactPaths, ExportError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ExportError::Io { path, source }
    };
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;

    let symbol = analysis.symbol();
    let paths = ArtifactPaths {
        summary_json: dir.join(format!("{symbol}_analysis.json")),
        bars_csv: dir.join(format!("{symbol}_bars.csv")),
    };

    std::fs::write(&paths.summary_json, analysis_summary_json(analysis)?)
        .map_err(io_err(&paths.summary_json))?;
    std::fs::write(&paths.bars_csv, export_analysis_csv(analysis)?)
        .map_err(io_err(&paths.bars_csv))?;

    info!(
        symbol,
        json = %paths.summary_json.display(),
        csv = %paths.bars_csv.display(),
        "artifacts saved"
    );
    Ok(paths)
}
