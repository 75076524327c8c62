//! Signalab Runner — series loading, comparison batches, export.
//!
//! This crate builds on `signalab-core` to provide:
//! - Data loading from a CSV directory with synthetic fallback
//! - Multi-symbol comparison fanned out across rayon workers
//! - Flat JSON and per-bar CSV export

pub mod batch;
pub mod data_loader;
pub mod export;

pub use batch::{compare, normalize_symbols, BatchError, CompareOptions, ComparisonRow};
pub use data_loader::{
    generate_synthetic_bars, CsvDirProvider, DataLoader, LoadError, LoadedSeries,
    SyntheticProvider,
};
pub use export::{
    analysis_summary_json, export_analysis_csv, export_comparison_csv, recommendation_json,
    save_artifacts, ArtifactPaths, ExportError,
};
