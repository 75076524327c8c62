//! Signalab Core — indicators, signals, scoring, levels, patterns, classification.
//!
//! This crate turns one chronological OHLCV series into an explainable
//! recommendation:
//! - Domain types (bars, validated series)
//! - Indicator library behind a single-series `Indicator` trait
//! - Per-bar discrete signals and the weighted composite score
//! - Support/resistance pivots, Fibonacci ladder, candlestick patterns
//! - Threshold classifier and the analysis orchestrator
//!
//! Everything here is synchronous and pure; fan-out across symbols lives in
//! the runner crate.

pub mod analysis;
pub mod config;
pub mod data;
pub mod detail;
pub mod domain;
pub mod indicators;
pub mod levels;
pub mod patterns;
pub mod recommend;
pub mod scoring;
pub mod signals;

pub use analysis::{analyze, Analysis, AnalysisError};
pub use config::{AnalysisConfig, AnalysisWindow, ConfigError};
pub use data::{DataError, DataSource, SeriesProvider};
pub use domain::{Bar, Series, SeriesError};
pub use recommend::{AnalysisPath, Category, Confidence, Recommendation};
