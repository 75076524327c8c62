//! Market-data seam

pub mod provider;

pub use provider::{DataError, DataSource, SeriesProvider};
