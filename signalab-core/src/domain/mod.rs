//! Domain types for signalab

pub mod bar;
pub mod series;

pub use bar::Bar;
pub use series::{Series, SeriesError};
