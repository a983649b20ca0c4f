//! Feature engineering for OHLCV bars: lagged linear features, scaling,
//! symbolic features from an external generator, correlation-based selection,
//! a chronological split and a baseline regression.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod ml;
pub mod table;
pub mod types;
pub mod utils;

pub use error::{FeaturePipelineError, Result, Stage};
pub use table::FeatureTable;
pub use types::{Bar, BarSeries};
