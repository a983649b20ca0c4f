use super::traits::ConfigSection;
use crate::error::FeaturePipelineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Csv,
    Synthetic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: DataSourceKind,
    pub path: Option<PathBuf>,
    /// Bars are written here on first load and read back on later runs
    pub cache_path: Option<PathBuf>,
    pub min_rows: usize,
    pub synthetic: SyntheticConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub bars: usize,
    pub seed: u64,
    pub start_price: f64,
    pub volatility: f64,
    pub interval_minutes: i64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            bars: 500,
            seed: 42,
            start_price: 30000.0,
            volatility: 0.01,
            interval_minutes: 60,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSourceKind::Synthetic,
            path: None,
            cache_path: None,
            min_rows: 100,
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<(), FeaturePipelineError> {
        if self.source == DataSourceKind::Csv && self.path.is_none() {
            return Err(FeaturePipelineError::InvalidParameter(
                "data.path is required for the csv source".to_string(),
            ));
        }
        if self.source == DataSourceKind::Synthetic {
            if self.synthetic.bars < 2 {
                return Err(FeaturePipelineError::InvalidParameter(
                    "Synthetic source needs at least 2 bars".to_string(),
                ));
            }
            if self.synthetic.start_price <= 0.0 || self.synthetic.volatility < 0.0 {
                return Err(FeaturePipelineError::InvalidParameter(
                    "Synthetic start price must be positive and volatility non-negative"
                        .to_string(),
                ));
            }
            if self.synthetic.interval_minutes <= 0 {
                return Err(FeaturePipelineError::InvalidParameter(
                    "Synthetic interval must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}
