use super::traits::ConfigSection;
use crate::error::FeaturePipelineError;
use crate::ml::features::ScalerKind;
use serde::{Deserialize, Serialize};

/// Which rows the scaler learns its statistics from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitScope {
    /// Whole table, validation rows included
    Full,
    /// Training prefix only
    Train,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub memory: usize,
    pub target: String,
    pub transform: String,
    pub fit_scope: FitScope,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            memory: 7,
            target: "co".to_string(),
            transform: ScalerKind::Standard.as_str().to_string(),
            fit_scope: FitScope::Train,
        }
    }
}

impl ConfigSection for FeaturesConfig {
    fn section_name() -> &'static str {
        "features"
    }

    fn validate(&self) -> Result<(), FeaturePipelineError> {
        if self.memory < 1 {
            return Err(FeaturePipelineError::InvalidParameter(
                "Memory depth must be at least 1".to_string(),
            ));
        }
        if self.target.is_empty() {
            return Err(FeaturePipelineError::InvalidParameter(
                "Target column name is empty".to_string(),
            ));
        }
        self.transform.parse::<ScalerKind>()?;
        Ok(())
    }
}
