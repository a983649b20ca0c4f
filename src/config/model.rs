use super::traits::ConfigSection;
use crate::error::FeaturePipelineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitSection {
    pub train_fraction: f64,
}

impl Default for SplitSection {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
        }
    }
}

impl ConfigSection for SplitSection {
    fn section_name() -> &'static str {
        "split"
    }

    fn validate(&self) -> Result<(), FeaturePipelineError> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Split fraction must be in (0, 1), got {}",
                self.train_fraction
            )));
        }
        Ok(())
    }
}

/// Hyperparameters forwarded to the model trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    /// L2 penalty for the least-squares baseline
    pub ridge: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            epochs: 500,
            batch_size: 16,
            ridge: 1e-8,
        }
    }
}

impl ConfigSection for ModelConfig {
    fn section_name() -> &'static str {
        "model"
    }

    fn validate(&self) -> Result<(), FeaturePipelineError> {
        if self.learning_rate <= 0.0 {
            return Err(FeaturePipelineError::InvalidParameter(
                "Learning rate must be positive".to_string(),
            ));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(FeaturePipelineError::InvalidParameter(
                "Epochs and batch size must be positive".to_string(),
            ));
        }
        if self.ridge < 0.0 {
            return Err(FeaturePipelineError::InvalidParameter(
                "Ridge penalty must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
