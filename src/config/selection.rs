use super::traits::ConfigSection;
use crate::error::FeaturePipelineError;
use crate::ml::filtering::{Experiment, FeatureSelector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// |Pearson| to the target must reach this
    pub min_target_correlation: f64,
    /// |Spearman| between kept features must not exceed this
    pub max_feature_correlation: f64,
    pub experiment: Experiment,
    pub top_n: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_target_correlation: 0.10,
            max_feature_correlation: 0.5,
            experiment: Experiment::ThresholdSelected,
            top_n: 10,
        }
    }
}

impl SelectionConfig {
    pub fn selector(&self) -> Result<FeatureSelector, FeaturePipelineError> {
        FeatureSelector::new(self.min_target_correlation, self.max_feature_correlation)
    }
}

impl ConfigSection for SelectionConfig {
    fn section_name() -> &'static str {
        "selection"
    }

    fn validate(&self) -> Result<(), FeaturePipelineError> {
        self.selector()?;
        if self.experiment == Experiment::TopN && self.top_n < 2 {
            return Err(FeaturePipelineError::InvalidParameter(
                "top_n must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
