use super::metrics::RegressionMetrics;
use crate::engines::splitters::SplitResult;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Scores of a fitted model on both partitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model: String,
    pub features: Vec<String>,
    pub train: RegressionMetrics,
    pub validation: RegressionMetrics,
}

/// Fits a regression model on the training partition and scores both partitions.
pub trait ModelTrainer {
    fn train(&mut self, split: &SplitResult) -> Result<TrainingReport>;

    fn name(&self) -> &str;
}
