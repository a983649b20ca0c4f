use super::base::DataSplitter;
use super::types::SplitResult;
use crate::config::SplitSection;
use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;

/// Positional split: leading rows train, trailing rows validate. No shuffling.
pub struct ChronologicalSplitter {
    train_fraction: f64,
}

impl ChronologicalSplitter {
    pub fn new(train_fraction: f64) -> Self {
        Self { train_fraction }
    }

    pub fn from_config(config: &SplitSection) -> Self {
        Self::new(config.train_fraction)
    }

    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }
}

/// Number of training rows, `floor(fraction * total)`, for a split that leaves
/// both partitions non-empty.
pub fn train_rows(total_rows: usize, fraction: f64) -> Result<usize> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(FeaturePipelineError::InvalidParameter(format!(
            "Split fraction must be in (0, 1), got {}",
            fraction
        )));
    }
    if total_rows < 2 {
        return Err(FeaturePipelineError::InvalidParameter(format!(
            "Need at least 2 rows to split, got {}",
            total_rows
        )));
    }

    let rows = (total_rows as f64 * fraction).floor() as usize;
    if rows == 0 || rows >= total_rows {
        return Err(FeaturePipelineError::InvalidParameter(format!(
            "Invalid split: {} of {} rows leaves an empty partition",
            rows, total_rows
        )));
    }
    Ok(rows)
}

impl DataSplitter for ChronologicalSplitter {
    fn split(&self, data: &FeatureTable, target: &str) -> Result<SplitResult> {
        let total_rows = data.height();
        let is_rows = train_rows(total_rows, self.train_fraction)?;
        data.require_column(target)?;

        let train = data.slice_rows(0, is_rows);
        let validation = data.slice_rows(is_rows, total_rows - is_rows);
        let target_name = [target.to_string()];

        log::debug!(
            "Split {} rows into {} train / {} validation",
            total_rows,
            is_rows,
            total_rows - is_rows
        );

        Ok(SplitResult {
            train_x: train.drop_columns(&target_name)?,
            train_y: train.select(&target_name)?,
            val_x: validation.drop_columns(&target_name)?,
            val_y: validation.select(&target_name)?,
        })
    }
}
