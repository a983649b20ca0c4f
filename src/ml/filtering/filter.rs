use super::correlation::{CorrelationMatrix, CorrelationMethod};
use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;
use crate::utils::stats;

/// Two-threshold correlation filter
pub struct FeatureSelector {
    min_target_correlation: f64,
    max_feature_correlation: f64,
}

impl FeatureSelector {
    /// `min_target_correlation` in [0, 1), `max_feature_correlation` in (0, 1].
    pub fn new(min_target_correlation: f64, max_feature_correlation: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&min_target_correlation) {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Minimum target correlation must be in [0, 1), got {}",
                min_target_correlation
            )));
        }
        if !(max_feature_correlation > 0.0 && max_feature_correlation <= 1.0) {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Maximum feature correlation must be in (0, 1], got {}",
                max_feature_correlation
            )));
        }
        Ok(Self {
            min_target_correlation,
            max_feature_correlation,
        })
    }

    /// Keep columns relevant to `target` and drop later duplicates of earlier ones.
    pub fn select(&self, table: &FeatureTable, target: &str) -> Result<SelectionOutcome> {
        let target_values = table.column(target)?;

        // Step 1: Pearson against the target. NaN never compares below the threshold.
        let mut relevant = Vec::new();
        let mut dropped_low_target = Vec::new();
        for (name, values) in table.columns()? {
            if name == target {
                continue;
            }
            let corr = stats::pearson(&values, &target_values);
            if corr.abs() < self.min_target_correlation {
                dropped_low_target.push(name);
            } else {
                relevant.push(name);
            }
        }

        // Step 2: Spearman among the survivors, target excluded
        let matrix = CorrelationMatrix::compute(&table.select(&relevant)?, CorrelationMethod::Spearman)?;

        // Step 3: strictly upper triangle; the later column of an offending pair goes
        let n = matrix.len();
        let mut redundant = vec![false; n];
        for j in 0..n {
            for i in 0..j {
                if matrix.get(i, j).abs() > self.max_feature_correlation {
                    redundant[j] = true;
                    break;
                }
            }
        }

        let mut selected = vec![target.to_string()];
        let mut dropped_redundant = Vec::new();
        for (name, is_redundant) in relevant.into_iter().zip(redundant) {
            if is_redundant {
                dropped_redundant.push(name);
            } else {
                selected.push(name);
            }
        }

        log::info!(
            "Selected {} of {} features ({} below target threshold, {} redundant)",
            selected.len() - 1,
            table.width() - 1,
            dropped_low_target.len(),
            dropped_redundant.len()
        );

        Ok(SelectionOutcome {
            table: table.select(&selected)?,
            dropped_low_target,
            dropped_redundant,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Target first, then surviving features in input order
    pub table: FeatureTable,
    pub dropped_low_target: Vec<String>,
    pub dropped_redundant: Vec<String>,
}
