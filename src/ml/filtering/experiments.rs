use super::correlation::CorrelationMethod;
use super::filter::FeatureSelector;
use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;
use serde::{Deserialize, Serialize};

/// Which candidate feature set feeds the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experiment {
    /// Symbolic features plus the target, columns sorted by name
    SymbolicOnly,
    /// Linear and symbolic features side by side
    Combined,
    /// Combined set reduced by the two-threshold selector
    ThresholdSelected,
    /// Target plus the strongest |Spearman| and |Pearson| columns
    TopN,
}

/// Target followed by the `n - 1` strongest columns under Spearman, then under
/// Pearson. A column picked by both methods appears once.
pub fn top_n(table: &FeatureTable, target: &str, n: usize) -> Result<FeatureTable> {
    if n < 2 {
        return Err(FeaturePipelineError::InvalidParameter(format!(
            "Top-N selection needs n >= 2, got {}",
            n
        )));
    }
    let target_values = table.column(target)?;
    let candidates: Vec<(String, Vec<f64>)> = table
        .columns()?
        .into_iter()
        .filter(|(name, _)| name != target)
        .collect();

    let mut selected = vec![target.to_string()];
    for method in [CorrelationMethod::Spearman, CorrelationMethod::Pearson] {
        let mut ranked: Vec<(&str, f64)> = candidates
            .iter()
            .map(|(name, values)| (name.as_str(), method.coefficient(values, &target_values).abs()))
            .collect();

        // Descending, NaN last; stable so ties keep table order
        ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => b.1.total_cmp(&a.1),
        });

        for (name, _) in ranked.into_iter().take(n - 1) {
            if !selected.iter().any(|s| s == name) {
                selected.push(name.to_string());
            }
        }
    }

    table.select(&selected)
}

/// Assemble the feature table for `experiment` from the linear and symbolic sets.
pub fn build_experiment(
    experiment: Experiment,
    linear: &FeatureTable,
    symbolic: &FeatureTable,
    target: &str,
    selector: &FeatureSelector,
    top: usize,
) -> Result<FeatureTable> {
    linear.require_column(target)?;

    match experiment {
        Experiment::SymbolicOnly => symbolic
            .with_column(target, linear.column(target)?)?
            .sorted_by_name(),
        Experiment::Combined => linear.hconcat(symbolic),
        Experiment::ThresholdSelected => Ok(selector.select(&linear.hconcat(symbolic)?, target)?.table),
        Experiment::TopN => top_n(&linear.hconcat(symbolic)?, target, top),
    }
}
