use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;
use crate::utils::stats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Per-column rescaling transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalerKind {
    /// (x - mean) / sample std
    Standard,
    /// (x - median) / IQR
    Robust,
    /// (x - min) / (max - min)
    MinMax,
}

impl ScalerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Robust => "robust",
            Self::MinMax => "minmax",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Standard, Self::Robust, Self::MinMax]
    }
}

impl FromStr for ScalerKind {
    type Err = FeaturePipelineError;

    fn from_str(name: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| FeaturePipelineError::UnknownTransform(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnScale {
    center: f64,
    /// `None` for zero-spread columns, which pass through unscaled.
    spread: Option<f64>,
}

pub struct Scaler {
    kind: ScalerKind,
}

impl Scaler {
    pub fn new(kind: ScalerKind) -> Self {
        Self { kind }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    /// Compute per-column statistics from `table`.
    pub fn fit(&self, table: &FeatureTable) -> Result<FittedScaler> {
        let mut columns = Vec::with_capacity(table.width());

        for (name, values) in table.columns()? {
            let (center, spread) = match self.kind {
                ScalerKind::Standard => (stats::mean(&values), stats::sample_std(&values)),
                ScalerKind::Robust => (
                    stats::quantile(&values, 0.5),
                    stats::quantile(&values, 0.75) - stats::quantile(&values, 0.25),
                ),
                ScalerKind::MinMax => {
                    let min = stats::min(&values);
                    (min, stats::max(&values) - min)
                }
            };

            let spread = if spread == 0.0 || !spread.is_finite() {
                log::warn!(
                    "Column '{}' has zero spread under {} scaling, leaving it unscaled",
                    name,
                    self.kind.as_str()
                );
                None
            } else {
                Some(spread)
            };

            columns.push((name, ColumnScale { center, spread }));
        }

        Ok(FittedScaler {
            kind: self.kind,
            columns,
        })
    }
}

/// Scaling statistics captured from a fitting table
pub struct FittedScaler {
    kind: ScalerKind,
    columns: Vec<(String, ColumnScale)>,
}

impl FittedScaler {
    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    /// Columns left unscaled because their spread was zero.
    pub fn passthrough_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, scale)| scale.spread.is_none())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Rescale every column of `table` with the fitted statistics.
    pub fn transform(&self, table: &FeatureTable) -> Result<FeatureTable> {
        let params: HashMap<&str, ColumnScale> = self
            .columns
            .iter()
            .map(|(name, scale)| (name.as_str(), *scale))
            .collect();

        for (name, _) in &self.columns {
            table.require_column(name)?;
        }

        let mut scaled = Vec::with_capacity(table.width());
        for (name, values) in table.columns()? {
            let scale = params.get(name.as_str()).ok_or_else(|| {
                FeaturePipelineError::InvalidParameter(format!(
                    "Column '{}' was not present when the scaler was fitted",
                    name
                ))
            })?;

            let values = match scale.spread {
                Some(spread) => values.iter().map(|v| (v - scale.center) / spread).collect(),
                None => values,
            };
            scaled.push((name, values));
        }

        FeatureTable::from_columns(scaled)
    }
}

/// Fit and apply `transform` on the same table.
pub fn scale(table: &FeatureTable, transform: &str) -> Result<FeatureTable> {
    Scaler::from_name(transform)?.fit(table)?.transform(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FeatureTable {
        FeatureTable::from_columns(vec![
            ("a".to_string(), vec![1.0, 2.0, 3.0, 4.0, 10.0]),
            ("flat".to_string(), vec![7.0; 5]),
        ])
        .unwrap()
    }

    #[test]
    fn test_standard_mean_zero_variance_one() {
        let scaled = scale(&table(), "standard").unwrap();
        let a = scaled.column("a").unwrap();
        assert!(stats::mean(&a).abs() < 1e-12);
        assert!((stats::sample_std(&a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_column_copied() {
        for kind in ScalerKind::all() {
            let scaled = scale(&table(), kind.as_str()).unwrap();
            assert_eq!(scaled.column("flat").unwrap(), vec![7.0; 5]);
        }
        let fitted = Scaler::new(ScalerKind::Standard).fit(&table()).unwrap();
        assert_eq!(fitted.passthrough_columns(), vec!["flat"]);
    }

    #[test]
    fn test_standard_is_idempotent() {
        let once = scale(&table(), "standard").unwrap();
        let twice = scale(&once, "standard").unwrap();
        for (x, y) in once.column("a").unwrap().iter().zip(twice.column("a").unwrap()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_minmax_and_robust() {
        let minmax = scale(&table(), "minmax").unwrap().column("a").unwrap();
        assert_eq!(minmax[0], 0.0);
        assert_eq!(minmax[4], 1.0);

        // median 3, IQR 4 - 2 = 2
        let robust = scale(&table(), "robust").unwrap().column("a").unwrap();
        assert_eq!(robust, vec![-1.0, -0.5, 0.0, 0.5, 3.5]);
    }

    #[test]
    fn test_unknown_transform() {
        assert!(matches!(
            scale(&table(), "quantile"),
            Err(FeaturePipelineError::UnknownTransform(name)) if name == "quantile"
        ));
    }

    #[test]
    fn test_fit_on_prefix_transform_whole() {
        let table = table();
        let fitted = Scaler::new(ScalerKind::MinMax).fit(&table.slice_rows(0, 4)).unwrap();
        let scaled = fitted.transform(&table).unwrap().column("a").unwrap();
        // fitted range is 1..4, so the unseen 10.0 lands outside [0, 1]
        assert_eq!(scaled[3], 1.0);
        assert_eq!(scaled[4], 3.0);
    }

    #[test]
    fn test_transform_requires_fitted_columns() {
        let fitted = Scaler::new(ScalerKind::Standard).fit(&table()).unwrap();
        let narrow = table().drop_columns(&["flat".to_string()]).unwrap();
        assert!(matches!(
            fitted.transform(&narrow),
            Err(FeaturePipelineError::MissingColumn(_))
        ));
    }
}
