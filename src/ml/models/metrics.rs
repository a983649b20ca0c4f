use crate::error::{FeaturePipelineError, Result};
use crate::utils::stats;
use serde::{Deserialize, Serialize};

/// Regression scores for one partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Coefficient of determination; NaN when the observed values are constant
    pub r2: f64,
    /// Pearson correlation between observed and predicted values
    pub ic: f64,
    pub n_samples: usize,
}

impl RegressionMetrics {
    pub fn calculate(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Observed ({}) and predicted ({}) lengths differ",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(FeaturePipelineError::InvalidParameter(
                "Cannot score an empty partition".to_string(),
            ));
        }

        let mse = mean_squared_error(y_true, y_pred);
        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae: mean_absolute_error(y_true, y_pred),
            r2: r_squared(y_true, y_pred),
            ic: stats::pearson(y_true, y_pred),
            n_samples: y_true.len(),
        })
    }
}

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// R² = 1 - SS_res / SS_tot
pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let mean = stats::mean(y_true);
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    if ss_tot == 0.0 {
        return f64::NAN;
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];
        let m = RegressionMetrics::calculate(&y_true, &y_pred).unwrap();

        assert!((m.mse - 0.375).abs() < 1e-12);
        assert!((m.mae - 0.5).abs() < 1e-12);
        assert!((m.rmse - 0.375f64.sqrt()).abs() < 1e-12);
        // sklearn reference value for this pair
        assert!((m.r2 - 0.948_608_137_044_967_9).abs() < 1e-9);
        assert_eq!(m.n_samples, 4);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(RegressionMetrics::calculate(&[1.0, 2.0], &[1.0]).is_err());
        assert!(RegressionMetrics::calculate(&[], &[]).is_err());
    }
}
