use super::metrics::RegressionMetrics;
use super::trainer::{ModelTrainer, TrainingReport};
use crate::config::ModelConfig;
use crate::engines::splitters::SplitResult;
use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;
use crate::utils::stats;

const PIVOT_EPSILON: f64 = 1e-12;

/// Ridge-regularised linear regression solved through the normal equations.
///
/// Features and target are centred on the training means before solving, so
/// the intercept is never penalised.
#[derive(Debug, Clone)]
pub struct LeastSquaresTrainer {
    ridge: f64,
    fitted: Option<LinearModel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>> {
        let mut predictions = vec![self.intercept; table.height()];
        for (name, coefficient) in self.features.iter().zip(&self.coefficients) {
            let column = table.column(name)?;
            for (p, x) in predictions.iter_mut().zip(column) {
                *p += coefficient * x;
            }
        }
        Ok(predictions)
    }
}

impl LeastSquaresTrainer {
    pub fn new(ridge: f64) -> Result<Self> {
        if !(ridge >= 0.0) {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Ridge penalty must be non-negative, got {}",
                ridge
            )));
        }
        Ok(Self { ridge, fitted: None })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::new(config.ridge)
    }

    pub fn model(&self) -> Option<&LinearModel> {
        self.fitted.as_ref()
    }

    pub fn fit(&self, x: &FeatureTable, y: &[f64]) -> Result<LinearModel> {
        if x.width() > 0 && x.height() != y.len() {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Feature rows ({}) and target rows ({}) differ",
                x.height(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(FeaturePipelineError::InvalidParameter(
                "Cannot fit on an empty partition".to_string(),
            ));
        }

        let columns = x.columns()?;
        let names: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();
        let p = columns.len();

        let y_mean = stats::mean(y);
        let x_means: Vec<f64> = columns.iter().map(|(_, values)| stats::mean(values)).collect();
        let centred: Vec<Vec<f64>> = columns
            .iter()
            .zip(&x_means)
            .map(|((_, values), m)| values.iter().map(|v| v - m).collect())
            .collect();
        let y_centred: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

        // Gram matrix augmented with X'y
        let mut system = vec![vec![0.0; p + 1]; p];
        for i in 0..p {
            for j in i..p {
                let dot: f64 = centred[i].iter().zip(&centred[j]).map(|(a, b)| a * b).sum();
                system[i][j] = dot;
                system[j][i] = dot;
            }
            system[i][i] += self.ridge;
            system[i][p] = centred[i].iter().zip(&y_centred).map(|(a, b)| a * b).sum();
        }

        let coefficients = solve(system)?;
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_means)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        Ok(LinearModel {
            features: names,
            coefficients,
            intercept,
        })
    }
}

/// Gaussian elimination with partial pivoting on an augmented `p x (p + 1)` system.
fn solve(mut a: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let p = a.len();

    for col in 0..p {
        let pivot = (col..p)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);
        if !(a[pivot][col].abs() > PIVOT_EPSILON) {
            return Err(FeaturePipelineError::InvalidParameter(
                "Design matrix is singular; add a ridge penalty or drop collinear features"
                    .to_string(),
            ));
        }
        a.swap(col, pivot);

        for row in col + 1..p {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=p {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut solution = vec![0.0; p];
    for row in (0..p).rev() {
        let tail: f64 = (row + 1..p).map(|k| a[row][k] * solution[k]).sum();
        solution[row] = (a[row][p] - tail) / a[row][row];
    }
    Ok(solution)
}

impl ModelTrainer for LeastSquaresTrainer {
    fn train(&mut self, split: &SplitResult) -> Result<TrainingReport> {
        let train_y = first_column(&split.train_y)?;
        let val_y = first_column(&split.val_y)?;

        let model = self.fit(&split.train_x, &train_y)?;
        let train = RegressionMetrics::calculate(
            &train_y,
            &predict_rows(&model, &split.train_x, train_y.len())?,
        )?;
        let validation = RegressionMetrics::calculate(
            &val_y,
            &predict_rows(&model, &split.val_x, val_y.len())?,
        )?;

        log::info!(
            "Least squares on {} features: train R2 {:.4}, validation R2 {:.4}",
            model.features.len(),
            train.r2,
            validation.r2
        );

        let report = TrainingReport {
            model: self.name().to_string(),
            features: model.features.clone(),
            train,
            validation,
        };
        self.fitted = Some(model);
        Ok(report)
    }

    fn name(&self) -> &str {
        "least_squares"
    }
}

/// A table without feature columns has no height of its own; predict the intercept.
fn predict_rows(model: &LinearModel, x: &FeatureTable, rows: usize) -> Result<Vec<f64>> {
    if x.width() == 0 {
        return Ok(vec![model.intercept; rows]);
    }
    model.predict(x)
}

fn first_column(table: &FeatureTable) -> Result<Vec<f64>> {
    let names = table.column_names();
    match names.first() {
        Some(name) => table.column(name),
        None => Err(FeaturePipelineError::MissingColumn(
            "target partition has no columns".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::splitters::{ChronologicalSplitter, DataSplitter};

    fn table(columns: Vec<(&str, Vec<f64>)>) -> FeatureTable {
        FeatureTable::from_columns(
            columns
                .into_iter()
                .map(|(name, values)| (name.to_string(), values))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_recovers_exact_relation() {
        let a: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..20).map(|i| ((i * 7) % 5) as f64).collect();
        let y: Vec<f64> = a.iter().zip(&b).map(|(a, b)| 2.0 * a - 3.0 * b + 1.5).collect();
        let data = table(vec![("a", a), ("b", b), ("y", y)]);

        let split = ChronologicalSplitter::new(0.75).split(&data, "y").unwrap();
        let mut trainer = LeastSquaresTrainer::new(0.0).unwrap();
        let report = trainer.train(&split).unwrap();

        let model = trainer.model().unwrap();
        assert!((model.coefficients[0] - 2.0).abs() < 1e-9);
        assert!((model.coefficients[1] + 3.0).abs() < 1e-9);
        assert!((model.intercept - 1.5).abs() < 1e-9);
        assert!((report.train.r2 - 1.0).abs() < 1e-9);
        assert!((report.validation.r2 - 1.0).abs() < 1e-9);
        assert_eq!(report.validation.n_samples, 5);
    }

    #[test]
    fn test_singular_without_ridge() {
        let x = table(vec![("a", vec![1.0, 2.0, 3.0]), ("b", vec![2.0, 4.0, 6.0])]);
        let trainer = LeastSquaresTrainer::new(0.0).unwrap();
        assert!(trainer.fit(&x, &[1.0, 2.0, 3.0]).is_err());

        let ridged = LeastSquaresTrainer::new(1e-6).unwrap();
        let model = ridged.fit(&x, &[1.0, 2.0, 3.0]).unwrap();
        let predictions = model.predict(&x).unwrap();
        assert!((predictions[2] - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_target_only_predicts_mean() {
        let data = table(vec![("y", vec![1.0, 2.0, 3.0, 4.0, 10.0])]);
        let split = ChronologicalSplitter::new(0.8).split(&data, "y").unwrap();
        let report = LeastSquaresTrainer::new(0.0).unwrap().train(&split).unwrap();

        assert!(report.features.is_empty());
        // Intercept is the training mean 2.5; the single validation value is 10
        assert!((report.validation.mae - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_negative_ridge_rejected() {
        assert!(LeastSquaresTrainer::new(-1.0).is_err());
    }
}
