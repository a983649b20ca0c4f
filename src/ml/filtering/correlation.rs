use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;
use crate::utils::stats;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

impl CorrelationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
        }
    }

    pub fn coefficient(&self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            Self::Pearson => stats::pearson(x, y),
            Self::Spearman => stats::spearman(x, y),
        }
    }
}

impl FromStr for CorrelationMethod {
    type Err = FeaturePipelineError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            other => Err(FeaturePipelineError::InvalidParameter(format!(
                "Unknown correlation method: {}",
                other
            ))),
        }
    }
}

/// Square, symmetric matrix of pairwise coefficients with a unit diagonal.
///
/// Pairs involving a constant column are `NaN`, which never passes a
/// threshold comparison.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    method: CorrelationMethod,
    names: Vec<String>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn compute(table: &FeatureTable, method: CorrelationMethod) -> Result<Self> {
        let columns = table.columns()?;
        let names: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();

        // Rank once per column, then every Spearman pair is a Pearson over ranks
        let prepared: Vec<Vec<f64>> = columns
            .into_iter()
            .map(|(_, values)| match method {
                CorrelationMethod::Pearson => values,
                CorrelationMethod::Spearman => stats::rank(&values),
            })
            .collect();

        let n = names.len();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let c = stats::pearson(&prepared[i], &prepared[j]);
                values[i * n + j] = c;
                values[j * n + i] = c;
            }
        }

        Ok(Self {
            method,
            names,
            values,
        })
    }

    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.names.len() + j]
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.get(self.index_of(a)?, self.index_of(b)?))
    }

    /// Coefficients of every column against `name`, in matrix order.
    pub fn against(&self, name: &str) -> Result<Vec<(String, f64)>> {
        let j = self
            .index_of(name)
            .ok_or_else(|| FeaturePipelineError::MissingColumn(name.to_string()))?;
        Ok(self
            .names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), self.get(i, j)))
            .collect())
    }
}

impl fmt::Display for CorrelationMatrix {
    /// Lower triangle, two decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.names.iter().map(|n| n.len()).max().unwrap_or(0).max(6);

        write!(f, "{:<width$}", self.method.as_str(), width = width)?;
        for name in &self.names {
            write!(f, " {:>width$}", name, width = width)?;
        }
        writeln!(f)?;

        for (i, row) in self.names.iter().enumerate() {
            write!(f, "{:<width$}", row, width = width)?;
            for j in 0..=i {
                write!(f, " {:>width$.2}", self.get(i, j), width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
