use crate::error::Result;
use crate::table::FeatureTable;
use crate::utils::stats;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Descriptive statistics for every column of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataProfile {
    pub columns: Vec<ColumnProfile>,
}

impl DataProfile {
    pub fn of(table: &FeatureTable) -> Result<Self> {
        let columns = table
            .columns()?
            .into_iter()
            .map(|(name, values)| {
                let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
                ColumnProfile {
                    name,
                    count: finite.len(),
                    mean: stats::mean(&finite),
                    std: stats::sample_std(&finite),
                    min: stats::min(&finite),
                    q25: stats::quantile(&finite, 0.25),
                    median: stats::quantile(&finite, 0.5),
                    q75: stats::quantile(&finite, 0.75),
                    max: stats::max(&finite),
                }
            })
            .collect();

        Ok(Self { columns })
    }

    pub fn get(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for DataProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .columns
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max(6);

        writeln!(
            f,
            "{:<width$} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
            width = width
        )?;
        for c in &self.columns {
            writeln!(
                f,
                "{:<width$} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                c.name, c.count, c.mean, c.std, c.min, c.q25, c.median, c.q75, c.max,
                width = width
            )?;
        }
        Ok(())
    }
}
