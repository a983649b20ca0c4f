use crate::error::{FeaturePipelineError, Result};
use polars::prelude::*;
use std::collections::HashSet;

/// Named, row-aligned `f64` columns backed by a polars `DataFrame`.
///
/// Every operation returns a new table; the backing frame is never mutated
/// after construction.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    frame: DataFrame,
}

impl FeatureTable {
    /// Build a table from `(name, values)` pairs, preserving their order.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let mut seen = HashSet::new();
        let height = columns.first().map(|(_, values)| values.len()).unwrap_or(0);

        for (name, values) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(FeaturePipelineError::InvalidParameter(format!(
                    "Duplicate column name: {}",
                    name
                )));
            }
            if values.len() != height {
                return Err(FeaturePipelineError::InvalidParameter(format!(
                    "Column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    height
                )));
            }
        }

        let series: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();

        Ok(Self {
            frame: DataFrame::new(series)?,
        })
    }

    /// Wrap an existing frame, casting integer columns to `f64`.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(frame.width());

        for column in frame.get_columns() {
            if !matches!(
                column.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
            ) {
                return Err(FeaturePipelineError::InvalidParameter(format!(
                    "Column '{}' must be numeric, found {:?}",
                    column.name(),
                    column.dtype()
                )));
            }
            columns.push(column.cast(&DataType::Float64)?);
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.as_str().to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_column_names()
            .iter()
            .any(|col| col.as_str() == name)
    }

    /// Fails with `MissingColumn` if `name` is absent.
    pub fn require_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(FeaturePipelineError::MissingColumn(name.to_string()))
        }
    }

    /// Values of one column; nulls surface as `NaN`.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        self.require_column(name)?;
        let values = self
            .frame
            .column(name)?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(values)
    }

    /// All columns in table order.
    pub fn columns(&self) -> Result<Vec<(String, Vec<f64>)>> {
        self.column_names()
            .into_iter()
            .map(|name| {
                let values = self.column(&name)?;
                Ok((name, values))
            })
            .collect()
    }

    pub fn select(&self, names: &[String]) -> Result<Self> {
        for name in names {
            self.require_column(name)?;
        }
        let columns = names
            .iter()
            .map(|name| Ok((name.clone(), self.column(name)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_columns(columns)
    }

    pub fn drop_columns(&self, names: &[String]) -> Result<Self> {
        for name in names {
            self.require_column(name)?;
        }
        let keep: Vec<String> = self
            .column_names()
            .into_iter()
            .filter(|name| !names.contains(name))
            .collect();
        self.select(&keep)
    }

    /// Rows `offset..offset + len`, clamped to the table height.
    pub fn slice_rows(&self, offset: usize, len: usize) -> Self {
        Self {
            frame: self.frame.slice(offset as i64, len),
        }
    }

    /// Append another table's columns; heights must match and names must not collide.
    pub fn hconcat(&self, other: &FeatureTable) -> Result<Self> {
        if self.width() > 0 && other.width() > 0 && self.height() != other.height() {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Cannot concatenate tables with {} and {} rows",
                self.height(),
                other.height()
            )));
        }
        let mut columns = self.columns()?;
        columns.extend(other.columns()?);
        Self::from_columns(columns)
    }

    pub fn with_column(&self, name: &str, values: Vec<f64>) -> Result<Self> {
        let mut columns = self.columns()?;
        columns.push((name.to_string(), values));
        Self::from_columns(columns)
    }

    /// Same columns reordered alphabetically.
    pub fn sorted_by_name(&self) -> Result<Self> {
        let mut names = self.column_names();
        names.sort();
        self.select(&names)
    }
}
