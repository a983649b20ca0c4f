use super::types::RequiredColumn;
use crate::error::{FeaturePipelineError, Result};
use crate::types::Bar;
use polars::prelude::*;
use std::collections::HashMap;

pub struct DataValidator;

impl DataValidator {
    /// Resolve every required column through its aliases and check price/volume columns are numeric.
    pub fn resolve_columns(df: &DataFrame) -> Result<HashMap<RequiredColumn, String>> {
        let mut column_map = HashMap::new();

        for required in RequiredColumn::all() {
            match Self::find_column(df, &required) {
                Some(col_name) => {
                    column_map.insert(required, col_name.to_string());
                }
                None => {
                    return Err(FeaturePipelineError::DataLoading(format!(
                        "Missing required column: {} (tried aliases: {:?})",
                        required.as_str(),
                        required.aliases()
                    )));
                }
            }
        }

        for (req_col, actual_name) in &column_map {
            if *req_col == RequiredColumn::Timestamp {
                continue;
            }
            let column = df.column(actual_name)?;
            if !matches!(
                column.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
            ) {
                return Err(FeaturePipelineError::DataLoading(format!(
                    "Column '{}' ({}) must be numeric, found {:?}",
                    actual_name,
                    req_col.as_str(),
                    column.dtype()
                )));
            }
        }

        Ok(column_map)
    }

    fn find_column(df: &DataFrame, required: &RequiredColumn) -> Option<&'static str> {
        let columns = df.get_column_names();
        required
            .aliases()
            .into_iter()
            .find(|alias| columns.iter().any(|col| col.as_str() == *alias))
    }

    /// High must bound open/close from above, low from below; nothing may be negative or non-finite.
    pub fn validate_bars(bars: &[Bar]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            let values = [bar.open, bar.high, bar.low, bar.close, bar.volume];
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(FeaturePipelineError::DataLoading(format!(
                    "Invalid data at row {}: prices and volume must be finite and non-negative",
                    i
                )));
            }
            if bar.high < bar.low {
                return Err(FeaturePipelineError::DataLoading(format!(
                    "Invalid data at row {}: high ({}) < low ({})",
                    i, bar.high, bar.low
                )));
            }
            if bar.high < bar.open || bar.high < bar.close {
                return Err(FeaturePipelineError::DataLoading(format!(
                    "Invalid data at row {}: high ({}) < open ({}) or close ({})",
                    i, bar.high, bar.open, bar.close
                )));
            }
            if bar.low > bar.open || bar.low > bar.close {
                return Err(FeaturePipelineError::DataLoading(format!(
                    "Invalid data at row {}: low ({}) > open ({}) or close ({})",
                    i, bar.low, bar.open, bar.close
                )));
            }
        }
        Ok(())
    }

    /// Check for minimum required rows
    pub fn validate_minimum_rows(rows: usize, min_rows: usize) -> Result<()> {
        if rows < min_rows {
            return Err(FeaturePipelineError::DataLoading(format!(
                "Insufficient data: {} rows, minimum {} required",
                rows, min_rows
            )));
        }
        Ok(())
    }

    /// Per-column null counts, only for columns that have any
    pub fn check_nulls(df: &DataFrame) -> Vec<(String, usize)> {
        df.get_columns()
            .iter()
            .filter(|column| column.null_count() > 0)
            .map(|column| (column.name().as_str().to_string(), column.null_count()))
            .collect()
    }
}
