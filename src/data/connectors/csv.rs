use super::{types::RequiredColumn, validator::DataValidator, BarSource};
use crate::error::{FeaturePipelineError, Result};
use crate::types::{Bar, BarSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Loads bars from a CSV file with OHLCV columns.
///
/// Integer timestamps are epoch milliseconds; text timestamps may be RFC 3339,
/// `YYYY-MM-DD HH:MM:SS` or a bare date.
pub struct CsvConnector {
    path: PathBuf,
    min_rows: usize,
}

impl CsvConnector {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            min_rows: 1,
        }
    }

    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Load CSV file into DataFrame
    pub fn read_frame<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| FeaturePipelineError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Convert a frame with OHLCV columns (any supported aliases) into bars.
    pub fn frame_to_bars(df: &DataFrame) -> Result<Vec<Bar>> {
        let column_map = DataValidator::resolve_columns(df)?;

        let nulls = DataValidator::check_nulls(df);
        if !nulls.is_empty() {
            return Err(FeaturePipelineError::DataLoading(format!(
                "Null values detected: {:?}",
                nulls
            )));
        }

        let timestamps = Self::timestamps(df.column(&column_map[&RequiredColumn::Timestamp])?)?;
        let numeric = |required: RequiredColumn| -> Result<Vec<f64>> {
            let column = df.column(&column_map[&required])?.cast(&DataType::Float64)?;
            let values = column
                .as_materialized_series()
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            Ok(values)
        };

        let open = numeric(RequiredColumn::Open)?;
        let high = numeric(RequiredColumn::High)?;
        let low = numeric(RequiredColumn::Low)?;
        let close = numeric(RequiredColumn::Close)?;
        let volume = numeric(RequiredColumn::Volume)?;

        let bars = (0..df.height())
            .map(|i| Bar {
                timestamp: timestamps[i],
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
                volume: volume[i],
            })
            .collect();

        Ok(bars)
    }

    fn timestamps(column: &Column) -> Result<Vec<DateTime<Utc>>> {
        match column.dtype() {
            DataType::Int64 | DataType::Int32 | DataType::UInt64 | DataType::UInt32 => {
                let millis = column.cast(&DataType::Int64)?;
                millis
                    .as_materialized_series()
                    .i64()?
                    .into_iter()
                    .enumerate()
                    .map(|(i, ms)| {
                        ms.and_then(DateTime::<Utc>::from_timestamp_millis).ok_or_else(|| {
                            FeaturePipelineError::DataLoading(format!(
                                "Invalid timestamp at row {}",
                                i
                            ))
                        })
                    })
                    .collect()
            }
            DataType::String => column
                .as_materialized_series()
                .str()?
                .into_iter()
                .enumerate()
                .map(|(i, text)| {
                    text.and_then(parse_timestamp).ok_or_else(|| {
                        FeaturePipelineError::DataLoading(format!(
                            "Unparseable timestamp at row {}: {:?}",
                            i, text
                        ))
                    })
                })
                .collect(),
            other => Err(FeaturePipelineError::DataLoading(format!(
                "Timestamp column must be integer milliseconds or text, found {:?}",
                other
            ))),
        }
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl BarSource for CsvConnector {
    fn load(&self) -> Result<BarSeries> {
        let df = Self::read_frame(&self.path)?;
        let bars = Self::frame_to_bars(&df)?;

        DataValidator::validate_minimum_rows(bars.len(), self.min_rows)?;
        DataValidator::validate_bars(&bars)?;

        log::info!("Loaded {} bars from {}", bars.len(), self.path.display());
        BarSeries::new(bars)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}
