use crate::config::FeaturesConfig;
use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;
use crate::types::{Bar, BarSeries};

/// Autoregressive feature builder: `memory` lags of every column, checked against `target`
pub struct LinearFeatureBuilder {
    memory: usize,
    target: String,
}

impl LinearFeatureBuilder {
    pub fn new(memory: usize, target: impl Into<String>) -> Self {
        Self {
            memory,
            target: target.into(),
        }
    }

    pub fn from_config(config: &FeaturesConfig) -> Self {
        Self::new(config.memory, config.target.as_str())
    }

    pub fn memory(&self) -> usize {
        self.memory
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Original columns plus `memory` lagged copies of each, first `memory` rows dropped.
    pub fn build(&self, table: &FeatureTable) -> Result<FeatureTable> {
        let memory = self.memory;
        if memory < 1 {
            return Err(FeaturePipelineError::InvalidParameter(
                "Memory depth must be at least 1".to_string(),
            ));
        }
        if !table.has_column(&self.target) {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Target column '{}' not found in feature table",
                self.target
            )));
        }

        let n = table.height();
        if n <= memory {
            return Err(FeaturePipelineError::InvalidParameter(format!(
                "Need more than {} rows to build {} lags, got {}",
                memory, memory, n
            )));
        }

        let source = table.columns()?;

        // Current values, aligned to rows memory..n
        let mut features: Vec<(String, Vec<f64>)> = source
            .iter()
            .map(|(name, values)| (name.clone(), values[memory..].to_vec()))
            .collect();

        // NO LOOKAHEAD: lag k at output row i is input row (i + memory - k)
        for (name, values) in &source {
            for lag in 1..=memory {
                let lag_name = format!("{}_lag_{}", name, lag);
                if table.has_column(&lag_name) {
                    return Err(FeaturePipelineError::InvalidParameter(format!(
                        "Lag column '{}' collides with an existing column",
                        lag_name
                    )));
                }
                features.push((lag_name, values[memory - lag..n - lag].to_vec()));
            }
        }

        log::debug!(
            "Built {} linear features over {} rows (memory {})",
            features.len(),
            n - memory,
            memory
        );

        FeatureTable::from_columns(features)
    }
}

/// OHLCV columns plus the intrabar spreads `co`, `hl`, `ho` and `ol`.
pub fn price_spreads(bars: &BarSeries) -> Result<FeatureTable> {
    let bars = bars.bars();

    FeatureTable::from_columns(vec![
        ("open".to_string(), extract(bars, |b| b.open)),
        ("high".to_string(), extract(bars, |b| b.high)),
        ("low".to_string(), extract(bars, |b| b.low)),
        ("close".to_string(), extract(bars, |b| b.close)),
        ("volume".to_string(), extract(bars, |b| b.volume)),
        ("co".to_string(), extract(bars, |b| b.close - b.open)),
        ("hl".to_string(), extract(bars, |b| b.high - b.low)),
        ("ho".to_string(), extract(bars, |b| b.high - b.open)),
        ("ol".to_string(), extract(bars, |b| b.open - b.low)),
    ])
}

fn extract(bars: &[Bar], f: impl Fn(&Bar) -> f64) -> Vec<f64> {
    bars.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn builder(memory: usize, target: &str) -> LinearFeatureBuilder {
        LinearFeatureBuilder::new(memory, target)
    }

    fn table(n: usize) -> FeatureTable {
        FeatureTable::from_columns(vec![
            ("close".to_string(), (0..n).map(|i| i as f64).collect()),
            ("volume".to_string(), (0..n).map(|i| 100.0 + i as f64).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn test_shape() {
        for memory in 1..5 {
            let result = builder(memory, "close").build(&table(12)).unwrap();
            assert_eq!(result.height(), 12 - memory);
            assert_eq!(result.width(), (memory + 1) * 2);
        }
    }

    #[test]
    fn test_lag_values_shift_backward() {
        let result = builder(2, "close").build(&table(5)).unwrap();

        assert_eq!(result.column("close").unwrap(), vec![2.0, 3.0, 4.0]);
        assert_eq!(result.column("close_lag_1").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(result.column("close_lag_2").unwrap(), vec![0.0, 1.0, 2.0]);
        assert_eq!(result.column("volume_lag_2").unwrap(), vec![100.0, 101.0, 102.0]);
    }

    #[test]
    fn test_column_order() {
        let result = builder(1, "close").build(&table(3)).unwrap();
        assert_eq!(
            result.column_names(),
            vec!["close", "volume", "close_lag_1", "volume_lag_1"]
        );
    }

    #[test]
    fn test_invalid_memory_and_target() {
        assert!(matches!(
            builder(0, "close").build(&table(5)),
            Err(FeaturePipelineError::InvalidParameter(_))
        ));
        assert!(matches!(
            builder(2, "co").build(&table(5)),
            Err(FeaturePipelineError::InvalidParameter(_))
        ));
        assert!(builder(5, "close").build(&table(5)).is_err());
    }

    #[test]
    fn test_built_from_features_section() {
        let config = FeaturesConfig {
            memory: 2,
            target: "volume".to_string(),
            ..FeaturesConfig::default()
        };
        let builder = LinearFeatureBuilder::from_config(&config);
        assert_eq!(builder.memory(), 2);
        assert_eq!(builder.target(), "volume");
        assert_eq!(builder.build(&table(6)).unwrap().height(), 4);
    }

    #[test]
    fn test_price_spreads() {
        let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let bars = BarSeries::new(vec![
            Bar { timestamp: start, open: 10.0, high: 12.0, low: 9.0, close: 11.0, volume: 5.0 },
            Bar {
                timestamp: start + Duration::hours(1),
                open: 11.0,
                high: 11.5,
                low: 8.0,
                close: 9.0,
                volume: 7.0,
            },
        ])
        .unwrap();

        let table = price_spreads(&bars).unwrap();
        assert_eq!(table.width(), 9);
        assert_eq!(table.column("co").unwrap(), vec![1.0, -2.0]);
        assert_eq!(table.column("hl").unwrap(), vec![3.0, 3.5]);
        assert_eq!(table.column("ho").unwrap(), vec![2.0, 0.5]);
        assert_eq!(table.column("ol").unwrap(), vec![1.0, 3.0]);
    }
}
