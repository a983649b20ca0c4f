use crate::error::{FeaturePipelineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Time-ordered bars, strictly increasing timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(FeaturePipelineError::DataLoading(
                "Bar series is empty".to_string(),
            ));
        }

        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(FeaturePipelineError::DataLoading(format!(
                    "Timestamps must be strictly increasing: row {} ({}) is not after row {} ({})",
                    i + 1,
                    pair[1].timestamp,
                    i,
                    pair[0].timestamp
                )));
            }
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> DateTime<Utc> {
        self.bars[0].timestamp
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.bars[self.bars.len() - 1].timestamp
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
