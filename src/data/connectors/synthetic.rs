use super::BarSource;
use crate::config::SyntheticConfig;
use crate::error::{FeaturePipelineError, Result};
use crate::types::{Bar, BarSeries};
use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded random-walk bars for demos and tests.
///
/// Each bar opens at the previous close; high and low wrap the open/close pair
/// with a small random wick so the OHLC invariants always hold.
pub struct SyntheticConnector {
    config: SyntheticConfig,
}

impl SyntheticConnector {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }
}

impl BarSource for SyntheticConnector {
    fn load(&self) -> Result<BarSeries> {
        let cfg = &self.config;
        if cfg.bars == 0 {
            return Err(FeaturePipelineError::InvalidParameter(
                "Synthetic source needs at least one bar".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let start = Utc
            .with_ymd_and_hms(2021, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| FeaturePipelineError::DataLoading("Invalid start time".to_string()))?;
        let step = Duration::minutes(cfg.interval_minutes);

        let mut bars = Vec::with_capacity(cfg.bars);
        let mut price = cfg.start_price;
        let mut timestamp = start;

        for _ in 0..cfg.bars {
            let open = price;
            let ret: f64 = if cfg.volatility > 0.0 {
                rng.gen_range(-cfg.volatility..cfg.volatility)
            } else {
                0.0
            };
            let close = (open * (1.0 + ret)).max(f64::EPSILON);
            let wick: f64 = rng.gen_range(0.0..=cfg.volatility * 0.5);
            let high = open.max(close) * (1.0 + wick);
            let low = open.min(close) * (1.0 - wick).max(0.0);
            let volume = rng.gen_range(100.0..1000.0);

            bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            timestamp += step;
        }

        BarSeries::new(bars)
    }

    fn describe(&self) -> String {
        format!("synthetic:{} bars, seed {}", self.config.bars, self.config.seed)
    }
}
