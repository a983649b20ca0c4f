use crate::data::connectors::{BarSource, CsvConnector};
use crate::error::{FeaturePipelineError, Result};
use crate::types::BarSeries;
use polars::df;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Wraps another source and keeps a CSV copy of its bars on disk.
///
/// The first load goes to the inner source and writes the cache; later loads
/// read the cache file and never touch the inner source. A cache file that no
/// longer loads (truncated, or shorter than `min_rows`) is refreshed from the
/// inner source.
pub struct CachedBarSource<S: BarSource> {
    inner: S,
    path: PathBuf,
    min_rows: usize,
}

impl<S: BarSource> CachedBarSource<S> {
    pub fn new<P: AsRef<Path>>(inner: S, path: P) -> Self {
        Self {
            inner,
            path: path.as_ref().to_path_buf(),
            min_rows: 1,
        }
    }

    /// Minimum bar count a cache file must hold to be used
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_cached(&self) -> bool {
        self.path.exists()
    }

    fn write(&self, series: &BarSeries) -> Result<()> {
        let bars = series.bars();
        let mut df = df! {
            "timestamp" => bars.iter().map(|b| b.timestamp.timestamp_millis()).collect::<Vec<i64>>(),
            "open" => bars.iter().map(|b| b.open).collect::<Vec<f64>>(),
            "high" => bars.iter().map(|b| b.high).collect::<Vec<f64>>(),
            "low" => bars.iter().map(|b| b.low).collect::<Vec<f64>>(),
            "close" => bars.iter().map(|b| b.close).collect::<Vec<f64>>(),
            "volume" => bars.iter().map(|b| b.volume).collect::<Vec<f64>>(),
        }?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Readers only ever see a complete file
        let staging = self.path.with_extension("csv.tmp");
        let written = File::create(&staging)
            .map_err(FeaturePipelineError::from)
            .and_then(|mut file| {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(&mut df)
                    .map_err(FeaturePipelineError::from)
            });
        if let Err(e) = written {
            let _ = std::fs::remove_file(&staging);
            return Err(e);
        }
        std::fs::rename(&staging, &self.path)?;

        log::info!("Cached {} bars at {}", bars.len(), self.path.display());
        Ok(())
    }
}

impl<S: BarSource> BarSource for CachedBarSource<S> {
    fn load(&self) -> Result<BarSeries> {
        if self.is_cached() {
            log::debug!("Cache hit: {}", self.path.display());
            match CsvConnector::new(&self.path)
                .with_min_rows(self.min_rows)
                .load()
            {
                Ok(series) => return Ok(series),
                Err(e) => log::warn!(
                    "Ignoring unusable cache {}: {}; reloading from {}",
                    self.path.display(),
                    e,
                    self.inner.describe()
                ),
            }
        }

        let series = self.inner.load()?;
        self.write(&series)?;
        Ok(series)
    }

    fn describe(&self) -> String {
        format!("{} (cached at {})", self.inner.describe(), self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyntheticConfig;
    use crate::data::connectors::SyntheticConnector;

    struct Failing;

    impl BarSource for Failing {
        fn load(&self) -> Result<BarSeries> {
            Err(FeaturePipelineError::DataLoading("offline".to_string()))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = std::env::temp_dir().join(format!("genfeat_cache_{}", std::process::id()));
        let path = dir.join("bars.csv");
        let _ = std::fs::remove_dir_all(&dir);

        let synthetic = SyntheticConnector::new(SyntheticConfig {
            bars: 30,
            ..SyntheticConfig::default()
        });
        let cached = CachedBarSource::new(synthetic, &path);
        assert!(!cached.is_cached());

        let first = cached.load().unwrap();
        assert!(cached.is_cached());

        // Second load must come from disk since the inner source would fail.
        let reloaded = CachedBarSource::new(Failing, &path).load().unwrap();
        assert_eq!(reloaded.len(), first.len());
        assert_eq!(reloaded.first_timestamp(), first.first_timestamp());
        for (a, b) in first.bars().iter().zip(reloaded.bars()) {
            assert!((a.close - b.close).abs() < 1e-9 * a.close.abs().max(1.0));
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    fn synthetic(bars: usize) -> SyntheticConnector {
        SyntheticConnector::new(SyntheticConfig {
            bars,
            ..SyntheticConfig::default()
        })
    }

    #[test]
    fn test_empty_cache_file_is_refreshed() {
        let dir = std::env::temp_dir().join(format!("genfeat_cache_empty_{}", std::process::id()));
        let path = dir.join("bars.csv");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        File::create(&path).unwrap();

        // An empty file from an interrupted run cannot be served with no fallback
        assert!(CachedBarSource::new(Failing, &path).load().is_err());

        let refreshed = CachedBarSource::new(synthetic(25), &path).load().unwrap();
        assert_eq!(refreshed.len(), 25);
        assert!(!path.with_extension("csv.tmp").exists());

        let reloaded = CachedBarSource::new(Failing, &path).load().unwrap();
        assert_eq!(reloaded.len(), 25);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cache_hit_honours_min_rows() {
        let dir = std::env::temp_dir().join(format!("genfeat_cache_rows_{}", std::process::id()));
        let path = dir.join("bars.csv");
        let _ = std::fs::remove_dir_all(&dir);

        CachedBarSource::new(synthetic(10), &path).load().unwrap();

        let short = CachedBarSource::new(Failing, &path).with_min_rows(20).load();
        assert!(short.is_err());

        let refreshed = CachedBarSource::new(synthetic(40), &path)
            .with_min_rows(20)
            .load()
            .unwrap();
        assert_eq!(refreshed.len(), 40);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
