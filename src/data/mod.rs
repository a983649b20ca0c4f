pub mod cache;
pub mod connectors;

pub use cache::CachedBarSource;
pub use connectors::{BarSource, CsvConnector, DataValidator, RequiredColumn, SyntheticConnector};

use crate::config::{DataConfig, DataSourceKind};
use crate::error::{FeaturePipelineError, Result};

/// Build the bar source described by the data section, wrapped in a cache when one is configured.
pub fn source_from_config(config: &DataConfig) -> Result<Box<dyn BarSource>> {
    let source: Box<dyn BarSource> = match config.source {
        DataSourceKind::Csv => {
            let path = config.path.as_ref().ok_or_else(|| {
                FeaturePipelineError::InvalidParameter(
                    "data.path is required for the csv source".to_string(),
                )
            })?;
            Box::new(CsvConnector::new(path).with_min_rows(config.min_rows))
        }
        DataSourceKind::Synthetic => Box::new(SyntheticConnector::new(config.synthetic.clone())),
    };

    match &config.cache_path {
        Some(path) => Ok(Box::new(
            CachedBarSource::new(source, path).with_min_rows(config.min_rows),
        )),
        None => Ok(source),
    }
}
