use super::generator::{SymbolicFeatureGenerator, SymbolicFeatureSet, SymbolicMetadata};
use crate::config::SymbolicParams;
use crate::data::CsvConnector;
use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;
use std::path::{Path, PathBuf};

pub const FEATURES_FILE: &str = "features.csv";
pub const METADATA_FILE: &str = "metadata.json";

/// Reads symbolic features produced by an external search run.
///
/// The directory holds `features.csv` (one column per evolved program, rows
/// aligned with the linear feature table) and `metadata.json`
/// ([`SymbolicMetadata`]). A missing metadata file yields empty metadata.
pub struct PrecomputedSymbolicGenerator {
    dir: PathBuf,
    label: String,
}

impl PrecomputedSymbolicGenerator {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let label = format!("precomputed:{}", dir.display());
        Self { dir, label }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_metadata(&self) -> Result<SymbolicMetadata> {
        let path = self.dir.join(METADATA_FILE);
        if !path.exists() {
            log::warn!("No {} in {}, continuing without program details", METADATA_FILE, self.dir.display());
            return Ok(SymbolicMetadata::default());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl SymbolicFeatureGenerator for PrecomputedSymbolicGenerator {
    fn generate(
        &mut self,
        _features: &FeatureTable,
        _target: &str,
        params: &SymbolicParams,
    ) -> Result<SymbolicFeatureSet> {
        let path = self.dir.join(FEATURES_FILE);
        if !path.exists() {
            return Err(FeaturePipelineError::Collaborator(format!(
                "Symbolic feature file not found: {}",
                path.display()
            )));
        }

        let features = FeatureTable::from_frame(CsvConnector::read_frame(&path)?)?;
        let metadata = self.read_metadata()?;

        if features.width() > params.n_features {
            log::warn!(
                "{} holds {} features, more than the configured n_features {}",
                path.display(),
                features.width(),
                params.n_features
            );
        }

        Ok(SymbolicFeatureSet { features, metadata })
    }

    fn name(&self) -> &str {
        &self.label
    }
}
