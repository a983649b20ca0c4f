use super::{
    data::DataConfig,
    features::FeaturesConfig,
    model::{ModelConfig, SplitSection},
    selection::SelectionConfig,
    symbolic::SymbolicConfig,
    traits::ConfigSection,
};
use crate::error::FeaturePipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables with this prefix override file values,
/// e.g. `GENFEAT__FEATURES__MEMORY=5`.
pub const ENV_PREFIX: &str = "GENFEAT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub features: FeaturesConfig,
    pub symbolic: SymbolicConfig,
    pub selection: SelectionConfig,
    pub split: SplitSection,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), FeaturePipelineError> {
        validate_section(&self.data)?;
        validate_section(&self.features)?;
        validate_section(&self.symbolic)?;
        validate_section(&self.selection)?;
        validate_section(&self.split)?;
        validate_section(&self.model)?;
        Ok(())
    }
}

fn validate_section<S: ConfigSection>(section: &S) -> Result<(), FeaturePipelineError> {
    section.validate().map_err(|e| {
        log::error!("Invalid [{}] section: {}", S::section_name(), e);
        e
    })
}

pub struct ConfigManager {
    config: AppConfig,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Layer a TOML file and `GENFEAT__*` environment overrides over the defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), FeaturePipelineError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                FeaturePipelineError::Configuration(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let config: AppConfig = settings.try_deserialize().map_err(|e| {
            FeaturePipelineError::Configuration(format!("Failed to parse config: {}", e))
        })?;

        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());

        self.config = config;
        Ok(())
    }

    pub fn load_from_str(&mut self, contents: &str) -> Result<(), FeaturePipelineError> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|e| FeaturePipelineError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        self.config = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), FeaturePipelineError> {
        let toml_str = toml::to_string_pretty(&self.config)
            .map_err(|e| FeaturePipelineError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| FeaturePipelineError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    pub fn update<F>(&mut self, f: F) -> Result<(), FeaturePipelineError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.config.clone();
        f(&mut candidate);
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }
}
