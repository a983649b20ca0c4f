use std::fmt;
use thiserror::Error;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadBars,
    LinearFeatures,
    Scaling,
    SymbolicFeatures,
    Selection,
    Split,
    Training,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadBars => "load bars",
            Self::LinearFeatures => "linear features",
            Self::Scaling => "scaling",
            Self::SymbolicFeatures => "symbolic features",
            Self::Selection => "feature selection",
            Self::Split => "train/validation split",
            Self::Training => "model training",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum FeaturePipelineError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown transform: {0}")]
    UnknownTransform(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<FeaturePipelineError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl FeaturePipelineError {
    /// Tag this error with the stage it surfaced in. Already tagged errors keep their stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any stage tag removed.
    pub fn root(&self) -> &FeaturePipelineError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeaturePipelineError>;
