use crate::config::{AppConfig, FitScope};
use crate::data::{self, BarSource};
use crate::engines::generation::{
    generate_symbolic_features, PrecomputedSymbolicGenerator, ProgramSummary,
    SymbolicFeatureGenerator, SymbolicFeatureSet,
};
use crate::engines::splitters::{train_rows, ChronologicalSplitter, DataSplitter, SplitResult};
use crate::error::{FeaturePipelineError, Result, Stage};
use crate::ml::features::{price_spreads, LinearFeatureBuilder, Scaler};
use crate::ml::filtering::{build_experiment, Experiment};
use crate::ml::models::{LeastSquaresTrainer, ModelTrainer, TrainingReport};
use crate::table::FeatureTable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Summary of one pipeline run, written as JSON by the binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub generated_at: String,
    pub source: String,
    pub bars: usize,
    pub target: String,
    pub memory: usize,
    pub transform: String,
    pub fit_scope: FitScope,
    pub linear_columns: Vec<String>,
    pub symbolic_columns: Vec<String>,
    pub best_programs: Vec<ProgramSummary>,
    pub experiment: Experiment,
    pub selected_columns: Vec<String>,
    pub discarded_columns: Vec<String>,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub training: TrainingReport,
}

/// Tables produced along the way, kept for printing and inspection
pub struct PipelineOutput {
    pub report: PipelineReport,
    pub linear: FeatureTable,
    pub scaled: FeatureTable,
    pub symbolic: Option<SymbolicFeatureSet>,
    pub experiment: FeatureTable,
    pub split: SplitResult,
}

/// Runs bars through lagging, scaling, symbolic generation, selection,
/// splitting and training, one stage after the other.
pub struct Pipeline {
    config: AppConfig,
    source: Box<dyn BarSource>,
    generator: Option<Box<dyn SymbolicFeatureGenerator>>,
    trainer: Box<dyn ModelTrainer>,
}

impl Pipeline {
    /// Pipeline with an explicit bar source, the least-squares trainer and no symbolic generator.
    pub fn new(config: AppConfig, source: Box<dyn BarSource>) -> Result<Self> {
        config.validate()?;
        let trainer = LeastSquaresTrainer::from_config(&config.model)?;
        Ok(Self {
            config,
            source,
            generator: None,
            trainer: Box::new(trainer),
        })
    }

    /// Everything built from configuration: data source, precomputed symbolic features
    /// when enabled, least-squares trainer.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let source = data::source_from_config(&config.data)?;
        let generator: Option<Box<dyn SymbolicFeatureGenerator>> = if config.symbolic.enabled {
            let dir = config.symbolic.features_dir.as_ref().ok_or_else(|| {
                FeaturePipelineError::InvalidParameter(
                    "symbolic.features_dir is required when symbolic generation is enabled"
                        .to_string(),
                )
            })?;
            Some(Box::new(PrecomputedSymbolicGenerator::new(dir)))
        } else {
            None
        };

        let mut pipeline = Self::new(config, source)?;
        pipeline.generator = generator;
        Ok(pipeline)
    }

    pub fn with_generator(mut self, generator: Box<dyn SymbolicFeatureGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_trainer(mut self, trainer: Box<dyn ModelTrainer>) -> Self {
        self.trainer = trainer;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn run(&mut self) -> Result<PipelineOutput> {
        let cfg = self.config.clone();
        let target = cfg.features.target.as_str();

        log::info!("Loading bars from {}", self.source.describe());
        let bars = self.source.load().map_err(|e| e.in_stage(Stage::LoadBars))?;
        log::info!(
            "Loaded {} bars ({} .. {})",
            bars.len(),
            bars.first_timestamp(),
            bars.last_timestamp()
        );

        let linear = price_spreads(&bars)
            .and_then(|spreads| LinearFeatureBuilder::from_config(&cfg.features).build(&spreads))
            .map_err(|e| e.in_stage(Stage::LinearFeatures))?;
        log::info!(
            "Linear features: {} rows x {} columns",
            linear.height(),
            linear.width()
        );

        // Selection keeps every row, so the split is checked here once for both fit scopes
        let fit_rows = train_rows(linear.height(), cfg.split.train_fraction)
            .map_err(|e| e.in_stage(Stage::Split))?;

        let scaled = self
            .scale(&linear, fit_rows)
            .map_err(|e| e.in_stage(Stage::Scaling))?;

        let symbolic = self
            .symbolic(&scaled)
            .map_err(|e| e.in_stage(Stage::SymbolicFeatures))?;
        let symbolic_table = match &symbolic {
            Some(set) => set.features.clone(),
            None => FeatureTable::from_columns(Vec::new())
                .map_err(|e| e.in_stage(Stage::SymbolicFeatures))?,
        };

        let experiment = self
            .select(&scaled, &symbolic_table)
            .map_err(|e| e.in_stage(Stage::Selection))?;

        let split = ChronologicalSplitter::from_config(&cfg.split)
            .split(&experiment, target)
            .map_err(|e| e.in_stage(Stage::Split))?;
        log::info!(
            "Split {} rows: {} train / {} validation",
            experiment.height(),
            split.train_rows(),
            split.val_rows()
        );

        log::info!("Training {}", self.trainer.name());
        let training = self
            .trainer
            .train(&split)
            .map_err(|e| e.in_stage(Stage::Training))?;

        let selected_columns = experiment.column_names();
        let selected: HashSet<&String> = selected_columns.iter().collect();
        let discarded_columns = scaled
            .column_names()
            .into_iter()
            .chain(symbolic_table.column_names())
            .filter(|name| !selected.contains(name))
            .collect();

        let report = PipelineReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: self.source.describe(),
            bars: bars.len(),
            target: cfg.features.target.clone(),
            memory: cfg.features.memory,
            transform: cfg.features.transform.clone(),
            fit_scope: cfg.features.fit_scope,
            linear_columns: linear.column_names(),
            symbolic_columns: symbolic_table.column_names(),
            best_programs: symbolic
                .as_ref()
                .map(|set| set.metadata.best_programs.clone())
                .unwrap_or_default(),
            experiment: cfg.selection.experiment,
            selected_columns,
            discarded_columns,
            train_rows: split.train_rows(),
            validation_rows: split.val_rows(),
            training,
        };

        Ok(PipelineOutput {
            report,
            linear,
            scaled,
            symbolic,
            experiment,
            split,
        })
    }

    fn scale(&self, linear: &FeatureTable, fit_rows: usize) -> Result<FeatureTable> {
        let features = &self.config.features;
        let scaler = Scaler::from_name(&features.transform)?;

        let fitted = match features.fit_scope {
            FitScope::Full => scaler.fit(linear)?,
            FitScope::Train => {
                log::debug!(
                    "Fitting {} scaler on the first {} rows",
                    scaler.kind().as_str(),
                    fit_rows
                );
                scaler.fit(&linear.slice_rows(0, fit_rows))?
            }
        };

        let passthrough = fitted.passthrough_columns();
        if !passthrough.is_empty() {
            log::debug!("Columns left unscaled: {:?}", passthrough);
        }
        fitted.transform(linear)
    }

    fn symbolic(&mut self, scaled: &FeatureTable) -> Result<Option<SymbolicFeatureSet>> {
        let symbolic = &self.config.symbolic;
        if !symbolic.enabled {
            if self.config.selection.experiment == Experiment::SymbolicOnly {
                return Err(FeaturePipelineError::InvalidParameter(
                    "The symbolic_only experiment requires symbolic generation to be enabled"
                        .to_string(),
                ));
            }
            log::info!("Symbolic generation disabled");
            return Ok(None);
        }

        let generator = self.generator.as_mut().ok_or_else(|| {
            FeaturePipelineError::InvalidParameter(
                "Symbolic generation is enabled but no generator is configured".to_string(),
            )
        })?;

        let set = generate_symbolic_features(
            &mut **generator,
            scaled,
            &self.config.features.target,
            &symbolic.params,
        )?;
        for program in set.metadata.best_programs.iter().take(5) {
            log::info!(
                "  {} (fitness {:.4}, length {})",
                program.expression,
                program.fitness,
                program.length
            );
        }
        Ok(Some(set))
    }

    fn select(&self, linear: &FeatureTable, symbolic: &FeatureTable) -> Result<FeatureTable> {
        let selection = &self.config.selection;
        let selector = selection.selector()?;
        let table = build_experiment(
            selection.experiment,
            linear,
            symbolic,
            &self.config.features.target,
            &selector,
            selection.top_n,
        )?;
        log::info!(
            "Experiment {:?} keeps {} columns",
            selection.experiment,
            table.width()
        );
        Ok(table)
    }
}
