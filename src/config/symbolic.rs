use super::traits::ConfigSection;
use crate::error::FeaturePipelineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Primitive functions a symbolic search may combine
pub const KNOWN_FUNCTIONS: &[&str] = &[
    "add", "sub", "mul", "div", "sqrt", "log", "abs", "neg", "inv", "max", "min", "sin", "cos",
    "tan",
];

pub const INIT_METHODS: &[&str] = &["grow", "full", "half and half"];

pub const METRICS: &[&str] = &["pearson", "spearman"];

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Parameter bundle handed to the symbolic feature generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolicParams {
    pub functions: Vec<String>,
    pub population: usize,
    pub tournament: usize,
    pub hall_of_fame: usize,
    pub generations: usize,
    pub n_features: usize,
    pub init_depth: (usize, usize),
    pub init_method: String,
    pub parsimony: f64,
    pub metric: String,
    pub metric_goal: f64,
    pub prob_crossover: f64,
    pub prob_subtree_mutation: f64,
    pub prob_hoist_mutation: f64,
    pub prob_point_mutation: f64,
    /// Fraction of rows sampled per program; anything below 1 shuffles time order
    pub max_samples: f64,
    pub parallelization: bool,
    pub warm_start: bool,
    pub verbose: bool,
}

impl Default for SymbolicParams {
    fn default() -> Self {
        Self {
            functions: ["sub", "add", "inv", "mul", "div", "abs", "log", "sqrt"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            population: 12000,
            tournament: 3000,
            hall_of_fame: 30,
            generations: 5,
            n_features: 30,
            init_depth: (4, 10),
            init_method: "half and half".to_string(),
            parsimony: 0.001,
            metric: "pearson".to_string(),
            metric_goal: 0.90,
            prob_crossover: 0.4,
            prob_subtree_mutation: 0.5,
            prob_hoist_mutation: 0.05,
            prob_point_mutation: 0.05,
            max_samples: 1.0,
            parallelization: true,
            warm_start: true,
            verbose: true,
        }
    }
}

impl SymbolicParams {
    pub fn probability_sum(&self) -> f64 {
        self.prob_crossover
            + self.prob_subtree_mutation
            + self.prob_hoist_mutation
            + self.prob_point_mutation
    }
}

fn invalid(message: String) -> FeaturePipelineError {
    FeaturePipelineError::InvalidConfiguration(message)
}

impl ConfigSection for SymbolicParams {
    fn section_name() -> &'static str {
        "symbolic.params"
    }

    fn validate(&self) -> Result<(), FeaturePipelineError> {
        let probabilities = [
            ("prob_crossover", self.prob_crossover),
            ("prob_subtree_mutation", self.prob_subtree_mutation),
            ("prob_hoist_mutation", self.prob_hoist_mutation),
            ("prob_point_mutation", self.prob_point_mutation),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{} must be between 0 and 1, got {}", name, p)));
            }
        }
        let sum = self.probability_sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(invalid(format!(
                "Crossover and mutation probabilities must sum to 1.0, got {:.4}",
                sum
            )));
        }

        if self.functions.is_empty() {
            return Err(invalid("Function set is empty".to_string()));
        }
        if let Some(unknown) = self
            .functions
            .iter()
            .find(|f| !KNOWN_FUNCTIONS.contains(&f.as_str()))
        {
            return Err(invalid(format!("Unknown function: {}", unknown)));
        }
        if !INIT_METHODS.contains(&self.init_method.as_str()) {
            return Err(invalid(format!("Unknown init method: {}", self.init_method)));
        }
        if !METRICS.contains(&self.metric.as_str()) {
            return Err(invalid(format!("Unknown metric: {}", self.metric)));
        }

        if self.population == 0 || self.generations == 0 {
            return Err(invalid(
                "Population and generation count must be positive".to_string(),
            ));
        }
        if self.tournament == 0 || self.tournament > self.population {
            return Err(invalid(format!(
                "Tournament size {} must be in 1..={}",
                self.tournament, self.population
            )));
        }
        if self.hall_of_fame > self.population {
            return Err(invalid(format!(
                "Hall of fame {} exceeds population {}",
                self.hall_of_fame, self.population
            )));
        }
        if self.n_features == 0 || self.n_features > self.hall_of_fame {
            return Err(invalid(format!(
                "Feature count {} must be in 1..={} (hall of fame)",
                self.n_features, self.hall_of_fame
            )));
        }
        if self.init_depth.0 > self.init_depth.1 {
            return Err(invalid(format!(
                "Init depth range ({}, {}) is reversed",
                self.init_depth.0, self.init_depth.1
            )));
        }
        if !(self.max_samples > 0.0 && self.max_samples <= 1.0) {
            return Err(invalid(format!(
                "max_samples must be in (0, 1], got {}",
                self.max_samples
            )));
        }
        if self.parsimony < 0.0 {
            return Err(invalid("Parsimony coefficient must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// Symbolic generation stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolicConfig {
    pub enabled: bool,
    /// Directory holding `features.csv` and `metadata.json` from an external search
    pub features_dir: Option<PathBuf>,
    pub params: SymbolicParams,
}

impl Default for SymbolicConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            features_dir: None,
            params: SymbolicParams::default(),
        }
    }
}

impl ConfigSection for SymbolicConfig {
    fn section_name() -> &'static str {
        "symbolic"
    }

    fn validate(&self) -> Result<(), FeaturePipelineError> {
        self.params.validate()
    }
}
