use crate::config::{ConfigSection, SymbolicParams};
use crate::error::{FeaturePipelineError, Result};
use crate::table::FeatureTable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Prefix applied to generated columns whose names clash with input columns
pub const SYMBOLIC_PREFIX: &str = "sym_";

/// One evolved program kept in the hall of fame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub expression: String,
    /// Fitness penalised by program length
    pub fitness: f64,
    pub raw_fitness: f64,
    pub length: usize,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub average_length: f64,
    pub average_fitness: f64,
    pub best_length: usize,
    pub best_fitness: f64,
    #[serde(default)]
    pub generation_time_secs: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolicMetadata {
    pub best_programs: Vec<ProgramSummary>,
    #[serde(default)]
    pub generations: Vec<GenerationStats>,
}

#[derive(Debug, Clone)]
pub struct SymbolicFeatureSet {
    pub features: FeatureTable,
    pub metadata: SymbolicMetadata,
}

/// Produces new feature columns by searching over programs of the input columns.
///
/// Implementations own the search. `&mut self` lets a generator carry its
/// population between calls when `warm_start` is set.
pub trait SymbolicFeatureGenerator {
    fn generate(
        &mut self,
        features: &FeatureTable,
        target: &str,
        params: &SymbolicParams,
    ) -> Result<SymbolicFeatureSet>;

    fn name(&self) -> &str;
}

/// Validate the parameters, run the generator and check what came back.
///
/// Nothing is handed to the generator unless the parameter bundle is valid and
/// the target exists. The returned table must be row-aligned with the input;
/// generated names that collide with input columns get the `sym_` prefix.
pub fn generate_symbolic_features<G: SymbolicFeatureGenerator + ?Sized>(
    generator: &mut G,
    features: &FeatureTable,
    target: &str,
    params: &SymbolicParams,
) -> Result<SymbolicFeatureSet> {
    params.validate()?;
    features.require_column(target)?;

    log::info!(
        "Running symbolic generator '{}' on {} rows x {} columns (population {}, generations {})",
        generator.name(),
        features.height(),
        features.width(),
        params.population,
        params.generations
    );

    let generated = generator
        .generate(features, target, params)
        .map_err(|e| match e {
            FeaturePipelineError::Collaborator(_) => e,
            other => FeaturePipelineError::Collaborator(format!(
                "{} failed: {}",
                generator.name(),
                other
            )),
        })?;

    if generated.features.height() != features.height() {
        return Err(FeaturePipelineError::Collaborator(format!(
            "{} returned {} rows, expected {}",
            generator.name(),
            generated.features.height(),
            features.height()
        )));
    }

    for (name, values) in generated.features.columns()? {
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(FeaturePipelineError::Collaborator(format!(
                "{} returned a non-finite value in '{}' at row {}",
                generator.name(),
                name,
                row
            )));
        }
    }

    let features_out = prefix_collisions(&generated.features, features)?;
    log::info!(
        "Symbolic generator produced {} features ({} programs reported)",
        features_out.width(),
        generated.metadata.best_programs.len()
    );

    Ok(SymbolicFeatureSet {
        features: features_out,
        metadata: generated.metadata,
    })
}

fn prefix_collisions(generated: &FeatureTable, input: &FeatureTable) -> Result<FeatureTable> {
    let taken: HashSet<String> = input.column_names().into_iter().collect();
    let mut columns = Vec::with_capacity(generated.width());

    for (name, values) in generated.columns()? {
        let name = if taken.contains(&name) {
            format!("{}{}", SYMBOLIC_PREFIX, name)
        } else {
            name
        };
        columns.push((name, values));
    }

    FeatureTable::from_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns fixed columns and counts how often it was asked.
    struct StubGenerator {
        calls: usize,
        rows: Option<usize>,
        poison: bool,
    }

    impl SymbolicFeatureGenerator for StubGenerator {
        fn generate(
            &mut self,
            features: &FeatureTable,
            target: &str,
            _params: &SymbolicParams,
        ) -> Result<SymbolicFeatureSet> {
            self.calls += 1;
            let n = self.rows.unwrap_or(features.height());
            let mut doubled: Vec<f64> =
                features.column(target)?.iter().take(n).map(|v| v * 2.0).collect();
            if self.poison {
                doubled[1] = f64::NAN;
            }
            Ok(SymbolicFeatureSet {
                features: FeatureTable::from_columns(vec![
                    ("a".to_string(), doubled.clone()),
                    ("gp_0".to_string(), doubled),
                ])?,
                metadata: SymbolicMetadata {
                    best_programs: vec![ProgramSummary {
                        expression: format!("mul({}, 2)", target),
                        fitness: 0.99,
                        raw_fitness: 1.0,
                        length: 3,
                        depth: 1,
                    }],
                    generations: vec![],
                },
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn input() -> FeatureTable {
        FeatureTable::from_columns(vec![
            ("a".to_string(), vec![1.0, 2.0, 3.0]),
            ("co".to_string(), vec![0.5, -0.5, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_collisions_get_prefix() {
        let mut generator = StubGenerator { calls: 0, rows: None, poison: false };
        let set = generate_symbolic_features(&mut generator, &input(), "co", &SymbolicParams::default())
            .unwrap();

        assert_eq!(set.features.column_names(), vec!["sym_a", "gp_0"]);
        assert_eq!(set.features.column("gp_0").unwrap(), vec![1.0, -1.0, 2.0]);
        assert_eq!(set.metadata.best_programs.len(), 1);
        assert_eq!(generator.calls, 1);
    }

    #[test]
    fn test_invalid_params_never_reach_generator() {
        let mut generator = StubGenerator { calls: 0, rows: None, poison: false };
        let params = SymbolicParams {
            prob_crossover: 0.35,
            ..SymbolicParams::default()
        };
        let result = generate_symbolic_features(&mut generator, &input(), "co", &params);

        assert!(matches!(result, Err(FeaturePipelineError::InvalidConfiguration(_))));
        assert_eq!(generator.calls, 0);
    }

    #[test]
    fn test_missing_target_never_reaches_generator() {
        let mut generator = StubGenerator { calls: 0, rows: None, poison: false };
        let result =
            generate_symbolic_features(&mut generator, &input(), "hl", &SymbolicParams::default());
        assert!(matches!(result, Err(FeaturePipelineError::MissingColumn(_))));
        assert_eq!(generator.calls, 0);
    }

    #[test]
    fn test_row_mismatch_is_collaborator_error() {
        let mut generator = StubGenerator { calls: 0, rows: Some(2), poison: false };
        let result =
            generate_symbolic_features(&mut generator, &input(), "co", &SymbolicParams::default());
        assert!(matches!(result, Err(FeaturePipelineError::Collaborator(_))));
    }

    #[test]
    fn test_non_finite_output_is_collaborator_error() {
        let mut generator = StubGenerator { calls: 0, rows: None, poison: true };
        let result =
            generate_symbolic_features(&mut generator, &input(), "co", &SymbolicParams::default());
        assert!(matches!(result, Err(FeaturePipelineError::Collaborator(_))));
    }

    #[test]
    fn test_metadata_json_shape() {
        let json = r#"{"best_programs":[{"expression":"add(a, b)","fitness":0.8,"raw_fitness":0.81,"length":3,"depth":1}]}"#;
        let metadata: SymbolicMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.best_programs[0].expression, "add(a, b)");
        assert!(metadata.generations.is_empty());
    }
}
