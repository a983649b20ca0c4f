use genetic_features::config::{AppConfig, FitScope, SymbolicParams, SyntheticConfig};
use genetic_features::data::{BarSource, CachedBarSource, SyntheticConnector};
use genetic_features::engines::generation::{
    generate_symbolic_features, ProgramSummary, SymbolicFeatureGenerator, SymbolicFeatureSet,
    SymbolicMetadata,
};
use genetic_features::engines::splitters::{ChronologicalSplitter, DataSplitter};
use genetic_features::engines::Pipeline;
use genetic_features::ml::features::{scale, LinearFeatureBuilder};
use genetic_features::ml::filtering::{Experiment, FeatureSelector};
use genetic_features::utils::stats;
use genetic_features::{FeaturePipelineError, FeatureTable, Result, Stage};
use std::cell::Cell;
use std::rc::Rc;

fn table(columns: Vec<(&str, Vec<f64>)>) -> FeatureTable {
    FeatureTable::from_columns(
        columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), values))
            .collect(),
    )
    .unwrap()
}

/// Builds two programs from the target and the first lag, and records every call.
struct RecordingGenerator {
    calls: Rc<Cell<usize>>,
}

impl SymbolicFeatureGenerator for RecordingGenerator {
    fn generate(
        &mut self,
        features: &FeatureTable,
        target: &str,
        _params: &SymbolicParams,
    ) -> Result<SymbolicFeatureSet> {
        self.calls.set(self.calls.get() + 1);
        let lag = features.column(&format!("{}_lag_1", target))?;
        let hl = features.column("hl")?;

        let product: Vec<f64> = lag.iter().zip(&hl).map(|(a, b)| a * b).collect();
        let absolute: Vec<f64> = lag.iter().map(|v| v.abs()).collect();

        Ok(SymbolicFeatureSet {
            features: FeatureTable::from_columns(vec![
                ("gp_0".to_string(), product),
                ("gp_1".to_string(), absolute),
            ])?,
            metadata: SymbolicMetadata {
                best_programs: vec![ProgramSummary {
                    expression: format!("mul({}_lag_1, hl)", target),
                    fitness: 0.2,
                    raw_fitness: 0.21,
                    length: 3,
                    depth: 1,
                }],
                generations: vec![],
            },
        })
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[test]
fn test_monotonic_close_lags_then_standardises() {
    let close: Vec<f64> = (1..=20).map(|i| 100.0 + i as f64).collect();
    let bars = table(vec![("close", close)]);

    let linear = LinearFeatureBuilder::new(3, "close").build(&bars).unwrap();

    assert_eq!(linear.height(), 17);
    assert_eq!(
        linear.column_names(),
        vec!["close", "close_lag_1", "close_lag_2", "close_lag_3"]
    );
    // First kept row is bar 3; its first lag is bar 2
    assert_eq!(linear.column("close").unwrap()[0], 104.0);
    assert_eq!(linear.column("close_lag_1").unwrap()[0], 103.0);

    let scaled = scale(&linear, "standard").unwrap();
    let lag_1 = scaled.column("close_lag_1").unwrap();
    assert!(stats::mean(&lag_1).abs() < 1e-9);
    assert!((stats::sample_std(&lag_1).powi(2) - 1.0).abs() < 1e-9);
}

#[test]
fn test_eighty_percent_split_of_ten_rows() {
    let data = table(vec![
        ("t", (0..10).map(|i| i as f64).collect()),
        ("x", (0..10).map(|i| (i * i) as f64).collect()),
    ]);

    let split = ChronologicalSplitter::new(0.8).split(&data, "t").unwrap();
    assert_eq!(split.train_rows(), 8);
    assert_eq!(split.val_rows(), 2);
    assert_eq!(split.train_x.column_names(), vec!["x"]);

    let train_t = split.train_y.column("t").unwrap();
    let val_t = split.val_y.column("t").unwrap();
    assert_eq!(val_t, vec![8.0, 9.0]);
    assert!(train_t.iter().all(|t| val_t.iter().all(|v| t < v)));
}

#[test]
fn test_duplicated_columns_keep_the_first() {
    let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let b: Vec<f64> = a.iter().map(|v| 2.0 * v).collect();
    let c: Vec<f64> = a.iter().map(|v| 3.0 * v + 1.0).collect();
    let data = table(vec![
        ("y", vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0]),
        ("a", a),
        ("b", b),
        ("c", c),
    ]);

    let outcome = FeatureSelector::new(0.0, 0.5).unwrap().select(&data, "y").unwrap();
    assert!(outcome.dropped_low_target.is_empty());
    assert_eq!(outcome.table.column_names(), vec!["y", "a"]);
    assert_eq!(outcome.dropped_redundant, vec!["b", "c"]);
}

#[test]
fn test_bad_probabilities_stop_before_generator() {
    let calls = Rc::new(Cell::new(0));
    let mut generator = RecordingGenerator {
        calls: Rc::clone(&calls),
    };
    let params = SymbolicParams {
        prob_crossover: 0.4,
        prob_subtree_mutation: 0.45,
        prob_hoist_mutation: 0.05,
        prob_point_mutation: 0.05,
        ..SymbolicParams::default()
    };
    let data = table(vec![
        ("co", vec![1.0, 2.0, 3.0]),
        ("co_lag_1", vec![0.0, 1.0, 2.0]),
        ("hl", vec![1.0, 1.0, 2.0]),
    ]);

    let result = generate_symbolic_features(&mut generator, &data, "co", &params);
    assert!(matches!(result, Err(FeaturePipelineError::InvalidConfiguration(_))));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_full_run_with_symbolic_features() {
    let calls = Rc::new(Cell::new(0));
    let mut config = AppConfig::default();
    config.features.memory = 2;
    config.symbolic.enabled = true;
    config.selection.experiment = Experiment::Combined;
    config.model.ridge = 1e-3;

    let source = SyntheticConnector::new(SyntheticConfig {
        bars: 120,
        seed: 3,
        ..SyntheticConfig::default()
    });
    let mut pipeline = Pipeline::new(config, Box::new(source))
        .unwrap()
        .with_generator(Box::new(RecordingGenerator {
            calls: Rc::clone(&calls),
        }));

    let output = pipeline.run().unwrap();
    let report = &output.report;

    assert_eq!(calls.get(), 1);
    assert_eq!(report.bars, 120);
    assert_eq!(output.linear.height(), 118);
    assert_eq!(report.symbolic_columns, vec!["gp_0", "gp_1"]);
    assert_eq!(report.best_programs.len(), 1);
    // 9 spreads x 3 plus 2 symbolic columns
    assert_eq!(report.selected_columns.len(), 29);
    assert_eq!(report.train_rows + report.validation_rows, 118);
    assert_eq!(report.training.features.len(), 28);
    assert!(report.training.train.r2 > 0.0);

    let json = serde_json::to_string(report).unwrap();
    assert!(json.contains("\"experiment\":\"combined\""));
}

#[test]
fn test_threshold_run_from_cached_bars() {
    let dir = std::env::temp_dir().join(format!("genfeat_it_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let cache = dir.join("bars.csv");

    let source = CachedBarSource::new(
        SyntheticConnector::new(SyntheticConfig {
            bars: 150,
            ..SyntheticConfig::default()
        }),
        &cache,
    );
    let bars = source.load().unwrap();
    assert!(cache.exists());

    let mut config = AppConfig::default();
    config.data.cache_path = Some(cache.clone());
    config.model.ridge = 1e-3;
    let mut pipeline = Pipeline::from_config(config).unwrap();
    let output = pipeline.run().unwrap();

    assert_eq!(output.report.bars, bars.len());
    assert_eq!(output.report.selected_columns[0], "co");
    // Each selected feature clears the target threshold on the combined table
    for name in output.report.selected_columns.iter().skip(1) {
        let corr = stats::pearson(
            &output.scaled.column(name).unwrap(),
            &output.scaled.column("co").unwrap(),
        );
        assert!(corr.abs() >= 0.10);
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_split_failure_names_stage() {
    for scope in [FitScope::Full, FitScope::Train] {
        let mut config = AppConfig::default();
        config.features.memory = 1;
        config.features.fit_scope = scope;
        config.selection.experiment = Experiment::Combined;

        let source = SyntheticConnector::new(SyntheticConfig {
            bars: 2,
            ..SyntheticConfig::default()
        });
        let err = Pipeline::new(config, Box::new(source))
            .unwrap()
            .run()
            .err()
            .unwrap();

        assert_eq!(err.stage(), Some(Stage::Split));
        assert!(matches!(err.root(), FeaturePipelineError::InvalidParameter(_)));
    }
}
