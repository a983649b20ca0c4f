use anyhow::{bail, Context};
use genetic_features::config::ConfigManager;
use genetic_features::engines::Pipeline;
use genetic_features::ml::features::DataProfile;
use genetic_features::ml::filtering::{CorrelationMatrix, CorrelationMethod};
use std::path::PathBuf;

const USAGE: &str = "usage: genetic_features [CONFIG.toml] [--report REPORT.json]";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config_path: Option<PathBuf> = None;
    let mut report_path: Option<PathBuf> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--report" => match args.next() {
                Some(path) => report_path = Some(PathBuf::from(path)),
                None => bail!("--report needs a path\n{}", USAGE),
            },
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            other if config_path.is_none() => config_path = Some(PathBuf::from(other)),
            other => bail!("unexpected argument '{}'\n{}", other, USAGE),
        }
    }

    let mut manager = ConfigManager::new();
    match &config_path {
        Some(path) => manager
            .load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => log::info!("No config file given, running with defaults on synthetic bars"),
    }

    let mut pipeline = Pipeline::from_config(manager.get().clone())?;
    let output = pipeline.run()?;

    println!("Linear features\n{}", DataProfile::of(&output.linear)?);
    if let Some(symbolic) = &output.symbolic {
        println!("Symbolic features\n{}", DataProfile::of(&symbolic.features)?);
    }
    println!(
        "Selected features ({:?})\n{}",
        output.report.experiment,
        DataProfile::of(&output.experiment)?
    );
    println!(
        "{}",
        CorrelationMatrix::compute(&output.experiment, CorrelationMethod::Pearson)?
    );

    let training = &output.report.training;
    println!(
        "{} on {} features: train R2 {:.4} RMSE {:.4} | validation R2 {:.4} RMSE {:.4}",
        training.model,
        training.features.len(),
        training.train.r2,
        training.train.rmse,
        training.validation.r2,
        training.validation.rmse
    );

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&output.report)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }

    Ok(())
}
