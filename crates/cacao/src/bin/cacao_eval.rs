//! # cacao-eval
//!
//! Evaluate random forest rating prediction on the Flavors of Cacao data:
//! load → clean → split → baseline → nested CV → JSON report.

use std::path::PathBuf;
use std::process::ExitCode;

use cacao::config::{ConfigFileError, EvaluationConfig};
use cacao::data::columns::RATING;
use cacao::data::{load_clean, split_features_labels, LoadError, TableError};
use cacao::report::{DatasetSummary, EvaluationReport};
use cacao::validation::{guess_from_mean, NestedCrossValidator, ValidationError};
use cacao::ConfigError;
use clap::Parser;

#[derive(Parser)]
#[command(name = "cacao-eval")]
#[command(about = "Nested cross-validated evaluation of chocolate rating models", long_about = None)]
struct Cli {
    /// Raw review CSV (flavors_of_cacao.csv)
    #[arg(short, long)]
    data: PathBuf,

    /// Evaluation config (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report output file; stdout when omitted
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Thread count (0 = auto, 1 = sequential); overrides the config
    #[arg(short, long)]
    threads: Option<usize>,

    /// Only compute the mean-guessing baseline
    #[arg(long)]
    skip_nested: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigFileError),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to serialize report")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut message = err.to_string();
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                message.push_str(&format!(": {cause}"));
                source = cause.source();
            }
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => EvaluationConfig::from_path(path)?,
        None => EvaluationConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config.nested.n_threads = threads;
    }

    let table = load_clean(&cli.data, &config.cleaning)?;
    let (features, target) = split_features_labels(&table, RATING)?;
    let mut report = EvaluationReport::default().with_dataset(DatasetSummary {
        n_rows: features.n_rows(),
        n_features: features.n_columns(),
        target: target.name().to_string(),
    });

    let baseline = guess_from_mean(target.values(), &config.baseline)?;
    tracing::info!(
        n = baseline.len(),
        mean_mse = baseline.iter().sum::<f64>() / baseline.len() as f64,
        "baseline complete"
    );
    report = report.with_baseline(baseline);

    if !cli.skip_nested {
        let candidates = config.grid.candidates()?;
        tracing::info!(
            n_candidates = candidates.len(),
            n_trials = config.nested.n_trials,
            inner_folds = config.nested.inner_folds,
            outer_folds = config.nested.outer_folds,
            encoding = ?config.nested.encoding,
            "starting nested cross-validation"
        );
        let scores = NestedCrossValidator::new(config.nested.clone()).run(&features, &target, &candidates)?;
        let labels = candidates.iter().map(|c| c.label()).collect();
        report = report.with_nested(&scores, labels);
    }

    let json = report.to_json_pretty()?;
    match &cli.out {
        Some(path) => {
            std::fs::write(path, json).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "wrote report");
        }
        None => println!("{json}"),
    }
    Ok(())
}
