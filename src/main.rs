//! studperf: Student Performance Training CLI
//!
//! Runs ingestion, transformation and model selection end to end, or
//! predicts with previously trained artifacts.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use studperf::cli::{Cli, PredictSettings};
use studperf::pipeline::{DataIngestion, DataTransformation, ModelTrainer, PredictPipeline};
use studperf::report::{export_selection_report, ExportParams, TrainingSummary};
use studperf::utils::{
    create_spinner, finish_with_error, finish_with_success, print_banner, print_completion,
    print_config, print_info, print_step_header, print_step_time, print_success,
};
use studperf::{PipelineConfig, PipelineError};

fn init_tracing(verbose: bool) {
    let default = if verbose { "studperf=debug" } else { "studperf=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.pipeline_config().context("Invalid configuration")?;
    if let Some(settings) = cli.predict_settings(&config) {
        return run_predict(&settings);
    }

    run_training(&config, cli.skip_training)
}

fn run_training(config: &PipelineConfig, skip_training: bool) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &config.source_path,
        &config.schema.target_column,
        &config.artifacts_dir,
        config.test_size,
        config.min_score,
    );

    let mut summary = TrainingSummary::default();

    // Step 1: Ingestion
    print_step_header(1, "Data Ingestion");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading and splitting the dataset...");
    let ingestion = DataIngestion::new(config.ingestion(), config.schema.clone());
    let split = match ingestion.run() {
        Ok(split) => split,
        Err(e) => {
            finish_with_error(&spinner, "Ingestion failed");
            return Err(e).context("Data ingestion failed");
        }
    };
    finish_with_success(&spinner, "Dataset split");
    println!(
        "      Train rows: {}   Test rows: {}",
        style(split.train_rows).yellow().bold(),
        style(split.test_rows).yellow().bold()
    );
    summary.train_rows = split.train_rows;
    summary.test_rows = split.test_rows;
    summary.ingestion_time = step_start.elapsed();
    print_step_time(summary.ingestion_time);

    // Step 2: Transformation
    print_step_header(2, "Data Transformation");
    let step_start = Instant::now();
    let spinner = create_spinner("Fitting the preprocessor...");
    let transformation = DataTransformation::new(config.transformation(), config.schema.clone());
    let matrices = match transformation.run(&split.train_path, &split.test_path) {
        Ok(m) => m,
        Err(e) => {
            finish_with_error(&spinner, "Transformation failed");
            return Err(e).context("Data transformation failed");
        }
    };
    finish_with_success(
        &spinner,
        &format!("Preprocessor saved to {}", matrices.preprocessor_path.display()),
    );
    summary.n_features = matrices.train.ncols().saturating_sub(1);
    println!(
        "      Feature columns: {}",
        style(summary.n_features).yellow().bold()
    );
    summary.transformation_time = step_start.elapsed();
    print_step_time(summary.transformation_time);

    if skip_training {
        print_info("Training skipped (--skip-training)");
        summary.display();
        print_completion("Preprocessing complete!");
        return Ok(());
    }

    // Step 3: Model selection and training
    print_step_header(3, "Model Training");
    let step_start = Instant::now();
    let spinner = create_spinner("Grid-searching candidate models...");
    let trainer = ModelTrainer::new(config.trainer());
    let outcome = match trainer.run(&matrices.train, &matrices.test) {
        Ok(outcome) => outcome,
        Err(e) => {
            finish_with_error(&spinner, "Training failed");
            if let PipelineError::NoAcceptableModel { .. } = e {
                print_info("Lower --min-score to accept a weaker model");
            }
            return Err(e).context("Model training failed");
        }
    };
    finish_with_success(&spinner, &format!("Evaluated {} candidate(s)", outcome.report.len()));
    summary.training_time = step_start.elapsed();
    summary.best_model = Some(outcome.best_model_name.clone());
    summary.best_score = Some(outcome.best_score);
    print_step_time(summary.training_time);

    outcome.report.display();

    let report_path = config.report_path();
    let source = config.source_path.display().to_string();
    export_selection_report(
        &outcome.report,
        &report_path,
        &ExportParams {
            input_file: &source,
            target_column: &config.schema.target_column,
            train_rows: split.train_rows,
            test_rows: split.test_rows,
            cv_folds: config.cv_folds,
            min_score: config.min_score,
        },
    )
    .context("Failed to write the selection report")?;
    print_success(&format!("Report saved to {}", report_path.display()));
    print_success(&format!("Model saved to {}", outcome.model_path.display()));

    summary.display();
    println!();
    println!(
        "    Best model: {}  (test R² = {:.4})",
        style(&outcome.best_model_name).green().bold(),
        outcome.best_score
    );
    print_completion("Training complete!");

    Ok(())
}

fn run_predict(settings: &PredictSettings) -> Result<()> {
    let spinner = create_spinner("Predicting...");
    let pipeline = PredictPipeline::from_artifacts(&settings.artifacts_dir).with_context(|| {
        format!("Failed to load artifacts from {}", settings.artifacts_dir.display())
    })?;
    let rows = pipeline
        .predict_file(&settings.input, &settings.output, &settings.target_column)
        .with_context(|| format!("Failed to predict for {}", settings.input.display()))?;
    finish_with_success(
        &spinner,
        &format!("Wrote {} prediction(s) to {}", rows, settings.output.display()),
    );

    Ok(())
}
