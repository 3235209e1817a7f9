use anyhow::Result;
use clap::Parser;
use dataset_builder::cli::{init_config, resolve_run, Cli, Commands};
use dataset_builder::DatasetPipeline;
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::fmt;

fn main() -> Result<()> {
    // Initialize logging
    fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run(&config),
        Commands::Init { config } => init_config(&config),
    }
}

fn run(config_path: &Path) -> Result<()> {
    let (config, base_dir) = resolve_run(config_path)?;

    info!("Starting announcement dataset build");
    let pipeline = DatasetPipeline::new(config)?;
    let output = pipeline.run_from_files(&base_dir)?;

    let stats = &output.report.alignment;
    info!(
        rows = output.report.aligned.rows,
        columns = output.report.aligned.columns,
        ambiguous_dates = stats.ambiguous_dates,
        missing_window_cells = stats.missing_window_cells,
        rows_without_sentiment = stats.rows_without_sentiment,
        "Aligned table"
    );
    for shape in &output.report.variants {
        info!("  {}: {} rows x {} columns", shape.name, shape.rows, shape.columns);
    }

    Ok(())
}
