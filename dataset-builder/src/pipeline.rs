//! Dataset pipeline
//!
//! Loads the source tables, runs the alignment engine and the feature
//! transform in sequence, and writes the aligned table, every variant and a
//! JSON report. All paths are resolved against an explicit base directory.

use crate::alignment::AlignmentEngine;
use crate::config::{DatasetConfig, PriceInput, RateInput};
use crate::error::DatasetResult;
use crate::report::DatasetReport;
use crate::transform::{FeatureTransform, VariantTable};
use crate::variants::VariantManifest;
use anyhow::{anyhow, Context, Result};
use common::{InstrumentId, PriceObservation, RateObservation, SentimentTable, Table};
use data_ingestion::sinks::save_table;
use data_ingestion::sources;
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::Path;
use tracing::{info, warn};

/// Source tables for one run
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub prices: Vec<PriceObservation>,
    pub rates: Vec<RateObservation>,
    pub sentiment: SentimentTable,
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Aligned absolute-price table, before outlier removal
    pub aligned: Table,
    pub variants: Vec<VariantTable>,
    pub report: DatasetReport,
}

impl PipelineOutput {
    pub fn variant(&self, name: &str) -> Option<&Table> {
        self.variants.iter().find(|v| v.name == name).map(|v| &v.table)
    }
}

pub struct DatasetPipeline {
    config: DatasetConfig,
    manifest: VariantManifest,
}

impl DatasetPipeline {
    pub fn new(config: DatasetConfig) -> DatasetResult<Self> {
        config.validate()?;

        let manifest = match &config.features.variants {
            Some(variants) => VariantManifest::new(variants.clone()),
            None => VariantManifest::standard(&config.features.base_columns, &config.features.sentiment_columns),
        };

        info!(
            variants = manifest.len(),
            trailing = config.window.trailing,
            leading = config.window.leading,
            row_key = ?config.alignment.row_key,
            "Dataset pipeline configured"
        );

        Ok(Self { config, manifest })
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn manifest(&self) -> &VariantManifest {
        &self.manifest
    }

    /// Align, transform and build every variant from in-memory inputs
    pub fn run(&self, inputs: &PipelineInputs) -> DatasetResult<PipelineOutput> {
        let engine = AlignmentEngine::new(self.config.window, &self.config.alignment);
        let (aligned, stats) = engine.align(&inputs.prices, &inputs.rates, &inputs.sentiment);
        let aligned = aligned.to_table();

        let transform = FeatureTransform::from_config(&self.config.features);
        let variants = transform.build_variants(&aligned, &self.manifest)?;

        let excluded: HashSet<_> = self.config.features.exclude_dates.iter().collect();
        let excluded_rows = aligned.rows().iter().filter(|r| excluded.contains(&r.date)).count();

        let report = DatasetReport::new(&aligned, &variants, stats, excluded_rows);
        for shape in &report.variants {
            info!(variant = %shape.name, rows = shape.rows, columns = shape.columns, "Variant ready");
        }

        Ok(PipelineOutput {
            aligned,
            variants,
            report,
        })
    }

    /// Read every configured input table
    pub fn load_inputs(&self, base_dir: &Path) -> Result<PipelineInputs> {
        let inputs = &self.config.inputs;

        let prices = match &inputs.prices {
            PriceInput::Combined { path, date_format } => {
                sources::load_onehot_prices(&base_dir.join(path), date_format).context("Failed to load price table")?
            }
            PriceInput::PerInstrument {
                files,
                date_format,
                write_combined,
            } => {
                let mut series = Vec::with_capacity(files.len());
                for (code, path) in files {
                    let instrument =
                        InstrumentId::from_code(code).ok_or_else(|| anyhow!("unknown instrument '{}'", code))?;
                    let observations = sources::load_instrument_prices(&base_dir.join(path), instrument, date_format)
                        .with_context(|| format!("Failed to load {} prices", instrument))?;
                    series.push((instrument, observations));
                }
                let combined = sources::combine_instrument_series(series);

                if let Some(target) = write_combined {
                    let target = base_dir.join(target);
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)
                            .with_context(|| format!("Failed to create {}", parent.display()))?;
                    }
                    let file = File::create(&target)
                        .with_context(|| format!("Failed to create {}", target.display()))?;
                    sources::write_onehot_prices(file, &combined, date_format)
                        .context("Failed to write combined price table")?;
                    info!(path = %target.display(), rows = combined.len(), "Combined price table written");
                }

                combined
            }
        };

        let rates = match &inputs.rates {
            RateInput::Prepared { path, date_format } => {
                sources::load_rates(&base_dir.join(path), date_format).context("Failed to load rate table")?
            }
            RateInput::Derived {
                levels,
                announcements,
                level_date_format,
                announcement_date_format,
                since,
            } => {
                let levels = sources::load_rate_levels(&base_dir.join(levels), level_date_format)
                    .context("Failed to load rate levels")?;
                let dates = sources::load_announcement_dates(&base_dir.join(announcements), announcement_date_format)
                    .context("Failed to load announcement dates")?;
                sources::derive_rate_changes(&levels, &dates, *since)
            }
        };

        let sentiment_columns = &self.config.features.sentiment_columns;
        let sentiment = match &inputs.sentiment {
            Some(input) => sources::load_sentiment(&base_dir.join(&input.path), sentiment_columns, &input.date_format)
                .context("Failed to load sentiment table")?,
            None => {
                warn!("No sentiment input configured, sentiment columns stay empty");
                SentimentTable::new(sentiment_columns.clone())
            }
        };

        Ok(PipelineInputs {
            prices,
            rates,
            sentiment,
        })
    }

    /// Write the aligned table, every variant and the report
    pub fn write_outputs(&self, output: &PipelineOutput, base_dir: &Path) -> Result<()> {
        let out_dir = base_dir.join(&self.config.output.dir);
        fs::create_dir_all(&out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

        save_table(&out_dir.join(&self.config.output.aligned_filename), &output.aligned, "aligned")
            .context("Failed to write aligned table")?;

        for variant in &output.variants {
            save_table(&out_dir.join(format!("{}.csv", variant.name)), &variant.table, &variant.name)
                .with_context(|| format!("Failed to write variant {}", variant.name))?;
        }

        output.report.save(&out_dir.join(&self.config.output.report_filename))?;

        info!(dir = %out_dir.display(), variants = output.variants.len(), "All datasets exported");
        Ok(())
    }

    /// Load, run and write in one pass
    pub fn run_from_files(&self, base_dir: &Path) -> Result<PipelineOutput> {
        let inputs = self.load_inputs(base_dir)?;
        let output = self.run(&inputs).context("Dataset construction failed")?;
        self.write_outputs(&output, base_dir)?;
        Ok(output)
    }
}
