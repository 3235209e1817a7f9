//! Build the standard dataset variants from a small in-memory sample

use chrono::{Duration, NaiveDate};
use common::{InstrumentId, PriceObservation, RateObservation, SentimentTable};
use dataset_builder::{DatasetConfig, DatasetPipeline, PipelineInputs};

fn main() -> anyhow::Result<()> {
    println!("=== Announcement Dataset Example ===\n");

    let start = NaiveDate::from_ymd_opt(2024, 3, 1).ok_or_else(|| anyhow::anyhow!("invalid start date"))?;
    let prices: Vec<PriceObservation> = (0..40)
        .flat_map(|n| {
            let date = start + Duration::days(n);
            [
                PriceObservation {
                    date,
                    instrument: InstrumentId::Dax,
                    open: None,
                    close: 17_500.0 + (n as f64 * 0.7).sin() * 120.0,
                },
                PriceObservation {
                    date,
                    instrument: InstrumentId::Mdax,
                    open: None,
                    close: 26_000.0 + n as f64 * 15.0,
                },
            ]
        })
        .collect();

    let announcements = [start + Duration::days(17), start + Duration::days(31)];
    let rates: Vec<RateObservation> = announcements
        .iter()
        .zip([(4.0, 0.0), (3.75, -0.25)])
        .map(|(&date, (rate_level, rate_change))| RateObservation {
            date,
            rate_level,
            rate_change,
        })
        .collect();

    let config = DatasetConfig::default();
    let mut sentiment = SentimentTable::new(config.features.sentiment_columns.clone());
    sentiment.insert(announcements[0], vec![Some(0.21), Some(0.14), Some(-0.03), Some(0.08)]);

    println!("Example 1: Running the pipeline with default settings");
    let pipeline = DatasetPipeline::new(config)?;
    let output = pipeline.run(&PipelineInputs {
        prices,
        rates,
        sentiment,
    })?;
    println!(
        "  Aligned: {} rows x {} columns",
        output.aligned.num_rows(),
        output.aligned.num_columns()
    );
    println!("  Ambiguous dates: {}\n", output.report.alignment.ambiguous_dates);

    println!("Example 2: Variant shapes");
    for variant in &output.variants {
        println!(
            "  {}: {} rows x {} columns",
            variant.name,
            variant.table.num_rows(),
            variant.table.num_columns()
        );
    }

    println!("\nExample 3: Targets relative to Close_t-1");
    if let Some(base) = output.variant("dataset_base") {
        for (idx, date) in base.dates().iter().enumerate() {
            println!(
                "  {}: Close {:+.3}%  Close_t+1 {:+.3}%",
                date,
                base.value(idx, "Close").unwrap_or(f64::NAN),
                base.value(idx, "Close_t+1").unwrap_or(f64::NAN)
            );
        }
    }

    Ok(())
}
