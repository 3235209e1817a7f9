use chrono::NaiveDate;
use dataset_builder::{
    save_config, load_config, DatasetConfig, DatasetPipeline, PriceInput, RateInput, RowKey, SentimentInput,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
}

fn dax_close(n: u32) -> f64 {
    1000.0 + n as f64 * 10.0
}

/// DAX and MDAX both trade every day of January 1..=25
fn write_combined_prices(dir: &Path) {
    let mut data = String::from("Date,Open,Close,Index_DAX,Index_MDAX,Index_SDAX\n");
    for n in 1..=25 {
        let date = day(n).format("%d.%m.%Y");
        data.push_str(&format!("{},{},{},1.0,0.0,0.0\n", date, dax_close(n) - 1.0, dax_close(n)));
        data.push_str(&format!("{},,{},0.0,1.0,0.0\n", date, 500.0 + n as f64));
    }
    fs::write(dir.join("prices.csv"), data).unwrap();
}

fn write_rates(dir: &Path) {
    fs::write(
        dir.join("rates.csv"),
        "Date,Interest Rate_Old,Interest Rate_Change\n12.01.2024,4.0,0.0\n20.01.2024,4.25,0.25\n",
    )
    .unwrap();
}

fn write_sentiment(dir: &Path) {
    fs::write(
        dir.join("sentiment.csv"),
        "Date,FinBERT_Sentences,FinBERT_Chunks,RoBERTa_Sentences,RoBERTa_Chunks\n\
         20_January_2024,0.1,0.2,0.3,0.4\n\
         Average,0.1,0.2,0.3,0.4\n",
    )
    .unwrap();
}

fn base_config() -> DatasetConfig {
    let mut config = DatasetConfig::default();
    config.inputs.prices = PriceInput::Combined {
        path: PathBuf::from("prices.csv"),
        date_format: "%d.%m.%Y".to_string(),
    };
    config.inputs.rates = RateInput::Prepared {
        path: PathBuf::from("rates.csv"),
        date_format: "%d.%m.%Y".to_string(),
    };
    config.inputs.sentiment = Some(SentimentInput {
        path: PathBuf::from("sentiment.csv"),
        date_format: "%d_%B_%Y".to_string(),
    });
    config.output.dir = PathBuf::from("out");
    config.features.exclude_dates = vec![day(12)];
    config
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

#[test]
fn test_builds_every_dataset_from_files() {
    let dir = TempDir::new().unwrap();
    write_combined_prices(dir.path());
    write_rates(dir.path());
    write_sentiment(dir.path());

    let pipeline = DatasetPipeline::new(base_config()).unwrap();
    let output = pipeline.run_from_files(dir.path()).unwrap();

    // one row per announcement date, DAX preferred over MDAX
    assert_eq!(output.aligned.dates(), vec![day(12), day(20)]);
    assert_eq!(output.aligned.value(1, "Index_DAX"), Some(1.0));
    assert_eq!(output.aligned.value(1, "Close"), Some(dax_close(20)));
    assert_eq!(output.aligned.value(1, "Close_t-14"), Some(dax_close(6)));
    assert_eq!(output.aligned.value(1, "Close_t+3"), Some(dax_close(23)));
    assert_eq!(output.aligned.value(1, "RoBERTa_Chunks"), Some(0.4));
    assert_eq!(output.aligned.value(0, "FinBERT_Sentences"), None);
    assert_eq!(output.report.alignment.ambiguous_dates, 2);
    assert_eq!(output.report.alignment.rows_without_sentiment, 1);
    assert_eq!(output.report.excluded_rows, 1);

    let base = output.variant("dataset_base").unwrap();
    assert_eq!(base.dates(), vec![day(20)]);
    let expected = (dax_close(20) - dax_close(19)) / dax_close(19) * 100.0;
    assert!((base.value(0, "Close").unwrap() - expected).abs() < 1e-9);
    assert_eq!(base.value(0, "Interest Rate_Change"), Some(0.25));

    let out = dir.path().join("out");
    let aligned = fs::read_to_string(out.join("DS_14_t_3days_complete.csv")).unwrap();
    assert!(aligned.starts_with("Date,Close_t-14,Close_t-13,"));
    assert_eq!(aligned.lines().count(), 3);

    for name in [
        "dataset",
        "dataset_base",
        "dataset_finbert_sentences",
        "dataset_finbert_chunks",
        "dataset_roberta_sentences",
        "dataset_roberta_chunks",
    ] {
        let path = out.join(format!("{}.csv", name));
        assert_eq!(line_count(&path), 2, "{}", name);
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("2024-01-12"));
        assert!(content.lines().next().unwrap().ends_with("Close,Close_t+1,Close_t+2"));
    }

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["aligned"]["rows"], 2);
    assert_eq!(report["variants"].as_array().unwrap().len(), 6);
}

#[test]
fn test_rerun_produces_identical_files() {
    let dir = TempDir::new().unwrap();
    write_combined_prices(dir.path());
    write_rates(dir.path());
    write_sentiment(dir.path());

    let pipeline = DatasetPipeline::new(base_config()).unwrap();
    pipeline.run_from_files(dir.path()).unwrap();
    let out = dir.path().join("out");
    let first = fs::read(out.join("dataset.csv")).unwrap();
    let first_report = fs::read(out.join("report.json")).unwrap();

    pipeline.run_from_files(dir.path()).unwrap();
    assert_eq!(fs::read(out.join("dataset.csv")).unwrap(), first);
    assert_eq!(fs::read(out.join("report.json")).unwrap(), first_report);
}

#[test]
fn test_date_instrument_rows() {
    let dir = TempDir::new().unwrap();
    write_combined_prices(dir.path());
    write_rates(dir.path());
    write_sentiment(dir.path());

    let mut config = base_config();
    config.alignment.row_key = RowKey::DateInstrument;
    let output = DatasetPipeline::new(config).unwrap().run_from_files(dir.path()).unwrap();

    assert_eq!(output.aligned.num_rows(), 4);
    assert_eq!(output.variant("dataset").unwrap().num_rows(), 2);
}

#[test]
fn test_per_instrument_prices_and_derived_rates() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("raw");
    fs::create_dir_all(&raw).unwrap();

    let mut dax = String::from("Date,Open,Close\n");
    let mut sdax = String::from("Date,Open,Close\n");
    for n in 1..=25 {
        dax.push_str(&format!("{},{},{}\n", day(n), dax_close(n), dax_close(n)));
        if n >= 15 {
            sdax.push_str(&format!("{},,{}\n", day(n), 200.0 + n as f64));
        }
    }
    fs::write(raw.join("dax.csv"), dax).unwrap();
    fs::write(raw.join("sdax.csv"), sdax).unwrap();

    fs::write(
        raw.join("levels.csv"),
        "Date,Interest Rate\n2023-12-01,3.75\n2024-01-10,4.0\n2024-01-18,4.5\n2024-01-19,4.5\n",
    )
    .unwrap();
    fs::write(raw.join("announcements.csv"), "Date\n01.12.2023\n10.01.2024\n18.01.2024\n").unwrap();

    let mut files = BTreeMap::new();
    files.insert("DAX".to_string(), PathBuf::from("raw/dax.csv"));
    files.insert("SDAX".to_string(), PathBuf::from("raw/sdax.csv"));

    let mut config = base_config();
    config.inputs.prices = PriceInput::PerInstrument {
        files,
        date_format: "%Y-%m-%d".to_string(),
        write_combined: Some(PathBuf::from("prepared/combined.csv")),
    };
    config.inputs.rates = RateInput::Derived {
        levels: PathBuf::from("raw/levels.csv"),
        announcements: PathBuf::from("raw/announcements.csv"),
        level_date_format: "%Y-%m-%d".to_string(),
        announcement_date_format: "%d.%m.%Y".to_string(),
        since: NaiveDate::from_ymd_opt(2023, 12, 31),
    };
    config.inputs.sentiment = None;
    config.alignment.instrument_priority = vec![common::InstrumentId::Sdax, common::InstrumentId::Dax];

    let output = DatasetPipeline::new(config).unwrap().run_from_files(dir.path()).unwrap();

    // 2023-12-01 falls before the cutoff; the first kept change is zero
    assert_eq!(output.aligned.dates(), vec![day(10), day(18)]);
    assert_eq!(output.aligned.value(0, "Interest Rate_Change"), Some(0.0));
    assert_eq!(output.aligned.value(1, "Interest Rate_Change"), Some(0.5));

    // SDAX is preferred where it trades; its window starts on the 15th
    assert_eq!(output.aligned.value(0, "Index_DAX"), Some(1.0));
    assert_eq!(output.aligned.value(1, "Index_SDAX"), Some(1.0));
    assert_eq!(output.aligned.value(1, "Close_t-3"), Some(215.0));
    assert_eq!(output.aligned.value(1, "Close_t-4"), None);
    assert_eq!(output.aligned.value(1, "FinBERT_Chunks"), None);

    let combined = fs::read_to_string(dir.path().join("prepared/combined.csv")).unwrap();
    assert!(combined.starts_with("Date,Open,Close,Index_DAX,Index_SDAX"));
    assert_eq!(combined.lines().count(), 1 + 25 + 11);
}

#[test]
fn test_saved_config_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.toml");
    let config = base_config();

    save_config(&config, path.to_str().unwrap()).unwrap();
    let loaded = load_config(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded, config);
}
