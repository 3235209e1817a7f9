//! Dataset builder configuration

use crate::error::{DatasetError, DatasetResult};
use crate::variants::VariantSpec;
use chrono::NaiveDate;
use common::columns::{leading_close, trailing_close, CLOSE, RATE_CHANGE, RATE_LEVEL};
use common::InstrumentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Overall pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Where the price, rate and sentiment tables come from
    #[serde(default)]
    pub inputs: InputConfig,

    /// Where the finished tables go
    #[serde(default)]
    pub output: OutputConfig,

    /// Trailing/leading window sizes around each announcement
    #[serde(default)]
    pub window: WindowConfig,

    /// How announcement dates are matched to instruments
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Feature/target transform and dataset variants
    #[serde(default)]
    pub features: FeatureConfig,
}

impl DatasetConfig {
    /// Check settings that would otherwise only fail halfway through a run
    pub fn validate(&self) -> DatasetResult<()> {
        if let PriceInput::PerInstrument { files, .. } = &self.inputs.prices {
            if files.is_empty() {
                return Err(DatasetError::InvalidConfig(
                    "inputs.prices.files must name at least one instrument file".to_string(),
                ));
            }
            for code in files.keys() {
                if InstrumentId::from_code(code).is_none() {
                    return Err(DatasetError::InvalidConfig(format!(
                        "unknown instrument '{}' in inputs.prices.files",
                        code
                    )));
                }
            }
        }

        let mut seen = HashSet::new();
        for id in &self.alignment.instrument_priority {
            if !seen.insert(id) {
                return Err(DatasetError::InvalidConfig(format!(
                    "instrument {} listed twice in alignment.instrument_priority",
                    id
                )));
            }
        }

        if let Some(variants) = &self.features.variants {
            let mut names = HashSet::new();
            for variant in variants {
                if variant.name.trim().is_empty() {
                    return Err(DatasetError::InvalidConfig("variant with empty name".to_string()));
                }
                if !names.insert(variant.name.as_str()) {
                    return Err(DatasetError::InvalidConfig(format!(
                        "variant '{}' defined twice",
                        variant.name
                    )));
                }
            }
        }

        if self.features.target_columns.is_empty() {
            return Err(DatasetError::InvalidConfig(
                "features.target_columns must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Input tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub prices: PriceInput,

    #[serde(default)]
    pub rates: RateInput,

    /// Sentiment scores; when absent every sentiment cell is unset
    #[serde(default)]
    pub sentiment: Option<SentimentInput>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            prices: PriceInput::default(),
            rates: RateInput::default(),
            sentiment: Some(SentimentInput::default()),
        }
    }
}

/// Price table layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceInput {
    /// One table tagged with `Index_*` one-hot columns
    Combined {
        path: PathBuf,
        #[serde(default = "default_table_date_format")]
        date_format: String,
    },
    /// One `Date,Open,Close` file per instrument code
    PerInstrument {
        files: BTreeMap<String, PathBuf>,
        #[serde(default = "default_table_date_format")]
        date_format: String,
        /// Also write the combined one-hot table here
        #[serde(default)]
        write_combined: Option<PathBuf>,
    },
}

impl Default for PriceInput {
    fn default() -> Self {
        PriceInput::Combined {
            path: PathBuf::from("02_Preprocessing/Stock_Preprocessed/stock_data_combined_onehot.csv"),
            date_format: default_table_date_format(),
        }
    }
}

/// Rate table source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateInput {
    /// Table that already carries level and change per announcement
    Prepared {
        path: PathBuf,
        #[serde(default = "default_table_date_format")]
        date_format: String,
    },
    /// Raw level series joined with the press-release dates
    Derived {
        levels: PathBuf,
        announcements: PathBuf,
        #[serde(default = "default_level_date_format")]
        level_date_format: String,
        #[serde(default = "default_table_date_format")]
        announcement_date_format: String,
        /// Only keep announcements strictly after this date
        #[serde(default)]
        since: Option<NaiveDate>,
    },
}

impl Default for RateInput {
    fn default() -> Self {
        RateInput::Prepared {
            path: PathBuf::from("02_Preprocessing/Interest_Rate_Preprocessed/interest_rate_2022_2025.csv"),
            date_format: default_table_date_format(),
        }
    }
}

/// Sentiment table location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentInput {
    pub path: PathBuf,

    #[serde(default = "default_sentiment_date_format")]
    pub date_format: String,
}

impl Default for SentimentInput {
    fn default() -> Self {
        Self {
            path: PathBuf::from("02_Preprocessing/KAGGLE_Sentiment-Analysis/ecb_sentiment_analysis.csv"),
            date_format: default_sentiment_date_format(),
        }
    }
}

fn default_table_date_format() -> String {
    "%d.%m.%Y".to_string()
}

fn default_level_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_sentiment_date_format() -> String {
    "%d_%B_%Y".to_string()
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving every output file
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File name of the aligned absolute-price table
    #[serde(default = "default_aligned_filename")]
    pub aligned_filename: String,

    /// File name of the JSON run report
    #[serde(default = "default_report_filename")]
    pub report_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            aligned_filename: default_aligned_filename(),
            report_filename: default_report_filename(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("03_Dataset Creation/Datasets")
}

fn default_aligned_filename() -> String {
    "DS_14_t_3days_complete.csv".to_string()
}

fn default_report_filename() -> String {
    "report.json".to_string()
}

/// Window sizes in trading days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_trailing_window")]
    pub trailing: usize,

    #[serde(default = "default_leading_window")]
    pub leading: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            trailing: default_trailing_window(),
            leading: default_leading_window(),
        }
    }
}

fn default_trailing_window() -> usize {
    14
}

fn default_leading_window() -> usize {
    3
}

/// Row granularity of the aligned table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKey {
    /// One row per announcement date
    #[default]
    Date,
    /// One row per announcement date and traded instrument
    DateInstrument,
}

/// Instrument matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConfig {
    #[serde(default)]
    pub row_key: RowKey,

    /// Tie-break order when several instruments traded on a date
    #[serde(default = "default_instrument_priority")]
    pub instrument_priority: Vec<InstrumentId>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            row_key: RowKey::default(),
            instrument_priority: default_instrument_priority(),
        }
    }
}

fn default_instrument_priority() -> Vec<InstrumentId> {
    InstrumentId::ALL.to_vec()
}

/// Feature/target transform settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Outlier dates removed before building variants
    #[serde(default = "default_exclude_dates")]
    pub exclude_dates: Vec<NaiveDate>,

    /// Denominator column for percentage returns
    #[serde(default = "default_pivot_column")]
    pub pivot_column: String,

    /// Feature columns converted to percentage returns
    #[serde(default = "default_percentage_columns")]
    pub percentage_columns: Vec<String>,

    /// Features shared by every variant
    #[serde(default = "default_base_columns")]
    pub base_columns: Vec<String>,

    /// Target columns, converted to percentage returns
    #[serde(default = "default_target_columns")]
    pub target_columns: Vec<String>,

    /// Sentiment source columns read from the sentiment table
    #[serde(default = "default_sentiment_columns")]
    pub sentiment_columns: Vec<String>,

    /// Explicit variant manifest; the standard manifest is used when unset
    #[serde(default)]
    pub variants: Option<Vec<VariantSpec>>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            exclude_dates: default_exclude_dates(),
            pivot_column: default_pivot_column(),
            percentage_columns: default_percentage_columns(),
            base_columns: default_base_columns(),
            target_columns: default_target_columns(),
            sentiment_columns: default_sentiment_columns(),
            variants: None,
        }
    }
}

fn default_exclude_dates() -> Vec<NaiveDate> {
    [(2024, 12, 12), (2022, 6, 9)]
        .into_iter()
        .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

fn default_pivot_column() -> String {
    trailing_close(1)
}

fn default_percentage_columns() -> Vec<String> {
    vec![trailing_close(4), trailing_close(3), trailing_close(2)]
}

fn default_base_columns() -> Vec<String> {
    let mut columns = default_percentage_columns();
    columns.extend([
        InstrumentId::Mdax.indicator_column(),
        InstrumentId::Sdax.indicator_column(),
        RATE_LEVEL.to_string(),
        RATE_CHANGE.to_string(),
    ]);
    columns
}

fn default_target_columns() -> Vec<String> {
    vec![CLOSE.to_string(), leading_close(1), leading_close(2)]
}

fn default_sentiment_columns() -> Vec<String> {
    ["FinBERT_Sentences", "FinBERT_Chunks", "RoBERTa_Sentences", "RoBERTa_Chunks"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> anyhow::Result<DatasetConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: DatasetConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to TOML file
pub fn save_config(config: &DatasetConfig, path: &str) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Create a default configuration file template
pub fn create_config_template(path: &str) -> anyhow::Result<()> {
    std::fs::write(path, CONFIG_TEMPLATE)?;
    Ok(())
}

const CONFIG_TEMPLATE: &str = r#"# Announcement Dataset Builder Configuration
# Relative paths are resolved against the directory holding this file.

[inputs.prices]
# "combined": one table with Index_* one-hot columns
# "per_instrument": one Date,Open,Close file per index (see below)
kind = "combined"
path = "02_Preprocessing/Stock_Preprocessed/stock_data_combined_onehot.csv"
date_format = "%d.%m.%Y"

# [inputs.prices]
# kind = "per_instrument"
# date_format = "%Y-%m-%d"
# write_combined = "02_Preprocessing/Stock_Preprocessed/stock_data_combined_onehot.csv"
# [inputs.prices.files]
# DAX = "01_Raw Data/yFinance API/DAX_EUR.csv"
# MDAX = "01_Raw Data/yFinance API/MDAX_EUR.csv"
# SDAX = "01_Raw Data/yFinance API/SDAX_EUR.csv"

[inputs.rates]
# "prepared": Date, Interest Rate_Old, Interest Rate_Change
# "derived": raw level series joined with press-release dates
kind = "prepared"
path = "02_Preprocessing/Interest_Rate_Preprocessed/interest_rate_2022_2025.csv"
date_format = "%d.%m.%Y"

# [inputs.rates]
# kind = "derived"
# levels = "01_Raw Data/ECB Download/2022_2025_rate.csv"
# announcements = "02_Preprocessing/ECB Press Release Days.csv"
# level_date_format = "%Y-%m-%d"
# announcement_date_format = "%d.%m.%Y"
# since = "2022-05-31"

[inputs.sentiment]
path = "02_Preprocessing/KAGGLE_Sentiment-Analysis/ecb_sentiment_analysis.csv"
date_format = "%d_%B_%Y"

[output]
dir = "03_Dataset Creation/Datasets"
aligned_filename = "DS_14_t_3days_complete.csv"
report_filename = "report.json"

[window]
# Closes before the announcement (Close_t-14 .. Close_t-1)
trailing = 14
# Closes after the announcement (Close_t+1 .. Close_t+3)
leading = 3

[alignment]
# "date": one row per announcement date
# "date_instrument": one row per announcement date and traded index
row_key = "date"
instrument_priority = ["DAX", "MDAX", "SDAX"]

[features]
# Outlier announcement dates removed from every variant
exclude_dates = ["2024-12-12", "2022-06-09"]

# Percentage returns are (value - pivot) / pivot * 100
pivot_column = "Close_t-1"
percentage_columns = ["Close_t-4", "Close_t-3", "Close_t-2"]
base_columns = [
    "Close_t-4", "Close_t-3", "Close_t-2",
    "Index_MDAX", "Index_SDAX",
    "Interest Rate_Old", "Interest Rate_Change",
]
target_columns = ["Close", "Close_t+1", "Close_t+2"]
sentiment_columns = ["FinBERT_Sentences", "FinBERT_Chunks", "RoBERTa_Sentences", "RoBERTa_Chunks"]

# Without explicit variants the standard set is built: dataset,
# dataset_base and one dataset_<source> per sentiment column.
# [[features.variants]]
# name = "dataset_rates_only"
# features = ["Interest Rate_Old", "Interest Rate_Change"]
"#;
