// Announcement Dataset Builder
// Aligns index prices, ECB rate decisions and sentiment scores around each
// announcement date and emits percentage-return datasets per feature subset

pub mod alignment;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod transform;
pub mod variants;

pub use alignment::{AlignedRow, AlignedTable, AlignmentEngine, AlignmentStats, PriceIndex};
pub use config::{
    create_config_template, load_config, save_config, AlignmentConfig, DatasetConfig, FeatureConfig, InputConfig,
    OutputConfig, PriceInput, RateInput, RowKey, SentimentInput, WindowConfig,
};
pub use error::{DatasetError, DatasetResult};
pub use pipeline::{DatasetPipeline, PipelineInputs, PipelineOutput};
pub use report::{DatasetReport, TableShape};
pub use transform::{percentage_change, FeatureTransform, VariantTable};
pub use variants::{VariantManifest, VariantSpec};
