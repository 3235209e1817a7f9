use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{stage}: {table} table has no column '{column}'")]
    MissingColumn {
        stage: &'static str,
        table: String,
        column: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DatasetError {
    pub(crate) fn missing_column(stage: &'static str, table: &str, column: &str) -> Self {
        DatasetError::MissingColumn {
            stage,
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
