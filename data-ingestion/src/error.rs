use std::path::PathBuf;
use thiserror::Error;

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {table} table: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{table} table has no instrument indicator columns (expected e.g. 'Index_DAX')")]
    NoIndicatorColumns { table: String },

    #[error("{table} table, line {line}: cannot parse date '{value}' with format '{format}'")]
    InvalidDate {
        table: String,
        line: usize,
        value: String,
        format: String,
    },

    #[error("{table} table, line {line}, column '{column}': cannot parse number '{value}'")]
    InvalidNumber {
        table: String,
        line: usize,
        column: String,
        value: String,
    },
}

impl IngestError {
    pub(crate) fn csv(table: &str, source: csv::Error) -> Self {
        IngestError::Csv {
            table: table.to_string(),
            source,
        }
    }

    pub(crate) fn missing_column(table: &str, column: &str) -> Self {
        IngestError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
