//! CSV output for date-keyed tables

use crate::error::{IngestError, IngestResult};
use common::columns::DATE;
use common::Table;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Date format used for every written table
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Write `table` to `path`, creating parent directories as needed
pub fn save_table(path: &Path, table: &Table, name: &str) -> IngestResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| IngestError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_table(file, table, name)?;

    info!(
        table = name,
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "Table written"
    );
    Ok(())
}

/// Write `table` as CSV with a leading `Date` column; unset cells are empty.
pub fn write_table<W: Write>(writer: W, table: &Table, name: &str) -> IngestResult<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let header = std::iter::once(DATE).chain(table.columns().iter().map(String::as_str));
    writer
        .write_record(header)
        .map_err(|e| IngestError::csv(name, e))?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.date.format(OUTPUT_DATE_FORMAT).to_string());
        record.extend(row.values.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
        writer
            .write_record(&record)
            .map_err(|e| IngestError::csv(name, e))?;
    }

    writer.flush().map_err(|e| IngestError::csv(name, e.into()))?;
    Ok(())
}
