//! Header-addressed CSV access shared by all readers

use crate::error::{IngestError, IngestResult};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A fully read CSV file whose columns are looked up by header name.
pub(crate) struct CsvInput {
    table: String,
    headers: Vec<String>,
    header_map: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl CsvInput {
    pub(crate) fn from_reader<R: Read>(reader: R, table: &str) -> IngestResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| IngestError::csv(table, e))?
            .iter()
            .map(normalize_header)
            .collect();

        let mut header_map = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            header_map.entry(name.clone()).or_insert(idx);
        }

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IngestError::csv(table, e))?;

        Ok(Self {
            table: table.to_string(),
            headers,
            header_map,
            records,
        })
    }

    pub(crate) fn table(&self) -> &str {
        &self.table
    }

    pub(crate) fn headers(&self) -> &[String] {
        &self.headers
    }

    pub(crate) fn find(&self, column: &str) -> Option<usize> {
        self.header_map.get(column).copied()
    }

    /// First of `aliases` present in the header
    pub(crate) fn find_any(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| self.find(alias))
    }

    pub(crate) fn require(&self, column: &str) -> IngestResult<usize> {
        self.find(column)
            .ok_or_else(|| IngestError::missing_column(&self.table, column))
    }

    pub(crate) fn require_any(&self, aliases: &[&str]) -> IngestResult<usize> {
        self.find_any(aliases)
            .ok_or_else(|| IngestError::missing_column(&self.table, aliases[0]))
    }

    /// Records paired with the 1-based file line they start on (header is
    /// line 1). Quoted fields spanning several lines are accounted for.
    pub(crate) fn lines(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        self.records.iter().enumerate().map(|(idx, record)| {
            let line = record.position().map_or(idx + 2, |p| p.line() as usize);
            (line, record)
        })
    }

    pub(crate) fn cell<'a>(&self, record: &'a StringRecord, idx: usize) -> &'a str {
        record.get(idx).unwrap_or("")
    }

    pub(crate) fn date(&self, line: usize, value: &str, format: &str) -> IngestResult<NaiveDate> {
        parse_date(value, format).ok_or_else(|| IngestError::InvalidDate {
            table: self.table.clone(),
            line,
            value: value.to_string(),
            format: format.to_string(),
        })
    }

    pub(crate) fn number(&self, line: usize, column: &str, value: &str) -> IngestResult<Option<f64>> {
        parse_number(value).map_err(|_| IngestError::InvalidNumber {
            table: self.table.clone(),
            line,
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

pub(crate) fn open(path: &Path) -> IngestResult<File> {
    File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Strip a UTF-8 BOM and surrounding whitespace from a header cell.
fn normalize_header(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Parse `value` with `format`, tolerating a trailing time component such as
/// `2024-01-25 00:00:00` left behind by spreadsheet exports.
pub(crate) fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, format).ok().or_else(|| {
        value
            .split_whitespace()
            .next()
            .and_then(|head| NaiveDate::parse_from_str(head, format).ok())
    })
}

/// Empty cells and `NaN` are unset; booleans map to 1/0 so one-hot columns
/// written as `True`/`False` decode too.
pub(crate) fn parse_number(value: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if value.eq_ignore_ascii_case("true") {
        return Ok(Some(1.0));
    }
    if value.eq_ignore_ascii_case("false") {
        return Ok(Some(0.0));
    }
    value.parse::<f64>().map(Some)
}
