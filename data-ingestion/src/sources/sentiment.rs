use super::csv_input::{self, parse_date, CsvInput};
use crate::error::IngestResult;
use common::columns::DATE;
use common::SentimentTable;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub const SENTIMENT_TABLE: &str = "sentiment";

pub fn load_sentiment(path: &Path, sources: &[String], date_format: &str) -> IngestResult<SentimentTable> {
    info!(path = %path.display(), "Loading sentiment table");
    read_sentiment(csv_input::open(path)?, sources, date_format)
}

/// Read the configured sentiment `sources` keyed by date.
///
/// Rows whose date does not parse, such as a summary row at the bottom of
/// the sheet, are skipped.
pub fn read_sentiment<R: Read>(reader: R, sources: &[String], date_format: &str) -> IngestResult<SentimentTable> {
    let input = CsvInput::from_reader(reader, SENTIMENT_TABLE)?;
    let date_idx = input.require(DATE)?;
    let source_idx = sources
        .iter()
        .map(|source| input.require(source))
        .collect::<IngestResult<Vec<_>>>()?;

    let mut table = SentimentTable::new(sources.to_vec());
    let mut skipped = 0usize;

    for (line, record) in input.lines() {
        let raw_date = input.cell(record, date_idx);
        let Some(date) = parse_date(raw_date, date_format) else {
            warn!(line, value = raw_date, "Unparseable sentiment date, skipping row");
            skipped += 1;
            continue;
        };

        let scores = sources
            .iter()
            .zip(&source_idx)
            .map(|(source, &idx)| input.number(line, source, input.cell(record, idx)))
            .collect::<IngestResult<Vec<_>>>()?;

        if !table.insert(date, scores) {
            warn!(line, %date, "Duplicate sentiment date, keeping first row");
        }
    }

    info!(rows = table.len(), skipped, sources = sources.len(), "Sentiment table loaded");
    Ok(table)
}
