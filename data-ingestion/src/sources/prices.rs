//! Daily index prices
//!
//! Two layouts are supported: a combined table that tags each row with
//! one-hot `Index_*` columns, and one plain `Date,Open,Close` file per
//! instrument. The combiner and [`write_onehot_prices`] turn the latter
//! into the former.

use super::csv_input::{self, CsvInput};
use crate::error::{IngestError, IngestResult};
use common::columns::{CLOSE, DATE, OPEN};
use common::{IndicatorResolution, InstrumentId, PriceObservation};
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

pub const PRICE_TABLE: &str = "price";

/// Load a combined price table with one-hot instrument indicators
pub fn load_onehot_prices(path: &Path, date_format: &str) -> IngestResult<Vec<PriceObservation>> {
    info!(path = %path.display(), "Loading combined price table");
    read_onehot_prices(csv_input::open(path)?, date_format)
}

pub fn read_onehot_prices<R: Read>(reader: R, date_format: &str) -> IngestResult<Vec<PriceObservation>> {
    let input = CsvInput::from_reader(reader, PRICE_TABLE)?;
    let date_idx = input.require(DATE)?;
    let close_idx = input.require(CLOSE)?;
    let open_idx = input.find(OPEN);

    let indicators: Vec<(InstrumentId, usize)> = input
        .headers()
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| InstrumentId::from_indicator_column(name).map(|id| (id, idx)))
        .collect();

    if indicators.is_empty() {
        return Err(IngestError::NoIndicatorColumns {
            table: PRICE_TABLE.to_string(),
        });
    }

    let mut observations = Vec::new();
    let mut ambiguous = 0usize;
    let mut skipped = 0usize;

    for (line, record) in input.lines() {
        let date = input.date(line, input.cell(record, date_idx), date_format)?;

        let mut row = Vec::with_capacity(indicators.len());
        for (id, idx) in &indicators {
            let value = input.number(line, &id.indicator_column(), input.cell(record, *idx))?;
            row.push((*id, value.unwrap_or(0.0)));
        }

        let instrument = match InstrumentId::resolve_indicators(&row) {
            IndicatorResolution::Single(id) => id,
            IndicatorResolution::Ambiguous { chosen, active } => {
                warn!(line, %date, ?active, %chosen, "Several instrument indicators set, using first");
                ambiguous += 1;
                chosen
            }
            IndicatorResolution::Inactive => {
                warn!(line, %date, "No instrument indicator set, skipping row");
                skipped += 1;
                continue;
            }
        };

        let Some(close) = input.number(line, CLOSE, input.cell(record, close_idx))? else {
            debug!(line, %date, %instrument, "Empty close, skipping row");
            skipped += 1;
            continue;
        };

        let open = match open_idx {
            Some(idx) => input.number(line, OPEN, input.cell(record, idx))?,
            None => None,
        };

        observations.push(PriceObservation {
            date,
            instrument,
            open,
            close,
        });
    }

    info!(
        table = input.table(),
        rows = observations.len(),
        ambiguous,
        skipped,
        "Price table loaded"
    );

    Ok(observations)
}

/// Load one instrument's `Date,Open,Close` file
pub fn load_instrument_prices(
    path: &Path,
    instrument: InstrumentId,
    date_format: &str,
) -> IngestResult<Vec<PriceObservation>> {
    info!(path = %path.display(), %instrument, "Loading instrument price file");
    read_instrument_prices(csv_input::open(path)?, instrument, date_format)
}

pub fn read_instrument_prices<R: Read>(
    reader: R,
    instrument: InstrumentId,
    date_format: &str,
) -> IngestResult<Vec<PriceObservation>> {
    let table = format!("{} {}", instrument.code(), PRICE_TABLE);
    let input = CsvInput::from_reader(reader, &table)?;
    let date_idx = input.require(DATE)?;
    let close_idx = input.require(CLOSE)?;
    let open_idx = input.find(OPEN);

    let mut observations = Vec::new();
    for (line, record) in input.lines() {
        let date = input.date(line, input.cell(record, date_idx), date_format)?;
        let Some(close) = input.number(line, CLOSE, input.cell(record, close_idx))? else {
            debug!(line, %date, %instrument, "Empty close, skipping row");
            continue;
        };
        let open = match open_idx {
            Some(idx) => input.number(line, OPEN, input.cell(record, idx))?,
            None => None,
        };
        observations.push(PriceObservation {
            date,
            instrument,
            open,
            close,
        });
    }

    debug!(%instrument, rows = observations.len(), "Instrument prices loaded");
    Ok(observations)
}

/// Concatenate per-instrument series into one table in fixed instrument
/// order, re-tagging every observation with the series' instrument.
pub fn combine_instrument_series(
    mut series: Vec<(InstrumentId, Vec<PriceObservation>)>,
) -> Vec<PriceObservation> {
    series.sort_by_key(|(id, _)| *id);

    let combined: Vec<PriceObservation> = series
        .into_iter()
        .flat_map(|(id, observations)| {
            observations.into_iter().map(move |mut obs| {
                obs.instrument = id;
                obs
            })
        })
        .collect();

    info!(rows = combined.len(), "Combined instrument price series");
    combined
}

/// Write observations as a combined table with one indicator column per
/// instrument present, in fixed instrument order.
pub fn write_onehot_prices<W: Write>(
    writer: W,
    observations: &[PriceObservation],
    date_format: &str,
) -> IngestResult<()> {
    let instruments: BTreeSet<InstrumentId> = observations.iter().map(|o| o.instrument).collect();

    let mut writer = csv::Writer::from_writer(writer);
    let mut header = vec![DATE.to_string(), OPEN.to_string(), CLOSE.to_string()];
    header.extend(instruments.iter().map(InstrumentId::indicator_column));
    writer
        .write_record(&header)
        .map_err(|e| IngestError::csv(PRICE_TABLE, e))?;

    for obs in observations {
        let mut record = vec![
            obs.date.format(date_format).to_string(),
            obs.open.map(|v| v.to_string()).unwrap_or_default(),
            obs.close.to_string(),
        ];
        record.extend(instruments.iter().map(|id| {
            if *id == obs.instrument { "1.0" } else { "0.0" }.to_string()
        }));
        writer
            .write_record(&record)
            .map_err(|e| IngestError::csv(PRICE_TABLE, e))?;
    }

    writer
        .flush()
        .map_err(|e| IngestError::csv(PRICE_TABLE, e.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FORMAT: &str = "%d.%m.%Y";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_read_onehot_prices() {
        let data = "\
Date,Open,Close,Index_DAX,Index_MDAX,Index_SDAX
02.02.2023,15100.5,15180.7,1.0,0.0,0.0
02.02.2023,28900,29010.2,0.0,1.0,0.0
03.02.2023,,13400,0.0,0.0,1.0
";
        let prices = read_onehot_prices(data.as_bytes(), FORMAT).unwrap();
        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0].instrument, InstrumentId::Dax);
        assert_eq!(prices[1].instrument, InstrumentId::Mdax);
        assert_eq!(prices[1].close, 29010.2);
        assert_eq!(prices[2].date, date(2023, 2, 3));
        assert_eq!(prices[2].open, None);
    }

    #[test]
    fn test_onehot_ambiguous_and_inactive_rows() {
        let data = "\
Date,Close,Index_DAX,Index_MDAX,Index_SDAX
02.02.2023,100,0,1,1
03.02.2023,101,0,0,0
";
        let prices = read_onehot_prices(data.as_bytes(), FORMAT).unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].instrument, InstrumentId::Mdax);
    }

    #[test]
    fn test_onehot_requires_indicator_columns() {
        let data = "Date,Close\n02.02.2023,100\n";
        let err = read_onehot_prices(data.as_bytes(), FORMAT).unwrap_err();
        assert!(matches!(err, IngestError::NoIndicatorColumns { .. }));
    }

    #[test]
    fn test_onehot_missing_close_column() {
        let data = "Date,Index_DAX\n02.02.2023,1\n";
        let err = read_onehot_prices(data.as_bytes(), FORMAT).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "Close"));
    }

    #[test]
    fn test_combine_and_write_onehot() {
        let sdax = read_instrument_prices(
            "Date,Open,Close\n02.02.2023,13300,13350\n".as_bytes(),
            InstrumentId::Sdax,
            FORMAT,
        )
        .unwrap();
        let dax = read_instrument_prices(
            "Date,Open,Close\n02.02.2023,15100,15180\n03.02.2023,15180,15200\n".as_bytes(),
            InstrumentId::Dax,
            FORMAT,
        )
        .unwrap();

        let combined = combine_instrument_series(vec![(InstrumentId::Sdax, sdax), (InstrumentId::Dax, dax)]);
        assert_eq!(combined.len(), 3);
        assert_eq!(combined[0].instrument, InstrumentId::Dax);
        assert_eq!(combined[2].instrument, InstrumentId::Sdax);

        let mut buffer = Vec::new();
        write_onehot_prices(&mut buffer, &combined, FORMAT).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("Date,Open,Close,Index_DAX,Index_SDAX\n"));

        let reread = read_onehot_prices(text.as_bytes(), FORMAT).unwrap();
        assert_eq!(reread, combined);
    }
}
