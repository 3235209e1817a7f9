//! Policy rate announcements
//!
//! Either a prepared table (`Date`, `Interest Rate_Old`,
//! `Interest Rate_Change`) or a raw level series joined against the list
//! of press-release dates.

use super::csv_input::{self, CsvInput};
use crate::error::IngestResult;
use chrono::NaiveDate;
use common::columns::{RATE_CHANGE, RATE_LEVEL};
use common::RateObservation;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub const RATE_TABLE: &str = "rate";
pub const RATE_LEVEL_TABLE: &str = "rate level";
pub const ANNOUNCEMENT_TABLE: &str = "announcement";

/// Column holding the raw deposit facility level
pub const RAW_RATE_LEVEL: &str = "Interest Rate";

const DATE_ALIASES: &[&str] = &["Date", "DATE", "date"];

pub fn load_rates(path: &Path, date_format: &str) -> IngestResult<Vec<RateObservation>> {
    info!(path = %path.display(), "Loading prepared rate table");
    read_rates(csv_input::open(path)?, date_format)
}

/// Read a prepared rate table, sorted by date. Duplicate dates keep the
/// first row; an empty change cell counts as no change.
pub fn read_rates<R: Read>(reader: R, date_format: &str) -> IngestResult<Vec<RateObservation>> {
    let input = CsvInput::from_reader(reader, RATE_TABLE)?;
    let date_idx = input.require_any(DATE_ALIASES)?;
    let level_idx = input.require(RATE_LEVEL)?;
    let change_idx = input.require(RATE_CHANGE)?;

    let mut by_date: BTreeMap<NaiveDate, RateObservation> = BTreeMap::new();
    for (line, record) in input.lines() {
        let date = input.date(line, input.cell(record, date_idx), date_format)?;
        let Some(rate_level) = input.number(line, RATE_LEVEL, input.cell(record, level_idx))? else {
            warn!(line, %date, "Empty rate level, skipping row");
            continue;
        };
        let rate_change = input
            .number(line, RATE_CHANGE, input.cell(record, change_idx))?
            .unwrap_or(0.0);

        if by_date.contains_key(&date) {
            warn!(line, %date, "Duplicate announcement date, keeping first row");
            continue;
        }
        by_date.insert(
            date,
            RateObservation {
                date,
                rate_level,
                rate_change,
            },
        );
    }

    info!(rows = by_date.len(), "Rate table loaded");
    Ok(by_date.into_values().collect())
}

pub fn load_rate_levels(path: &Path, date_format: &str) -> IngestResult<Vec<(NaiveDate, f64)>> {
    info!(path = %path.display(), "Loading rate level series");
    read_rate_levels(csv_input::open(path)?, date_format)
}

/// Read a `(date, level)` series; rows with an empty level are dropped.
pub fn read_rate_levels<R: Read>(reader: R, date_format: &str) -> IngestResult<Vec<(NaiveDate, f64)>> {
    let input = CsvInput::from_reader(reader, RATE_LEVEL_TABLE)?;
    let date_idx = input.require_any(DATE_ALIASES)?;
    let level_idx = input.require(RAW_RATE_LEVEL)?;

    let mut levels = Vec::new();
    for (line, record) in input.lines() {
        let date = input.date(line, input.cell(record, date_idx), date_format)?;
        match input.number(line, RAW_RATE_LEVEL, input.cell(record, level_idx))? {
            Some(level) => levels.push((date, level)),
            None => debug!(line, %date, "Empty rate level, skipping row"),
        }
    }

    Ok(levels)
}

pub fn load_announcement_dates(path: &Path, date_format: &str) -> IngestResult<Vec<NaiveDate>> {
    info!(path = %path.display(), "Loading announcement dates");
    read_announcement_dates(csv_input::open(path)?, date_format)
}

pub fn read_announcement_dates<R: Read>(reader: R, date_format: &str) -> IngestResult<Vec<NaiveDate>> {
    let input = CsvInput::from_reader(reader, ANNOUNCEMENT_TABLE)?;
    let date_idx = input.require_any(DATE_ALIASES)?;

    input
        .lines()
        .map(|(line, record)| input.date(line, input.cell(record, date_idx), date_format))
        .collect()
}

/// Build announcement observations from a level series.
///
/// Keeps the level dates that are announcement dates (and after `since`,
/// when given), sorted ascending. Each change is the difference to the
/// previous kept announcement; the first change is zero.
pub fn derive_rate_changes(
    levels: &[(NaiveDate, f64)],
    announcements: &[NaiveDate],
    since: Option<NaiveDate>,
) -> Vec<RateObservation> {
    let announcements: BTreeSet<NaiveDate> = announcements.iter().copied().collect();

    let mut joined: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for &(date, level) in levels {
        if since.is_some_and(|cutoff| date <= cutoff) || !announcements.contains(&date) {
            continue;
        }
        joined.entry(date).or_insert(level);
    }

    let mut previous: Option<f64> = None;
    let observations: Vec<RateObservation> = joined
        .into_iter()
        .map(|(date, rate_level)| {
            let rate_change = previous.map_or(0.0, |prev| rate_level - prev);
            previous = Some(rate_level);
            RateObservation {
                date,
                rate_level,
                rate_change,
            }
        })
        .collect();

    info!(
        levels = levels.len(),
        announcements = announcements.len(),
        rows = observations.len(),
        "Derived rate changes"
    );
    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_read_prepared_rates_sorted() {
        let data = "\
Date,Interest Rate_Old,Interest Rate_Change
14.09.2023,4.0,0.25
27.07.2023,3.75,
14.09.2023,9.9,9.9
";
        let rates = read_rates(data.as_bytes(), "%d.%m.%Y").unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].date, date(2023, 7, 27));
        assert_eq!(rates[0].rate_change, 0.0);
        assert_eq!(rates[1].rate_level, 4.0);
    }

    #[test]
    fn test_derive_rate_changes_first_is_zero() {
        let levels = vec![
            (date(2022, 7, 27), 0.0),
            (date(2022, 9, 14), 0.75),
            (date(2022, 11, 2), 1.5),
            (date(2022, 12, 21), 2.0),
        ];
        let announcements = vec![date(2022, 12, 21), date(2022, 9, 14), date(2022, 7, 27)];

        let rates = derive_rate_changes(&levels, &announcements, None);
        assert_eq!(rates.len(), 3);
        assert_eq!(rates[0].rate_change, 0.0);
        assert_eq!(rates[1].rate_change, 0.75);
        // 2022-11-02 is not an announcement, so the change spans two hikes
        assert_eq!(rates[2].rate_change, 1.25);
    }

    #[test]
    fn test_derive_rate_changes_cutoff() {
        let levels = vec![(date(2022, 4, 14), -0.5), (date(2022, 7, 27), 0.0)];
        let announcements = vec![date(2022, 4, 14), date(2022, 7, 27)];

        let rates = derive_rate_changes(&levels, &announcements, Some(date(2022, 5, 31)));
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].date, date(2022, 7, 27));
        assert_eq!(rates[0].rate_change, 0.0);
    }

    #[test]
    fn test_read_levels_and_announcements() {
        let levels = read_rate_levels(
            "DATE,Interest Rate\n2023-09-20,4.0\n2023-09-21,\n".as_bytes(),
            "%Y-%m-%d",
        )
        .unwrap();
        assert_eq!(levels, vec![(date(2023, 9, 20), 4.0)]);

        let dates = read_announcement_dates("date\n14.09.2023\n".as_bytes(), "%d.%m.%Y").unwrap();
        assert_eq!(dates, vec![date(2023, 9, 14)]);
    }
}
