//! Alignment engine
//!
//! Matches every announcement date that also has a price observation to a
//! single instrument, reads the trailing and leading closes from that
//! instrument's own trading-day sequence, and attaches the rate and
//! sentiment values for the date.

use crate::config::{AlignmentConfig, RowKey, WindowConfig};
use chrono::NaiveDate;
use common::columns::{leading_close, trailing_close, CLOSE, OPEN, RATE_CHANGE, RATE_LEVEL};
use common::{InstrumentId, PriceObservation, RateObservation, SentimentTable, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// One instrument's observations in date order plus a date → position map
#[derive(Debug, Clone)]
struct InstrumentSeries {
    observations: Vec<PriceObservation>,
    positions: HashMap<NaiveDate, usize>,
}

/// Per-instrument ordered index over a price table, built once per run.
#[derive(Debug, Clone)]
pub struct PriceIndex {
    series: BTreeMap<InstrumentId, InstrumentSeries>,
    duplicates: usize,
}

impl PriceIndex {
    /// Group by instrument and sort by date. A repeated (instrument, date)
    /// pair keeps its first occurrence.
    pub fn build(prices: &[PriceObservation]) -> Self {
        let mut grouped: BTreeMap<InstrumentId, Vec<PriceObservation>> = BTreeMap::new();
        for obs in prices {
            grouped.entry(obs.instrument).or_default().push(obs.clone());
        }

        let mut duplicates = 0usize;
        let series = grouped
            .into_iter()
            .map(|(instrument, mut observations)| {
                observations.sort_by_key(|o| o.date);
                let before = observations.len();
                observations.dedup_by_key(|o| o.date);

                let dropped = before - observations.len();
                if dropped > 0 {
                    warn!(%instrument, dropped, "Duplicate trading days, keeping first occurrence");
                    duplicates += dropped;
                }

                let positions = observations
                    .iter()
                    .enumerate()
                    .map(|(pos, o)| (o.date, pos))
                    .collect();

                (instrument, InstrumentSeries { observations, positions })
            })
            .collect();

        Self { series, duplicates }
    }

    /// Every date with at least one observation
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.series
            .values()
            .flat_map(|s| s.positions.keys().copied())
            .collect()
    }

    /// Instruments with an observation on `date`, in fixed order
    pub fn instruments_on(&self, date: NaiveDate) -> Vec<InstrumentId> {
        self.series
            .iter()
            .filter(|(_, s)| s.positions.contains_key(&date))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn position(&self, instrument: InstrumentId, date: NaiveDate) -> Option<usize> {
        self.series.get(&instrument)?.positions.get(&date).copied()
    }

    pub fn observation(&self, instrument: InstrumentId, position: usize) -> Option<&PriceObservation> {
        self.series.get(&instrument)?.observations.get(position)
    }

    /// Close `offset` trading days away from `position`; `None` outside the
    /// instrument's sequence.
    pub fn close_at(&self, instrument: InstrumentId, position: usize, offset: isize) -> Option<f64> {
        let target = position.checked_add_signed(offset)?;
        self.observation(instrument, target).map(|o| o.close)
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Announcement row with absolute prices
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub instrument: InstrumentId,
    pub open: Option<f64>,
    pub close: f64,
    /// `[t-N, …, t-1]`
    pub trailing: Vec<Option<f64>>,
    /// `[t+1, …, t+M]`
    pub leading: Vec<Option<f64>>,
    pub rate_level: f64,
    pub rate_change: f64,
    /// Aligned with the table's sentiment sources
    pub sentiment: Vec<Option<f64>>,
}

impl AlignedRow {
    /// Close `offset` trading days before the announcement
    pub fn trailing_close(&self, offset: usize) -> Option<f64> {
        if offset == 0 || offset > self.trailing.len() {
            return None;
        }
        self.trailing[self.trailing.len() - offset]
    }

    /// Close `offset` trading days after the announcement
    pub fn leading_close(&self, offset: usize) -> Option<f64> {
        offset.checked_sub(1).and_then(|i| self.leading.get(i).copied().flatten())
    }
}

/// Output of the alignment engine, ordered by date
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    window: WindowConfig,
    sentiment_sources: Vec<String>,
    rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sentiment_sources(&self) -> &[String] {
        &self.sentiment_sources
    }

    /// Wide column order: trailing closes, `Open`, `Close`, leading closes,
    /// instrument indicators, rate level and change, sentiment sources.
    pub fn column_names(&self) -> Vec<String> {
        let mut columns: Vec<String> = (1..=self.window.trailing).rev().map(trailing_close).collect();
        columns.push(OPEN.to_string());
        columns.push(CLOSE.to_string());
        columns.extend((1..=self.window.leading).map(leading_close));
        columns.extend(InstrumentId::ALL.iter().map(InstrumentId::indicator_column));
        columns.push(RATE_LEVEL.to_string());
        columns.push(RATE_CHANGE.to_string());
        columns.extend(self.sentiment_sources.iter().cloned());
        columns
    }

    /// Wide table with the instrument expanded back into one-hot columns
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(self.column_names());

        for row in &self.rows {
            let mut values = Vec::with_capacity(table.num_columns());
            values.extend(row.trailing.iter().copied());
            values.push(row.open);
            values.push(Some(row.close));
            values.extend(row.leading.iter().copied());
            values.extend(
                InstrumentId::ALL
                    .iter()
                    .map(|id| Some(if *id == row.instrument { 1.0 } else { 0.0 })),
            );
            values.push(Some(row.rate_level));
            values.push(Some(row.rate_change));
            values.extend(row.sentiment.iter().copied());
            table.push_row(row.date, values);
        }

        table
    }
}

/// Counters describing one alignment run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentStats {
    /// Dates present in both the price and the rate table
    pub common_dates: usize,
    pub rows: usize,
    /// Dates on which more than one instrument traded (date row key only)
    pub ambiguous_dates: usize,
    /// Window cells left unset because the offset left the sequence
    pub missing_window_cells: usize,
    pub rows_without_sentiment: usize,
    pub duplicate_prices: usize,
}

/// Aligns prices, rates and sentiment onto announcement rows
#[derive(Debug, Clone)]
pub struct AlignmentEngine {
    window: WindowConfig,
    row_key: RowKey,
    priority: Vec<InstrumentId>,
}

impl AlignmentEngine {
    pub fn new(window: WindowConfig, alignment: &AlignmentConfig) -> Self {
        Self {
            window,
            row_key: alignment.row_key,
            priority: alignment.instrument_priority.clone(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(WindowConfig::default(), &AlignmentConfig::default())
    }

    /// Build the aligned table. Inputs are left untouched.
    pub fn align(
        &self,
        prices: &[PriceObservation],
        rates: &[RateObservation],
        sentiment: &SentimentTable,
    ) -> (AlignedTable, AlignmentStats) {
        let index = PriceIndex::build(prices);

        let mut rate_by_date: BTreeMap<NaiveDate, &RateObservation> = BTreeMap::new();
        for rate in rates {
            rate_by_date.entry(rate.date).or_insert(rate);
        }

        let price_dates = index.dates();
        let common_dates: Vec<NaiveDate> = rate_by_date
            .keys()
            .filter(|d| price_dates.contains(d))
            .copied()
            .collect();

        let mut stats = AlignmentStats {
            common_dates: common_dates.len(),
            duplicate_prices: index.duplicates(),
            ..Default::default()
        };

        if common_dates.is_empty() {
            warn!(
                price_dates = price_dates.len(),
                rate_dates = rate_by_date.len(),
                "No common dates between price and rate tables"
            );
        }

        let mut rows = Vec::new();
        for date in common_dates {
            let candidates = self.rank(index.instruments_on(date));

            let selected: &[InstrumentId] = match self.row_key {
                RowKey::Date => {
                    if candidates.len() > 1 {
                        debug!(%date, ?candidates, chosen = %candidates[0], "Several instruments on announcement date");
                        stats.ambiguous_dates += 1;
                    }
                    &candidates[..1.min(candidates.len())]
                }
                RowKey::DateInstrument => &candidates,
            };

            let rate = rate_by_date[&date];
            for &instrument in selected {
                if let Some(row) = self.build_row(&index, date, instrument, rate, sentiment, &mut stats) {
                    rows.push(row);
                }
            }
        }

        stats.rows = rows.len();
        info!(
            rows = stats.rows,
            common_dates = stats.common_dates,
            ambiguous_dates = stats.ambiguous_dates,
            missing_window_cells = stats.missing_window_cells,
            rows_without_sentiment = stats.rows_without_sentiment,
            "Alignment complete"
        );

        let table = AlignedTable {
            window: self.window,
            sentiment_sources: sentiment.sources().to_vec(),
            rows,
        };
        (table, stats)
    }

    /// Order candidates by the configured priority; unlisted instruments
    /// follow in fixed order.
    fn rank(&self, mut candidates: Vec<InstrumentId>) -> Vec<InstrumentId> {
        candidates.sort_by_key(|id| {
            let rank = self.priority.iter().position(|p| p == id).unwrap_or(self.priority.len());
            (rank, *id)
        });
        candidates
    }

    fn build_row(
        &self,
        index: &PriceIndex,
        date: NaiveDate,
        instrument: InstrumentId,
        rate: &RateObservation,
        sentiment: &SentimentTable,
        stats: &mut AlignmentStats,
    ) -> Option<AlignedRow> {
        let position = index.position(instrument, date)?;
        let obs = index.observation(instrument, position)?;

        let trailing: Vec<Option<f64>> = (1..=self.window.trailing)
            .rev()
            .map(|k| index.close_at(instrument, position, -(k as isize)))
            .collect();
        let leading: Vec<Option<f64>> = (1..=self.window.leading)
            .map(|k| index.close_at(instrument, position, k as isize))
            .collect();

        let missing = trailing.iter().chain(&leading).filter(|v| v.is_none()).count();
        if missing > 0 {
            debug!(%date, %instrument, missing, "Window reaches outside the instrument's price history");
            stats.missing_window_cells += missing;
        }

        let sentiment = match sentiment.scores_for(date) {
            Some(scores) => scores.to_vec(),
            None => {
                if !sentiment.sources().is_empty() {
                    stats.rows_without_sentiment += 1;
                }
                vec![None; sentiment.sources().len()]
            }
        };

        Some(AlignedRow {
            date,
            instrument,
            open: obs.open,
            close: obs.close,
            trailing,
            leading,
            rate_level: rate.rate_level,
            rate_change: rate.rate_change,
            sentiment,
        })
    }
}
