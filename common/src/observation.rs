//! Source observations consumed by the alignment engine

use crate::instrument::InstrumentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One trading day of one index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub instrument: InstrumentId,
    pub open: Option<f64>,
    pub close: f64,
}

/// Policy rate on an announcement date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    /// Rate level in force after the announcement
    pub rate_level: f64,
    /// Difference to the previous announcement's level (0 for the first)
    pub rate_change: f64,
}

/// Date-keyed sentiment scores, one optional score per source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentTable {
    sources: Vec<String>,
    scores: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl SentimentTable {
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            sources,
            scores: BTreeMap::new(),
        }
    }

    /// Source column names in output order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Insert the scores for `date`, aligned with `sources()`.
    ///
    /// Returns `false` and keeps the existing entry if `date` was already
    /// present. Short score vectors are padded with unset values.
    pub fn insert(&mut self, date: NaiveDate, mut scores: Vec<Option<f64>>) -> bool {
        if self.scores.contains_key(&date) {
            return false;
        }
        scores.resize(self.sources.len(), None);
        self.scores.insert(date, scores);
        true
    }

    pub fn scores_for(&self, date: NaiveDate) -> Option<&[Option<f64>]> {
        self.scores.get(&date).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
