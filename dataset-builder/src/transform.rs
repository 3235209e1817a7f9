//! Feature/target transform
//!
//! Turns the aligned absolute-price table into percentage-return features
//! and targets relative to a pivot close, drops outlier dates, and selects
//! one table per dataset variant.

use crate::config::FeatureConfig;
use crate::error::{DatasetError, DatasetResult};
use crate::variants::VariantManifest;
use chrono::NaiveDate;
use common::Table;
use std::collections::HashSet;
use tracing::{debug, info};

const STAGE: &str = "feature transform";
const ALIGNED_TABLE: &str = "aligned";

/// `(value - pivot) / pivot * 100`; unset when either side is unset, the
/// pivot is zero, or the result is not finite.
pub fn percentage_change(value: Option<f64>, pivot: Option<f64>) -> Option<f64> {
    let (value, pivot) = (value?, pivot?);
    if pivot == 0.0 {
        return None;
    }
    let pct = (value - pivot) / pivot * 100.0;
    pct.is_finite().then_some(pct)
}

/// One finished dataset variant
#[derive(Debug, Clone, PartialEq)]
pub struct VariantTable {
    pub name: String,
    pub table: Table,
}

/// Outlier removal and percentage conversion shared by all variants
#[derive(Debug, Clone)]
pub struct FeatureTransform {
    exclude_dates: HashSet<NaiveDate>,
    pivot_column: String,
    percentage_columns: Vec<String>,
    target_columns: Vec<String>,
}

impl FeatureTransform {
    pub fn new(
        exclude_dates: impl IntoIterator<Item = NaiveDate>,
        pivot_column: impl Into<String>,
        percentage_columns: Vec<String>,
        target_columns: Vec<String>,
    ) -> Self {
        Self {
            exclude_dates: exclude_dates.into_iter().collect(),
            pivot_column: pivot_column.into(),
            percentage_columns,
            target_columns,
        }
    }

    pub fn from_config(config: &FeatureConfig) -> Self {
        Self::new(
            config.exclude_dates.iter().copied(),
            config.pivot_column.clone(),
            config.percentage_columns.clone(),
            config.target_columns.clone(),
        )
    }

    pub fn target_columns(&self) -> &[String] {
        &self.target_columns
    }

    /// Drop excluded dates and convert target and percentage columns.
    ///
    /// The result keeps every column of `aligned`; columns not listed for
    /// conversion are copied unchanged.
    pub fn prepare(&self, aligned: &Table) -> DatasetResult<Table> {
        let pivot_idx = self.require(aligned, &self.pivot_column)?;

        let mut convert = Vec::new();
        for column in self.target_columns.iter().chain(&self.percentage_columns) {
            let idx = self.require(aligned, column)?;
            if !convert.contains(&idx) {
                convert.push(idx);
            }
        }

        let mut table = aligned.clone();
        let before = table.num_rows();
        table.retain_rows(|row| !self.exclude_dates.contains(&row.date));
        let excluded = before - table.num_rows();

        let mut undefined = 0usize;
        for row in table.rows_mut() {
            let pivot = row.values[pivot_idx];
            for &idx in &convert {
                let converted = percentage_change(row.values[idx], pivot);
                if converted.is_none() && row.values[idx].is_some() {
                    undefined += 1;
                }
                row.values[idx] = converted;
            }
        }

        if undefined > 0 {
            debug!(undefined, pivot = %self.pivot_column, "Percentage undefined for some cells");
        }
        info!(
            rows = table.num_rows(),
            excluded,
            converted_columns = convert.len(),
            "Features and targets converted to percentage returns"
        );

        Ok(table)
    }

    /// Build every variant in `manifest` from one prepared table.
    pub fn build_variants(&self, aligned: &Table, manifest: &VariantManifest) -> DatasetResult<Vec<VariantTable>> {
        let prepared = self.prepare(aligned)?;

        manifest
            .variants()
            .iter()
            .map(|variant| {
                let mut columns: Vec<String> = variant
                    .features
                    .iter()
                    .filter(|c| !self.target_columns.contains(*c))
                    .cloned()
                    .collect();
                columns.extend(self.target_columns.iter().cloned());

                let table = prepared
                    .select(&columns)
                    .map_err(|e| DatasetError::missing_column("variant selection", ALIGNED_TABLE, &e.0))?;

                debug!(
                    variant = %variant.name,
                    rows = table.num_rows(),
                    columns = table.num_columns(),
                    "Variant built"
                );

                Ok(VariantTable {
                    name: variant.name.clone(),
                    table,
                })
            })
            .collect()
    }

    fn require(&self, table: &Table, column: &str) -> DatasetResult<usize> {
        table
            .column_index(column)
            .ok_or_else(|| DatasetError::missing_column(STAGE, ALIGNED_TABLE, column))
    }
}
