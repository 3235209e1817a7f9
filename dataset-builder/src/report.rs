//! Run summary written next to the datasets

use crate::alignment::AlignmentStats;
use crate::transform::VariantTable;
use anyhow::Context;
use common::Table;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shape of one written table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

impl TableShape {
    pub fn of(name: &str, table: &Table) -> Self {
        Self {
            name: name.to_string(),
            rows: table.num_rows(),
            columns: table.num_columns(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetReport {
    pub aligned: TableShape,
    pub variants: Vec<TableShape>,
    pub alignment: AlignmentStats,
    /// Aligned rows dropped as outliers
    pub excluded_rows: usize,
}

impl DatasetReport {
    pub fn new(aligned: &Table, variants: &[VariantTable], alignment: AlignmentStats, excluded_rows: usize) -> Self {
        Self {
            aligned: TableShape::of("aligned", aligned),
            variants: variants.iter().map(|v| TableShape::of(&v.name, &v.table)).collect(),
            alignment,
            excluded_rows,
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(())
    }
}
