//! Date-keyed table of named numeric columns

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of a [`Table`]; `values` is aligned with the table's columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// Rows keyed by date with a fixed, ordered column set.
///
/// Unset cells are `None`. Dates need not be unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

/// A column name was requested that the table does not have
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn(pub String);

impl std::fmt::Display for UnknownColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown column '{}'", self.0)
    }
}

impl std::error::Error for UnknownColumn {}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [TableRow] {
        &mut self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row; `values` is padded or truncated to the column count.
    pub fn push_row(&mut self, date: NaiveDate, mut values: Vec<Option<f64>>) {
        values.resize(self.columns.len(), None);
        self.rows.push(TableRow { date, values });
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value of `column` in row `row`; `None` when unset or out of range,
    /// including rows whose values were shortened through `rows_mut`
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.values.get(idx).copied().flatten())
    }

    /// All dates in row order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Keep only the rows for which `keep` returns true
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&TableRow) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// New table with only `columns`, in the given order
    pub fn select(&self, columns: &[String]) -> Result<Table, UnknownColumn> {
        let indices = columns
            .iter()
            .map(|name| self.column_index(name).ok_or_else(|| UnknownColumn(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| TableRow {
                date: row.date,
                values: indices.iter().map(|&i| row.values.get(i).copied().flatten()).collect(),
            })
            .collect();

        Ok(Table {
            columns: columns.to_vec(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(NaiveDate::from_ymd_opt(2023, 2, 2).unwrap(), vec![Some(1.0), None, Some(3.0)]);
        table.push_row(NaiveDate::from_ymd_opt(2023, 3, 16).unwrap(), vec![Some(4.0), Some(5.0)]);
        table
    }

    #[test]
    fn test_push_row_pads_values() {
        let table = sample();
        assert_eq!(table.rows()[1].values, vec![Some(4.0), Some(5.0), None]);
        assert_eq!(table.value(0, "c"), Some(3.0));
        assert_eq!(table.value(0, "b"), None);
        assert_eq!(table.value(9, "a"), None);
    }

    #[test]
    fn test_select_reorders_columns() {
        let selected = sample().select(&["c".to_string(), "a".to_string()]).unwrap();
        assert_eq!(selected.columns(), &["c".to_string(), "a".to_string()]);
        assert_eq!(selected.rows()[0].values, vec![Some(3.0), Some(1.0)]);
        assert_eq!(selected.num_rows(), 2);
    }

    #[test]
    fn test_select_unknown_column() {
        let err = sample().select(&["z".to_string()]).unwrap_err();
        assert_eq!(err, UnknownColumn("z".to_string()));
    }

    #[test]
    fn test_short_rows_read_as_unset() {
        let mut table = sample();
        table.rows_mut()[0].values.truncate(1);

        assert_eq!(table.value(0, "a"), Some(1.0));
        assert_eq!(table.value(0, "c"), None);

        let selected = table.select(&["c".to_string(), "a".to_string()]).unwrap();
        assert_eq!(selected.rows()[0].values, vec![None, Some(1.0)]);
        assert_eq!(selected.rows()[1].values, vec![None, Some(4.0)]);
    }

    #[test]
    fn test_retain_rows() {
        let mut table = sample();
        table.retain_rows(|row| row.values[0] == Some(4.0));
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.dates(), vec![NaiveDate::from_ymd_opt(2023, 3, 16).unwrap()]);
    }
}
