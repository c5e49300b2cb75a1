// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use super::dataset::{Dataset, DatasetResponse};

pub const DATE_COLUMN: &str = "Date";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset has no 'Date' column")]
    MissingDateColumn,

    #[error("row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row} has an invalid date: {value}")]
    InvalidDate { row: usize, value: String },

    #[error("row {row} has a non-numeric value in column '{column}'")]
    NonNumeric { row: usize, column: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Daily series indexed by date, one value per date in every column.
///
/// Row order is the upstream order (Quandl returns newest first).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    name: Option<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl TimeSeriesTable {
    /// Builds a table from upstream column names and rows.
    ///
    /// Either every row converts or the whole table is rejected.
    pub fn from_rows(column_names: &[String], rows: &[Vec<Value>]) -> Result<Self, ParseError> {
        let date_idx = column_names
            .iter()
            .position(|c| c == DATE_COLUMN)
            .ok_or(ParseError::MissingDateColumn)?;

        let mut dates = Vec::with_capacity(rows.len());
        let mut columns: Vec<Column> = column_names
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .map(|(_, name)| Column {
                name: name.clone(),
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != column_names.len() {
                return Err(ParseError::RowWidth {
                    row: row_idx,
                    expected: column_names.len(),
                    found: row.len(),
                });
            }

            dates.push(parse_date(row_idx, &row[date_idx])?);

            let cells = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != date_idx)
                .map(|(_, cell)| cell);
            for (column, cell) in columns.iter_mut().zip(cells) {
                let value = match cell {
                    Value::Null => None,
                    Value::Number(n) => n.as_f64(),
                    _ => {
                        return Err(ParseError::NonNumeric {
                            row: row_idx,
                            column: column.name.clone(),
                        })
                    }
                };
                column.values.push(value);
            }
        }

        Ok(Self {
            name: None,
            dates,
            columns,
        })
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Dataset title as reported upstream, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column by exact name, then case-insensitively.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    /// Non-null `(date, value)` pairs of one column, in table order.
    pub fn points(&self, column: &Column) -> Vec<(NaiveDate, f64)> {
        self.dates
            .iter()
            .zip(column.values.iter())
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
            .collect()
    }
}

impl TryFrom<Dataset> for TimeSeriesTable {
    type Error = ParseError;

    fn try_from(dataset: Dataset) -> Result<Self, Self::Error> {
        let table = TimeSeriesTable::from_rows(&dataset.column_names, &dataset.data)?;
        Ok(table.with_name(dataset.name))
    }
}

/// Parses a dataset response body into a table.
pub fn parse_dataset(body: &str) -> Result<TimeSeriesTable, ParseError> {
    let response: DatasetResponse = serde_json::from_str(body)?;
    TimeSeriesTable::try_from(response.dataset)
}

fn parse_date(row: usize, cell: &Value) -> Result<NaiveDate, ParseError> {
    let text = cell.as_str().ok_or_else(|| ParseError::InvalidDate {
        row,
        value: cell.to_string(),
    })?;
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| ParseError::InvalidDate {
        row,
        value: text.to_string(),
    })
}
