// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tabular step arguments.
//!
//! A [`Table`] is the pipe-delimited block written under a step. Its first
//! row names the columns, every following row is data.

use std::{collections::HashMap, fmt};

use derive_more::{Display, Error};

/// Error of building a [`Table`] out of raw rows.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum TableShapeError {
    /// No rows at all, so there is no header.
    #[display("table has no header row")]
    Empty,

    /// A row has a different number of cells than the header.
    #[display("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row, the header being row `0`.
        row: usize,

        /// Number of header cells.
        expected: usize,

        /// Number of cells in the offending row.
        found: usize,
    },
}

/// Data table attached to a step.
///
/// # Example
///
/// ```rust
/// use stepbind::Table;
///
/// let table = Table::try_from(vec![
///     vec!["mark", "row", "col"],
///     vec!["X", "top", "left"],
/// ])
/// .unwrap();
///
/// assert_eq!(table.columns(), ["mark", "row", "col"]);
/// let row = table.rows().next().unwrap();
/// assert_eq!(row.get("row"), Some("top"));
/// assert_eq!(row.cells().collect::<Vec<_>>(), ["X", "top", "left"]);
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a new [`Table`] out of a `header` and data `rows`.
    ///
    /// # Errors
    ///
    /// If any of the `rows` doesn't have exactly as many cells as the
    /// `header`.
    pub fn new(
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, TableShapeError> {
        let expected = header.len();
        if let Some((i, row)) =
            rows.iter().enumerate().find(|(_, r)| r.len() != expected)
        {
            return Err(TableShapeError::Ragged {
                row: i + 1,
                expected,
                found: row.len(),
            });
        }
        Ok(Self { header, rows })
    }

    /// Column names, in the order they were written.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.header
    }

    /// Iterates over the data rows (the header excluded).
    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(|cells| Row {
            header: &self.header,
            cells,
        })
    }

    /// Returns the data row at `index`, if any.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            header: &self.header,
            cells,
        })
    }

    /// Returns all the rows including the header one.
    #[must_use]
    pub fn raw(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }

    /// Converts the data rows into maps keyed by column name.
    #[must_use]
    pub fn hashes(&self) -> Vec<HashMap<String, String>> {
        self.rows()
            .map(|row| {
                row.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect()
            })
            .collect()
    }

    /// Converts a two-column table into a map, the header row included.
    ///
    /// Returns [`None`] if the table isn't two columns wide.
    #[must_use]
    pub fn rows_hash(&self) -> Option<HashMap<String, String>> {
        if self.width() != 2 {
            return None;
        }
        Some(
            self.raw()
                .into_iter()
                .filter_map(|mut r| {
                    let v = r.pop()?;
                    let k = r.pop()?;
                    Some((k, v))
                })
                .collect(),
        )
    }

    /// Returns a transposed [`Table`]: the first column becomes the header.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let raw = self.raw();
        let mut columns = (0..self.width())
            .map(|i| raw.iter().map(|r| r[i].clone()).collect::<Vec<_>>());
        let header = columns.next().unwrap_or_default();
        Self {
            header,
            rows: columns.collect(),
        }
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Indicates whether this [`Table`] has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Applies `f` to every cell, the header included.
    pub(crate) fn map_cells<E>(
        &self,
        mut f: impl FnMut(&str) -> Result<String, E>,
    ) -> Result<Self, E> {
        let mut map_row = |row: &[String]| {
            row.iter().map(|c| f(c)).collect::<Result<Vec<_>, E>>()
        };
        let header = map_row(&self.header)?;
        let rows = self
            .rows
            .iter()
            .map(|r| map_row(r))
            .collect::<Result<_, _>>()?;
        Ok(Self { header, rows })
    }
}

impl TryFrom<Vec<Vec<String>>> for Table {
    type Error = TableShapeError;

    fn try_from(mut rows: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        if rows.is_empty() {
            return Err(TableShapeError::Empty);
        }
        let header = rows.remove(0);
        Self::new(header, rows)
    }
}

impl TryFrom<Vec<Vec<&str>>> for Table {
    type Error = TableShapeError;

    fn try_from(rows: Vec<Vec<&str>>) -> Result<Self, Self::Error> {
        rows.into_iter()
            .map(|r| r.into_iter().map(str::to_owned).collect())
            .collect::<Vec<Vec<String>>>()
            .try_into()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in std::iter::once(&self.header).chain(&self.rows) {
            writeln!(f, "| {} |", row.join(" | "))?;
        }
        Ok(())
    }
}

/// Single data row of a [`Table`].
#[derive(Clone, Copy, Debug)]
pub struct Row<'t> {
    header: &'t [String],
    cells: &'t [String],
}

impl<'t> Row<'t> {
    /// Returns the cell under the given `column`, if there is such column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'t str> {
        self.header
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
    }

    /// Iterates over the cells in column order.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = &'t str> + 't {
        self.cells.iter().map(String::as_str)
    }

    /// Iterates over `(column, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'t str, &'t str)> + 't {
        self.header
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Table {
        Table::try_from(vec![
            vec!["mark", "row", "col"],
            vec!["X", "top", "left"],
            vec!["O", "middle", "right"],
        ])
        .unwrap()
    }

    #[test]
    fn rows_exclude_header() {
        let table = board();

        assert_eq!(table.len(), 2);
        assert_eq!(table.width(), 3);
        let first = table.rows().next().unwrap();
        assert_eq!(first.cells().collect::<Vec<_>>(), ["X", "top", "left"]);
    }

    #[test]
    fn row_lookup_by_column() {
        let table = board();
        let row = table.row(1).unwrap();

        assert_eq!(row.get("mark"), Some("O"));
        assert_eq!(row.get("col"), Some("right"));
        assert_eq!(row.get("diagonal"), None);
    }

    #[test]
    fn hashes() {
        let hashes = board().hashes();

        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes[0].get("row"), Some(&"top".to_owned()));
        assert_eq!(hashes[1].get("mark"), Some(&"O".to_owned()));
    }

    #[test]
    fn rows_hash_needs_two_columns() {
        assert!(board().rows_hash().is_none());

        let settings = Table::try_from(vec![
            vec!["timeout", "30"],
            vec!["retries", "3"],
        ])
        .unwrap();
        let hash = settings.rows_hash().unwrap();
        assert_eq!(hash.get("timeout"), Some(&"30".to_owned()));
        assert_eq!(hash.get("retries"), Some(&"3".to_owned()));
    }

    #[test]
    fn transpose() {
        let table = Table::try_from(vec![
            vec!["name", "Alice", "Bob"],
            vec!["age", "30", "25"],
        ])
        .unwrap();

        let transposed = table.transpose();
        assert_eq!(transposed.columns(), ["name", "age"]);
        assert_eq!(
            transposed.raw(),
            [["name", "age"], ["Alice", "30"], ["Bob", "25"]],
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Table::try_from(vec![vec!["a", "b"], vec!["1"]]).unwrap_err();

        assert_eq!(
            err,
            TableShapeError::Ragged {
                row: 1,
                expected: 2,
                found: 1,
            },
        );
        assert_eq!(
            Table::try_from(Vec::<Vec<String>>::new()).unwrap_err(),
            TableShapeError::Empty,
        );
    }

    #[test]
    fn display_renders_pipes() {
        assert_eq!(
            board().to_string(),
            "| mark | row | col |\n| X | top | left |\n| O | middle | right |\n",
        );
    }
}
