#![forbid(unsafe_code)]

//! Record Table: the unit every loader and aggregation function operates on.
//!
//! A [`Table`] is a column-major collection of equally long [`Scalar`]
//! columns. Column order is insertion order — for loaded datasets that is
//! the CSV header order, which the presentation layer relies on. Tables are
//! built fresh per load, never cached, and exclusively owned by the caller.

use rg_types::Scalar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("column '{name}' doesn't exist")]
    MissingColumn { name: String },
    #[error("column '{name}' has {actual} rows, table has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("column '{name}' already exists")]
    DuplicateColumn { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Column {
    name: String,
    values: Vec<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(name, values)` pairs, in order.
    pub fn from_columns<I>(columns: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (String, Vec<Scalar>)>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Appends a column. The first column fixes the row count.
    pub fn push_column(&mut self, name: String, values: Vec<Scalar>) -> Result<(), FrameError> {
        if self.has_column(&name) {
            return Err(FrameError::DuplicateColumn { name });
        }
        if !self.columns.is_empty() && values.len() != self.row_count() {
            return Err(FrameError::LengthMismatch {
                name,
                expected: self.row_count(),
                actual: values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Column names in insertion (header) order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Scalar]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`Table::column`] but absence is a hard error — the taxonomy for
    /// aggregations that require a specific column.
    pub fn require_column(&self, name: &str) -> Result<&[Scalar], FrameError> {
        self.column(name).ok_or_else(|| FrameError::MissingColumn {
            name: name.to_owned(),
        })
    }

    /// Replaces an existing column's values in place.
    pub fn set_column(&mut self, name: &str, values: Vec<Scalar>) -> Result<(), FrameError> {
        if values.len() != self.row_count() {
            return Err(FrameError::LengthMismatch {
                name: name.to_owned(),
                expected: self.row_count(),
                actual: values.len(),
            });
        }
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| FrameError::MissingColumn {
                name: name.to_owned(),
            })?;
        column.values = values;
        Ok(())
    }

    /// New table holding the given row positions, in the given order, with
    /// every column carried across. Positions must be in bounds.
    #[must_use]
    pub fn take_rows(&self, positions: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: positions.iter().map(|&p| c.values[p].clone()).collect(),
            })
            .collect();
        Self { columns }
    }
}

#[cfg(test)]
mod tests {
    use rg_types::Scalar;

    use super::{FrameError, Table};

    fn utf8_column(values: &[&str]) -> Vec<Scalar> {
        values.iter().map(|v| Scalar::from(*v)).collect()
    }

    #[test]
    fn columns_keep_header_order() {
        let table = Table::from_columns([
            ("annee".to_owned(), utf8_column(&["1951", "1952"])),
            ("genre".to_owned(), utf8_column(&["Masculin", "F_minin"])),
            ("pr1".to_owned(), utf8_column(&["Jean", "Marie"])),
        ])
        .expect("build");
        assert_eq!(table.names(), ["annee", "genre", "pr1"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut table = Table::new();
        table
            .push_column("annee".to_owned(), utf8_column(&["1951", "1952"]))
            .expect("first column");
        let err = table
            .push_column("genre".to_owned(), utf8_column(&["Masculin"]))
            .unwrap_err();
        assert!(matches!(err, FrameError::LengthMismatch { .. }));
    }

    #[test]
    fn duplicate_column_is_rejected() {
        let mut table = Table::new();
        table
            .push_column("annee".to_owned(), utf8_column(&["1951"]))
            .expect("first column");
        let err = table
            .push_column("annee".to_owned(), utf8_column(&["1952"]))
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::DuplicateColumn {
                name: "annee".to_owned()
            }
        );
    }

    #[test]
    fn require_column_reports_the_missing_name() {
        let table = Table::new();
        let err = table.require_column("genre").unwrap_err();
        assert_eq!(
            err,
            FrameError::MissingColumn {
                name: "genre".to_owned()
            }
        );
    }

    #[test]
    fn set_column_replaces_values_of_matching_length() {
        let mut table = Table::from_columns([(
            "annee".to_owned(),
            utf8_column(&["1951", "1952"]),
        )])
        .expect("build");
        table
            .set_column("annee", vec![Scalar::Int64(1951), Scalar::Int64(1952)])
            .expect("replace");
        assert_eq!(
            table.column("annee").unwrap(),
            &[Scalar::Int64(1951), Scalar::Int64(1952)]
        );
        let err = table.set_column("annee", vec![Scalar::Null]).unwrap_err();
        assert!(matches!(err, FrameError::LengthMismatch { .. }));
    }

    #[test]
    fn take_rows_reorders_and_filters() {
        let table = Table::from_columns([
            ("annee".to_owned(), utf8_column(&["1951", "1952", "1953"])),
            ("pr1".to_owned(), utf8_column(&["Jean", "Marie", "Louis"])),
        ])
        .expect("build");
        let subset = table.take_rows(&[2, 0]);
        assert_eq!(subset.row_count(), 2);
        assert_eq!(
            subset.column("pr1").unwrap(),
            &[Scalar::from("Louis"), Scalar::from("Jean")]
        );
    }
}
