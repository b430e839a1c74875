/*
 * Copyright (c) 2021-2021 Thomas Kramer.
 *
 * This file is part of regrid
 * (a fork of https://codeberg.org/libreda/interp).
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */


//! In-memory table: one independent column and ordered dependent columns.

use crate::error::ConfigurationError;

/// Column-oriented table of `f64` values.
///
/// Dependent column names are unique and keep their insertion order. Missing
/// cells are stored as `NaN`.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    index_name: String,
    index: Vec<f64>,
    columns: Vec<(String, Vec<f64>)>,
}

impl Table {
    /// Create a table with only an independent column.
    pub fn new(index_name: impl Into<String>, index: Vec<f64>) -> Self {
        Self {
            index_name: index_name.into(),
            index,
            columns: Vec::new(),
        }
    }

    /// Build a table from named columns, using `index_column` as the independent
    /// variable and every other column as a dependent one.
    pub fn from_columns(
        columns: Vec<(String, Vec<f64>)>,
        index_column: &str,
    ) -> Result<Self, ConfigurationError> {
        let pos = columns
            .iter()
            .position(|(name, _)| name == index_column)
            .ok_or_else(|| ConfigurationError::MissingColumn {
                name: index_column.to_string(),
                available: columns.iter().map(|(n, _)| n.clone()).collect(),
            })?;

        let mut columns = columns;
        let (index_name, index) = columns.remove(pos);
        let mut table = Table::new(index_name, index);
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        if table.columns.is_empty() {
            return Err(ConfigurationError::NoDependentColumns);
        }
        Ok(table)
    }

    /// Append a dependent column, builder style.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, ConfigurationError> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Append a dependent column.
    ///
    /// # Errors
    /// Fails on a name clash with any existing column and when the length differs
    /// from the independent column.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), ConfigurationError> {
        let name = name.into();
        if name == self.index_name || self.columns.iter().any(|(n, _)| *n == name) {
            return Err(ConfigurationError::DuplicateColumn(name));
        }
        if values.len() != self.index.len() {
            return Err(ConfigurationError::RaggedColumn {
                name,
                len: values.len(),
                expected: self.index.len(),
            });
        }
        self.columns.push((name, values));
        Ok(())
    }

    /// Remove a dependent column and return its values.
    pub fn remove_column(&mut self, name: &str) -> Option<Vec<f64>> {
        let pos = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(pos).1)
    }

    /// Name of the independent column.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Values of the independent column.
    pub fn index(&self) -> &[f64] {
        &self.index
    }

    /// Values of a dependent column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Mutable values of a dependent column.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut [f64]> {
        self.columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_mut_slice())
    }

    /// Dependent columns in order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Names of the dependent columns in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Header in output order: independent column first.
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(self.index_name.as_str())
            .chain(self.columns.iter().map(|(n, _)| n.as_str()))
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Smallest and largest finite value of the independent column.
    pub fn index_range(&self) -> Option<(f64, f64)> {
        self.index
            .iter()
            .copied()
            .filter(|x| x.is_finite())
            .fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
    }

    /// The known samples of a dependent column: rows where both the independent
    /// and the dependent value are finite, in row order.
    pub fn series(&self, name: &str) -> Option<(Vec<f64>, Vec<f64>)> {
        let values = self.column(name)?;
        Some(
            self.index
                .iter()
                .zip(values)
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .map(|(&x, &y)| (x, y))
                .unzip(),
        )
    }
}

#[cfg(test)]
fn sample() -> Table {
    Table::new("t", vec![0.0, 3.0, f64::NAN, 9.0])
        .with_column("Q", vec![10.0, 40.0, 30.0, 5.0])
        .unwrap()
        .with_column("H", vec![1.0, f64::NAN, 3.0, 4.0])
        .unwrap()
}

#[test]
fn test_series_skips_missing_cells() {
    let t = sample();
    assert_eq!(t.series("Q").unwrap(), (vec![0.0, 3.0, 9.0], vec![10.0, 40.0, 5.0]));
    assert_eq!(t.series("H").unwrap(), (vec![0.0, 9.0], vec![1.0, 4.0]));
    assert!(t.series("missing").is_none());
}

#[test]
fn test_index_range() {
    assert_eq!(sample().index_range(), Some((0.0, 9.0)));
    assert_eq!(Table::new("t", vec![f64::NAN]).index_range(), None);
}

#[test]
fn test_column_order_and_header() {
    let t = sample();
    assert_eq!(t.header(), vec!["t", "Q", "H"]);
    assert_eq!(t.column_names(), vec!["Q", "H"]);
}

#[test]
fn test_push_column_errors() {
    let mut t = sample();
    assert_eq!(
        t.push_column("Q", vec![0.0; 4]),
        Err(ConfigurationError::DuplicateColumn("Q".to_string()))
    );
    assert_eq!(
        t.push_column("t", vec![0.0; 4]),
        Err(ConfigurationError::DuplicateColumn("t".to_string()))
    );
    assert!(matches!(
        t.push_column("Z", vec![0.0; 3]),
        Err(ConfigurationError::RaggedColumn { len: 3, expected: 4, .. })
    ));
}

#[test]
fn test_from_columns() {
    let cols = vec![
        ("Q".to_string(), vec![1.0, 2.0]),
        ("t".to_string(), vec![0.0, 1.0]),
        ("H".to_string(), vec![3.0, 4.0]),
    ];
    let t = Table::from_columns(cols.clone(), "t").unwrap();
    assert_eq!(t.index_name(), "t");
    assert_eq!(t.column_names(), vec!["Q", "H"]);

    assert!(matches!(
        Table::from_columns(cols, "time"),
        Err(ConfigurationError::MissingColumn { .. })
    ));
    assert_eq!(
        Table::from_columns(vec![("t".to_string(), vec![0.0])], "t"),
        Err(ConfigurationError::NoDependentColumns)
    );
}
