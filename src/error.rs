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


//! Error types.
//!
//! Configuration problems are fatal and abort a run before any computation.
//! [`MethodNotApplicable`] never escapes a run: it is recovered by falling
//! back to linear interpolation and reported through
//! [`Fallback`](crate::method::Fallback) records instead.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top level error of the library.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid settings or input shape.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// A requested method is not registered (strict mode only).
    #[error(transparent)]
    UnsupportedMethod(#[from] UnsupportedMethod),
    /// Reading or writing a file failed.
    #[error("I/O error on `{path}`: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The delimited file could not be parsed or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Fatal problems with the settings or the shape of the input table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The grid step must be finite and strictly positive.
    #[error("step must be a positive finite number, got {0}")]
    InvalidStep(f64),
    /// The independent variable range is empty or not finite.
    #[error("invalid grid range [{min}, {max}]")]
    InvalidRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// The grid would contain more points than [`MAX_GRID_POINTS`](crate::grid::MAX_GRID_POINTS).
    #[error("grid would have {0} points, which exceeds the limit")]
    GridTooLarge(usize),
    /// The independent column was not found in the header.
    #[error("independent column `{name}` not found, available columns: {available:?}")]
    MissingColumn {
        /// Requested column name.
        name: String,
        /// Column names present in the table.
        available: Vec<String>,
    },
    /// The table has no dependent columns next to the independent one.
    #[error("no dependent columns found")]
    NoDependentColumns,
    /// Two columns share a name.
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),
    /// A column does not have as many rows as the independent column.
    #[error("column `{name}` has {len} rows, expected {expected}")]
    RaggedColumn {
        /// Column name.
        name: String,
        /// Actual number of rows.
        len: usize,
        /// Number of rows of the independent column.
        expected: usize,
    },
    /// The independent column has no finite values.
    #[error("independent column `{0}` has no finite values")]
    EmptyIndex(String),
    /// The configured encoding label is not known.
    #[error("unknown encoding `{0}`")]
    UnknownEncoding(String),
    /// The input bytes are not valid in the configured encoding.
    #[error("input is not valid {0}")]
    Undecodable(String),
    /// A cell could not be parsed as a number.
    #[error("cannot parse `{value}` in column `{column}`, row {row}")]
    InvalidCell {
        /// Column name.
        column: String,
        /// 1-based data row.
        row: usize,
        /// Raw cell content.
        value: String,
    },
    /// Decimal precision outside `0..=MAX_PRECISION`.
    #[error("precision {0} is out of range 0..={max}", max = crate::precision::MAX_PRECISION)]
    InvalidPrecision(u32),
    /// Unsupported spline degree.
    #[error("spline degree {0} is out of range 1..=5")]
    InvalidSplineDegree(usize),
    /// No usable interpolation method remains after filtering the request.
    #[error("no interpolation method to run")]
    NoMethods,
    /// A settings value could not be parsed.
    #[error("invalid value `{value}` for setting `{key}`")]
    InvalidSetting {
        /// Settings key.
        key: String,
        /// Raw value.
        value: String,
    },
    /// A required setting is absent.
    #[error("missing setting `{0}`")]
    MissingSetting(String),
}

/// A requested method name is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported interpolation method `{0}`")]
pub struct UnsupportedMethod(pub String);

/// A method cannot produce a valid result for one column.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MethodNotApplicable {
    /// The method needs more known points than the column has.
    #[error("needs at least {required} points, got {got}")]
    TooFewPoints {
        /// Minimum number of points.
        required: usize,
        /// Number of points available.
        got: usize,
    },
    /// Two known points share the same x value.
    #[error("duplicate x value {0}")]
    DuplicateNodes(f64),
    /// Logarithmic interpolation was given a value whose logarithm is undefined.
    #[error("non-positive value {0} in log space")]
    NonPositive(f64),
    /// The linear system behind the method is singular.
    #[error("singular system")]
    Singular,
    /// Evaluation produced NaN or infinity.
    #[error("non-finite result at x = {0}")]
    NonFinite(f64),
}
