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


//! Resampling of tabulated one dimensional curves onto a fixed-step grid.
//!
//! A [`Table`](table::Table) holds one independent column (time, water level, ...)
//! and any number of dependent columns. [`Resampler`](resampler::Resampler) builds
//! a regular grid over the independent column and produces one resampled table per
//! interpolation [`Method`](method::Method). Samples that already lie on the grid
//! are copied verbatim, everything else is interpolated.
//!
//! # Example
//! ```
//! use regrid::prelude::*;
//!
//! let table = Table::new("t", vec![0.0, 3.0, 6.0, 9.0])
//!     .with_column("Q", vec![10.0, 40.0, 30.0, 5.0])
//!     .unwrap();
//!
//! let config = ResampleConfig::new(1.0)
//!     .with_methods(["linear"])
//!     .with_precision(0, 1);
//! let output = Resampler::new(config).run(&table).unwrap();
//!
//! let linear = output.get(Method::Linear).unwrap();
//! assert_eq!(linear.table.index(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
//! assert_eq!(linear.table.column("Q").unwrap()[1], 20.0);
//! ```

#![deny(missing_docs)]

use std::cmp::Ordering;

pub mod config;
pub mod error;
pub mod grid;
pub mod interp1d;
pub mod io;
pub mod merge;
pub mod method;
pub mod precision;
pub mod resampler;
mod solve;
pub mod table;

/// Commonly used types.
pub mod prelude {
    pub use crate::error::{ConfigurationError, Error, MethodNotApplicable, UnsupportedMethod};
    pub use crate::method::{Fallback, Method, MethodOptions};
    pub use crate::resampler::{MethodResult, ResampleConfig, ResampleOutput, Resampler};
    pub use crate::table::Table;
}

/// Absolute and relative tolerance under which two abscissae are the same point.
pub const POINT_TOLERANCE: f64 = 1e-12;

/// Tolerance comparison `|a - b| <= atol + rtol * |b|` with both tolerances set to
/// [`POINT_TOLERANCE`].
#[inline]
pub(crate) fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= POINT_TOLERANCE + POINT_TOLERANCE * b.abs()
}

/// Find the indices of the segment of the sorted `v` used to evaluate at `x`.
///
/// Points left of `v[0]` map to the first segment and points right of the last
/// sample map to the last segment. `v` must hold at least two values.
pub(crate) fn find_closest_neighbours_indices<C>(v: &[C], x: C) -> (usize, usize)
    where C: PartialOrd {
    debug_assert!(v.len() >= 2);
    // Upper bound: first index with `v[i] > x`.
    let upper = v.partition_point(|a| !matches!(a.partial_cmp(&x), Some(Ordering::Greater)));

    let idx = upper.max(1) - 1;

    if idx >= v.len() - 1 {
        (v.len() - 2, v.len() - 1)
    } else {
        (idx, idx + 1)
    }
}

/// Stable sort of `(x, y)` pairs by `x`, returned as two vectors.
pub(crate) fn sorted_by_x(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut order: Vec<usize> = (0..x.len()).collect();
    order.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal));
    order.iter().map(|&i| (x[i], y[i])).unzip()
}

#[test]
fn test_find_closest_neighbours_indices() {
    let v = vec![0., 1., 2.];
    assert_eq!(find_closest_neighbours_indices(&v, -0.1), (0, 1));
    assert_eq!(find_closest_neighbours_indices(&v, 0.), (0, 1));
    assert_eq!(find_closest_neighbours_indices(&v, 0.01), (0, 1));
    assert_eq!(find_closest_neighbours_indices(&v, 0.99), (0, 1));
    assert_eq!(find_closest_neighbours_indices(&v, 1.0), (1, 2));
    assert_eq!(find_closest_neighbours_indices(&v, 1.99), (1, 2));
    assert_eq!(find_closest_neighbours_indices(&v, 2.99), (1, 2));
}

#[test]
fn test_find_closest_neighbours_with_duplicates() {
    // The last of a run of equal values starts the segment.
    let v = vec![0., 1., 1., 2.];
    assert_eq!(find_closest_neighbours_indices(&v, 1.0), (2, 3));
    assert_eq!(find_closest_neighbours_indices(&v, 0.5), (0, 1));
}

#[test]
fn test_is_close() {
    assert!(is_close(1.0, 1.0 + 1e-13));
    assert!(!is_close(1.0, 1.0 + 1e-9));
    assert!(is_close(0.0, 0.0));
}

#[test]
fn test_sorted_by_x_is_stable() {
    let (x, y) = sorted_by_x(&[2.0, 1.0, 1.0, 0.0], &[20.0, 10.0, 11.0, 0.0]);
    assert_eq!(x, vec![0.0, 1.0, 1.0, 2.0]);
    assert_eq!(y, vec![0.0, 10.0, 11.0, 20.0]);
}
