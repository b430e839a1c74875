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


//! Preservation of original samples that lie on the grid.
//!
//! Grid points matching a known abscissa within [`POINT_TOLERANCE`] take the
//! known value verbatim. Only the remaining points are handed to the
//! interpolation method, so exact data never picks up round-off from an
//! interpolant.

use std::cmp::Ordering;

use crate::error::MethodNotApplicable;
use crate::method::{Method, MethodOptions};
use crate::{is_close, POINT_TOLERANCE};

/// Split of a grid into points backed by an original sample and points to interpolate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridPartition {
    /// `(grid index, known index)` pairs.
    pub kept: Vec<(usize, usize)>,
    /// Grid indices without a matching sample.
    pub missing: Vec<usize>,
}

/// Match every grid point against the known abscissae.
///
/// When several samples match the same grid point the one appearing first in
/// `x_known` wins.
pub fn partition_grid(x_known: &[f64], grid: &[f64]) -> GridPartition {
    let mut order: Vec<usize> = (0..x_known.len()).collect();
    order.sort_by(|&a, &b| x_known[a].partial_cmp(&x_known[b]).unwrap_or(Ordering::Equal));
    let sorted: Vec<f64> = order.iter().map(|&i| x_known[i]).collect();

    let mut partition = GridPartition::default();
    for (gi, &g) in grid.iter().enumerate() {
        let tol = POINT_TOLERANCE + POINT_TOLERANCE * g.abs();
        let lo = sorted.partition_point(|&x| x < g - tol);
        let hi = sorted.partition_point(|&x| x <= g + tol);

        let first = order[lo..hi.max(lo)]
            .iter()
            .copied()
            .filter(|&ki| is_close(x_known[ki], g))
            .min();

        match first {
            Some(ki) => partition.kept.push((gi, ki)),
            None => partition.missing.push(gi),
        }
    }
    partition
}

/// Values of one column on `grid` for `method`.
///
/// Returns the values in grid order and the reason linear interpolation was
/// substituted, if it was.
///
/// # Errors
/// Fails when not even linear interpolation can run on the samples.
pub fn resample_column(
    x_known: &[f64],
    y_known: &[f64],
    grid: &[f64],
    method: Method,
    options: &MethodOptions,
) -> Result<(Vec<f64>, Option<MethodNotApplicable>), MethodNotApplicable> {
    let partition = partition_grid(x_known, grid);

    let x_missing: Vec<f64> = partition.missing.iter().map(|&gi| grid[gi]).collect();
    let (y_missing, fallback) = if x_missing.is_empty() {
        (Vec::new(), None)
    } else {
        method.interpolate_or_linear(x_known, y_known, &x_missing, options)?
    };

    // Kept originals followed by interpolated points, ordered by abscissa.
    let mut merged: Vec<(f64, f64)> = partition
        .kept
        .iter()
        .map(|&(_, ki)| (x_known[ki], y_known[ki]))
        .chain(x_missing.into_iter().zip(y_missing))
        .collect();
    merged.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    Ok((merged.into_iter().map(|(_, y)| y).collect(), fallback))
}

#[test]
fn test_partition_grid() {
    let x = [0.0, 3.0, 6.0 + 1e-13, 9.0];
    let grid = [0.0, 1.5, 3.0, 4.5, 6.0, 7.5, 9.0];
    let p = partition_grid(&x, &grid);
    assert_eq!(p.kept, vec![(0, 0), (2, 1), (4, 2), (6, 3)]);
    assert_eq!(p.missing, vec![1, 3, 5]);
}

#[test]
fn test_partition_first_match_wins() {
    let x = [5.0, 1.0, 1.0 + 1e-13, 1.0];
    let p = partition_grid(&x, &[1.0, 2.0]);
    assert_eq!(p.kept, vec![(0, 1)]);
    assert_eq!(p.missing, vec![1]);
}

#[test]
fn test_resample_keeps_originals_verbatim() {
    // A polynomial through these points does not return 0.1 exactly at x = 1.
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let y = [0.3, 0.1, 0.7, 0.2, 0.9];
    let grid = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];

    let (v, fallback) = resample_column(&x, &y, &grid, Method::Polynomial, &MethodOptions::default()).unwrap();
    assert!(fallback.is_none());
    assert_eq!(v.len(), grid.len());
    for (i, &want) in y.iter().enumerate() {
        assert_eq!(v[2 * i].to_bits(), want.to_bits());
    }
}

#[test]
fn test_resample_reports_fallback() {
    let (v, fallback) = resample_column(
        &[0.0, 2.0],
        &[1.0, 3.0],
        &[0.0, 1.0, 2.0],
        Method::Spline,
        &MethodOptions::default(),
    )
    .unwrap();
    assert_eq!(v, vec![1.0, 2.0, 3.0]);
    assert_eq!(fallback, Some(MethodNotApplicable::TooFewPoints { required: 4, got: 2 }));
}

#[test]
fn test_resample_all_points_kept_skips_method() {
    // Spline could not run on two points, but nothing needs interpolating.
    let (v, fallback) = resample_column(
        &[0.0, 1.0],
        &[5.0, 6.0],
        &[0.0, 1.0],
        Method::Spline,
        &MethodOptions::default(),
    )
    .unwrap();
    assert_eq!(v, vec![5.0, 6.0]);
    assert!(fallback.is_none());
}
