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


//! Nearest-neighbour lookup.

use crate::error::MethodNotApplicable;
use crate::sorted_by_x;

/// Value of the known point closest to each query.
///
/// Equidistant neighbours resolve to the lower one. Queries outside the sample
/// range take the value of the closest end point.
pub(super) fn interpolate(x_known: &[f64], y_known: &[f64], x_query: &[f64]) -> Result<Vec<f64>, MethodNotApplicable> {
    if x_known.is_empty() {
        return Err(MethodNotApplicable::TooFewPoints { required: 1, got: 0 });
    }
    let (x, y) = sorted_by_x(x_known, y_known);

    Ok(x_query.iter().map(|&q| y[nearest_index(&x, q)]).collect())
}

/// Index of the sample closest to `q` in the sorted `x`.
///
/// Among equal abscissae the first one is returned.
fn nearest_index(x: &[f64], q: f64) -> usize {
    // First index with `x[i] >= q`.
    let right = x.partition_point(|&v| v < q);
    if right == 0 {
        return 0;
    }

    let mut left = right - 1;
    while left > 0 && x[left - 1] == x[left] {
        left -= 1;
    }

    if right < x.len() && x[right] - q < q - x[left] {
        right
    } else {
        left
    }
}

#[test]
fn test_nearest_index() {
    let x = [1.0, 2.0, 2.0, 4.0];
    assert_eq!(nearest_index(&x, 0.0), 0);
    assert_eq!(nearest_index(&x, 1.4), 0);
    assert_eq!(nearest_index(&x, 1.5), 0);
    assert_eq!(nearest_index(&x, 1.6), 1);
    assert_eq!(nearest_index(&x, 2.0), 1);
    assert_eq!(nearest_index(&x, 3.0), 1);
    assert_eq!(nearest_index(&x, 3.5), 3);
    assert_eq!(nearest_index(&x, 10.0), 3);
}

#[test]
fn test_nearest_clamps_outside_range() {
    let v = interpolate(&[3.0, 1.0], &[30.0, 10.0], &[-5.0, 1.0, 2.9, 7.0]).unwrap();
    assert_eq!(v, vec![10.0, 10.0, 30.0, 30.0]);
}
