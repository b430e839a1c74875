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


//! Dense linear solver for the small systems behind polynomial fits and
//! spline collocation.

use ndarray::{Array1, Array2};
use crate::error::MethodNotApplicable;

/// Pivots smaller than this relative to the largest entry of the matrix are
/// treated as zero.
const PIVOT_EPS: f64 = 1e-13;

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
///
/// `a` must be square with as many rows as `b`.
pub(crate) fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, MethodNotApplicable> {
    let n = b.len();
    assert_eq!(a.dim(), (n, n), "matrix shape mismatch.");

    let scale = a.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(MethodNotApplicable::Singular);
    }

    for col in 0..n {
        // Partial pivoting.
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() <= PIVOT_EPS * scale {
            return Err(MethodNotApplicable::Singular);
        }
        if pivot != col {
            for k in 0..n {
                a.swap([pivot, k], [col, k]);
            }
            b.swap(pivot, col);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution.
    let mut x: Array1<f64> = Array1::zeros(n);
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in row + 1..n {
            acc -= a[[row, k]] * x[k];
        }
        x[row] = acc / a[[row, row]];
    }

    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(MethodNotApplicable::Singular)
    }
}

#[test]
fn test_solve_3x3() {
    let a = ndarray::array![
        [2.0, 1.0, -1.0],
        [-3.0, -1.0, 2.0],
        [-2.0, 1.0, 2.0]
    ];
    let b = ndarray::array![8.0, -11.0, -3.0];
    let x = solve(a, b).unwrap();

    let tol = 1e-12;
    assert!((x[0] - 2.0).abs() < tol);
    assert!((x[1] - 3.0).abs() < tol);
    assert!((x[2] + 1.0).abs() < tol);
}

#[test]
fn test_solve_needs_pivoting() {
    let a = ndarray::array![[0.0, 1.0], [1.0, 0.0]];
    let b = ndarray::array![3.0, 4.0];
    let x = solve(a, b).unwrap();
    assert_eq!(x, ndarray::array![4.0, 3.0]);
}

#[test]
fn test_solve_singular() {
    let a = ndarray::array![[1.0, 2.0], [2.0, 4.0]];
    let b = ndarray::array![1.0, 2.0];
    assert_eq!(solve(a, b), Err(MethodNotApplicable::Singular));
}
