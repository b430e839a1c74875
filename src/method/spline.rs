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


//! Interpolating B-splines without smoothing.
//!
//! Knots follow the FITPACK convention for `s = 0`: the end knots are repeated
//! `k + 1` times, interior knots sit on the data points for odd degrees (dropping
//! the `(k - 1) / 2` points next to each end, the "not-a-knot" condition of the
//! cubic case) and halfway between data points for even degrees.
//! Outside the sample range the end polynomial pieces are continued.

use ndarray::{Array1, Array2};

use crate::error::MethodNotApplicable;
use crate::solve::solve;
use crate::sorted_by_x;

/// Highest supported spline degree.
pub const MAX_DEGREE: usize = 5;

pub(super) fn interpolate(
    x_known: &[f64],
    y_known: &[f64],
    x_query: &[f64],
    degree: usize,
) -> Result<Vec<f64>, MethodNotApplicable> {
    let (x, y) = sorted_by_x(x_known, y_known);
    let spline = BSpline::interpolating(&x, &y, degree)?;
    Ok(x_query.iter().map(|&q| spline.eval(q)).collect())
}

struct BSpline {
    degree: usize,
    knots: Vec<f64>,
    coeffs: Array1<f64>,
}

impl BSpline {
    /// Spline of `degree` through the sorted samples.
    fn interpolating(x: &[f64], y: &[f64], degree: usize) -> Result<Self, MethodNotApplicable> {
        let k = degree.clamp(1, MAX_DEGREE);
        let n = x.len();
        if n <= k {
            return Err(MethodNotApplicable::TooFewPoints { required: k + 1, got: n });
        }
        if let Some(w) = x.windows(2).find(|w| w[0] == w[1]) {
            return Err(MethodNotApplicable::DuplicateNodes(w[0]));
        }

        let knots = knot_vector(x, k);

        let mut colloc = Array2::<f64>::zeros((n, n));
        let mut basis = vec![0.0; k + 1];
        for (i, &xi) in x.iter().enumerate() {
            let span = find_span(&knots, n, k, xi);
            basis_funs(&knots, span, xi, k, &mut basis);
            for (r, &b) in basis.iter().enumerate() {
                colloc[[i, span - k + r]] = b;
            }
        }

        let coeffs = solve(colloc, Array1::from(y.to_vec()))?;

        Ok(Self { degree: k, knots, coeffs })
    }

    fn eval(&self, q: f64) -> f64 {
        let k = self.degree;
        let n = self.coeffs.len();
        let span = find_span(&self.knots, n, k, q);
        let mut basis = vec![0.0; k + 1];
        basis_funs(&self.knots, span, q, k, &mut basis);
        basis
            .iter()
            .enumerate()
            .map(|(r, b)| b * self.coeffs[span - k + r])
            .sum()
    }
}

/// Knot vector of length `n + k + 1` for `n` sorted, distinct samples.
fn knot_vector(x: &[f64], k: usize) -> Vec<f64> {
    let n = x.len();
    let mut t = Vec::with_capacity(n + k + 1);
    t.extend(std::iter::repeat(x[0]).take(k + 1));
    for j in 0..n - k - 1 {
        let knot = if k % 2 == 1 {
            x[j + (k + 1) / 2]
        } else {
            0.5 * (x[j + k / 2] + x[j + k / 2 + 1])
        };
        t.push(knot);
    }
    t.extend(std::iter::repeat(x[n - 1]).take(k + 1));
    t
}

/// Index `s` in `k..n` of the knot span used at `u`.
///
/// Values left of the first knot use the first span, values at or right of the
/// last knot use the last one.
fn find_span(t: &[f64], n: usize, k: usize, u: f64) -> usize {
    let interior = &t[k + 1..n];
    k + interior.partition_point(|&v| v <= u)
}

/// The `k + 1` non-zero basis functions of span `s` at `u`, by the Cox-de Boor
/// recurrence. For `u` outside the span this evaluates the polynomial piece of
/// that span.
fn basis_funs(t: &[f64], s: usize, u: f64, k: usize, out: &mut [f64]) {
    let mut left = vec![0.0; k + 1];
    let mut right = vec![0.0; k + 1];
    out[0] = 1.0;
    for j in 1..=k {
        left[j] = u - t[s + 1 - j];
        right[j] = t[s + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = out[r] / (right[r + 1] + left[j - r]);
            out[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        out[j] = saved;
    }
}

#[test]
fn test_knot_vector_cubic_is_not_a_knot() {
    let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(
        knot_vector(&x, 3),
        vec![0.0, 0.0, 0.0, 0.0, 2.0, 3.0, 5.0, 5.0, 5.0, 5.0]
    );
    assert_eq!(knot_vector(&x, 2), vec![0.0, 0.0, 0.0, 1.5, 2.5, 3.5, 5.0, 5.0, 5.0]);
}

#[test]
fn test_basis_partition_of_unity() {
    let x = [0.0, 1.0, 2.5, 3.0, 4.0, 6.0];
    let t = knot_vector(&x, 3);
    let mut b = vec![0.0; 4];
    for &u in [0.0, 0.3, 2.7, 5.9, 6.0].iter() {
        let s = find_span(&t, x.len(), 3, u);
        basis_funs(&t, s, u, 3, &mut b);
        assert!((b.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_cubic_spline_reproduces_cubic() {
    let f = |x: f64| 0.5 * x * x * x - x * x + 3.0;
    let x = vec![0.0, 1.0, 2.0, 4.0, 5.0, 7.0];
    let y: Vec<f64> = x.iter().map(|&v| f(v)).collect();
    let q = [-1.0, 0.5, 3.0, 6.5, 8.0];

    let v = interpolate(&x, &y, &q, 3).unwrap();
    for (got, &u) in v.iter().zip(q.iter()) {
        assert!((got - f(u)).abs() < 1e-8, "at {}: {} != {}", u, got, f(u));
    }
}

#[test]
fn test_spline_passes_through_samples() {
    let x = [0.0, 3.0, 6.0, 9.0, 12.0];
    let y = [10.0, 40.0, 30.0, 5.0, 8.0];
    for k in 1..=4 {
        let v = interpolate(&x, &y, &x, k).unwrap();
        for (got, want) in v.iter().zip(y.iter()) {
            assert!((got - want).abs() < 1e-9, "degree {}", k);
        }
    }
}

#[test]
fn test_linear_spline_is_piecewise_linear() {
    let v = interpolate(&[0.0, 1.0, 3.0], &[0.0, 2.0, 3.0], &[0.5, 2.0], 1).unwrap();
    assert!((v[0] - 1.0).abs() < 1e-12);
    assert!((v[1] - 2.5).abs() < 1e-12);
}

#[test]
fn test_spline_requirements() {
    assert_eq!(
        interpolate(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], &[0.5], 3).unwrap_err(),
        MethodNotApplicable::TooFewPoints { required: 4, got: 3 }
    );
    assert_eq!(
        interpolate(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 2.0, 0.0], &[0.5], 3).unwrap_err(),
        MethodNotApplicable::DuplicateNodes(1.0)
    );
}
