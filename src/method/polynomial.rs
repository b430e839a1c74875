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


//! Global polynomial interpolation.
//!
//! The interpolating polynomial through all `n` known points is evaluated in
//! barycentric form. It oscillates strongly between the outer samples once `n`
//! grows beyond a handful of points; that is accepted here and only numerical
//! failure (duplicate nodes, overflow) makes the method inapplicable.
//!
//! A degree lower than `n - 1` selects a least-squares fit instead.

use ndarray::{Array1, Array2};

use crate::error::MethodNotApplicable;
use crate::solve::solve;
use crate::sorted_by_x;

pub(super) fn interpolate(
    x_known: &[f64],
    y_known: &[f64],
    x_query: &[f64],
    degree: Option<usize>,
) -> Result<Vec<f64>, MethodNotApplicable> {
    let n = x_known.len();
    if n == 0 {
        return Err(MethodNotApplicable::TooFewPoints { required: 1, got: 0 });
    }
    let (x, y) = sorted_by_x(x_known, y_known);

    match degree {
        Some(d) if d + 1 < n => {
            let fit = LeastSquares::fit(&x, &y, d)?;
            Ok(x_query.iter().map(|&q| fit.eval(q)).collect())
        }
        _ => {
            let lagrange = Lagrange::new(x, y)?;
            Ok(x_query.iter().map(|&q| lagrange.eval(q)).collect())
        }
    }
}

/// Interpolating polynomial in the second barycentric form.
struct Lagrange {
    x: Vec<f64>,
    y: Vec<f64>,
    weights: Vec<f64>,
}

impl Lagrange {
    /// `x` must be sorted.
    fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, MethodNotApplicable> {
        if let Some(w) = x.windows(2).find(|w| w[0] == w[1]) {
            return Err(MethodNotApplicable::DuplicateNodes(w[0]));
        }

        // Distances are scaled by a quarter of the range to keep the products
        // of the weights away from overflow. The barycentric form does not depend
        // on a common factor of the weights.
        let scale = match (x.first(), x.last()) {
            (Some(a), Some(b)) if b > a => (b - a) / 4.0,
            _ => 1.0,
        };

        let weights = (0..x.len())
            .map(|j| {
                let prod: f64 = (0..x.len())
                    .filter(|&k| k != j)
                    .map(|k| (x[j] - x[k]) / scale)
                    .product();
                1.0 / prod
            })
            .collect::<Vec<_>>();

        if let Some(j) = weights.iter().position(|w| !w.is_finite()) {
            return Err(MethodNotApplicable::NonFinite(x[j]));
        }

        Ok(Self { x, y, weights })
    }

    fn eval(&self, q: f64) -> f64 {
        let mut num = 0.0;
        let mut den = 0.0;
        for ((&xj, &yj), &wj) in self.x.iter().zip(&self.y).zip(&self.weights) {
            let d = q - xj;
            if d == 0.0 {
                return yj;
            }
            let t = wj / d;
            num += t * yj;
            den += t;
        }
        num / den
    }
}

/// Least-squares polynomial of a fixed degree on centred and scaled abscissae.
struct LeastSquares {
    center: f64,
    half_width: f64,
    /// Coefficients, lowest order first.
    coeffs: Array1<f64>,
}

impl LeastSquares {
    /// `x` must be sorted.
    fn fit(x: &[f64], y: &[f64], degree: usize) -> Result<Self, MethodNotApplicable> {
        let (lo, hi) = (x[0], x[x.len() - 1]);
        let center = 0.5 * (lo + hi);
        let half_width = if hi > lo { 0.5 * (hi - lo) } else { 1.0 };

        let m = degree + 1;
        let mut vander = Array2::<f64>::zeros((x.len(), m));
        for (i, &xi) in x.iter().enumerate() {
            let u = (xi - center) / half_width;
            let mut p = 1.0;
            for k in 0..m {
                vander[[i, k]] = p;
                p *= u;
            }
        }

        // Normal equations.
        let vt = vander.t();
        let ata = vt.dot(&vander);
        let atb = vt.dot(&Array1::from(y.to_vec()));
        let coeffs = solve(ata, atb)?;

        Ok(Self { center, half_width, coeffs })
    }

    fn eval(&self, q: f64) -> f64 {
        let u = (q - self.center) / self.half_width;
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * u + c)
    }
}

#[test]
fn test_lagrange_reproduces_cubic() {
    let f = |x: f64| x * x * x - 2.0 * x + 1.0;
    let x = vec![-1.0, 0.0, 1.5, 3.0];
    let y: Vec<f64> = x.iter().map(|&v| f(v)).collect();

    let v = interpolate(&x, &y, &[-2.0, 0.5, 2.0, 4.0], None).unwrap();
    for (got, q) in v.iter().zip([-2.0, 0.5, 2.0, 4.0].iter()) {
        assert!((got - f(*q)).abs() < 1e-9, "at {}: {} != {}", q, got, f(*q));
    }
}

#[test]
fn test_lagrange_returns_nodes_exactly() {
    let v = interpolate(&[2.0, 0.0, 1.0], &[5.0, 1.0, 3.5], &[0.0, 1.0, 2.0], None).unwrap();
    assert_eq!(v, vec![1.0, 3.5, 5.0]);
}

#[test]
fn test_lagrange_single_point() {
    let v = interpolate(&[1.0], &[4.0], &[0.0, 3.0], None).unwrap();
    assert_eq!(v, vec![4.0, 4.0]);
}

#[test]
fn test_duplicate_nodes() {
    let r = interpolate(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0], &[0.5], None);
    assert_eq!(r.unwrap_err(), MethodNotApplicable::DuplicateNodes(1.0));
}

#[test]
fn test_least_squares_line() {
    // Collinear data is reproduced by a degree one fit, also when extrapolating.
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let y = [1.0, 3.0, 5.0, 7.0, 9.0];
    let v = interpolate(&x, &y, &[2.5, 10.0], Some(1)).unwrap();
    assert!((v[0] - 6.0).abs() < 1e-9);
    assert!((v[1] - 21.0).abs() < 1e-9);
}

#[test]
fn test_least_squares_mean() {
    let v = interpolate(&[0.0, 1.0, 2.0], &[1.0, 2.0, 6.0], &[7.0], Some(0)).unwrap();
    assert!((v[0] - 3.0).abs() < 1e-12);
}

#[test]
fn test_high_degree_uses_lagrange() {
    let x = [0.0, 1.0, 2.0];
    let y = [0.0, 1.0, 4.0];
    let a = interpolate(&x, &y, &[1.5], Some(5)).unwrap();
    let b = interpolate(&x, &y, &[1.5], None).unwrap();
    assert_eq!(a, b);
}
