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


//! One-dimensional linear interpolation with linear extrapolation.
//!
//! # Examples
//! ```
//! use regrid::interp1d::Interp1D;
//!
//! let xs = vec![2.0, 0.0, 1.0];
//! let zs = vec![4.0f64, 0.0, 2.0];
//!
//! // Samples are sorted on construction.
//! let interp = Interp1D::new(xs, zs).unwrap();
//!
//! assert_eq!(interp.eval(1.5), 3.0);
//! // Extrapolation continues the slope of the edge segment.
//! assert_eq!(interp.eval(3.0), 6.0);
//! ```

use num_traits::Num;
use std::ops::Mul;
use std::cmp::Ordering;
use crate::error::MethodNotApplicable;
use crate::find_closest_neighbours_indices;

///
/// * `C`: Coordinate type.
/// * `Z`: Value type.
#[derive(Clone, Debug)]
pub struct Interp1D<C, Z> {
    /// Index, sorted ascending.
    x: Vec<C>,
    /// Samples.
    z: Vec<Z>,
}

/// Interpolate between two values `x0` and `x1`.
/// `alpha` should range from `0.0` to `1.0` for interpolation, otherwise
/// the value is *extrapolated*.
fn interpolate1d<C, Z>(x0: Z, x1: Z, alpha: C) -> Z
    where C: Num + Copy + Mul<Z, Output=Z> + PartialOrd,
          Z: Num + Copy + Mul<C, Output=Z>, {
    x0 * (C::one() - alpha) + alpha * x1
}

#[test]
fn test_interpolate1d() {
    assert!((interpolate1d(1.0f64, 2., 0.) - 1.).abs() < 1e-6);
    assert!((interpolate1d(1.0f64, 2., 1.) - 2.).abs() < 1e-6);
    assert!((interpolate1d(1.0f64, 2., 0.5) - 1.5).abs() < 1e-6);
    assert!((interpolate1d(1.0f64, 2., 2.0) - 3.0).abs() < 1e-6);
}

/// Find the value of `f(x)`
/// given two sample values `vi = f(xi)` for all `i in [0, 1]`.
///
/// A zero-width segment yields `v0`.
pub(crate) fn interp1d<C, Z>(x: C,
                  (x0, x1): (C, C),
                  (v0, v1): (Z, Z)) -> Z
    where C: Num + Copy + Mul<Z, Output=Z> + PartialOrd,
          Z: Num + Copy + Mul<C, Output=Z> {
    let dx = x1 - x0;
    if dx == C::zero() {
        return v0;
    }

    let alpha = (x - x0) / dx;

    interpolate1d(v0, v1, alpha)
}

impl<C, Z> Interp1D<C, Z>
    where C: Num + Copy + Mul<Z, Output=Z> + PartialOrd,
          Z: Num + Copy + Mul<C, Output=Z>, {
    /// Create a new interpolation engine.
    ///
    /// The samples do not need to be sorted, they are stably sorted by `x` here.
    /// Equal `x` values are kept in their input order.
    ///
    /// # Parameters
    /// * `x`: The x-coordinates.
    /// * `z`: The values `z(x)` for each `x` coordinate.
    ///
    /// # Errors
    /// Fails with [`MethodNotApplicable::TooFewPoints`] when there are no samples.
    ///
    /// # Panics
    /// Panics when the lengths of `x` and `z` don't match.
    pub fn new(x: Vec<C>, z: Vec<Z>) -> Result<Self, MethodNotApplicable> {
        assert_eq!(z.len(), x.len(), "x-axis length mismatch.");
        if x.is_empty() {
            return Err(MethodNotApplicable::TooFewPoints { required: 1, got: 0 });
        }

        let mut pairs: Vec<(C, Z)> = x.into_iter().zip(z).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let (x, z) = pairs.into_iter().unzip();

        Ok(Self {
            x,
            z,
        })
    }

    /// Evaluate the sampled function by interpolation at `x`.
    ///
    /// If `x` lies out of the sampled range then the function is silently *extrapolated*
    /// with the slope of the closest segment. A single sample is treated as a constant.
    pub fn eval(&self, x: C) -> Z {
        if self.x.len() == 1 {
            return self.z[0];
        }

        // Find closest grid points.
        let (x0, x1) = find_closest_neighbours_indices(&self.x, x);

        interp1d(x,
                 (self.x[x0], self.x[x1]),
                 (self.z[x0], self.z[x1])
        )
    }

    /// Evaluate at every point of `xs`.
    pub fn eval_many(&self, xs: &[C]) -> Vec<Z> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }

    /// Get the sorted x-coordinate values.
    pub fn xs(&self) -> &[C] {
        &self.x
    }

    /// Get the z values in the order of `xs()`.
    pub fn z(&self) -> &[Z] {
        &self.z
    }
}

#[test]
fn test_interp1d() {

    let xs = vec![0.0f64, 1.0, 2.0];
    let zs = vec![0.0, 1.0, 0.0];

    let interp = Interp1D::new(xs, zs).unwrap();

    assert!((interp.eval(1.0) - 1.0).abs() < 1e-6);
    assert!((interp.eval(2.0) - 0.0).abs() < 1e-6);
    assert!((interp.eval(1.5) - 0.5).abs() < 1e-6);
}

#[test]
fn test_interp1d_extrapolates_edge_slopes() {
    let interp = Interp1D::new(vec![0.0f64, 1.0, 2.0], vec![0.0, 2.0, 4.0]).unwrap();

    assert_eq!(interp.eval(1.5), 3.0);
    assert_eq!(interp.eval(3.0), 6.0);
    assert_eq!(interp.eval(4.0), 8.0);
    assert_eq!(interp.eval(-1.0), -2.0);
}

#[test]
fn test_interp1d_single_sample_is_constant() {
    let interp = Interp1D::new(vec![5.0f64], vec![7.0]).unwrap();
    assert_eq!(interp.eval(-100.0), 7.0);
    assert_eq!(interp.eval(100.0), 7.0);
}

#[test]
fn test_interp1d_empty() {
    let r = Interp1D::<f64, f64>::new(vec![], vec![]);
    assert_eq!(r.unwrap_err(), MethodNotApplicable::TooFewPoints { required: 1, got: 0 });
}

#[test]
fn test_interp1d_unsorted_input() {
    let interp = Interp1D::new(vec![9.0f64, 0.0, 6.0, 3.0], vec![5.0, 10.0, 30.0, 40.0]).unwrap();
    assert_eq!(interp.xs(), &[0.0, 3.0, 6.0, 9.0]);
    assert_eq!(interp.z(), &[10.0, 40.0, 30.0, 5.0]);
    assert!((interp.eval(1.0) - 20.0).abs() < 1e-12);
}
