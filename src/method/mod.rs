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


//! Interpolation methods.
//!
//! Every method maps known samples `(x_known, y_known)` to values at `x_query`.
//! Known samples do not need to be sorted. They must be finite, which
//! [`Resampler`](crate::resampler::Resampler) guarantees by dropping empty cells.
//!
//! # Example
//! ```
//! use regrid::method::{Method, MethodOptions};
//!
//! let method: Method = "nearest".parse().unwrap();
//! let values = method
//!     .interpolate(&[1.0, 2.0], &[10.0, 20.0], &[1.5, 1.9], &MethodOptions::default())
//!     .unwrap();
//! assert_eq!(values, vec![10.0, 20.0]);
//! ```

mod logarithmic;
mod nearest;
mod nearest_two_point;
mod polynomial;
mod spline;

use std::fmt;
use std::str::FromStr;

use crate::error::{MethodNotApplicable, UnsupportedMethod};
use crate::interp1d::Interp1D;

pub use spline::MAX_DEGREE as MAX_SPLINE_DEGREE;

/// The closed set of supported interpolation methods.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Local linear fit through the two known points closest to each query.
    NearestTwoPoint,
    /// Piecewise linear, extrapolating with the edge slopes.
    Linear,
    /// Value of the nearest known point.
    Nearest,
    /// Global polynomial through all known points.
    Polynomial,
    /// Interpolating B-spline, cubic by default.
    Spline,
    /// Linear interpolation of `ln(y)`.
    Logarithmic,
}

impl Method {
    /// All registered methods in the order used when none are requested.
    pub const ALL: [Method; 6] = [
        Method::NearestTwoPoint,
        Method::Linear,
        Method::Nearest,
        Method::Polynomial,
        Method::Spline,
        Method::Logarithmic,
    ];

    /// Canonical registry name.
    pub fn name(self) -> &'static str {
        match self {
            Method::NearestTwoPoint => "nearest_two_point",
            Method::Linear => "linear",
            Method::Nearest => "nearest",
            Method::Polynomial => "polynomial",
            Method::Spline => "spline",
            Method::Logarithmic => "logarithmic",
        }
    }

    /// Human readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Method::NearestTwoPoint => "nearest two-point interpolation",
            Method::Linear => "linear interpolation",
            Method::Nearest => "nearest-neighbour interpolation",
            Method::Polynomial => "polynomial interpolation",
            Method::Spline => "spline interpolation",
            Method::Logarithmic => "logarithmic interpolation",
        }
    }

    /// Evaluate this method at `x_query`.
    ///
    /// # Errors
    /// Returns [`MethodNotApplicable`] when the method cannot produce finite values for
    /// these samples. Nothing is substituted here, see [`Method::interpolate_or_linear`].
    ///
    /// # Panics
    /// Panics when `x_known` and `y_known` differ in length.
    pub fn interpolate(
        self,
        x_known: &[f64],
        y_known: &[f64],
        x_query: &[f64],
        options: &MethodOptions,
    ) -> Result<Vec<f64>, MethodNotApplicable> {
        assert_eq!(x_known.len(), y_known.len(), "x-axis length mismatch.");

        let values = match self {
            Method::Linear => linear(x_known, y_known, x_query)?,
            Method::Nearest => nearest::interpolate(x_known, y_known, x_query)?,
            Method::NearestTwoPoint => nearest_two_point::interpolate(x_known, y_known, x_query)?,
            Method::Polynomial => {
                polynomial::interpolate(x_known, y_known, x_query, options.polynomial_degree)?
            }
            Method::Spline => spline::interpolate(x_known, y_known, x_query, options.spline_degree)?,
            Method::Logarithmic => {
                logarithmic::interpolate(x_known, y_known, x_query, options.log_epsilon)?
            }
        };

        match values.iter().zip(x_query).find(|(v, _)| !v.is_finite()) {
            Some((_, &x)) => Err(MethodNotApplicable::NonFinite(x)),
            None => Ok(values),
        }
    }

    /// Evaluate this method and substitute linear interpolation when it is not applicable.
    ///
    /// Returns the values together with the reason of the substitution, if any.
    ///
    /// # Errors
    /// Fails only when linear interpolation cannot run either, i.e. there are no samples.
    pub fn interpolate_or_linear(
        self,
        x_known: &[f64],
        y_known: &[f64],
        x_query: &[f64],
        options: &MethodOptions,
    ) -> Result<(Vec<f64>, Option<MethodNotApplicable>), MethodNotApplicable> {
        match self.interpolate(x_known, y_known, x_query, options) {
            Ok(values) => Ok((values, None)),
            Err(reason) if self == Method::Linear => Err(reason),
            Err(reason) => {
                let values = Method::Linear.interpolate(x_known, y_known, x_query, options)?;
                Ok((values, Some(reason)))
            }
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = UnsupportedMethod;

    /// Parse a registry name. Case and `-`/`_` are not significant and `log` is
    /// accepted for `logarithmic`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        let method = match key.as_str() {
            "log" => Method::Logarithmic,
            _ => *Method::ALL
                .iter()
                .find(|m| m.name() == key)
                .ok_or_else(|| UnsupportedMethod(s.trim().to_string()))?,
        };
        Ok(method)
    }
}

/// Tuning knobs of the individual methods.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodOptions {
    /// `None` fits the interpolating polynomial of degree `n - 1` through all points.
    /// `Some(d)` with `d < n - 1` fits a least-squares polynomial of degree `d` instead.
    pub polynomial_degree: Option<usize>,
    /// Spline degree, `1..=5`.
    pub spline_degree: usize,
    /// Offset added to the values before taking the logarithm. Without it any
    /// non-positive value makes the logarithmic method fall back to linear.
    pub log_epsilon: Option<f64>,
}

impl Default for MethodOptions {
    fn default() -> Self {
        Self {
            polynomial_degree: None,
            spline_degree: 3,
            log_epsilon: None,
        }
    }
}

/// Record of a method that was not applicable to one column.
#[derive(Clone, Debug, PartialEq)]
pub struct Fallback {
    /// The requested method.
    pub method: Method,
    /// The dependent column.
    pub column: String,
    /// Why the method could not be used.
    pub reason: MethodNotApplicable,
    /// The method that produced the values instead, `None` when the column was
    /// left empty.
    pub substitute: Option<Method>,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.substitute {
            Some(m) => write!(f, "{} on `{}`: {}, used {}", self.method, self.column, self.reason, m),
            None => write!(f, "{} on `{}`: {}, column left empty", self.method, self.column, self.reason),
        }
    }
}

/// Piecewise linear interpolation with linear extrapolation.
fn linear(x_known: &[f64], y_known: &[f64], x_query: &[f64]) -> Result<Vec<f64>, MethodNotApplicable> {
    let interp = Interp1D::new(x_known.to_vec(), y_known.to_vec())?;
    Ok(interp.eval_many(x_query))
}

#[cfg(test)]
fn opts() -> MethodOptions {
    MethodOptions::default()
}

#[test]
fn test_parse_names() {
    for m in Method::ALL.iter() {
        assert_eq!(m.name().parse::<Method>().unwrap(), *m);
    }
    assert_eq!("log".parse::<Method>().unwrap(), Method::Logarithmic);
    assert_eq!(" Nearest-Two-Point ".parse::<Method>().unwrap(), Method::NearestTwoPoint);
    assert_eq!("cubic".parse::<Method>(), Err(UnsupportedMethod("cubic".to_string())));
}

#[test]
fn test_linear_exactness() {
    let v = Method::Linear
        .interpolate(&[0.0, 1.0, 2.0], &[0.0, 2.0, 4.0], &[1.5, 3.0], &opts())
        .unwrap();
    assert_eq!(v, vec![3.0, 6.0]);
}

#[test]
fn test_nearest_tie_goes_to_first() {
    let v = Method::Nearest
        .interpolate(&[1.0, 2.0], &[10.0, 20.0], &[1.5], &opts())
        .unwrap();
    assert_eq!(v, vec![10.0]);
}

#[test]
fn test_spline_with_three_points_falls_back_to_linear() {
    let x = [0.0, 1.0, 3.0];
    let y = [1.0, 5.0, 2.0];
    let q = [-1.0, 0.5, 2.0, 4.0];

    let err = Method::Spline.interpolate(&x, &y, &q, &opts()).unwrap_err();
    assert_eq!(err, MethodNotApplicable::TooFewPoints { required: 4, got: 3 });

    let (spline, reason) = Method::Spline.interpolate_or_linear(&x, &y, &q, &opts()).unwrap();
    let linear = Method::Linear.interpolate(&x, &y, &q, &opts()).unwrap();
    assert_eq!(spline, linear);
    assert!(reason.is_some());
}

#[test]
fn test_logarithmic_guard_falls_back_to_linear() {
    let x = [0.0, 1.0, 2.0];
    let y = [0.0, 10.0, 100.0];
    let q = [0.5, 1.5];

    let (log, reason) = Method::Logarithmic.interpolate_or_linear(&x, &y, &q, &opts()).unwrap();
    let linear = Method::Linear.interpolate(&x, &y, &q, &opts()).unwrap();
    assert_eq!(log, linear);
    assert_eq!(reason, Some(MethodNotApplicable::NonPositive(0.0)));
}

#[test]
fn test_polynomial_duplicate_nodes_fall_back() {
    let x = [0.0, 1.0, 1.0, 2.0];
    let y = [0.0, 1.0, 2.0, 3.0];
    let q = [0.5];
    let (v, reason) = Method::Polynomial.interpolate_or_linear(&x, &y, &q, &opts()).unwrap();
    assert_eq!(reason, Some(MethodNotApplicable::DuplicateNodes(1.0)));
    assert_eq!(v, Method::Linear.interpolate(&x, &y, &q, &opts()).unwrap());
}

#[test]
fn test_no_samples() {
    for m in Method::ALL.iter() {
        let r = m.interpolate_or_linear(&[], &[], &[1.0], &opts());
        assert!(r.is_err(), "{} should fail without samples", m);
    }
}

#[test]
fn test_every_method_reproduces_a_line() {
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
    let q = [0.5, 1.5, 3.5];
    for m in [Method::Linear, Method::NearestTwoPoint, Method::Polynomial, Method::Spline].iter() {
        let v = m.interpolate(&x, &y, &q, &opts()).unwrap();
        for (got, x) in v.iter().zip(q.iter()) {
            assert!((got - (2.0 * x + 1.0)).abs() < 1e-9, "{} at {}: {}", m, x, got);
        }
    }
}
