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


//! Linear interpolation in log space, suited to quantities spanning orders of
//! magnitude such as discharge recessions.

use crate::error::MethodNotApplicable;
use crate::interp1d::Interp1D;

/// `exp(linear(x, ln(y + eps))) - eps`.
///
/// Without `epsilon` every known value must be strictly positive.
pub(super) fn interpolate(
    x_known: &[f64],
    y_known: &[f64],
    x_query: &[f64],
    epsilon: Option<f64>,
) -> Result<Vec<f64>, MethodNotApplicable> {
    let eps = epsilon.unwrap_or(0.0);

    let log_y = y_known
        .iter()
        .map(|&y| {
            let shifted = y + eps;
            if shifted > 0.0 {
                Ok(shifted.ln())
            } else {
                Err(MethodNotApplicable::NonPositive(y))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let interp = Interp1D::new(x_known.to_vec(), log_y)?;
    Ok(x_query.iter().map(|&q| interp.eval(q).exp() - eps).collect())
}

#[test]
fn test_geometric_midpoint() {
    let v = interpolate(&[0.0, 2.0], &[1.0, 100.0], &[1.0], None).unwrap();
    assert!((v[0] - 10.0).abs() < 1e-9);
}

#[test]
fn test_exponential_extrapolation() {
    let v = interpolate(&[0.0, 1.0], &[1.0, 2.0], &[3.0], None).unwrap();
    assert!((v[0] - 8.0).abs() < 1e-9);
}

#[test]
fn test_non_positive_without_epsilon() {
    assert_eq!(
        interpolate(&[0.0, 1.0, 2.0], &[3.0, -1.0, 4.0], &[0.5], None).unwrap_err(),
        MethodNotApplicable::NonPositive(-1.0)
    );
}

#[test]
fn test_epsilon_tolerates_zero() {
    let v = interpolate(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0], &[0.0, 2.0, 0.5], Some(1e-12)).unwrap();
    assert!(v[0].abs() < 1e-15);
    assert!((v[1] - 4.0).abs() < 1e-9);
    assert!(v[2] > 0.0 && v[2] < 1.0);
}
