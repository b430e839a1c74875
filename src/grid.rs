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


//! Regular target grids.
//!
//! # Example
//! ```
//! use regrid::grid::generate_grid;
//!
//! // The last point may overshoot the maximum by less than one step.
//! assert_eq!(generate_grid(0.0, 9.0, 2.5).unwrap(), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
//! ```

use crate::error::ConfigurationError;

/// Upper limit on the number of grid points.
pub const MAX_GRID_POINTS: usize = 50_000_000;

/// Fraction of a step ignored before rounding the number of steps up, so that
/// `0.3 / 0.1 = 3.0000000000000004` does not add a point.
const STEP_SLACK: f64 = 1e-9;

/// Grid `x_min + i * step` for `i = 0..=ceil((x_max - x_min) / step)`.
///
/// # Errors
/// [`ConfigurationError::InvalidStep`] when `step` is not a positive finite number,
/// [`ConfigurationError::InvalidRange`] when the bounds are not finite or
/// `x_min > x_max` and [`ConfigurationError::GridTooLarge`] beyond
/// [`MAX_GRID_POINTS`] points.
pub fn generate_grid(x_min: f64, x_max: f64, step: f64) -> Result<Vec<f64>, ConfigurationError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(ConfigurationError::InvalidStep(step));
    }
    if !(x_min.is_finite() && x_max.is_finite()) || x_min > x_max {
        return Err(ConfigurationError::InvalidRange { min: x_min, max: x_max });
    }

    let steps = ((x_max - x_min) / step - STEP_SLACK).ceil().max(0.0);
    if !steps.is_finite() || steps >= MAX_GRID_POINTS as f64 {
        return Err(ConfigurationError::GridTooLarge(steps.min(usize::MAX as f64) as usize));
    }
    let steps = steps as usize;

    Ok((0..=steps).map(|i| x_min + i as f64 * step).collect())
}

#[test]
fn test_grid_exact_end() {
    assert_eq!(generate_grid(0.0, 10.0, 2.5).unwrap(), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
}

#[test]
fn test_grid_overshoot() {
    assert_eq!(generate_grid(0.0, 9.0, 2.5).unwrap(), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
}

#[test]
fn test_grid_single_point() {
    assert_eq!(generate_grid(4.0, 4.0, 1.0).unwrap(), vec![4.0]);
}

#[test]
fn test_grid_float_step() {
    let g = generate_grid(0.0, 0.3, 0.1).unwrap();
    assert_eq!(g.len(), 4);
    assert!((g[3] - 0.3).abs() < 1e-12);
    assert!(g.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_grid_errors() {
    assert_eq!(generate_grid(0.0, 1.0, 0.0), Err(ConfigurationError::InvalidStep(0.0)));
    assert_eq!(generate_grid(0.0, 1.0, -1.0), Err(ConfigurationError::InvalidStep(-1.0)));
    assert!(matches!(generate_grid(0.0, 1.0, f64::NAN), Err(ConfigurationError::InvalidStep(_))));
    assert_eq!(
        generate_grid(2.0, 1.0, 1.0),
        Err(ConfigurationError::InvalidRange { min: 2.0, max: 1.0 })
    );
    assert!(matches!(generate_grid(0.0, 1e12, 1e-6), Err(ConfigurationError::GridTooLarge(_))));
}
