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


//! Decimal rounding of output values.

use num_traits::{cast, Float};

use crate::error::ConfigurationError;

/// Largest supported number of decimal digits.
pub const MAX_PRECISION: u32 = 15;

/// Round `value` to `digits` decimals. Exact ties go to the even neighbour.
/// Non-finite values are returned unchanged.
pub fn round_to<F: Float>(value: F, digits: u32) -> F {
    if !value.is_finite() {
        return value;
    }
    let scale: F = match cast(10f64.powi(digits as i32)) {
        Some(s) => s,
        None => return value,
    };
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    round_half_even(scaled) / scale
}

fn round_half_even<F: Float>(v: F) -> F {
    let r = v.round();
    let two = F::one() + F::one();
    // `round` breaks ties away from zero, pull exact halves back to the even neighbour.
    if (v - v.trunc()).abs() == cast(0.5).unwrap_or_else(F::zero) && r % two != F::zero() {
        r - v.signum()
    } else {
        r
    }
}

/// Round all values in place. `None` leaves them untouched.
pub fn round_all(values: &mut [f64], digits: Option<u32>) {
    if let Some(d) = digits {
        values.iter_mut().for_each(|v| *v = round_to(*v, d));
    }
}

/// Check a configured precision.
pub fn validate(digits: Option<u32>) -> Result<(), ConfigurationError> {
    match digits {
        Some(d) if d > MAX_PRECISION => Err(ConfigurationError::InvalidPrecision(d)),
        _ => Ok(()),
    }
}

#[test]
fn test_round_to() {
    assert_eq!(round_to(19.999999999999996f64, 1), 20.0);
    assert_eq!(round_to(1.26f64, 1), 1.3);
    assert_eq!(round_to(-1.26f64, 1), -1.3);
    assert_eq!(round_to(7.0f64, 0), 7.0);
    assert!(round_to(f64::NAN, 2).is_nan());
}

#[test]
fn test_ties_to_even() {
    assert_eq!(round_to(2.5f64, 0), 2.0);
    assert_eq!(round_to(3.5f64, 0), 4.0);
    assert_eq!(round_to(-2.5f64, 0), -2.0);
    assert_eq!(round_to(0.125f64, 2), 0.12);
}

#[test]
fn test_validate() {
    assert!(validate(None).is_ok());
    assert!(validate(Some(15)).is_ok());
    assert_eq!(validate(Some(16)), Err(ConfigurationError::InvalidPrecision(16)));
}
