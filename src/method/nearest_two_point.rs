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


//! Local linear fit through the two known points nearest to each query.
//!
//! Unlike piecewise linear interpolation the pair is chosen by distance alone, so
//! the two points may lie on the same side of the query.

use crate::error::MethodNotApplicable;
use crate::sorted_by_x;

pub(super) fn interpolate(x_known: &[f64], y_known: &[f64], x_query: &[f64]) -> Result<Vec<f64>, MethodNotApplicable> {
    if x_known.is_empty() {
        return Err(MethodNotApplicable::TooFewPoints { required: 1, got: 0 });
    }
    let (x, y) = sorted_by_x(x_known, y_known);

    Ok(x_query.iter().map(|&q| eval(&x, &y, q)).collect())
}

/// Index of the smallest distance to `q`, skipping `exclude`. The first one wins on ties.
fn closest(x: &[f64], q: f64, exclude: Option<usize>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &xi) in x.iter().enumerate() {
        if Some(i) == exclude {
            continue;
        }
        let d = (xi - q).abs();
        match best {
            Some((_, bd)) if bd <= d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

fn eval(x: &[f64], y: &[f64], q: f64) -> f64 {
    let i1 = match closest(x, q, None) {
        Some(i) => i,
        None => return f64::NAN,
    };
    let i2 = match closest(x, q, Some(i1)) {
        Some(i) => i,
        None => return y[i1],
    };

    let (x1, x2) = (x[i1], x[i2]);
    let (y1, y2) = (y[i1], y[i2]);
    if x1 == x2 {
        y1
    } else {
        y1 + (y2 - y1) * (q - x1) / (x2 - x1)
    }
}

#[test]
fn test_single_point_is_constant() {
    let v = interpolate(&[2.0], &[7.0], &[0.0, 2.0, 5.0]).unwrap();
    assert_eq!(v, vec![7.0, 7.0, 7.0]);
}

#[test]
fn test_pair_is_chosen_by_distance() {
    let x = [0.0, 1.0, 2.0, 10.0];
    let y = [0.0, 1.0, 4.0, 100.0];

    // 2.4: nearest 2.0, then 1.0 (the segment 2..10 is not used).
    let v = interpolate(&x, &y, &[2.4]).unwrap();
    assert!((v[0] - (4.0 + 3.0 * 0.4)).abs() < 1e-12);

    // Beyond the range the two last points are extrapolated.
    let v = interpolate(&x, &y, &[12.0]).unwrap();
    let slope = (4.0 - 100.0) / (2.0 - 10.0);
    assert!((v[0] - (100.0 + slope * 2.0)).abs() < 1e-9);
}

#[test]
fn test_equidistant_prefers_lower_index() {
    // 1.5 is equidistant from 1 and 2: 1 is picked first, then 2.
    let v = interpolate(&[1.0, 2.0, 3.0], &[10.0, 20.0, 90.0], &[1.5]).unwrap();
    assert_eq!(v, vec![15.0]);
}

#[test]
fn test_duplicate_abscissae_return_first_value() {
    let v = interpolate(&[1.0, 1.0, 5.0], &[3.0, 4.0, 9.0], &[0.0]).unwrap();
    assert_eq!(v, vec![3.0]);
}
