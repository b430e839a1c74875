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


//! Orchestration: one resampled table per requested method.
//!
//! Each (method, column) pair is an independent unit of work: strategy, then
//! merge with the original samples, then rounding. Units share no mutable state,
//! so they may run on the rayon pool without changing the result.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{ConfigurationError, Error, Result, UnsupportedMethod};
use crate::grid::generate_grid;
use crate::merge::resample_column;
use crate::method::{Fallback, Method, MethodOptions};
use crate::precision::{self, round_all};
use crate::table::Table;

/// Immutable settings of a resampling run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResampleConfig {
    /// Grid step of the independent variable.
    pub step: f64,
    /// Requested method names; empty means all registered methods.
    pub methods: Vec<String>,
    /// Per-method options.
    pub options: MethodOptions,
    /// Decimals of the independent column in the output, `None` keeps full precision.
    pub index_precision: Option<u32>,
    /// Decimals of the dependent columns in the output, `None` keeps full precision.
    pub value_precision: Option<u32>,
    /// Abort on unknown method names instead of skipping them.
    pub strict: bool,
    /// Spread the (method, column) units over the rayon thread pool.
    pub parallel: bool,
}

impl ResampleConfig {
    /// Configuration with the given step, all methods and no rounding.
    pub fn new(step: f64) -> Self {
        Self {
            step,
            methods: Vec::new(),
            options: MethodOptions::default(),
            index_precision: None,
            value_precision: None,
            strict: false,
            parallel: false,
        }
    }

    /// Request methods by name.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
        where I: IntoIterator<Item=S>,
              S: Into<String> {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Set the method options.
    pub fn with_options(mut self, options: MethodOptions) -> Self {
        self.options = options;
        self
    }

    /// Round the independent and dependent columns to the given decimals.
    pub fn with_precision(mut self, index: u32, value: u32) -> Self {
        self.index_precision = Some(index);
        self.value_precision = Some(value);
        self
    }

    /// Toggle strict handling of unknown method names.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Toggle parallel execution.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check everything that does not depend on the table.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(ConfigurationError::InvalidStep(self.step));
        }
        precision::validate(self.index_precision)?;
        precision::validate(self.value_precision)?;
        let k = self.options.spline_degree;
        if !(1..=crate::method::MAX_SPLINE_DEGREE).contains(&k) {
            return Err(ConfigurationError::InvalidSplineDegree(k));
        }
        Ok(())
    }

    /// Resolve the requested names against the registry.
    ///
    /// Returns the methods to run, in request order without repetitions, and the
    /// names that were not recognised.
    pub fn resolve_methods(&self) -> (Vec<Method>, Vec<UnsupportedMethod>) {
        if self.methods.iter().all(|m| m.trim().is_empty()) {
            return (Method::ALL.to_vec(), Vec::new());
        }

        let mut methods = Vec::new();
        let mut unknown = Vec::new();
        for name in self.methods.iter().filter(|m| !m.trim().is_empty()) {
            match name.parse::<Method>() {
                Ok(m) if !methods.contains(&m) => methods.push(m),
                Ok(_) => {}
                Err(e) => unknown.push(e),
            }
        }
        (methods, unknown)
    }
}

/// Resampled table of one method.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodResult {
    /// The method that was requested.
    pub method: Method,
    /// Index column on the grid, dependent columns in input order.
    pub table: Table,
    /// Columns on which the method was replaced.
    pub fallbacks: Vec<Fallback>,
}

/// Everything produced by one run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResampleOutput {
    /// The unrounded grid.
    pub grid: Vec<f64>,
    /// One result per method, in request order.
    pub results: Vec<MethodResult>,
    /// Requested names that were skipped.
    pub skipped: Vec<UnsupportedMethod>,
}

impl ResampleOutput {
    /// Result of `method`, if it was run.
    pub fn get(&self, method: Method) -> Option<&MethodResult> {
        self.results.iter().find(|r| r.method == method)
    }

    /// All fallbacks of all methods.
    pub fn fallbacks(&self) -> impl Iterator<Item = &Fallback> {
        self.results.iter().flat_map(|r| r.fallbacks.iter())
    }
}

/// Runs the configured methods over tables.
#[derive(Clone, Debug)]
pub struct Resampler {
    config: ResampleConfig,
}

/// Known samples of one dependent column.
struct Series<'a> {
    name: &'a str,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Resampler {
    /// Create a resampler.
    pub fn new(config: ResampleConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Resample `table` with every configured method.
    ///
    /// # Errors
    /// Configuration errors and, in strict mode, unknown method names. Methods that
    /// cannot run on a column are not errors, see [`MethodResult::fallbacks`].
    pub fn run(&self, table: &Table) -> Result<ResampleOutput> {
        let config = &self.config;
        config.validate()?;

        let (methods, skipped) = config.resolve_methods();
        if let Some(first) = skipped.first() {
            if config.strict {
                return Err(Error::UnsupportedMethod(first.clone()));
            }
            for name in &skipped {
                warn!("skipping {}", name);
            }
        }
        if methods.is_empty() {
            return Err(ConfigurationError::NoMethods.into());
        }

        if table.columns().next().is_none() {
            return Err(ConfigurationError::NoDependentColumns.into());
        }
        let (lo, hi) = table
            .index_range()
            .ok_or_else(|| ConfigurationError::EmptyIndex(table.index_name().to_string()))?;
        let grid = generate_grid(lo, hi, config.step)?;
        debug!("grid over [{}, {}] with step {}: {} points", lo, hi, config.step, grid.len());

        let series: Vec<Series> = table
            .columns()
            .map(|(name, _)| {
                let (x, y) = table.series(name).unwrap_or_default();
                Series { name, x, y }
            })
            .collect();

        let units: Vec<(Method, &Series)> = methods
            .iter()
            .flat_map(|&m| series.iter().map(move |s| (m, s)))
            .collect();

        let run_unit = |&(method, s): &(Method, &Series)| self.run_unit(method, s, &grid);
        let outcomes: Vec<(Vec<f64>, Option<Fallback>)> = if config.parallel {
            units.par_iter().map(run_unit).collect()
        } else {
            units.iter().map(run_unit).collect()
        };

        let mut index = grid.clone();
        round_all(&mut index, config.index_precision);

        let mut outcomes = outcomes.into_iter();
        let mut results = Vec::with_capacity(methods.len());
        for &method in &methods {
            let mut out = Table::new(table.index_name(), index.clone());
            let mut fallbacks = Vec::new();
            for (s, (values, fallback)) in series.iter().zip(outcomes.by_ref().take(series.len())) {
                out.push_column(s.name, values)?;
                fallbacks.extend(fallback);
            }
            info!("{}: {} rows, {} fallback(s)", method.label(), out.len(), fallbacks.len());
            results.push(MethodResult { method, table: out, fallbacks });
        }

        Ok(ResampleOutput { grid, results, skipped })
    }

    /// Strategy, merge and rounding for one column.
    fn run_unit(&self, method: Method, series: &Series, grid: &[f64]) -> (Vec<f64>, Option<Fallback>) {
        let config = &self.config;
        let (mut values, fallback) = match resample_column(&series.x, &series.y, grid, method, &config.options) {
            Ok((values, None)) => (values, None),
            Ok((values, Some(reason))) => {
                let fallback = Fallback {
                    method,
                    column: series.name.to_string(),
                    reason,
                    substitute: Some(Method::Linear),
                };
                (values, Some(fallback))
            }
            Err(reason) => {
                let fallback = Fallback {
                    method,
                    column: series.name.to_string(),
                    reason,
                    substitute: None,
                };
                (vec![f64::NAN; grid.len()], Some(fallback))
            }
        };
        if let Some(f) = &fallback {
            warn!("{}", f);
        }

        round_all(&mut values, config.value_precision);
        (values, fallback)
    }
}

#[cfg(test)]
use crate::error::MethodNotApplicable;

#[cfg(test)]
fn hydrograph() -> Table {
    Table::new("t", vec![0.0, 3.0, 6.0, 9.0])
        .with_column("Q", vec![10.0, 40.0, 30.0, 5.0])
        .unwrap()
}

#[test]
fn test_linear_end_to_end() {
    let config = ResampleConfig::new(1.0).with_methods(["linear"]);
    let output = Resampler::new(config).run(&hydrograph()).unwrap();

    assert_eq!(output.results.len(), 1);
    let result = output.get(Method::Linear).unwrap();
    let expected_t: Vec<f64> = (0..10).map(|i| i as f64).collect();
    assert_eq!(result.table.index(), expected_t.as_slice());

    let q = result.table.column("Q").unwrap();
    assert_eq!(q.len(), 10);
    assert_eq!(q[0], 10.0);
    assert_eq!(q[3], 40.0);
    assert_eq!(q[6], 30.0);
    assert_eq!(q[9], 5.0);
    assert_eq!(q[1], 20.0);
    assert_eq!(q[2], 30.0);
    assert!(result.fallbacks.is_empty());
}

#[test]
fn test_all_methods_by_default_in_registry_order() {
    let output = Resampler::new(ResampleConfig::new(1.0)).run(&hydrograph()).unwrap();
    let methods: Vec<Method> = output.results.iter().map(|r| r.method).collect();
    assert_eq!(methods, Method::ALL.to_vec());

    // Four samples are enough for a cubic spline, every value is positive.
    assert_eq!(output.fallbacks().count(), 0);

    for r in &output.results {
        let q = r.table.column("Q").unwrap();
        assert_eq!((q[0], q[3], q[6], q[9]), (10.0, 40.0, 30.0, 5.0), "{}", r.method);
    }
}

#[test]
fn test_samples_on_grid_are_copied_verbatim() {
    // Samples every 0.5, grid every 0.25: every other grid point is a sample.
    let samples = [0.1, 0.7, 0.2, 0.9, 0.4];
    let table = Table::new("z", vec![0.0, 0.5, 1.0, 1.5, 2.0])
        .with_column("V", samples.to_vec())
        .unwrap();
    let config = ResampleConfig::new(0.25).with_methods(["polynomial", "spline", "nearest_two_point"]);
    let output = Resampler::new(config).run(&table).unwrap();
    for r in &output.results {
        let v = r.table.column("V").unwrap();
        assert_eq!(v.len(), 9);
        for (i, want) in samples.iter().enumerate() {
            assert_eq!(v[2 * i].to_bits(), want.to_bits(), "{}", r.method);
        }
    }
}

#[test]
fn test_unknown_method_is_skipped() {
    let config = ResampleConfig::new(1.0).with_methods(["cubic", "linear", "linear"]);
    let output = Resampler::new(config).run(&hydrograph()).unwrap();
    assert_eq!(output.skipped, vec![UnsupportedMethod("cubic".to_string())]);
    assert_eq!(output.results.len(), 1);
    assert_eq!(output.results[0].method, Method::Linear);
}

#[test]
fn test_unknown_method_strict() {
    let config = ResampleConfig::new(1.0).with_methods(["cubic", "linear"]).strict(true);
    let err = Resampler::new(config).run(&hydrograph()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedMethod(UnsupportedMethod(ref n)) if n == "cubic"));
}

#[test]
fn test_only_unknown_methods() {
    let config = ResampleConfig::new(1.0).with_methods(["cubic"]);
    let err = Resampler::new(config).run(&hydrograph()).unwrap_err();
    assert!(matches!(err, Error::Configuration(ConfigurationError::NoMethods)));
}

#[test]
fn test_invalid_configuration() {
    let err = Resampler::new(ResampleConfig::new(0.0)).run(&hydrograph()).unwrap_err();
    assert!(matches!(err, Error::Configuration(ConfigurationError::InvalidStep(_))));

    let mut config = ResampleConfig::new(1.0);
    config.options.spline_degree = 7;
    let err = Resampler::new(config).run(&hydrograph()).unwrap_err();
    assert!(matches!(err, Error::Configuration(ConfigurationError::InvalidSplineDegree(7))));

    let mut config = ResampleConfig::new(1.0);
    config.value_precision = Some(40);
    let err = Resampler::new(config).run(&hydrograph()).unwrap_err();
    assert!(matches!(err, Error::Configuration(ConfigurationError::InvalidPrecision(40))));
}

#[test]
fn test_idempotent() {
    let table = hydrograph()
        .with_column("H", vec![1.5, 2.5, 2.0, 1.0])
        .unwrap();
    let resampler = Resampler::new(ResampleConfig::new(0.5).with_precision(1, 3));
    let a = resampler.run(&table).unwrap();
    let b = resampler.run(&table).unwrap();
    for (ra, rb) in a.results.iter().zip(&b.results) {
        for ((_, va), (_, vb)) in ra.table.columns().zip(rb.table.columns()) {
            let bits_a: Vec<u64> = va.iter().map(|v| v.to_bits()).collect();
            let bits_b: Vec<u64> = vb.iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits_a, bits_b);
        }
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let table = hydrograph()
        .with_column("H", vec![1.5, 2.5, 2.0, 1.0])
        .unwrap()
        .with_column("S", vec![0.0, 1.0, -1.0, 2.0])
        .unwrap();
    let config = ResampleConfig::new(0.25);
    let seq = Resampler::new(config.clone()).run(&table).unwrap();
    let par = Resampler::new(config.parallel(true)).run(&table).unwrap();

    assert_eq!(seq.results.len(), par.results.len());
    for (a, b) in seq.results.iter().zip(&par.results) {
        assert_eq!(a.method, b.method);
        assert_eq!(a.table.header(), b.table.header());
        for ((_, va), (_, vb)) in a.table.columns().zip(b.table.columns()) {
            let bits_a: Vec<u64> = va.iter().map(|v| v.to_bits()).collect();
            let bits_b: Vec<u64> = vb.iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits_a, bits_b);
        }
        assert_eq!(a.fallbacks, b.fallbacks);
    }
}

#[test]
fn test_column_independence() {
    let full = hydrograph()
        .with_column("H", vec![1.5, 2.5, 2.0, 1.0])
        .unwrap();
    let mut corrupted = full.clone();
    corrupted.column_mut("Q").unwrap()[1] = f64::NAN;
    corrupted.column_mut("Q").unwrap()[2] = -1e9;
    let mut removed = full.clone();
    removed.remove_column("Q");

    let resampler = Resampler::new(ResampleConfig::new(0.5));
    let base = resampler.run(&full).unwrap();
    for other in [corrupted, removed].iter() {
        let out = resampler.run(other).unwrap();
        for (a, b) in base.results.iter().zip(&out.results) {
            let ha: Vec<u64> = a.table.column("H").unwrap().iter().map(|v| v.to_bits()).collect();
            let hb: Vec<u64> = b.table.column("H").unwrap().iter().map(|v| v.to_bits()).collect();
            assert_eq!(ha, hb, "{}", a.method);
        }
    }
}

#[test]
fn test_logarithmic_fallback_is_reported_per_column() {
    let table = hydrograph()
        .with_column("S", vec![0.0, 1.0, 4.0, 2.0])
        .unwrap();
    let config = ResampleConfig::new(1.0).with_methods(["log", "linear"]);
    let output = Resampler::new(config).run(&table).unwrap();

    let log = output.get(Method::Logarithmic).unwrap();
    assert_eq!(log.fallbacks.len(), 1);
    assert_eq!(log.fallbacks[0].column, "S");
    assert_eq!(log.fallbacks[0].reason, MethodNotApplicable::NonPositive(0.0));
    assert_eq!(log.fallbacks[0].substitute, Some(Method::Linear));

    let linear = output.get(Method::Linear).unwrap();
    assert_eq!(log.table.column("S"), linear.table.column("S"));
    assert_ne!(log.table.column("Q"), linear.table.column("Q"));
}

#[test]
fn test_empty_column_is_left_empty() {
    let table = hydrograph()
        .with_column("E", vec![f64::NAN; 4])
        .unwrap();
    let output = Resampler::new(ResampleConfig::new(1.0).with_methods(["spline"])).run(&table).unwrap();
    let r = output.get(Method::Spline).unwrap();
    assert!(r.table.column("E").unwrap().iter().all(|v| v.is_nan()));
    assert_eq!(r.fallbacks.len(), 1);
    assert_eq!(r.fallbacks[0].substitute, None);
    assert_eq!(r.table.column("Q").unwrap()[3], 40.0);
}

#[test]
fn test_precision_applied_last() {
    let table = Table::new("t", vec![0.0, 3.0])
        .with_column("Q", vec![0.0, 1.0])
        .unwrap();
    let config = ResampleConfig::new(1.0).with_methods(["linear"]).with_precision(0, 2);
    let output = Resampler::new(config).run(&table).unwrap();
    assert_eq!(output.results[0].table.column("Q").unwrap(), &[0.0, 0.33, 0.67, 1.0]);
    // The grid itself is kept at full precision.
    assert_eq!(output.grid, vec![0.0, 1.0, 2.0, 3.0]);
}
