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


//! `regrid`: resample a delimited table onto a fixed-step grid.
//!
//! Settings come from an optional INI file and are overridden by command line
//! options. One output file is written per interpolation method, plus a report.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*};

use regrid::config::{parse_delimiter, parse_method_list, Settings};
use regrid::io::{read_table, write_report, write_results, Report};
use regrid::method::Method;
use regrid::resampler::Resampler;

/// Resample the dependent columns of a CSV file onto a regular grid of the
/// independent column, with one output file per interpolation method.
#[derive(Parser, Debug)]
#[command(name = "regrid", version, about, long_about = None)]
struct Args {
    /// Input table (overrides `input` from the settings file)
    input: Option<PathBuf>,
    /// INI settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output folder (default: folder of the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Name of the independent column
    #[arg(short = 'x', long)]
    index_column: Option<String>,
    /// Grid step of the independent column
    #[arg(short, long)]
    step: Option<f64>,
    /// Methods, comma separated (default: all)
    #[arg(short, long)]
    methods: Option<String>,
    /// Degree of the least-squares polynomial (default: through all points)
    #[arg(long)]
    polynomial_degree: Option<usize>,
    /// Spline degree, 1 to 5
    #[arg(long)]
    spline_degree: Option<usize>,
    /// Offset added before taking logarithms
    #[arg(long)]
    log_epsilon: Option<f64>,
    /// Encoding of the input file, e.g. utf-8, gbk, latin1
    #[arg(short, long)]
    encoding: Option<String>,
    /// Field delimiter, a single character or `tab`
    #[arg(short, long)]
    delimiter: Option<String>,
    /// Decimals of the independent column
    #[arg(long)]
    index_precision: Option<u32>,
    /// Decimals of the dependent columns
    #[arg(long)]
    value_precision: Option<u32>,
    /// Abort on unknown method names
    #[arg(long)]
    strict: bool,
    /// Run methods and columns in parallel
    #[arg(long)]
    parallel: bool,
    /// Worker threads for --parallel (default: one per core)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Do not write a byte order mark in front of the output files
    #[arg(long)]
    no_bom: bool,
    /// Print the available methods and exit
    #[arg(long)]
    list_methods: bool,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        other => bail!("unknown log level `{}`", other),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer()
            .without_time()
            .with_target(false)
            .with_thread_names(false))
        .try_init()?;
    Ok(())
}

fn apply_overrides(settings: &mut Settings, args: &Args) -> Result<()> {
    if let Some(input) = &args.input {
        settings.input = Some(input.clone());
    }
    if let Some(dir) = &args.output_dir {
        settings.output_dir = Some(dir.clone());
    }
    if let Some(col) = &args.index_column {
        settings.index_column = Some(col.clone());
    }
    if let Some(step) = args.step {
        settings.step = step;
    }
    if let Some(methods) = &args.methods {
        settings.methods = parse_method_list(methods);
    }
    if args.polynomial_degree.is_some() {
        settings.polynomial_degree = args.polynomial_degree;
    }
    if let Some(k) = args.spline_degree {
        settings.spline_degree = k;
    }
    if args.log_epsilon.is_some() {
        settings.log_epsilon = args.log_epsilon;
    }
    if let Some(enc) = &args.encoding {
        settings.encoding = enc.clone();
    }
    if let Some(d) = &args.delimiter {
        settings.delimiter = match parse_delimiter(d) {
            Some(b) => b,
            None => bail!("invalid delimiter `{}`", d),
        };
    }
    if args.index_precision.is_some() {
        settings.index_precision = args.index_precision;
    }
    if args.value_precision.is_some() {
        settings.value_precision = args.value_precision;
    }
    settings.strict |= args.strict;
    settings.parallel |= args.parallel || args.jobs.is_some();
    if args.no_bom {
        settings.write_bom = false;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    if args.list_methods {
        for m in Method::ALL.iter() {
            println!("{:<18} {}", m.name(), m.label());
        }
        return Ok(());
    }

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    apply_overrides(&mut settings, &args)?;
    settings.validate().context("invalid settings")?;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to start worker threads")?;
    }

    let input = settings.input.clone().unwrap_or_default();
    let table = read_table(&input, &settings.read_options())
        .with_context(|| format!("failed to read {}", input.display()))?;

    let output = Resampler::new(settings.resample_config())
        .run(&table)
        .context("resampling failed")?;

    let output_dir = settings.output_dir();
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    let written = write_results(&output, &output_dir, &stem, &settings.write_options());

    let report = Report {
        input: &input,
        output_dir: &output_dir,
        index_column: table.index_name(),
        step: settings.step,
        index_precision: settings.index_precision,
        value_precision: settings.value_precision,
        output: &output,
        written: &written,
    };
    if let Err(e) = write_report(&report, &output_dir, &stem) {
        warn!("could not write report: {}", e);
    }

    let failed = written.iter().filter(|w| w.result.is_err()).count();
    if failed == written.len() {
        bail!("no output file could be written");
    }
    info!(
        "done: {} of {} file(s) written, {} fallback(s), {} skipped method(s)",
        written.len() - failed,
        written.len(),
        output.fallbacks().count(),
        output.skipped.len()
    );
    Ok(())
}

#[test]
fn test_command_line_overrides_settings_file() {
    let mut settings = Settings::from_ini_str(
        "input = a.csv\n\
         index_column = t\n\
         step = 2\n\
         methods = spline\n\
         encoding = gbk\n\
         value_precision = 3\n",
    )
    .unwrap();
    let args = Args::parse_from([
        "regrid", "b.csv", "-s", "0.5", "-m", "linear,nearest", "-d", ";",
        "--index-precision", "1", "--log-epsilon", "0.001", "--no-bom", "--strict",
    ]);
    apply_overrides(&mut settings, &args).unwrap();

    assert_eq!(settings.input, Some(PathBuf::from("b.csv")));
    assert_eq!(settings.step, 0.5);
    assert_eq!(settings.methods, vec!["linear", "nearest"]);
    assert_eq!(settings.delimiter, b';');
    assert_eq!(settings.index_precision, Some(1));
    assert_eq!(settings.log_epsilon, Some(0.001));
    assert!(!settings.write_bom);
    assert!(settings.strict);
    // Untouched keys keep the file's values.
    assert_eq!(settings.index_column.as_deref(), Some("t"));
    assert_eq!(settings.encoding, "gbk");
    assert_eq!(settings.value_precision, Some(3));
    assert!(!settings.parallel);
}

#[test]
fn test_jobs_enables_parallel() {
    let mut settings = Settings::default();
    let args = Args::parse_from(["regrid", "-j", "2"]);
    apply_overrides(&mut settings, &args).unwrap();
    assert!(settings.parallel);
}

#[test]
fn test_invalid_delimiter_override() {
    let mut settings = Settings::default();
    let args = Args::parse_from(["regrid", "--delimiter", ";;"]);
    assert!(apply_overrides(&mut settings, &args).is_err());
}
