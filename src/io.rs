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


//! Delimited-file input and output.
//!
//! Input files are decoded from a configurable encoding before parsing, so legacy
//! regional code pages (GBK, GB18030, Latin-1, ...) work next to UTF-8. Output is
//! always UTF-8, optionally with a byte order mark for spreadsheet applications.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use tracing::{info, warn};

use crate::error::{ConfigurationError, Error, Result};
use crate::method::Method;
use crate::resampler::{MethodResult, ResampleOutput};
use crate::table::Table;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How to read an input table.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadOptions {
    /// Name of the independent column.
    pub index_column: String,
    /// Encoding label as understood by the WHATWG encoding standard, plus `utf-8-sig`.
    pub encoding: String,
    /// Field delimiter.
    pub delimiter: u8,
}

impl ReadOptions {
    /// UTF-8, comma separated.
    pub fn new(index_column: impl Into<String>) -> Self {
        Self {
            index_column: index_column.into(),
            encoding: "utf-8".to_string(),
            delimiter: b',',
        }
    }
}

/// How to render output tables.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteOptions {
    /// Decimals of the independent column, `None` for the shortest exact form.
    pub index_precision: Option<u32>,
    /// Decimals of the dependent columns, `None` for the shortest exact form.
    pub value_precision: Option<u32>,
    /// Field delimiter.
    pub delimiter: u8,
    /// Start the file with a UTF-8 byte order mark.
    pub bom: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            index_precision: None,
            value_precision: None,
            delimiter: b',',
            bom: false,
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io { path: path.display().to_string(), source }
}

/// Look up an encoding label.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, ConfigurationError> {
    let trimmed = label.trim();
    if trimmed.eq_ignore_ascii_case("utf-8-sig") || trimmed.eq_ignore_ascii_case("utf8") {
        return Ok(UTF_8);
    }
    Encoding::for_label(trimmed.as_bytes())
        .ok_or_else(|| ConfigurationError::UnknownEncoding(label.to_string()))
}

/// Decode raw bytes. A byte order mark takes precedence over the label.
pub fn decode(bytes: &[u8], label: &str) -> Result<String, ConfigurationError> {
    let encoding = encoding_for_label(label)?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ConfigurationError::Undecodable(used.name().to_string()));
    }
    Ok(text.into_owned())
}

/// Parse delimited text with a header row into a [`Table`].
///
/// Empty cells become `NaN`.
pub fn parse_table(text: &str, options: &ReadOptions) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut columns: Vec<(String, Vec<f64>)> = headers.into_iter().map(|h| (h, Vec::new())).collect();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for ((name, values), cell) in columns.iter_mut().zip(record.iter()) {
            let value = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>().map_err(|_| ConfigurationError::InvalidCell {
                    column: name.clone(),
                    row: row + 1,
                    value: cell.to_string(),
                })?
            };
            values.push(value);
        }
    }

    Ok(Table::from_columns(columns, &options.index_column)?)
}

/// Read and parse a table file.
pub fn read_table(path: &Path, options: &ReadOptions) -> Result<Table> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    let text = decode(&bytes, &options.encoding)?;
    let table = parse_table(&text, options)?;
    info!(
        "read {}: {} rows, independent column `{}`, dependent columns {:?}",
        path.display(),
        table.len(),
        table.index_name(),
        table.column_names()
    );
    Ok(table)
}

/// Render one value. Missing values are empty cells.
pub fn format_value(value: f64, digits: Option<u32>) -> String {
    if value.is_nan() {
        return String::new();
    }
    // Avoid printing `-0.0` after rounding small negatives.
    let value = if value == 0.0 { 0.0 } else { value };
    match digits {
        Some(d) => format!("{:.*}", d as usize, value),
        None => value.to_string(),
    }
}

/// Write `table` as delimited text.
pub fn write_table<W: Write>(out: W, table: &Table, options: &WriteOptions) -> Result<()> {
    let mut out = out;
    if options.bom {
        out.write_all(UTF8_BOM).map_err(|e| io_error(Path::new("<output>"), e))?;
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(out);

    writer.write_record(table.header())?;

    let columns: Vec<&[f64]> = table.columns().map(|(_, v)| v).collect();
    for (row, &x) in table.index().iter().enumerate() {
        let record = std::iter::once(format_value(x, options.index_precision))
            .chain(columns.iter().map(|c| format_value(c[row], options.value_precision)));
        writer.write_record(record)?;
    }
    writer.flush().map_err(|e| io_error(Path::new("<output>"), e))?;
    Ok(())
}

/// Write `table` to a file.
pub fn write_table_file(path: &Path, table: &Table, options: &WriteOptions) -> Result<()> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    write_table(BufWriter::new(file), table, options)
}

/// `{dir}/{stem}_{method}_resampled.csv`.
pub fn output_path(dir: &Path, stem: &str, method: Method) -> PathBuf {
    dir.join(format!("{}_{}_resampled.csv", stem, method.name()))
}

/// Outcome of writing one method's table.
#[derive(Debug)]
pub struct Written {
    /// The method.
    pub method: Method,
    /// Target file.
    pub path: PathBuf,
    /// `Err` when the file could not be written.
    pub result: Result<()>,
}

/// Write every method's table into `dir`.
///
/// A failure on one file is logged and does not stop the others.
pub fn write_results(output: &ResampleOutput, dir: &Path, stem: &str, options: &WriteOptions) -> Vec<Written> {
    output
        .results
        .iter()
        .map(|r: &MethodResult| {
            let path = output_path(dir, stem, r.method);
            let result = write_table_file(&path, &r.table, options);
            match &result {
                Ok(()) => info!("wrote {}", path.display()),
                Err(e) => warn!("could not write {}: {}", path.display(), e),
            }
            Written { method: r.method, path, result }
        })
        .collect()
}

/// Plain text summary of a run.
pub struct Report<'a> {
    /// Input file.
    pub input: &'a Path,
    /// Output folder.
    pub output_dir: &'a Path,
    /// Independent column.
    pub index_column: &'a str,
    /// Grid step.
    pub step: f64,
    /// Decimals of the independent column.
    pub index_precision: Option<u32>,
    /// Decimals of the dependent columns.
    pub value_precision: Option<u32>,
    /// The run.
    pub output: &'a ResampleOutput,
    /// Files written.
    pub written: &'a [Written],
}

fn describe_precision(p: Option<u32>) -> String {
    match p {
        Some(d) => format!("{} decimal(s)", d),
        None => "full".to_string(),
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resampling report")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "Input file: {}", self.input.display())?;
        writeln!(f, "Output folder: {}", self.output_dir.display())?;
        writeln!(f, "Independent column: {}", self.index_column)?;
        writeln!(f, "Step: {}", self.step)?;
        writeln!(f, "Independent precision: {}", describe_precision(self.index_precision))?;
        writeln!(f, "Dependent precision: {}", describe_precision(self.value_precision))?;

        writeln!(f, "\nMethods:")?;
        for r in &self.output.results {
            writeln!(f, "- {} ({}): {} rows", r.method.label(), r.method, r.table.len())?;
        }

        let fallbacks: Vec<_> = self.output.fallbacks().collect();
        if !fallbacks.is_empty() {
            writeln!(f, "\nFallbacks:")?;
            for fb in fallbacks {
                writeln!(f, "- {}", fb)?;
            }
        }

        if !self.output.skipped.is_empty() {
            writeln!(f, "\nSkipped:")?;
            for s in &self.output.skipped {
                writeln!(f, "- {}", s)?;
            }
        }

        writeln!(f, "\nFiles:")?;
        for w in self.written {
            let name = w.path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            match &w.result {
                Ok(()) => writeln!(f, "- {}", name)?,
                Err(e) => writeln!(f, "- {} (failed: {})", name, e)?,
            }
        }
        Ok(())
    }
}

/// Write the report to `{dir}/{stem}_report.txt` and return the path.
pub fn write_report(report: &Report<'_>, dir: &Path, stem: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{}_report.txt", stem));
    fs::write(&path, report.to_string()).map_err(|e| io_error(&path, e))?;
    info!("wrote report {}", path.display());
    Ok(path)
}

#[test]
fn test_parse_table_with_missing_cells() {
    let text = "t,Q,H\n0,10,1.5\n3,40,\n6, 30 ,2\n";
    let table = parse_table(text, &ReadOptions::new("t")).unwrap();
    assert_eq!(table.index(), &[0.0, 3.0, 6.0]);
    assert_eq!(table.column("Q").unwrap(), &[10.0, 40.0, 30.0]);
    let h = table.column("H").unwrap();
    assert!(h[1].is_nan());
    assert_eq!(h[2], 2.0);
}

#[test]
fn test_parse_table_invalid_cell() {
    let err = parse_table("t,Q\n0,abc\n", &ReadOptions::new("t")).unwrap_err();
    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::InvalidCell { ref column, row: 1, .. }) if column == "Q"
    ));
}

#[test]
fn test_parse_table_missing_index() {
    let err = parse_table("t,Q\n0,1\n", &ReadOptions::new("time")).unwrap_err();
    assert!(matches!(err, Error::Configuration(ConfigurationError::MissingColumn { .. })));
}

#[test]
fn test_parse_table_semicolon() {
    let mut options = ReadOptions::new("z");
    options.delimiter = b';';
    let table = parse_table("z;V\n1;2\n", &options).unwrap();
    assert_eq!(table.column("V").unwrap(), &[2.0]);
}

#[test]
fn test_decode_gbk() {
    // "时间" in GBK.
    let bytes = b"\xca\xb1\xbc\xe4,Q\n0,1\n";
    let text = decode(bytes, "gbk").unwrap();
    assert!(text.starts_with("时间,Q"));
    let table = parse_table(&text, &ReadOptions::new("时间")).unwrap();
    assert_eq!(table.column("Q").unwrap(), &[1.0]);
}

#[test]
fn test_decode_strips_bom() {
    let text = decode(b"\xEF\xBB\xBFt,Q\n", "utf-8-sig").unwrap();
    assert_eq!(text, "t,Q\n");
    let text = decode(b"\xEF\xBB\xBFt,Q\n", "utf-8").unwrap();
    assert_eq!(text, "t,Q\n");
}

#[test]
fn test_decode_errors() {
    assert_eq!(
        decode(b"t", "klingon"),
        Err(ConfigurationError::UnknownEncoding("klingon".to_string()))
    );
    assert!(matches!(decode(b"t,\xc3\x28\n", "utf-8"), Err(ConfigurationError::Undecodable(_))));
}

#[test]
fn test_format_value() {
    assert_eq!(format_value(20.0, Some(1)), "20.0");
    assert_eq!(format_value(20.0, Some(0)), "20");
    assert_eq!(format_value(-0.0, Some(1)), "0.0");
    assert_eq!(format_value(0.25, None), "0.25");
    assert_eq!(format_value(f64::NAN, Some(2)), "");
}

#[test]
fn test_write_table() {
    let table = Table::new("t", vec![0.0, 1.0])
        .with_column("Q", vec![10.0, f64::NAN])
        .unwrap();
    let options = WriteOptions { index_precision: Some(0), value_precision: Some(1), ..WriteOptions::default() };
    let mut buf = Vec::new();
    write_table(&mut buf, &table, &options).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "t,Q\n0,10.0\n1,\n");
}

#[test]
fn test_write_table_bom() {
    let table = Table::new("t", vec![0.0]).with_column("Q", vec![1.0]).unwrap();
    let options = WriteOptions { bom: true, ..WriteOptions::default() };
    let mut buf = Vec::new();
    write_table(&mut buf, &table, &options).unwrap();
    assert!(buf.starts_with(UTF8_BOM));
    assert_eq!(&buf[3..], b"t,Q\n0,1\n");
}

#[test]
fn test_output_path() {
    let p = output_path(Path::new("out"), "inflow", Method::NearestTwoPoint);
    assert_eq!(p, Path::new("out").join("inflow_nearest_two_point_resampled.csv"));
}
