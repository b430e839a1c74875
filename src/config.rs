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


//! Settings file.
//!
//! Settings live in an INI file, either at the top level or in a `[resample]`
//! section (which wins when a key appears in both):
//!
//! ```ini
//! input = inflow_3h.csv
//! output_dir = resampled
//! index_column = t/h
//! step = 1
//! methods = linear, spline
//! encoding = gbk
//! index_precision = 0
//! value_precision = 1
//! ```
//!
//! Absent keys take the [`Settings::default`] values. Empty values mean "unset"
//! for optional keys.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, ParseOption};

use crate::error::{ConfigurationError, Error, Result};
use crate::io::{encoding_for_label, ReadOptions, WriteOptions};
use crate::method::MethodOptions;
use crate::resampler::ResampleConfig;

/// Section consulted before the top level.
pub const SECTION: &str = "resample";

/// All recognised settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Input table.
    pub input: Option<PathBuf>,
    /// Output folder, defaults to the folder of the input.
    pub output_dir: Option<PathBuf>,
    /// Independent column name.
    pub index_column: Option<String>,
    /// Grid step.
    pub step: f64,
    /// Requested methods, empty for all.
    pub methods: Vec<String>,
    /// Polynomial degree, unset for interpolation through all points.
    pub polynomial_degree: Option<usize>,
    /// Spline degree.
    pub spline_degree: usize,
    /// Offset for logarithmic interpolation.
    pub log_epsilon: Option<f64>,
    /// Encoding of the input file.
    pub encoding: String,
    /// Field delimiter of input and output.
    pub delimiter: u8,
    /// Decimals of the independent column.
    pub index_precision: Option<u32>,
    /// Decimals of the dependent columns.
    pub value_precision: Option<u32>,
    /// Abort on unknown methods.
    pub strict: bool,
    /// Run columns and methods in parallel.
    pub parallel: bool,
    /// Write a UTF-8 byte order mark in front of the output files.
    pub write_bom: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: None,
            output_dir: None,
            index_column: None,
            step: 1.0,
            methods: Vec::new(),
            polynomial_degree: None,
            spline_degree: 3,
            log_epsilon: None,
            encoding: "utf-8".to_string(),
            delimiter: b',',
            index_precision: None,
            value_precision: None,
            strict: false,
            parallel: false,
            write_bom: true,
        }
    }
}

/// Split a method list on commas and whitespace.
pub fn parse_method_list(s: &str) -> Vec<String> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a delimiter: a single ASCII character, or `tab`.
pub fn parse_delimiter(s: &str) -> Option<u8> {
    match s {
        "tab" | "\\t" | "\t" => Some(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => s.bytes().next(),
        _ => None,
    }
}

/// Backslashes are kept as written, as in Windows paths.
fn parse_option() -> ParseOption {
    ParseOption { enabled_escape: false, ..ParseOption::default() }
}

fn invalid(key: &str, value: &str) -> ConfigurationError {
    ConfigurationError::InvalidSetting { key: key.to_string(), value: value.to_string() }
}

/// Lookup of raw values with section precedence.
struct Source<'a> {
    ini: &'a Ini,
}

impl<'a> Source<'a> {
    fn raw(&self, key: &str) -> Option<&'a str> {
        self.ini
            .section(Some(SECTION))
            .and_then(|p| p.get(key))
            .or_else(|| self.ini.section(None::<String>).and_then(|p| p.get(key)))
            .map(str::trim)
    }

    /// `Ok(None)` when the key is absent or empty.
    fn parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigurationError> {
        match self.raw(key) {
            None | Some("") => Ok(None),
            Some(v) => v.parse().map(Some).map_err(|_| invalid(key, v)),
        }
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigurationError> {
        match self.raw(key).map(str::to_ascii_lowercase).as_deref() {
            None | Some("") => Ok(None),
            Some("true") | Some("yes") | Some("on") | Some("1") => Ok(Some(true)),
            Some("false") | Some("no") | Some("off") | Some("0") => Ok(Some(false)),
            Some(v) => Err(invalid(key, v)),
        }
    }
}

impl Settings {
    /// Read settings from an INI file.
    pub fn load(path: &Path) -> Result<Self> {
        let ini = Ini::load_from_file_opt(path, parse_option()).map_err(|e| match e {
            ini::Error::Io(source) => Error::Io { path: path.display().to_string(), source },
            ini::Error::Parse(p) => Error::Configuration(invalid("<file>", &p.to_string())),
        })?;
        Ok(Self::from_ini(&ini)?)
    }

    /// Read settings from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigurationError> {
        let ini = Ini::load_from_str_opt(text, parse_option()).map_err(|e| invalid("<file>", &e.to_string()))?;
        Self::from_ini(&ini)
    }

    /// Read settings from a parsed INI document.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigurationError> {
        let src = Source { ini };
        let mut s = Settings::default();

        s.input = src.parsed::<PathBuf>("input")?;
        s.output_dir = src.parsed::<PathBuf>("output_dir")?;
        s.index_column = src.raw("index_column").filter(|v| !v.is_empty()).map(str::to_string);
        if let Some(step) = src.parsed("step")? {
            s.step = step;
        }
        if let Some(methods) = src.raw("methods") {
            s.methods = parse_method_list(methods);
        }
        s.polynomial_degree = src.parsed("polynomial_degree")?;
        if let Some(k) = src.parsed("spline_degree")? {
            s.spline_degree = k;
        }
        s.log_epsilon = src.parsed("log_epsilon")?;
        if let Some(enc) = src.raw("encoding").filter(|v| !v.is_empty()) {
            s.encoding = enc.to_string();
        }
        if let Some(d) = src.raw("delimiter").filter(|v| !v.is_empty()) {
            s.delimiter = parse_delimiter(d).ok_or_else(|| invalid("delimiter", d))?;
        }
        s.index_precision = src.parsed("index_precision")?;
        s.value_precision = src.parsed("value_precision")?;
        if let Some(v) = src.flag("strict")? {
            s.strict = v;
        }
        if let Some(v) = src.flag("parallel")? {
            s.parallel = v;
        }
        if let Some(v) = src.flag("write_bom")? {
            s.write_bom = v;
        }
        Ok(s)
    }

    /// Check the settings needed for a run. Problems that depend on the input
    /// table are found later.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.input.is_none() {
            return Err(ConfigurationError::MissingSetting("input".to_string()));
        }
        if self.index_column.is_none() {
            return Err(ConfigurationError::MissingSetting("index_column".to_string()));
        }
        if let Some(eps) = self.log_epsilon {
            if !(eps.is_finite() && eps >= 0.0) {
                return Err(invalid("log_epsilon", &eps.to_string()));
            }
        }
        encoding_for_label(&self.encoding)?;
        self.resample_config().validate()
    }

    /// Output folder: the configured one or the folder of the input.
    pub fn output_dir(&self) -> PathBuf {
        match (&self.output_dir, &self.input) {
            (Some(dir), _) => dir.clone(),
            (None, Some(input)) => input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            (None, None) => PathBuf::from("."),
        }
    }

    /// Immutable configuration for [`Resampler`](crate::resampler::Resampler).
    pub fn resample_config(&self) -> ResampleConfig {
        ResampleConfig {
            step: self.step,
            methods: self.methods.clone(),
            options: MethodOptions {
                polynomial_degree: self.polynomial_degree,
                spline_degree: self.spline_degree,
                log_epsilon: self.log_epsilon,
            },
            index_precision: self.index_precision,
            value_precision: self.value_precision,
            strict: self.strict,
            parallel: self.parallel,
        }
    }

    /// Options for reading the input.
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            index_column: self.index_column.clone().unwrap_or_default(),
            encoding: self.encoding.clone(),
            delimiter: self.delimiter,
        }
    }

    /// Options for writing the outputs.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            index_precision: self.index_precision,
            value_precision: self.value_precision,
            delimiter: self.delimiter,
            bom: self.write_bom,
        }
    }
}

#[test]
fn test_default_settings() {
    let s = Settings::default();
    assert_eq!(s.step, 1.0);
    assert!(s.methods.is_empty());
    assert_eq!(s.spline_degree, 3);
    assert_eq!(s.encoding, "utf-8");
    assert_eq!(s.delimiter, b',');
    assert!(s.write_bom);
    assert!(!s.strict);
    assert_eq!(s.validate(), Err(ConfigurationError::MissingSetting("input".to_string())));
}

#[test]
fn test_from_ini_str() {
    let s = Settings::from_ini_str(
        "input = data/inflow.csv\n\
         index_column = t/h\n\
         step = 0.5\n\
         methods = linear, spline log\n\
         encoding = gbk\n\
         index_precision = 1\n\
         value_precision =\n\
         strict = yes\n\
         delimiter = tab\n",
    )
    .unwrap();
    assert_eq!(s.input, Some(PathBuf::from("data/inflow.csv")));
    assert_eq!(s.index_column.as_deref(), Some("t/h"));
    assert_eq!(s.step, 0.5);
    assert_eq!(s.methods, vec!["linear", "spline", "log"]);
    assert_eq!(s.encoding, "gbk");
    assert_eq!(s.index_precision, Some(1));
    assert_eq!(s.value_precision, None);
    assert!(s.strict);
    assert_eq!(s.delimiter, b'\t');
    assert_eq!(s.output_dir(), PathBuf::from("data"));
    assert!(s.validate().is_ok());
}

#[test]
fn test_windows_paths_keep_backslashes() {
    let s = Settings::from_ini_str(
        "input = E:\\test\\new_inflow.csv\n\
         output_dir = D:\\水文\\results\n\
         index_column = t\n",
    )
    .unwrap();
    assert_eq!(s.input, Some(PathBuf::from(r"E:\test\new_inflow.csv")));
    assert_eq!(s.output_dir, Some(PathBuf::from(r"D:\水文\results")));
}

#[test]
fn test_section_overrides_top_level() {
    let s = Settings::from_ini_str("step = 2\n[resample]\nstep = 0.25\n").unwrap();
    assert_eq!(s.step, 0.25);
}

#[test]
fn test_invalid_values() {
    assert_eq!(
        Settings::from_ini_str("step = fast\n"),
        Err(ConfigurationError::InvalidSetting { key: "step".to_string(), value: "fast".to_string() })
    );
    assert!(Settings::from_ini_str("parallel = maybe\n").is_err());

    let mut s = Settings::from_ini_str("input = a.csv\nindex_column = t\n").unwrap();
    s.step = -1.0;
    assert_eq!(s.validate(), Err(ConfigurationError::InvalidStep(-1.0)));
    s.step = 1.0;
    s.encoding = "ebcdic-nope".to_string();
    assert!(matches!(s.validate(), Err(ConfigurationError::UnknownEncoding(_))));
}

#[test]
fn test_resample_config() {
    let s = Settings::from_ini_str("polynomial_degree = 2\nlog_epsilon = 1e-12\nparallel = on\n").unwrap();
    let c = s.resample_config();
    assert_eq!(c.options.polynomial_degree, Some(2));
    assert_eq!(c.options.log_epsilon, Some(1e-12));
    assert!(c.parallel);
    assert!(c.methods.is_empty());
}

#[test]
fn test_parse_delimiter() {
    assert_eq!(parse_delimiter(";"), Some(b';'));
    assert_eq!(parse_delimiter("tab"), Some(b'\t'));
    assert_eq!(parse_delimiter(",,"), None);
}
