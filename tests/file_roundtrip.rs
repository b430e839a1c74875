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


//! Reading a table from disk, resampling it and writing the per-method files.

use std::fs;

use regrid::config::Settings;
use regrid::io::{read_table, write_report, write_results, Report, WriteOptions};
use regrid::prelude::*;
use tempfile::tempdir;

#[test]
fn test_gbk_input_to_csv_outputs() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("inflow.csv");

    // Header "时间,Q" in GBK.
    let mut bytes = b"\xca\xb1\xbc\xe4,Q\n".to_vec();
    bytes.extend_from_slice(b"0,10\n3,40\n6,30\n9,5\n");
    fs::write(&input, bytes).unwrap();

    let settings = Settings::from_ini_str(&format!(
        "input = {}\nindex_column = 时间\nstep = 1\nmethods = linear, nearest, bogus\nencoding = gbk\n\
         index_precision = 0\nvalue_precision = 1\nwrite_bom = false\n",
        input.display()
    ))
    .unwrap();
    settings.validate().unwrap();

    let table = read_table(&input, &settings.read_options()).unwrap();
    assert_eq!(table.index_name(), "时间");

    let output = Resampler::new(settings.resample_config()).run(&table).unwrap();
    assert_eq!(output.skipped, vec![UnsupportedMethod("bogus".to_string())]);

    let out_dir = dir.path().join("out");
    fs::create_dir_all(&out_dir).unwrap();
    let written = write_results(&output, &out_dir, "inflow", &settings.write_options());
    assert_eq!(written.len(), 2);
    assert!(written.iter().all(|w| w.result.is_ok()));

    let linear = fs::read_to_string(out_dir.join("inflow_linear_resampled.csv")).unwrap();
    let lines: Vec<&str> = linear.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "时间,Q");
    assert_eq!(lines[1], "0,10.0");
    assert_eq!(lines[2], "1,20.0");
    assert_eq!(lines[3], "2,30.0");
    assert_eq!(lines[4], "3,40.0");
    assert_eq!(lines[10], "9,5.0");

    let nearest = fs::read_to_string(out_dir.join("inflow_nearest_resampled.csv")).unwrap();
    assert!(nearest.lines().any(|l| l == "1,10.0"));
    assert!(nearest.lines().any(|l| l == "2,40.0"));

    let report = Report {
        input: &input,
        output_dir: &out_dir,
        index_column: table.index_name(),
        step: settings.step,
        index_precision: settings.index_precision,
        value_precision: settings.value_precision,
        output: &output,
        written: &written,
    };
    let report_path = write_report(&report, &out_dir, "inflow").unwrap();
    let text = fs::read_to_string(report_path).unwrap();
    assert!(text.contains("inflow_linear_resampled.csv"));
    assert!(text.contains("bogus"));
    assert!(text.contains("linear interpolation (linear): 10 rows"));
}

#[test]
fn test_failed_write_does_not_stop_other_methods() {
    let dir = tempdir().unwrap();
    let table = Table::new("t", vec![0.0, 1.0, 2.0])
        .with_column("Q", vec![1.0, 2.0, 3.0])
        .unwrap();
    let output = Resampler::new(ResampleConfig::new(0.5).with_methods(["linear", "nearest"]))
        .run(&table)
        .unwrap();

    // A directory where the linear output file should go makes that write fail.
    fs::create_dir(dir.path().join("t_linear_resampled.csv")).unwrap();

    let written = write_results(&output, dir.path(), "t", &WriteOptions::default());
    assert_eq!(written.len(), 2);
    assert!(written[0].result.is_err());
    assert!(written[1].result.is_ok());
    assert!(dir.path().join("t_nearest_resampled.csv").is_file());
}

#[test]
fn test_missing_input_file() {
    let dir = tempdir().unwrap();
    let settings = Settings::from_ini_str("index_column = t\n").unwrap();
    let err = read_table(&dir.path().join("nope.csv"), &settings.read_options()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_settings_file_with_windows_paths() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regrid.ini");
    fs::write(
        &path,
        "[resample]\ninput = E:\\test\\new_inflow.csv\noutput_dir = E:\\test\\out\nindex_column = t\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.input, Some(std::path::PathBuf::from(r"E:\test\new_inflow.csv")));
    assert_eq!(settings.output_dir(), std::path::PathBuf::from(r"E:\test\out"));
}
