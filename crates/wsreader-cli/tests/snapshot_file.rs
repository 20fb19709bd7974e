#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! End-to-end runs of the reader against snapshot files

use clap::Parser;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use wsreader_cli::{Cli, CliError};
use wsreader_formats::{RawRecord, SignMagnitude16};

/// A station that has wrapped: four records, the oldest two at the top
/// of memory
fn wrapped_image() -> Vec<u8> {
    let mut image = vec![0u8; 0x1_0000];
    image[0x10] = 5;
    image[0x1B..0x1D].copy_from_slice(&4u16.to_le_bytes());
    image[0x1E..0x20].copy_from_slice(&0x0110u16.to_le_bytes());
    image[0x2B..0x30].copy_from_slice(&[0x25, 0x01, 0x01, 0x00, 0x10]);

    let slots = [(0x0110usize, 104u16), (0x0100, 102), (0xFFF0, 101), (0xFFE0, 100)];
    for (slot, rain) in slots {
        let record = RawRecord {
            interval: 5,
            humidity_in: 40,
            temperature_in: SignMagnitude16::from_value(215),
            humidity_out: 80,
            temperature_out: SignMagnitude16::from_value(-12),
            pressure: 10_132,
            wind_speed: 0,
            gust_speed: 0,
            wind_direction: 0,
            rain_counter: rain,
            error_code: 0,
        };
        image[slot..slot + 16].copy_from_slice(&record.to_bytes().unwrap());
    }
    image
}

fn snapshot(image: &[u8]) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), image).expect("write snapshot");
    file
}

fn run(file: &NamedTempFile, args: &[&str]) -> anyhow::Result<String> {
    let path = file.path().to_str().expect("utf8 path");
    let cli = Cli::try_parse_from(
        ["wsreader", "--file", path]
            .into_iter()
            .chain(args.iter().copied()),
    )
    .expect("arguments");
    let mut out = Vec::new();
    wsreader_cli::run(&cli, &mut out)?;
    Ok(String::from_utf8(out).expect("utf8 output"))
}

#[test]
fn test_records_follow_the_ring() {
    let file = snapshot(&wrapped_image());
    let text = run(&file, &["records", "0:n", "-p", "atr", "-S", " "]).unwrap();
    assert_eq!(
        text,
        "0110 -1.2 10.4\n0100 -1.2 10.2\nfff0 -1.2 10.1\nffe0 -1.2 10.0\n"
    );
}

#[test]
fn test_timestamps_and_rain_delta_across_wrap() {
    let file = snapshot(&wrapped_image());
    let text = run(&file, &["records", "1:3", "-p", "uR", "-S", "|"]).unwrap();
    // The slot behind the oldest record was never written
    assert_eq!(
        text,
        "2025-01-01 00:05|0.1\n2025-01-01 00:00|0.1\n2024-12-31 23:55|10.0\n"
    );
}

#[test]
fn test_since_across_midnight() {
    let file = snapshot(&wrapped_image());
    let text = run(&file, &["since", "2024-12-31 23:55", "-p", "a"]).unwrap();
    assert_eq!(text, "0100\nfff0\n");
}

#[test]
fn test_headings_mode() {
    let file = snapshot(&wrapped_image());
    let text = run(&file, &["records", "-p", "ah", "--headings", "-S", " "]).unwrap();
    assert_eq!(text, "loc.  hO.\n0110   80\n");
}

#[test]
fn test_json_lines() {
    let file = snapshot(&wrapped_image());
    let text = run(&file, &["records", "0:1", "--json", "-p", "uR"]).unwrap();
    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["index"], 1);
    assert_eq!(rows[1]["address"], 0x0100);
    assert_eq!(rows[1]["timestamp"], "2025-01-01 00:05");
}

#[test]
fn test_copy_then_read_back() {
    let file = snapshot(&wrapped_image());
    let dir = tempfile::tempdir().unwrap();
    let copy = dir.path().join("copy.bin");

    run(&file, &["copy", "--full", copy.to_str().unwrap()]).unwrap();
    assert_eq!(std::fs::read(&copy).unwrap(), wrapped_image());

    let original = run(&file, &["records", "--all", "-p", "auR"]).unwrap();
    let cli = Cli::try_parse_from([
        "wsreader",
        "--file",
        copy.to_str().unwrap(),
        "records",
        "--all",
        "-p",
        "auR",
    ])
    .unwrap();
    let mut out = Vec::new();
    wsreader_cli::run(&cli, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), original);
}

#[test]
fn test_truncated_snapshot_reports_end_of_data() {
    let image = wrapped_image();
    let file = snapshot(&image[..0x0120]);
    let err = run(&file, &["records", "0:2"]).unwrap_err();
    let store_error = err
        .downcast_ref::<wsreader_store::StoreError>()
        .expect("store error");
    assert_eq!(
        store_error.kind(),
        wsreader_store::ErrorKind::EndOfData
    );
}

#[test]
fn test_empty_station() {
    let mut image = wrapped_image();
    image[0x1B..0x1D].copy_from_slice(&0u16.to_le_bytes());
    let file = snapshot(&image);
    let err = run(&file, &["records"]).unwrap_err();
    assert_eq!(err.downcast_ref::<CliError>(), Some(&CliError::NoRecords));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin");
    let cli = Cli::try_parse_from(["wsreader", "--file", missing.to_str().unwrap(), "header"])
        .unwrap();
    let err = wsreader_cli::run(&cli, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().starts_with("cannot read station memory from"));
}
