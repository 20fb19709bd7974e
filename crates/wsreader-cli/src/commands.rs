//! Command execution.
//!
//! Every command reads through a [`StoreHandle`] and writes its report to
//! the given writer, so the same code serves the live station, snapshot
//! files and tests.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{debug, info};
use wsreader_formats::format_timestamp;
use wsreader_store::{
    FieldCatalog, RecordStore, SnapshotExtent, StoreHandle, TimedRecord, save_snapshot,
};

use crate::config::{Cli, Command, MemoryRange, RecordRange};
use crate::error::CliError;
use crate::report::{
    DUMP_WIDTH, RecordReport, RecordRow, ReportStyle, header_line, header_value, hex_dump,
    raw_line,
};

/// Open the configured store, run the command and close the store
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let target = cli.target();
    let mut handle = StoreHandle::connect(&target, &cli.store_config())
        .with_context(|| format!("cannot read station memory from {target}"))?;
    info!("Reading from {target}");

    execute(cli, &mut handle, out)?;

    if let Some(stats) = handle.cache_stats() {
        debug!(
            "Cache: {} physical reads, {} hits, {} misses",
            stats.physical_reads, stats.hits, stats.misses
        );
    }
    handle.close()?;
    Ok(())
}

/// Run the command against an already open store
pub fn execute<W: Write>(cli: &Cli, handle: &mut StoreHandle, out: &mut W) -> Result<()> {
    match &cli.command {
        Command::Header => list_header(cli, handle, out),
        Command::Dump { range } => dump_memory(handle, range.unwrap_or_default(), out),
        Command::Copy { output, full } => {
            let extent = if *full {
                SnapshotExtent::Full
            } else {
                SnapshotExtent::ThroughCurrent
            };
            let written = save_snapshot(handle, extent, output)
                .with_context(|| format!("failed to copy memory to {}", output.display()))?;
            writeln!(out, "wrote {written} bytes to {}", output.display())?;
            Ok(())
        }
        Command::Records { range, all } => {
            let range = if *all {
                RecordRange {
                    start: range.map_or(0, |range| range.start),
                    ..RecordRange::ALL
                }
            } else {
                range.unwrap_or_default()
            };
            list_records(cli, handle, range, out)
        }
        Command::Since { date } => list_since(cli, handle, *date, out),
        Command::Raw { range } => list_raw(handle, range.unwrap_or_default(), out),
    }
}

fn list_header<W: Write>(cli: &Cli, handle: &mut StoreHandle, out: &mut W) -> Result<()> {
    let fields = FieldCatalog::new(handle)
        .list()
        .context("failed to read header")?;

    if cli.report_style() == ReportStyle::Json {
        let object: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(field, value)| {
                (
                    field.name.to_string(),
                    serde_json::Value::String(header_value(field, value)),
                )
            })
            .collect();
        writeln!(out, "{}", serde_json::Value::Object(object))?;
    } else {
        for (field, value) in &fields {
            writeln!(out, "{}", header_line(field, value))?;
        }
    }
    Ok(())
}

fn dump_memory<W: Write>(handle: &mut StoreHandle, range: MemoryRange, out: &mut W) -> Result<()> {
    let bytes = handle.read(range.start, range.len())?;
    if bytes.len() < range.len() {
        return Err(CliError::InvalidMemoryRange(format!(
            "{:04x}:{:04x} (data ends at {:04x})",
            range.start,
            range.end,
            range.start as usize + bytes.len()
        ))
        .into());
    }
    for line in hex_dump(range.start, &bytes, DUMP_WIDTH) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn list_records<W: Write>(
    cli: &Cli,
    handle: &mut StoreHandle,
    range: RecordRange,
    out: &mut W,
) -> Result<()> {
    let mut store = RecordStore::new(handle);
    let stored = store.records_stored()?;
    let indices = range.resolve(stored)?;
    debug!("Listing records {indices:?} of {stored}");

    let rows = if cli.print_spec.needs_timestamp() {
        store.timeline(indices)?.into_iter().map(timed_row).collect()
    } else {
        let start = *indices.start();
        store
            .read_range(indices)?
            .into_iter()
            .zip(start..)
            .map(|(record, index)| RecordRow {
                index,
                timestamp: None,
                rain_delta: None,
                record,
            })
            .collect()
    };
    write_records(cli, &mut store, rows, out)
}

fn list_since<W: Write>(
    cli: &Cli,
    handle: &mut StoreHandle,
    since: NaiveDateTime,
    out: &mut W,
) -> Result<()> {
    let mut store = RecordStore::new(handle);
    let device_time = store.device_time()?;
    if since > device_time {
        return Err(CliError::FutureDate {
            requested: format_timestamp(&since),
            device: format_timestamp(&device_time),
        }
        .into());
    }

    let rows: Vec<_> = store.since(since)?.into_iter().map(timed_row).collect();
    info!("{} records since {}", rows.len(), format_timestamp(&since));
    write_records(cli, &mut store, rows, out)
}

fn list_raw<W: Write>(handle: &mut StoreHandle, range: RecordRange, out: &mut W) -> Result<()> {
    let mut store = RecordStore::new(handle);
    let stored = store.records_stored()?;
    for record in store.read_range(range.resolve(stored)?)? {
        writeln!(out, "{}", raw_line(&record))?;
    }
    Ok(())
}

fn timed_row(timed: TimedRecord) -> RecordRow {
    RecordRow {
        index: timed.index,
        timestamp: Some(timed.timestamp),
        rain_delta: None,
        record: timed.record,
    }
}

fn write_records<W: Write>(
    cli: &Cli,
    store: &mut RecordStore<'_>,
    rows: Vec<RecordRow>,
    out: &mut W,
) -> Result<()> {
    let mut report = RecordReport::new(cli.report_style(), cli.print_spec.clone());
    for mut row in rows {
        if cli.print_spec.needs_rain_delta() {
            row.rain_delta = Some(store.rain_delta(&row.record)?);
        }
        for line in report.render(&row)? {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}
