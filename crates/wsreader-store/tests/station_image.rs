#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests over a synthetic station image
//!
//! Builds a full 64 KiB memory image with a wrapped record ring, then reads
//! it through both backends: cached device reads over a `MemorySource` and
//! direct reads from a snapshot file.

use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use wsreader_formats::{RawRecord, SignMagnitude16, parse_timestamp};
use wsreader_store::{
    DeviceLayout, ErrorKind, FieldCatalog, MemorySource, RecordStore, SnapshotExtent, StoreError,
    StoreHandle, write_snapshot,
};

const LAYOUT: DeviceLayout = DeviceLayout::WH1080;
const RECORDS: u16 = 6;
// Three records below the base address wrap to the top of memory
const CURRENT: u16 = 0x0120;

fn record(sequence: u16) -> RawRecord {
    RawRecord {
        interval: 15,
        humidity_in: 40 + sequence as u8,
        temperature_in: SignMagnitude16::from_value(200 + i32::from(sequence)),
        humidity_out: 70,
        temperature_out: SignMagnitude16::from_value(-20 - i32::from(sequence)),
        pressure: 10_000 + sequence,
        wind_speed: 5,
        gust_speed: 9,
        wind_direction: (sequence % 16) as u8,
        rain_counter: 100 + sequence * 3,
        error_code: 0,
    }
}

/// Image where logical index `i` holds `record(RECORDS - 1 - i)`
fn station_image() -> Vec<u8> {
    let mut image = vec![0u8; LAYOUT.memory_size as usize];
    image[0x10] = 15;
    image[0x1B..0x1D].copy_from_slice(&RECORDS.to_le_bytes());
    image[0x1E..0x20].copy_from_slice(&CURRENT.to_le_bytes());
    image[0x2B..0x30].copy_from_slice(&[0x24, 0x11, 0x05, 0x09, 0x30]);

    let slots = [0x0120, 0x0110, 0x0100, 0xFFF0, 0xFFE0, 0xFFD0];
    for (index, slot) in slots.iter().enumerate() {
        let bytes = record(RECORDS - 1 - index as u16).to_bytes().unwrap();
        let start = *slot as usize;
        image[start..start + 16].copy_from_slice(&bytes);
    }
    image
}

fn snapshot_file(image: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(image).expect("write image");
    file.flush().expect("flush");
    file
}

fn both_backends() -> (StoreHandle, StoreHandle, NamedTempFile) {
    let image = station_image();
    let file = snapshot_file(&image);
    let device = StoreHandle::with_source(MemorySource::new(image), LAYOUT);
    let snapshot = StoreHandle::open_file(file.path(), LAYOUT).expect("open snapshot");
    (device, snapshot, file)
}

#[test]
fn header_reads_agree_across_backends() {
    let (mut device, mut snapshot, _file) = both_backends();

    let from_device = FieldCatalog::new(&mut device).list().expect("device header");
    let from_file = FieldCatalog::new(&mut snapshot).list().expect("file header");
    assert_eq!(from_device, from_file);

    let mut catalog = FieldCatalog::new(&mut device);
    assert_eq!(catalog.records_stored().unwrap(), u32::from(RECORDS));
    assert_eq!(catalog.current_record_pointer().unwrap(), u32::from(CURRENT));
    assert_eq!(catalog.device_date().unwrap().to_string(), "2024-11-05 09:30");
}

#[test]
fn ring_walk_wraps_past_base_address() {
    let (mut device, _snapshot, _file) = both_backends();
    let mut store = RecordStore::new(&mut device);

    let addresses: Vec<_> = (0..u32::from(RECORDS))
        .map(|index| store.address_of(index).unwrap())
        .collect();
    assert_eq!(addresses, vec![0x0120, 0x0110, 0x0100, 0xFFF0, 0xFFE0, 0xFFD0]);

    let oldest = store.read_index(5).unwrap();
    assert_eq!(oldest.humidity_in, 40);
    let newest = store.read_index(0).unwrap();
    assert_eq!(newest.humidity_in, 45);
}

#[test]
fn records_agree_across_backends() {
    let (mut device, mut snapshot, _file) = both_backends();

    let from_device = RecordStore::new(&mut device).read_range(0..=5).unwrap();
    let from_file = RecordStore::new(&mut snapshot).read_range(0..=5).unwrap();
    assert_eq!(from_device, from_file);
}

#[test]
fn rain_delta_across_the_wrap() {
    let (mut device, _snapshot, _file) = both_backends();
    let mut store = RecordStore::new(&mut device);

    // Index 2 sits at the base address; its predecessor is the top slot
    let at_base = store.read_index(2).unwrap();
    assert_eq!(at_base.address, 0x0100);
    let delta = store.rain_delta(&at_base).unwrap();
    assert!((delta - 0.3).abs() < 1e-9, "delta was {delta}");
}

#[test]
fn invalid_index_is_rejected() {
    let (mut device, _snapshot, _file) = both_backends();
    let err = RecordStore::new(&mut device)
        .read_index(u32::from(RECORDS))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIndex);
}

#[test]
fn since_walks_back_until_boundary() {
    let (mut device, _snapshot, _file) = both_backends();
    let mut store = RecordStore::new(&mut device);

    // Record 1 at 09:15, record 2 at 09:00, record 3 at 08:45, record 4 at 08:30
    let since = parse_timestamp("2024-11-05 08:40").unwrap();
    let indices: Vec<_> = store
        .since(since)
        .unwrap()
        .iter()
        .map(|timed| timed.index)
        .collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[test]
fn cache_reads_each_block_once() {
    let mut device = StoreHandle::with_source(MemorySource::new(station_image()), LAYOUT);
    let mut store = RecordStore::new(&mut device);
    store.read_range(0..=5).unwrap();
    store.read_range(0..=5).unwrap();

    let stats = device.cache_stats().expect("device stats");
    // Header block 0, two blocks from 0x0100 and two from 0xFFC0
    assert_eq!(stats.physical_reads, 5);
    assert!(stats.hits > stats.misses);
}

#[test]
fn snapshot_round_trip_preserves_records() {
    let mut device = StoreHandle::with_source(MemorySource::new(station_image()), LAYOUT);
    let mut bytes = Vec::new();
    write_snapshot(&mut device, SnapshotExtent::Full, &mut bytes).unwrap();

    let file = snapshot_file(&bytes);
    let mut reopened = StoreHandle::open_file(file.path(), LAYOUT).unwrap();

    let original = RecordStore::new(&mut device).read_range(0..=5).unwrap();
    let restored = RecordStore::new(&mut reopened).read_range(0..=5).unwrap();
    assert_eq!(original, restored);
}

#[test]
fn partial_snapshot_cannot_serve_wrapped_records() {
    let mut device = StoreHandle::with_source(MemorySource::new(station_image()), LAYOUT);
    let mut bytes = Vec::new();
    write_snapshot(&mut device, SnapshotExtent::ThroughCurrent, &mut bytes).unwrap();
    assert_eq!(bytes.len(), usize::from(CURRENT) + 16);

    let file = snapshot_file(&bytes);
    let mut reopened = StoreHandle::open_file(file.path(), LAYOUT).unwrap();
    let mut store = RecordStore::new(&mut reopened);
    assert!(store.read_index(2).is_ok());
    let err = store.read_index(3).unwrap_err();
    assert!(matches!(err, StoreError::EndOfData { address: 0xFFF0, .. }));
}
