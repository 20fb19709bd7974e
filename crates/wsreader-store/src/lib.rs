//! Cached access to Fine Offset weather station memory
//!
//! This crate reads the station's 64 KiB memory either live over USB or
//! from a snapshot file, and turns it into header values and weather
//! records.
//!
//! # Architecture
//!
//! - **[`ByteSource`]**: slow block reads from the device
//! - **[`BlockCache`]**: read-through cache of 32-byte blocks with a cursor
//! - **[`StoreHandle`]**: one open backend, device or file, behind one API
//! - **[`FieldCatalog`]**: header fields by name
//! - **[`RecordStore`]**: ring addressing, rain deltas and timestamps
//!
//! # Example
//!
//! ```
//! use wsreader_store::{DeviceLayout, MemorySource, RecordStore, StoreHandle};
//!
//! let mut image = vec![0u8; 0x1_0000];
//! image[0x1B] = 1; // one record stored
//! image[0x1F] = 0x01; // current record at 0x0100
//!
//! let mut handle = StoreHandle::with_source(MemorySource::new(image), DeviceLayout::WH1080);
//! let mut records = RecordStore::new(&mut handle);
//! assert_eq!(records.address_of(0)?, 0x0100);
//! # Ok::<(), wsreader_store::StoreError>(())
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handle;
pub mod hidraw;
pub mod records;
pub mod snapshot;
pub mod source;

pub use cache::{BlockCache, CacheStats};
pub use catalog::FieldCatalog;
pub use config::StoreConfig;
pub use error::{ErrorKind, Result, StoreError};
pub use handle::{BackendKind, DEVICE_IDENTIFIER, StoreHandle, StoreTarget};
pub use hidraw::{HidrawSource, locate_station};
pub use records::{RecordStore, TimedRecord, previous_slot, ring_address};
pub use snapshot::{SnapshotExtent, save_snapshot, write_snapshot};
pub use source::{ByteSource, MemorySource};

pub use wsreader_formats::{Address, DeviceLayout};
