//! Circular record addressing and history walks.
//!
//! The record ring starts at the layout's base address. Logical index 0 is
//! the record currently being filled; index `i` lies `i` records behind it.
//! When walking backwards past the base address the ring continues from the
//! top of memory, with the reserved header margin skipped.

use std::ops::RangeInclusive;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use tracing::{debug, warn};
use wsreader_formats::{Address, DeviceLayout, WeatherRecord};

use crate::catalog::FieldCatalog;
use crate::error::{Result, StoreError};
use crate::handle::StoreHandle;

/// Physical address of logical record `index`, given the current record
/// address; `None` when the result falls outside the address space
pub fn ring_address(layout: &DeviceLayout, current: Address, index: u32) -> Option<Address> {
    let current = i64::from(current);
    let offset = i64::from(index) * i64::from(layout.record_size);
    let address = if current - offset >= i64::from(layout.base_address) {
        current - offset
    } else {
        i64::from(layout.memory_size) - (offset - (current - i64::from(layout.reserved_margin)))
    };
    Address::try_from(address)
        .ok()
        .filter(|address| layout.contains(*address))
}

/// The record slot before `address` in the ring
///
/// Below the reserved margin the ring continues from the last slot in
/// memory.
pub const fn previous_slot(layout: &DeviceLayout, address: Address) -> Address {
    if address >= layout.reserved_margin + layout.record_size {
        address - layout.record_size
    } else {
        layout.memory_size - layout.record_size
    }
}

/// A record together with the time it was taken
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedRecord {
    /// Logical index, 0 being the newest
    pub index: u32,
    /// Estimated time the record was taken
    pub timestamp: NaiveDateTime,
    /// Decoded record
    pub record: WeatherRecord,
}

/// Record-level reads over a store handle
#[derive(Debug)]
pub struct RecordStore<'a> {
    handle: &'a mut StoreHandle,
    layout: DeviceLayout,
}

impl<'a> RecordStore<'a> {
    /// Borrow `handle` for record reads
    pub fn new(handle: &'a mut StoreHandle) -> Self {
        let layout = *handle.layout();
        Self { handle, layout }
    }

    fn catalog(&mut self) -> FieldCatalog<'_> {
        FieldCatalog::new(self.handle)
    }

    /// Number of records the station holds
    pub fn records_stored(&mut self) -> Result<u32> {
        self.catalog().records_stored()
    }

    /// Address of the record being filled
    pub fn current_record_pointer(&mut self) -> Result<Address> {
        self.catalog().current_record_pointer()
    }

    /// The station clock
    pub fn device_time(&mut self) -> Result<NaiveDateTime> {
        self.catalog().device_time()
    }

    /// Physical address of logical record `index`
    pub fn address_of(&mut self, index: u32) -> Result<Address> {
        let stored = self.records_stored()?;
        if index >= stored {
            return Err(StoreError::InvalidIndex { index, stored });
        }
        if stored > self.layout.max_records() + 1 {
            warn!(
                "Header claims {stored} records, the ring holds {}",
                self.layout.max_records() + 1
            );
        }
        let current = self.current_record_pointer()?;
        ring_address(&self.layout, current, index).ok_or_else(|| {
            StoreError::CorruptHeader(format!(
                "record {index} behind {current:#06x} falls outside memory"
            ))
        })
    }

    /// Decode the record stored at `address`
    pub fn read_at(&mut self, address: Address) -> Result<WeatherRecord> {
        let size = self.layout.record_size as usize;
        let bytes = self.handle.read_exact(address, size)?;
        Ok(WeatherRecord::decode(address, &bytes)?)
    }

    /// Decode logical record `index`
    pub fn read_index(&mut self, index: u32) -> Result<WeatherRecord> {
        let address = self.address_of(index)?;
        self.read_at(address)
    }

    /// Rain counted since the previous slot in the ring
    ///
    /// The counter wraps at 16 bits, so a negative difference is returned
    /// as is.
    pub fn rain_delta(&mut self, record: &WeatherRecord) -> Result<f64> {
        let previous = previous_slot(&self.layout, record.address);
        let earlier = self.read_at(previous)?;
        Ok(record.rain_counter - earlier.rain_counter)
    }

    /// Decode logical records in `range`, newest first
    pub fn read_range(&mut self, range: RangeInclusive<u32>) -> Result<Vec<WeatherRecord>> {
        range.map(|index| self.read_index(index)).collect()
    }

    /// Decode logical records in `range` with their timestamps
    ///
    /// Record 0 is stamped with the station clock and each older record
    /// is stamped one interval of its successor earlier, so every record
    /// up to the end of the range is read.
    pub fn timeline(&mut self, range: RangeInclusive<u32>) -> Result<Vec<TimedRecord>> {
        let (start, end) = range.into_inner();
        if start > end {
            return Ok(Vec::new());
        }

        let mut timestamp = self.device_time()?;
        let mut timed = Vec::new();
        for index in 0..=end {
            let record = self.read_index(index)?;
            let interval = record.interval;
            if index >= start {
                timed.push(TimedRecord {
                    index,
                    timestamp,
                    record,
                });
            }
            timestamp -= TimeDelta::minutes(i64::from(interval));
        }
        debug!("Stamped {} records from index {start}", timed.len());
        Ok(timed)
    }

    /// Completed records taken strictly after `since`, newest first
    ///
    /// The record being filled (index 0) is never included.
    pub fn since(&mut self, since: NaiveDateTime) -> Result<Vec<TimedRecord>> {
        let stored = self.records_stored()?;
        if stored < 2 {
            return Ok(Vec::new());
        }

        let device_time = self.device_time()?;
        if since > device_time {
            warn!("Requested start {since} is after the station clock {device_time}");
            return Ok(Vec::new());
        }

        let newest = self.read_index(0)?;
        let mut timestamp = device_time - TimeDelta::minutes(i64::from(newest.interval));
        let mut timed = Vec::new();
        for index in 1..stored {
            if timestamp <= since {
                break;
            }
            let record = self.read_index(index)?;
            let interval = record.interval;
            timed.push(TimedRecord {
                index,
                timestamp,
                record,
            });
            timestamp -= TimeDelta::minutes(i64::from(interval));
        }
        Ok(timed)
    }

    /// Memory geometry in use
    pub const fn layout(&self) -> &DeviceLayout {
        &self.layout
    }
}
