//! Named access to header fields.

use chrono::NaiveDateTime;
use tracing::trace;
use wsreader_formats::header::{CURRENT_OFFSET, DATETIME_OFFSET, INTERVAL_OFFSET, RECORDS_OFFSET};
use wsreader_formats::{
    Address, FieldDescriptor, FormatError, HEADER_FIELDS, PackedDate, Scalar, ScalarKind,
};

use crate::error::{Result, StoreError};
use crate::handle::StoreHandle;

/// Reads header fields through a store handle
#[derive(Debug)]
pub struct FieldCatalog<'a> {
    handle: &'a mut StoreHandle,
}

impl<'a> FieldCatalog<'a> {
    /// Borrow `handle` for header reads
    pub const fn new(handle: &'a mut StoreHandle) -> Self {
        Self { handle }
    }

    /// Look up a field descriptor by name
    pub fn field(name: &str) -> Result<&'static FieldDescriptor> {
        wsreader_formats::field_by_name(name).map_err(|err| match err {
            FormatError::UnknownField(name) => StoreError::NotFound(name),
            other => StoreError::Format(other),
        })
    }

    /// Read and decode the named field
    pub fn value_of(&mut self, name: &str) -> Result<Scalar> {
        let field = Self::field(name)?;
        self.read_field(field)
    }

    /// Read and decode one field
    pub fn read_field(&mut self, field: &FieldDescriptor) -> Result<Scalar> {
        self.read_scalar(field.offset, field.kind)
    }

    /// Every header field with its current value, in address order
    pub fn list(&mut self) -> Result<Vec<(&'static FieldDescriptor, Scalar)>> {
        HEADER_FIELDS
            .iter()
            .map(|field| Ok((field, self.read_field(field)?)))
            .collect()
    }

    /// Number of records the station says it holds
    pub fn records_stored(&mut self) -> Result<u32> {
        self.read_unsigned(RECORDS_OFFSET, ScalarKind::UInt16)
    }

    /// Address of the record currently being filled
    pub fn current_record_pointer(&mut self) -> Result<Address> {
        self.read_unsigned(CURRENT_OFFSET, ScalarKind::UInt16)
    }

    /// Minutes between stored records
    pub fn storage_interval(&mut self) -> Result<u8> {
        let value = self.read_unsigned(INTERVAL_OFFSET, ScalarKind::Char)?;
        u8::try_from(value).map_err(|_| StoreError::CorruptHeader(format!("interval {value}")))
    }

    /// The station clock as stored
    pub fn device_date(&mut self) -> Result<PackedDate> {
        match self.read_scalar(DATETIME_OFFSET, ScalarKind::Date)? {
            Scalar::Date(date) => Ok(date),
            other => Err(StoreError::CorruptHeader(format!(
                "date field decoded as {other}"
            ))),
        }
    }

    /// The station clock as a timestamp
    pub fn device_time(&mut self) -> Result<NaiveDateTime> {
        Ok(self.device_date()?.to_datetime()?)
    }

    fn read_scalar(&mut self, offset: Address, kind: ScalarKind) -> Result<Scalar> {
        let bytes = self.handle.read_exact(offset, kind.width())?;
        let value = kind.decode(&bytes)?;
        trace!("Header {offset:#05x}: {value}");
        Ok(value)
    }

    fn read_unsigned(&mut self, offset: Address, kind: ScalarKind) -> Result<u32> {
        let value = self.read_scalar(offset, kind)?;
        value.as_u32().ok_or_else(|| {
            StoreError::CorruptHeader(format!("expected unsigned value at {offset:#05x}"))
        })
    }
}
