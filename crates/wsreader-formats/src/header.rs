//! Header field catalog.
//!
//! The region below the record ring holds a sparse set of configuration and
//! summary values at fixed offsets. This table names each one and declares how
//! it is stored. Offsets and kinds are fixed by the device firmware.

use serde::Serialize;

use crate::error::{FormatError, FormatResult};
use crate::layout::Address;
use crate::scalar::ScalarKind;

/// Offset of the storage interval (minutes)
pub const INTERVAL_OFFSET: Address = 0x010;
/// Offset of the stored record counter
pub const RECORDS_OFFSET: Address = 0x01B;
/// Offset of the pointer to the in-progress record
pub const CURRENT_OFFSET: Address = 0x01E;
/// Offset of the station clock
pub const DATETIME_OFFSET: Address = 0x02B;

/// How a value is conventionally displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notation {
    /// Base 10
    Decimal,
    /// Four hex digits, used for addresses
    Hex,
}

/// One named field in the header region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Lookup name
    pub name: &'static str,
    /// Human-readable label
    pub description: &'static str,
    /// Physical offset in device memory
    pub offset: Address,
    /// Storage type
    pub kind: ScalarKind,
    /// Display convention
    pub notation: Notation,
}

impl FieldDescriptor {
    const fn new(
        name: &'static str,
        description: &'static str,
        offset: Address,
        kind: ScalarKind,
    ) -> Self {
        Self {
            name,
            description,
            offset,
            kind,
            notation: Notation::Decimal,
        }
    }

    const fn hex(mut self) -> Self {
        self.notation = Notation::Hex;
        self
    }

    /// One past the last byte occupied by this field
    pub const fn end(&self) -> Address {
        self.offset + self.kind.width() as Address
    }
}

use ScalarKind::{Char, Date, Int16, UInt16, UInt24};

/// Every header field of the WH1080 family, in memory order
pub static HEADER_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("interval", "storage interval", INTERVAL_OFFSET, Char),
    FieldDescriptor::new("records", "number of records stored", RECORDS_OFFSET, UInt16),
    FieldDescriptor::new("current", "current record location", CURRENT_OFFSET, UInt16).hex(),
    FieldDescriptor::new("rpressure", "current relative pressure", 0x020, UInt16),
    FieldDescriptor::new("apressure", "current absolute pressure", 0x022, UInt16),
    FieldDescriptor::new("datetime", "current date & time", DATETIME_OFFSET, Date),
    FieldDescriptor::new("ihumiditymax", "inside maximum humidity", 0x062, Char),
    FieldDescriptor::new("ihumiditymin", "inside minimum humidity", 0x063, Char),
    FieldDescriptor::new("ohumiditymax", "outside maximum humidity", 0x064, Char),
    FieldDescriptor::new("ohumiditymin", "outside minimum humidity", 0x065, Char),
    FieldDescriptor::new("itempmax", "inside maximum temperature", 0x066, Int16),
    FieldDescriptor::new("itempmin", "inside minimum temperature", 0x068, Int16),
    FieldDescriptor::new("otempmax", "outside maximum temperature", 0x06A, Int16),
    FieldDescriptor::new("otempmin", "outside minimum temperature", 0x06C, Int16),
    FieldDescriptor::new("windchillmax", "maximum wind chill", 0x06E, Int16),
    FieldDescriptor::new("windchillmin", "minimum wind chill", 0x070, Int16),
    FieldDescriptor::new("dewpointmax", "maximum dew point", 0x072, Int16),
    FieldDescriptor::new("dewpointmin", "minimum dew point", 0x074, Int16),
    FieldDescriptor::new("abspressmax", "maximum absolute pressure", 0x076, UInt16),
    FieldDescriptor::new("abspressmin", "minimum absolute pressure", 0x078, UInt16),
    FieldDescriptor::new("relpressmax", "maximum relative pressure", 0x07A, UInt16),
    FieldDescriptor::new("relpressmin", "minimum relative pressure", 0x07C, UInt16),
    FieldDescriptor::new("windspeedmax", "maximum wind speed", 0x07E, UInt16),
    FieldDescriptor::new("gustspeedmax", "maximum gust speed", 0x080, UInt16),
    FieldDescriptor::new("rainhoumax", "maximum rain in an hour", 0x082, UInt16),
    FieldDescriptor::new("raindaymax", "maximum rain in a day", 0x084, UInt16),
    FieldDescriptor::new("rainweekmax", "maximum rain in a week", 0x086, UInt16),
    FieldDescriptor::new("rainmonthmax", "maximum rain in a month", 0x088, UInt16),
    FieldDescriptor::new("raintotalmax", "maximum total rain", 0x08A, UInt24),
    FieldDescriptor::new("ihummaxdate", "date inside maximum humidity", 0x08D, Date),
    FieldDescriptor::new("ihummindate", "date inside minimum humidity", 0x092, Date),
    FieldDescriptor::new("ohummaxdate", "date outside maximum humidity", 0x097, Date),
    FieldDescriptor::new("ohummindate", "date outside minimum humidity", 0x09C, Date),
    FieldDescriptor::new("itempmaxdate", "date inside maximum temp", 0x0A1, Date),
    FieldDescriptor::new("itempmindate", "date inside minimum temp", 0x0A6, Date),
    FieldDescriptor::new("otempmaxdate", "date outside maximum temp", 0x0AB, Date),
    FieldDescriptor::new("otempmindate", "date outside minimum temp", 0x0B0, Date),
    FieldDescriptor::new("wcmaxdate", "date maximum wind chill", 0x0B5, Date),
    FieldDescriptor::new("wcmindate", "date minimum wind chill", 0x0BA, Date),
    FieldDescriptor::new("dpmaxdate", "date maximum dew point", 0x0BF, Date),
    FieldDescriptor::new("dpmindate", "date minimum dew point", 0x0C4, Date),
    FieldDescriptor::new("apmaxdate", "date maximum absolute pressure", 0x0C9, Date),
    FieldDescriptor::new("apmindate", "date minimum absolute pressure", 0x0CE, Date),
    FieldDescriptor::new("rpmaxdate", "date maximum relative pressure", 0x0D3, Date),
    FieldDescriptor::new("rpmindate", "date minimum relative pressure", 0x0D8, Date),
    FieldDescriptor::new("wsmaxdate", "date maximum wind speed", 0x0DD, Date),
    FieldDescriptor::new("gsmindate", "date minimum gust speed", 0x0E2, Date),
    FieldDescriptor::new("rhmaxdate", "date maximum rain in an hour", 0x0E7, Date),
    FieldDescriptor::new("rdmaxdate", "date maximum rain in a day", 0x0EC, Date),
    FieldDescriptor::new("rwmaxdate", "date maximum rain in a week", 0x0F1, Date),
    FieldDescriptor::new("rmmaxdate", "date maximum rain in a month", 0x0F6, Date),
    FieldDescriptor::new("rtmaxdate", "date maximum rain total", 0x0FB, Date),
];

/// Look up a header field by name
pub fn field_by_name(name: &str) -> FormatResult<&'static FieldDescriptor> {
    HEADER_FIELDS
        .iter()
        .find(|field| field.name == name)
        .ok_or_else(|| FormatError::UnknownField(name.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::layout::DeviceLayout;

    #[test]
    fn test_well_known_fields() {
        let interval = field_by_name("interval").expect("interval");
        assert_eq!(interval.offset, 0x010);
        assert_eq!(interval.kind, ScalarKind::Char);

        let records = field_by_name("records").expect("records");
        assert_eq!(records.offset, 0x01B);
        assert_eq!(records.kind, ScalarKind::UInt16);

        let current = field_by_name("current").expect("current");
        assert_eq!(current.offset, 0x01E);
        assert_eq!(current.kind, ScalarKind::UInt16);
        assert_eq!(current.notation, Notation::Hex);

        let datetime = field_by_name("datetime").expect("datetime");
        assert_eq!(datetime.offset, 0x02B);
        assert_eq!(datetime.kind, ScalarKind::Date);
    }

    #[test]
    fn test_unknown_field() {
        let err = field_by_name("nonsense").unwrap_err();
        assert!(matches!(err, FormatError::UnknownField(ref name) if name == "nonsense"));
    }

    #[test]
    fn test_table_is_ordered_and_non_overlapping() {
        for pair in HEADER_FIELDS.windows(2) {
            assert!(
                pair[0].end() <= pair[1].offset,
                "{} overlaps {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn test_table_fits_below_ring() {
        let layout = DeviceLayout::WH1080;
        for field in HEADER_FIELDS {
            assert!(field.end() <= layout.base_address, "{}", field.name);
        }
        assert_eq!(HEADER_FIELDS.len(), 52);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = HEADER_FIELDS.iter().map(|f| f.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), HEADER_FIELDS.len());
    }
}
