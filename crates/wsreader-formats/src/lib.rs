//! Binary layouts and scalar decoders for Fine Offset weather station memory
//!
//! WH1080-family stations keep a 64 KiB memory image: a header region of
//! configuration and min/max summary fields, followed by a ring buffer of
//! fixed-width weather records. This crate decodes both without doing any
//! I/O; the `wsreader-store` crate fetches the bytes.
//!
//! # Components
//!
//! - **Layout**: [`DeviceLayout`] geometry constants for the address space
//! - **Scalars**: sign-magnitude, little-endian and packed-date decoders
//! - **Header**: the [`HEADER_FIELDS`] catalog and [`field_by_name`] lookup
//! - **Records**: the 16-byte [`RawRecord`] layout and decoded [`WeatherRecord`]
//!
//! # Example
//!
//! ```
//! use wsreader_formats::{ScalarKind, WeatherRecord, field_by_name};
//!
//! let data = [10, 45, 0x0A, 0x00, 50, 0x14, 0x00, 0xF4, 0x01, 20, 0x32, 0x00, 3, 0x64, 0x00, 0x00];
//! let record = WeatherRecord::decode(0x0100, &data)?;
//! assert_eq!(record.pressure, 50.0);
//!
//! let field = field_by_name("records")?;
//! assert_eq!(field.kind, ScalarKind::UInt16);
//! # Ok::<(), wsreader_formats::FormatError>(())
//! ```

#![warn(missing_docs)]

pub mod compass;
pub mod date;
pub mod error;
pub mod header;
pub mod layout;
pub mod record;
pub mod scalar;

pub use compass::{COMPASS_POINTS, compass_point};
pub use date::{DATE_FORMAT, PackedDate, format_timestamp, parse_timestamp};
pub use error::{FormatError, FormatResult};
pub use header::{FieldDescriptor, HEADER_FIELDS, Notation, field_by_name};
pub use layout::{Address, DeviceLayout};
pub use record::{RECORD_SIZE, RawRecord, SignMagnitude16, WeatherRecord};
pub use scalar::{Scalar, ScalarKind};
