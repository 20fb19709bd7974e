//! Memory snapshots.
//!
//! A snapshot is the station memory written verbatim from address 0, so it
//! can be reopened later as a file-backed store.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::catalog::FieldCatalog;
use crate::error::Result;
use crate::handle::StoreHandle;

/// How much memory a snapshot covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotExtent {
    /// From address 0 through the end of the current record
    #[default]
    ThroughCurrent,
    /// The whole address space
    Full,
}

/// Write a snapshot of `handle` to `writer`, returning the bytes written
///
/// A short read is written as far as it got.
pub fn write_snapshot<W: Write>(
    handle: &mut StoreHandle,
    extent: SnapshotExtent,
    writer: &mut W,
) -> Result<usize> {
    let layout = *handle.layout();
    let size = match extent {
        SnapshotExtent::ThroughCurrent => {
            let current = FieldCatalog::new(handle).current_record_pointer()?;
            (current + layout.record_size).min(layout.memory_size)
        }
        SnapshotExtent::Full => layout.memory_size,
    } as usize;

    let bytes = handle.read(0, size)?;
    if bytes.len() < size {
        warn!("Snapshot truncated: read {} of {size} bytes", bytes.len());
    }
    writer.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Write a snapshot of `handle` to a new file at `path`
pub fn save_snapshot<P: AsRef<Path>>(
    handle: &mut StoreHandle,
    extent: SnapshotExtent,
    path: P,
) -> Result<usize> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    let written = write_snapshot(handle, extent, &mut writer)?;
    writer.flush()?;
    info!("Wrote {written} bytes to {}", path.display());
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use wsreader_formats::DeviceLayout;

    fn image() -> Vec<u8> {
        let mut image: Vec<u8> = (0..0x1_0000).map(|i: u32| (i % 253) as u8).collect();
        image[0x1E..0x20].copy_from_slice(&0x0140u16.to_le_bytes());
        image
    }

    #[test]
    fn test_snapshot_through_current() {
        let data = image();
        let mut handle = StoreHandle::with_source(MemorySource::new(data.clone()), DeviceLayout::WH1080);

        let mut out = Vec::new();
        let written =
            write_snapshot(&mut handle, SnapshotExtent::ThroughCurrent, &mut out).expect("snapshot");
        assert_eq!(written, 0x0150);
        assert_eq!(out, data[..0x0150].to_vec());
    }

    #[test]
    fn test_full_snapshot_reopens_as_file() {
        let data = image();
        let mut handle = StoreHandle::with_source(MemorySource::new(data.clone()), DeviceLayout::WH1080);
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("station.bin");

        let written = save_snapshot(&mut handle, SnapshotExtent::Full, &path).expect("save");
        assert_eq!(written, 0x1_0000);

        let mut file = StoreHandle::open_file(&path, DeviceLayout::WH1080).expect("reopen");
        assert_eq!(file.read(0xFFF0, 16).expect("read"), data[0xFFF0..].to_vec());
    }

    #[test]
    fn test_short_source_writes_partial_snapshot() {
        let mut handle = StoreHandle::with_source(MemorySource::new(vec![0; 0x100]), DeviceLayout::WH1080);

        let mut out = Vec::new();
        let written = write_snapshot(&mut handle, SnapshotExtent::Full, &mut out).expect("snapshot");
        assert_eq!(written, 0x100);
        assert_eq!(out.len(), 0x100);
    }
}
