//! Physical byte sources.
//!
//! A [`ByteSource`] is the slow end of the stack: it answers "read up to N
//! bytes starting at A". It may return fewer bytes than asked for, which
//! signals exhaustion, but never more and never out of order. Retries and
//! timeouts, if any, belong to the implementation.

use std::io;

use tracing::trace;
use wsreader_formats::Address;

/// A slow, block-oriented reader of device memory
pub trait ByteSource {
    /// Fill `buf` from `address`, returning how many bytes were read
    fn read_block(&mut self, address: Address, buf: &mut [u8]) -> io::Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_block(&mut self, address: Address, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_block(address, buf)
    }
}

/// In-memory station image
///
/// Useful for replaying a snapshot through the block cache and for tests.
/// Reads past the end of the image are short.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    image: Vec<u8>,
    reads: usize,
}

impl MemorySource {
    /// Wrap an image
    pub fn new(image: Vec<u8>) -> Self {
        Self { image, reads: 0 }
    }

    /// Number of physical reads served so far
    pub const fn physical_reads(&self) -> usize {
        self.reads
    }

    /// The backing image
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Mutable access to the backing image, standing in for the station
    /// updating its own memory between reads
    pub fn image_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }
}

impl ByteSource for MemorySource {
    fn read_block(&mut self, address: Address, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        let start = (address as usize).min(self.image.len());
        let end = (start + buf.len()).min(self.image.len());
        let count = end - start;
        buf[..count].copy_from_slice(&self.image[start..end]);
        trace!("memory read {count} bytes at {address:#06x}");
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads() {
        let mut source = MemorySource::new((0u8..64).collect());
        let mut buf = [0u8; 8];

        assert_eq!(source.read_block(8, &mut buf).expect("read"), 8);
        assert_eq!(buf, [8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(source.physical_reads(), 1);
    }

    #[test]
    fn test_memory_source_short_reads() {
        let mut source = MemorySource::new((0u8..20).collect());
        let mut buf = [0xAAu8; 8];

        assert_eq!(source.read_block(16, &mut buf).expect("read"), 4);
        assert_eq!(&buf[..4], &[16, 17, 18, 19]);
        assert_eq!(&buf[4..], &[0xAA; 4]);

        assert_eq!(source.read_block(100, &mut buf).expect("read"), 0);
        assert_eq!(source.physical_reads(), 2);
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn ByteSource> = Box::new(MemorySource::new(vec![7; 4]));
        let mut buf = [0u8; 4];
        assert_eq!(source.read_block(0, &mut buf).expect("read"), 4);
        assert_eq!(buf, [7; 4]);
    }
}
