//! Block cache in front of a slow [`ByteSource`].
//!
//! The address space is split into fixed-size blocks. A byte is served from
//! its block if the block is valid and the last fill covered the byte's
//! offset; otherwise the whole block is fetched with one physical read.
//! Blocks stay cached until [`BlockCache::flush_all`] or
//! [`BlockCache::invalidate_block`] drops them. The cursor is owned by the
//! cache and advances by one on every successful byte read.

use serde::Serialize;
use tracing::{debug, trace, warn};
use wsreader_formats::{Address, DeviceLayout};

use crate::error::{ErrorKind, Result, StoreError};
use crate::source::ByteSource;

/// Cache access counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Bytes served from a valid block
    pub hits: u64,
    /// Bytes that needed a physical read
    pub misses: u64,
    /// Physical reads issued to the source
    pub physical_reads: u64,
    /// Bytes delivered by the source
    pub bytes_fetched: u64,
    /// Single-block invalidations
    pub invalidations: u64,
    /// Whole-cache flushes
    pub flushes: u64,
}

impl CacheStats {
    /// Fraction of byte reads served without touching the source
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct Block {
    valid: bool,
    filled: usize,
    data: Vec<u8>,
}

impl Block {
    fn new(size: usize) -> Self {
        Self {
            valid: false,
            filled: 0,
            data: vec![0; size],
        }
    }

    const fn covers(&self, offset: usize) -> bool {
        self.valid && offset < self.filled
    }
}

/// Read-through block cache with a byte cursor
pub struct BlockCache<S> {
    source: S,
    layout: DeviceLayout,
    blocks: Vec<Block>,
    cursor: Address,
    last_error: Option<ErrorKind>,
    stats: CacheStats,
}

impl<S: ByteSource> BlockCache<S> {
    /// Create an empty cache over `source`
    pub fn new(source: S, layout: DeviceLayout) -> Self {
        let blocks = (0..layout.block_count())
            .map(|_| Block::new(layout.block_size as usize))
            .collect();
        debug!(
            "Created block cache: {} blocks of {} bytes",
            layout.block_count(),
            layout.block_size
        );
        Self {
            source,
            layout,
            blocks,
            cursor: 0,
            last_error: None,
            stats: CacheStats::default(),
        }
    }

    /// Move the cursor and clear the sticky error. Never touches the source.
    pub const fn seek(&mut self, address: Address) {
        self.cursor = address;
        self.last_error = None;
    }

    /// Current cursor position
    pub const fn position(&self) -> Address {
        self.cursor
    }

    /// Read the byte under the cursor and advance it
    ///
    /// On failure the cursor stays put and the error kind becomes the
    /// sticky [`last_error`](Self::last_error).
    pub fn read_byte(&mut self) -> Result<u8> {
        match self.fetch(self.cursor) {
            Ok(byte) => {
                self.cursor += 1;
                Ok(byte)
            }
            Err(err) => {
                self.last_error = Some(err.kind());
                Err(err)
            }
        }
    }

    /// Read up to `count` bytes from the cursor
    ///
    /// Stops early at the end of available data and returns what was read,
    /// leaving [`ErrorKind::EndOfData`] as the sticky error. Transport
    /// errors are returned as `Err`.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let start = self.cursor;
        let mut bytes = Vec::with_capacity(count);
        while bytes.len() < count {
            match self.read_byte() {
                Ok(byte) => bytes.push(byte),
                Err(StoreError::EndOfData { .. }) => {
                    debug!(
                        "Short read at {start:#06x}: {} of {count} bytes",
                        bytes.len()
                    );
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(bytes)
    }

    /// Drop every cached block
    pub fn flush_all(&mut self) {
        for block in &mut self.blocks {
            block.valid = false;
            block.filled = 0;
        }
        self.stats.flushes += 1;
        debug!("Flushed block cache");
    }

    /// Drop the block containing `address`
    pub fn invalidate_block(&mut self, address: Address) {
        let index = self.layout.block_index(address);
        if let Some(block) = self.blocks.get_mut(index) {
            block.valid = false;
            block.filled = 0;
            self.stats.invalidations += 1;
            trace!("Invalidated block {index} ({address:#06x})");
        }
    }

    /// Kind of the most recent failure, if any
    pub const fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Clear the sticky error
    pub const fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Access counters
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Geometry this cache was built for
    pub const fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    /// The underlying source
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the underlying source
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn fetch(&mut self, address: Address) -> Result<u8> {
        let end_of_data = StoreError::EndOfData {
            address,
            expected: 1,
            actual: 0,
        };
        if !self.layout.contains(address) {
            return Err(end_of_data);
        }

        let index = self.layout.block_index(address);
        let base = self.layout.block_base(address);
        let offset = (address - base) as usize;

        if self.blocks[index].covers(offset) {
            self.stats.hits += 1;
            return Ok(self.blocks[index].data[offset]);
        }

        self.stats.misses += 1;
        let block = &mut self.blocks[index];
        self.stats.physical_reads += 1;
        let read = match self.source.read_block(base, &mut block.data) {
            Ok(read) => read.min(block.data.len()),
            Err(err) => {
                block.valid = false;
                block.filled = 0;
                warn!("Physical read at {base:#06x} failed: {err}");
                return Err(err.into());
            }
        };
        block.valid = true;
        block.filled = read;
        self.stats.bytes_fetched += read as u64;
        trace!("Filled block {index} at {base:#06x} with {read} bytes");

        if read <= offset {
            debug!("Source exhausted at {address:#06x} ({read} bytes in block)");
            return Err(end_of_data);
        }
        Ok(block.data[offset])
    }
}

impl<S> std::fmt::Debug for BlockCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockCache")
            .field("layout", &self.layout)
            .field("cursor", &self.cursor)
            .field("last_error", &self.last_error)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
