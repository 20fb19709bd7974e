//! Device memory geometry.
//!
//! The station exposes a flat 64 KiB address space. The first 256 bytes hold
//! configuration and summary fields; the rest is a ring of 16-byte records.
//!
//! | Range              | Contents                     |
//! |--------------------|------------------------------|
//! | `0x0000..0x0100`   | Header fields (see `header`) |
//! | `0x0100..0x10000`  | Record ring                  |

use serde::{Deserialize, Serialize};

/// Offset into device memory
pub type Address = u32;

/// Geometry of a station's memory image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLayout {
    /// First byte of the record ring
    pub base_address: Address,
    /// Total size of the address space
    pub memory_size: Address,
    /// Size of one physical read, and of one cache block
    pub block_size: Address,
    /// Size of one weather record
    pub record_size: Address,
    /// Boundary between the header region and the ring used by wraparound
    pub reserved_margin: Address,
}

impl DeviceLayout {
    /// Layout of the WH1080/WH1081 family
    pub const WH1080: Self = Self {
        base_address: 0x0100,
        memory_size: 0x1_0000,
        block_size: 0x20,
        record_size: 16,
        reserved_margin: 0x0100,
    };

    /// Number of cache blocks covering the address space
    pub const fn block_count(&self) -> usize {
        (self.memory_size / self.block_size) as usize
    }

    /// Index of the block containing `address`
    pub const fn block_index(&self, address: Address) -> usize {
        (address / self.block_size) as usize
    }

    /// First address of the block containing `address`
    pub const fn block_base(&self, address: Address) -> Address {
        (address / self.block_size) * self.block_size
    }

    /// Capacity of the record ring, minus the in-progress slot
    pub const fn max_records(&self) -> u32 {
        ((self.memory_size - self.base_address) / self.record_size) - 1
    }

    /// Whether `address` lies inside the address space
    pub const fn contains(&self, address: Address) -> bool {
        address < self.memory_size
    }
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self::WH1080
    }
}
