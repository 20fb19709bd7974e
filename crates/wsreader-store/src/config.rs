//! Store configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use wsreader_formats::DeviceLayout;

use crate::handle::StoreTarget;
use crate::hidraw::DEFAULT_DEVICE_PATH;

/// Configuration for opening a station store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Device node used when the target is the live station
    pub device_path: PathBuf,

    /// Memory geometry of the station
    pub layout: DeviceLayout,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            layout: DeviceLayout::WH1080,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device node
    #[must_use]
    pub fn with_device_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.device_path = path.into();
        self
    }

    /// Set the memory geometry
    #[must_use]
    pub const fn with_layout(mut self, layout: DeviceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Resolve an identifier to a target using this configuration
    pub fn target(&self, identifier: &str) -> StoreTarget {
        StoreTarget::resolve(identifier, &self.device_path)
    }
}
