//! Uniform read access to a live station or a snapshot file.
//!
//! A [`StoreHandle`] owns exactly one backend once opened. The device
//! backend goes through a [`BlockCache`]; the file backend reads the image
//! directly. Both honour the same short-read contract: a read returns as
//! many bytes as were available, and [`StoreHandle::read_exact`] turns a
//! short read into [`StoreError::EndOfData`].

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};
use wsreader_formats::{Address, DeviceLayout};

use crate::cache::{BlockCache, CacheStats};
use crate::config::StoreConfig;
use crate::error::{ErrorKind, Result, StoreError};
use crate::hidraw::{DEFAULT_DEVICE_PATH, HidrawSource};
use crate::source::ByteSource;

/// Identifier that selects the live station instead of a file
pub const DEVICE_IDENTIFIER: &str = ":usb:";

/// What a handle should open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// Live station behind a hidraw node
    Device(PathBuf),
    /// Snapshot file
    File(PathBuf),
}

impl StoreTarget {
    /// Map an identifier to a target; [`DEVICE_IDENTIFIER`] picks the device
    pub fn resolve(identifier: &str, device_path: &Path) -> Self {
        if identifier == DEVICE_IDENTIFIER {
            Self::Device(device_path.to_path_buf())
        } else {
            Self::File(PathBuf::from(identifier))
        }
    }

    /// Backend this target opens
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Device(_) => BackendKind::Device,
            Self::File(_) => BackendKind::File,
        }
    }
}

impl FromStr for StoreTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::resolve(s, Path::new(DEFAULT_DEVICE_PATH)))
    }
}

impl fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(path) => write!(f, "{DEVICE_IDENTIFIER} ({})", path.display()),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Which backend a handle is using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Cached device reads
    Device,
    /// Direct file reads
    File,
}

enum Backend {
    Device(BlockCache<Box<dyn ByteSource>>),
    File { file: File, path: PathBuf },
}

/// Handle over either the live station or a snapshot file
pub struct StoreHandle {
    layout: DeviceLayout,
    backend: Option<Backend>,
}

impl StoreHandle {
    /// An unopened handle
    pub const fn new(layout: DeviceLayout) -> Self {
        Self {
            layout,
            backend: None,
        }
    }

    /// Open `target` with the given configuration
    pub fn connect(target: &StoreTarget, config: &StoreConfig) -> Result<Self> {
        let mut handle = Self::new(config.layout);
        handle.open(target)?;
        Ok(handle)
    }

    /// Open a snapshot file
    pub fn open_file<P: AsRef<Path>>(path: P, layout: DeviceLayout) -> Result<Self> {
        let mut handle = Self::new(layout);
        handle.open(&StoreTarget::File(path.as_ref().to_path_buf()))?;
        Ok(handle)
    }

    /// A device-backed handle over any byte source, with an empty cache
    pub fn with_source<S: ByteSource + 'static>(source: S, layout: DeviceLayout) -> Self {
        Self {
            layout,
            backend: Some(Backend::Device(BlockCache::new(Box::new(source), layout))),
        }
    }

    /// Establish a backend, replacing any previous one
    ///
    /// Device targets start with an empty cache.
    pub fn open(&mut self, target: &StoreTarget) -> Result<()> {
        self.backend = None;
        let open_error = |source| StoreError::OpenError {
            target: target.to_string(),
            source,
        };
        let backend = match target {
            StoreTarget::Device(path) => {
                let source = HidrawSource::open(path).map_err(open_error)?;
                Backend::Device(BlockCache::new(Box::new(source), self.layout))
            }
            StoreTarget::File(path) => {
                let file = File::open(path).map_err(open_error)?;
                info!("Opened snapshot file {}", path.display());
                Backend::File {
                    file,
                    path: path.clone(),
                }
            }
        };
        self.backend = Some(backend);
        Ok(())
    }

    /// Read up to `count` bytes starting at `address`
    ///
    /// Returns fewer bytes when the backend runs out of data.
    pub fn read(&mut self, address: Address, count: usize) -> Result<Vec<u8>> {
        match self.backend.as_mut().ok_or(StoreError::NotOpen)? {
            Backend::Device(cache) => {
                cache.seek(address);
                cache.read_bytes(count)
            }
            Backend::File { file, path } => {
                let bytes = read_file(file, address, count)?;
                if bytes.len() < count {
                    debug!(
                        "Short read from {} at {address:#06x}: {} of {count} bytes",
                        path.display(),
                        bytes.len()
                    );
                }
                Ok(bytes)
            }
        }
    }

    /// Read exactly `count` bytes or fail with [`StoreError::EndOfData`]
    pub fn read_exact(&mut self, address: Address, count: usize) -> Result<Vec<u8>> {
        let bytes = self.read(address, count)?;
        if bytes.len() < count {
            return Err(StoreError::EndOfData {
                address,
                expected: count,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }

    /// Drop all cached blocks; a no-op for files
    pub fn flush(&mut self) -> Result<()> {
        match self.backend.as_mut().ok_or(StoreError::NotOpen)? {
            Backend::Device(cache) => cache.flush_all(),
            Backend::File { .. } => {}
        }
        Ok(())
    }

    /// Drop the cached block containing `address`; a no-op for files
    pub fn invalidate(&mut self, address: Address) -> Result<()> {
        match self.backend.as_mut().ok_or(StoreError::NotOpen)? {
            Backend::Device(cache) => cache.invalidate_block(address),
            Backend::File { .. } => {}
        }
        Ok(())
    }

    /// Release the backend
    pub fn close(&mut self) -> Result<()> {
        match self.backend.take() {
            Some(_) => {
                debug!("Closed store");
                Ok(())
            }
            None => Err(StoreError::NotOpen),
        }
    }

    /// Whether a backend is established
    pub const fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    /// Kind of the established backend
    pub const fn backend_kind(&self) -> Option<BackendKind> {
        match &self.backend {
            Some(Backend::Device(_)) => Some(BackendKind::Device),
            Some(Backend::File { .. }) => Some(BackendKind::File),
            None => None,
        }
    }

    /// Cache counters, for device backends
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match &self.backend {
            Some(Backend::Device(cache)) => Some(cache.stats()),
            _ => None,
        }
    }

    /// Sticky error of the device cursor
    pub fn last_error(&self) -> Option<ErrorKind> {
        match &self.backend {
            Some(Backend::Device(cache)) => cache.last_error(),
            _ => None,
        }
    }

    /// Memory geometry used by this handle
    pub const fn layout(&self) -> &DeviceLayout {
        &self.layout
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("layout", &self.layout)
            .field("backend", &self.backend_kind())
            .finish()
    }
}

fn read_file(file: &mut File, address: Address, count: usize) -> Result<Vec<u8>> {
    file.seek(SeekFrom::Start(u64::from(address)))?;
    let mut bytes = Vec::with_capacity(count);
    file.by_ref().take(count as u64).read_to_end(&mut bytes)?;
    Ok(bytes)
}
