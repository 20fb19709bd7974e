//! USB transport through the Linux hidraw interface.
//!
//! The station answers an 8-byte read command with 32 bytes of memory,
//! delivered as four 8-byte interrupt reports. The command repeats
//! `A1 <addr hi> <addr lo> 20` twice; it is written with a leading zero
//! report id.
//!
//! The node is opened non-blocking and every report is awaited for at most
//! [`READ_TIMEOUT`]. A station that stops answering yields a short read.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, trace, warn};
use wsreader_formats::Address;

use crate::source::ByteSource;

/// USB vendor id of Fine Offset stations
pub const VENDOR_ID: u16 = 0x1941;

/// USB product id of the WH1080 family
pub const PRODUCT_ID: u16 = 0x8021;

/// Hidraw node used when no station is found
pub const DEFAULT_DEVICE_PATH: &str = "/dev/hidraw0";

/// sysfs class directory listing hidraw nodes
pub const SYSFS_HIDRAW_CLASS: &str = "/sys/class/hidraw";

/// How long to wait for each input report
pub const READ_TIMEOUT: Duration = Duration::from_millis(1000);

const READ_COMMAND: u8 = 0xA1;
const REPORT_SIZE: usize = 8;
const USB_BUS: u32 = 0x0003;

/// Whether a hidraw `uevent` describes a WH1080 station
///
/// The kernel writes the id as `HID_ID=<bus>:<vendor>:<product>` in hex.
pub fn is_station_uevent(uevent: &str) -> bool {
    uevent
        .lines()
        .filter_map(|line| line.trim().strip_prefix("HID_ID="))
        .any(|id| {
            let mut parts = id.split(':').map(|part| u32::from_str_radix(part, 16));
            matches!(
                (parts.next(), parts.next(), parts.next(), parts.next()),
                (Some(Ok(bus)), Some(Ok(vendor)), Some(Ok(product)), None)
                    if bus == USB_BUS
                        && vendor == u32::from(VENDOR_ID)
                        && product == u32::from(PRODUCT_ID)
            )
        })
}

/// Find the station among the nodes listed in `class_dir`
///
/// Returns the node under `dev_dir` with the same name as the first
/// matching class entry, in name order. A missing `class_dir` finds nothing.
pub fn find_station(class_dir: &Path, dev_dir: &Path) -> io::Result<Option<PathBuf>> {
    let entries = match fs::read_dir(class_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    let mut names: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.file_name()))
        .collect();
    names.sort();

    for name in names {
        let uevent = class_dir.join(&name).join("device").join("uevent");
        match fs::read_to_string(&uevent) {
            Ok(text) if is_station_uevent(&text) => return Ok(Some(dev_dir.join(name))),
            Ok(_) => {}
            Err(err) => trace!("Skipping {}: {err}", uevent.display()),
        }
    }
    Ok(None)
}

/// Hidraw node of an attached station, or [`DEFAULT_DEVICE_PATH`]
pub fn locate_station() -> PathBuf {
    match find_station(Path::new(SYSFS_HIDRAW_CLASS), Path::new("/dev")) {
        Ok(Some(path)) => {
            debug!("Found station at {}", path.display());
            path
        }
        Ok(None) => {
            debug!("No station listed in {SYSFS_HIDRAW_CLASS}, using {DEFAULT_DEVICE_PATH}");
            PathBuf::from(DEFAULT_DEVICE_PATH)
        }
        Err(err) => {
            warn!("Cannot scan {SYSFS_HIDRAW_CLASS}: {err}");
            PathBuf::from(DEFAULT_DEVICE_PATH)
        }
    }
}

/// Memory reads over a hidraw device node
#[derive(Debug)]
pub struct HidrawSource {
    file: File,
    path: PathBuf,
    timeout: Duration,
}

impl HidrawSource {
    /// Open the device node for reading and writing
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.read(true).write(true);
        #[cfg(unix)]
        options.custom_flags(libc::O_NONBLOCK);
        let file = options.open(path)?;
        info!("Opened station device {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
            timeout: READ_TIMEOUT,
        })
    }

    /// Wait at most `timeout` for each report
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Output report requesting `len` bytes at `address`
    pub fn command(address: Address, len: u8) -> io::Result<[u8; REPORT_SIZE + 1]> {
        let address = u16::try_from(address).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("address {address:#x} beyond 16-bit range"),
            )
        })?;
        let [hi, lo] = address.to_be_bytes();
        Ok([
            0x00,
            READ_COMMAND,
            hi,
            lo,
            len,
            READ_COMMAND,
            hi,
            lo,
            len,
        ])
    }
}

impl ByteSource for HidrawSource {
    fn read_block(&mut self, address: Address, buf: &mut [u8]) -> io::Result<usize> {
        let len = u8::try_from(buf.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("block of {} bytes too large for one command", buf.len()),
            )
        })?;
        self.file.write_all(&Self::command(address, len)?)?;

        let mut filled = 0;
        while filled < buf.len() {
            if !wait_readable(&self.file, self.timeout)? {
                warn!(
                    "No report from {} within {:?} at {address:#06x} after {filled} bytes",
                    self.path.display(),
                    self.timeout
                );
                break;
            }
            let mut report = [0u8; REPORT_SIZE];
            let read = match self.file.read(&mut report) {
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => 0,
                Err(err) => return Err(err),
            };
            if read == 0 {
                debug!("Device returned no data at {address:#06x} after {filled} bytes");
                break;
            }
            let take = read.min(buf.len() - filled);
            buf[filled..filled + take].copy_from_slice(&report[..take]);
            filled += take;
        }
        trace!("Read {filled} bytes at {address:#06x} from {}", self.path.display());
        Ok(filled)
    }
}

/// Wait until `file` has input, `false` on timeout
#[cfg(unix)]
#[allow(unsafe_code)]
fn wait_readable<F: std::os::fd::AsRawFd>(file: &F, timeout: Duration) -> io::Result<bool> {
    let mut poll_fd = libc::pollfd {
        fd: file.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
    loop {
        // SAFETY: poll_fd is one valid pollfd that outlives the call
        let ready = unsafe { libc::poll(&raw mut poll_fd, 1, millis) };
        match ready {
            0 => return Ok(false),
            ready if ready > 0 => return Ok(true),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(not(unix))]
fn wait_readable<F>(_file: &F, _timeout: Duration) -> io::Result<bool> {
    Ok(true)
}
