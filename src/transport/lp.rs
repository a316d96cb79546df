//! # USB Printer Device Transport
//!
//! Talks to the printer through the Linux USB printer class device node
//! (`usblp`), normally `/dev/usb/lp0`.
//!
//! ## Device Setup (Linux)
//!
//! The kernel binds the printer automatically when it matches the printer
//! class; no vendor driver is involved:
//!
//! ```bash
//! $ ls -l /dev/usb/lp0
//! crw-rw---- 1 root lp 180, 0 ... /dev/usb/lp0
//!
//! # Access requires membership in the lp group:
//! $ sudo usermod -a -G lp $USER
//! ```
//!
//! ## Chunked Writes
//!
//! Bulk raster commands run to hundreds of kilobytes. Writes are split into
//! 4 KiB pieces with a short pause between them so the device buffer is
//! never overrun; a `write` that accepts fewer bytes than offered surfaces
//! as a short write for the session layer to retry.
//!
//! ## Reads
//!
//! `usblp` is bidirectional. Reads poll the descriptor with a deadline
//! (`poll(2)`) so a silent printer turns into a clean timeout instead of a
//! blocked thread.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::{TransportError, TransportPort};

/// Default USB printer device path
pub const DEFAULT_DEVICE: &str = "/dev/usb/lp0";

/// Write chunk size (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between write chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// Read buffer size for one receive call
const READ_BUF_SIZE: usize = 256;

/// # USB Printer Transport
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use inkcraft::transport::{LpTransport, TransportPort};
/// use inkcraft::protocol::commands;
///
/// let mut port = LpTransport::open("/dev/usb/lp0")?;
/// port.send(&commands::init())?;
/// let status = port.receive(Duration::from_millis(500));
/// # Ok::<(), inkcraft::transport::TransportError>(())
/// ```
pub struct LpTransport {
    file: Option<File>,
    path: String,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl std::fmt::Debug for LpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LpTransport")
            .field("path", &self.path)
            .field("open", &self.file.is_some())
            .finish()
    }
}

impl LpTransport {
    /// Open the printer device node read-write.
    ///
    /// ## Errors
    ///
    /// - [`TransportError::PermissionDenied`] when the node is not
    ///   accessible (usually a missing lp group membership)
    /// - [`TransportError::Disconnected`] when the node does not exist
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, TransportError> {
        let path = device.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| classify_open_error(e, path))?;

        Ok(Self {
            file: Some(file),
            path: path.display().to_string(),
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    /// Open with the default device path (/dev/usb/lp0).
    pub fn open_default() -> Result<Self, TransportError> {
        Self::open(DEFAULT_DEVICE)
    }

    /// Set the chunk size for large writes. Default is 4096 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Set the delay between chunks. Default is 2ms.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    fn file_mut(&mut self) -> Result<&mut File, TransportError> {
        self.file.as_mut().ok_or(TransportError::Disconnected)
    }
}

impl TransportPort for LpTransport {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let chunk_size = self.chunk_size;
        let chunk_delay = self.chunk_delay;
        let file = self.file_mut()?;

        let mut written = 0;
        for chunk in data.chunks(chunk_size) {
            match file.write(chunk) {
                Ok(n) if n == chunk.len() => written += n,
                Ok(n) => {
                    return Err(TransportError::ShortWrite {
                        written: written + n,
                        expected: data.len(),
                    });
                }
                Err(e) => return Err(classify_io_error(e)),
            }
            if !chunk_delay.is_zero() {
                thread::sleep(chunk_delay);
            }
        }

        file.flush().map_err(classify_io_error)
    }

    fn receive(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let file = self.file_mut()?;
        let fd = file.as_raw_fd();

        let mut pollfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;

        let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if ready < 0 {
            return Err(classify_io_error(io::Error::last_os_error()));
        }
        if ready == 0 {
            return Err(TransportError::Timeout);
        }
        if pollfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
            return Err(TransportError::Disconnected);
        }

        let mut buf = [0u8; READ_BUF_SIZE];
        match file.read(&mut buf) {
            Ok(0) => Err(TransportError::Disconnected),
            Ok(n) => Ok(buf[..n].to_vec()),
            Err(e) => Err(classify_io_error(e)),
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        // Dropping the File closes the descriptor.
        self.file.take();
        Ok(())
    }
}

/// Map an open failure to the transport taxonomy, keeping the device path.
fn classify_open_error(error: io::Error, path: &Path) -> TransportError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => TransportError::PermissionDenied {
            path: path.display().to_string(),
        },
        io::ErrorKind::NotFound => TransportError::Disconnected,
        _ => TransportError::Io(error.to_string()),
    }
}

fn classify_io_error(error: io::Error) -> TransportError {
    match error.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout,
        io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected => TransportError::Disconnected,
        _ => TransportError::Io(error.to_string()),
    }
}

// ============================================================================
// TESTS
// ============================================================================
