//! # Transport Layer
//!
//! Byte-level link to the printer, behind the [`TransportPort`] trait:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`lp`] | USB printer class device node (`/dev/usb/lp0`) |
//! | [`mock`] | Scripted in-memory port for session tests |
//!
//! The session controller ([`crate::session`]) owns retry and backoff; a
//! transport reports each failure honestly and classifies it as transient or
//! permanent via [`TransportError::is_transient`].

use std::time::Duration;

use thiserror::Error;

pub mod lp;
pub mod mock;

pub use lp::LpTransport;
pub use mock::MockTransport;

// ============================================================================
// ERRORS
// ============================================================================

/// A failure on the printer link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No response within the allowed window.
    #[error("Timed out waiting for the printer")]
    Timeout,

    /// The device accepted fewer bytes than requested.
    #[error("Short write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },

    /// The device vanished mid-session (cable pull, power off).
    #[error("Printer disconnected")]
    Disconnected,

    /// The device node exists but is not accessible (needs the lp group).
    #[error("Permission denied opening {path}")]
    PermissionDenied { path: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Whether a retry of the same operation can plausibly succeed.
    ///
    /// Timeouts and short writes are momentary buffer conditions; a
    /// disconnect or permission failure will not heal on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::ShortWrite { .. })
    }
}

// ============================================================================
// TRANSPORT PORT
// ============================================================================

/// A bidirectional byte link to a printer.
///
/// `send` must either deliver the whole buffer or return an error; partial
/// delivery is reported as [`TransportError::ShortWrite`] so the caller can
/// resend the same bytes.
pub trait TransportPort {
    /// Deliver `data` to the device in full.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Wait up to `timeout` for bytes from the device.
    ///
    /// Returns the bytes read (possibly fewer than the device will
    /// eventually send) or [`TransportError::Timeout`].
    fn receive(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError>;

    /// Release the link. Further calls return [`TransportError::Disconnected`].
    fn close(&mut self) -> Result<(), TransportError>;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::ShortWrite {
            written: 3,
            expected: 10
        }
        .is_transient());
        assert!(!TransportError::Disconnected.is_transient());
        assert!(!TransportError::PermissionDenied {
            path: "/dev/usb/lp0".into()
        }
        .is_transient());
        assert!(!TransportError::Io("boom".into()).is_transient());
    }
}
