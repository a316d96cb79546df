//! # Error Types
//!
//! This module defines the umbrella error type for the inkcraft crate.
//!
//! Each layer has its own focused error enum (`CatalogError`, `StateError`,
//! `EncodeError`, `TransportError`, `SessionError`) defined next to the code
//! that produces it. `InkcraftError` wraps them all so binary code can use a
//! single `?`-friendly result type.

use thiserror::Error;

use crate::capture::CaptureError;
use crate::driver::EncodeError;
use crate::printer::state::StateError;
use crate::protocol::catalog::CatalogError;
use crate::session::SessionError;
use crate::transport::TransportError;

/// Main error type for inkcraft operations
#[derive(Debug, Error)]
pub enum InkcraftError {
    /// Catalog construction or import/export failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A command was illegal for the accumulated printer state
    #[error(transparent)]
    State(#[from] StateError),

    /// The driver encoder refused a print intent
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Transport-level failure (device node, short write, timeout)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A print session aborted partway through
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Capture file could not be parsed
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
