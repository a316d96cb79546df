//! # Printer Model
//!
//! Hardware configuration ([`config`]) and the protocol state machine
//! ([`state`]) for the supported direct-to-garment printers.

pub mod config;
pub mod state;

pub use config::PrinterConfig;
pub use state::{validate_sequence, Finding, PrinterState, StateError};
