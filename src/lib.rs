//! # Inkcraft - Epson DTG Printer Protocol Library
//!
//! Inkcraft is a Rust library for driving Epson SureColor F2100/F2130
//! direct-to-garment printers over their ESC/P2 dialect, reconstructed from
//! USB traffic captures. It provides:
//!
//! - **Protocol implementation**: schema-driven command catalog, wire
//!   builders, and a full-coverage stream decoder
//! - **State machine**: legality checking for command sequences
//! - **Driver**: print-intent encoding with raster chunking
//! - **Session**: retrying, cancellable delivery over `/dev/usb/lp0`
//! - **Analysis**: capture ingestion and human-readable reports
//!
//! ## Quick Start
//!
//! ```no_run
//! use inkcraft::{
//!     driver::{self, PrintIntent},
//!     printer::{PrinterConfig, PrinterState},
//!     session::{RetryPolicy, SessionController},
//!     transport::LpTransport,
//! };
//!
//! // Describe the job
//! let intent = PrintIntent::color(720, vec![0u8; 90 * 64]);
//!
//! // Encode and validate it
//! let config = PrinterConfig::F2100;
//! let job = driver::encode(&intent, PrinterState::new(), &config)?;
//!
//! // Deliver it
//! let transport = LpTransport::open("/dev/usb/lp0")?;
//! let mut session = SessionController::new(transport, RetryPolicy::default());
//! let report = session.run(&job.bytes, &job.sequence)?;
//! println!("sent {} bytes in {} segments", report.bytes_sent, report.segments_sent);
//!
//! # Ok::<(), inkcraft::error::InkcraftError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Catalog, builders, cursor, and decoder |
//! | [`command`] | Semantic command model |
//! | [`printer`] | Printer configurations and state machine |
//! | [`driver`] | Print-intent encoder |
//! | [`transport`] | Device-node and mock transports |
//! | [`session`] | Retrying job delivery |
//! | [`capture`] | USB capture ingestion |
//! | [`report`] | Decoded-stream listings and statistics |
//! | [`error`] | Umbrella error type |
//!
//! ## Supported Printers
//!
//! Currently targeted at:
//! - Epson SureColor F2100 (16in platen, 720 dpi, CMYK + White)
//! - Epson SureColor F2130
//!
//! The command catalog is data-driven; other printers speaking a related
//! ESC/P2 dialect can be covered by importing an extended catalog JSON.

pub mod capture;
pub mod command;
pub mod driver;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod report;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use command::{Command, InkChannel};
pub use error::InkcraftError;
pub use printer::{PrinterConfig, PrinterState};
pub use protocol::{Catalog, CommandSequence, Decoder};
