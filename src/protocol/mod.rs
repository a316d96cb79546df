//! # ESC/P2 Protocol Layer
//!
//! Everything that touches raw wire bytes lives here:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cursor`] | Bounds-checked read cursor, the base of all parsing |
//! | [`commands`] | Byte builders for catalogued commands |
//! | [`catalog`] | Data-driven opcode registry with JSON export/import |
//! | [`decode`] | Stream → [`decode::CommandSequence`] with full coverage |
//!
//! The layer is deliberately stateless: whether a decoded command is *legal*
//! at a given point is the printer state machine's concern
//! ([`crate::printer::state`]), not the decoder's.

pub mod catalog;
pub mod commands;
pub mod cursor;
pub mod decode;

pub use catalog::{Catalog, CommandDescriptor, Opcode};
pub use decode::{ByteSpan, CommandSequence, Decoder, Segment};
