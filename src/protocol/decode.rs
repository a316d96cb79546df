//! # Protocol Decoder
//!
//! Splits a raw host→device byte stream into a sequence of recognized
//! commands, opaque data blocks, and flagged unknown segments.
//!
//! ## Decision Rule
//!
//! ```text
//! byte at cursor is a start marker (ESC, FF, ...)?
//!   ├─ yes → catalog lookup
//!   │        ├─ match     → extract params per schema → ParsedCommand
//!   │        ├─ truncated → UnknownSegment(TruncatedCommand) to end of input
//!   │        └─ no match  → 1-byte UnknownSegment(UnrecognizedOpcode)
//!   └─ no  → DataBlock until the next start marker or end of input
//! ```
//!
//! The 1-byte resync on an unrecognized marker bounds worst-case mis-sync to
//! a single byte; a large region is never silently swallowed because one
//! escape sequence is missing from the catalog.
//!
//! ## Coverage Invariant
//!
//! `decode` never fails. For any input, the emitted spans are contiguous,
//! non-overlapping, and exactly cover the buffer, so a capture can always be
//! re-analyzed later as the catalog grows; nothing is dropped.

use super::catalog::{Catalog, CommandDescriptor, FieldKind, Opcode, ParamSchema};
use super::cursor::Cursor;

// ============================================================================
// SPANS AND SEGMENTS
// ============================================================================

/// Immutable `(offset, len)` view into the captured buffer. Never copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub offset: usize,
    pub len: usize,
}

impl ByteSpan {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last byte covered.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The covered bytes of `buffer`.
    pub fn slice<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.offset..self.end()]
    }
}

/// A decoded parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    U8(u8),
    U16(u16),
    U32(u32),
    /// Bulk payload tail (raster data); kept as a span, never copied.
    Bytes(ByteSpan),
}

/// A recognized command: opcode, typed parameters, and the exact bytes it
/// occupied in the stream. Read-only after decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub opcode: Opcode,
    /// Ordered `(field name, value)` pairs per the descriptor's field layout.
    pub values: Vec<(String, ParamValue)>,
    /// Full command bytes including signature and any length prefix.
    pub span: ByteSpan,
    /// Parameter bytes only.
    pub payload: ByteSpan,
}

impl ParsedCommand {
    /// Look up a decoded field by name.
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Why a region could not be decoded as a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    /// A start marker whose following bytes match no catalog signature.
    UnrecognizedOpcode,
    /// The buffer ended before the declared parameter length.
    TruncatedCommand,
}

/// Bytes that matched no descriptor. Position is preserved so the region can
/// be re-analyzed once the catalog grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSegment {
    pub span: ByteSpan,
    pub reason: UnknownReason,
}

/// A run of bytes with no leading start marker; raster or other bulk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBlock {
    pub span: ByteSpan,
    /// Index (into the sequence) of the most recent command segment, if any.
    /// A back reference for analysis, not ownership.
    pub preceding_command: Option<usize>,
}

/// One element of a decoded stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Command(ParsedCommand),
    Data(DataBlock),
    Unknown(UnknownSegment),
}

impl Segment {
    /// The bytes this segment covers.
    pub fn span(&self) -> ByteSpan {
        match self {
            Self::Command(c) => c.span,
            Self::Data(d) => d.span,
            Self::Unknown(u) => u.span,
        }
    }
}

// ============================================================================
// COMMAND SEQUENCE
// ============================================================================

/// Ordered decode output. Insertion order is stream order and is semantically
/// significant (commands are stateful); the sequence is never reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSequence {
    segments: Vec<Segment>,
}

impl CommandSequence {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Iterate only the recognized commands, with their segment indices.
    pub fn commands(&self) -> impl Iterator<Item = (usize, &ParsedCommand)> {
        self.segments.iter().enumerate().filter_map(|(i, s)| match s {
            Segment::Command(c) => Some((i, c)),
            _ => None,
        })
    }

    /// Verify the coverage invariant against a buffer of `len` bytes:
    /// spans contiguous, non-overlapping, exactly covering `0..len`.
    pub fn check_coverage(&self, len: usize) -> bool {
        let mut pos = 0;
        for seg in &self.segments {
            let span = seg.span();
            if span.offset != pos || span.len == 0 {
                return false;
            }
            pos = span.end();
        }
        pos == len
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// Stream decoder over a command catalog.
pub struct Decoder<'a> {
    catalog: &'a Catalog,
}

impl<'a> Decoder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Decode a complete host→device byte stream.
    ///
    /// Always returns a sequence satisfying the coverage invariant; decode
    /// errors are represented in-band as [`UnknownSegment`]s.
    pub fn decode(&self, buffer: &[u8]) -> CommandSequence {
        let mut cursor = Cursor::new(buffer);
        let mut seq = CommandSequence::new();
        let mut last_command: Option<usize> = None;

        while let Some(byte) = cursor.peek() {
            let start = cursor.position();

            if !self.catalog.is_start_marker(byte) {
                // Data block: run of bytes up to the next possible command.
                let end = cursor
                    .find_from_here(|b| self.catalog.is_start_marker(b))
                    .unwrap_or(buffer.len());
                seq.push(Segment::Data(DataBlock {
                    span: ByteSpan::new(start, end - start),
                    preceding_command: last_command,
                }));
                cursor.seek(end);
                continue;
            }

            match self.catalog.lookup(buffer, start) {
                Some((desc, sig_len)) => {
                    match extract_command(desc, buffer, start, sig_len) {
                        Ok((cmd, total_len)) => {
                            seq.push(Segment::Command(cmd));
                            last_command = Some(seq.len() - 1);
                            cursor.skip(total_len);
                        }
                        Err(()) => {
                            // Declared length runs past the end of input:
                            // flag the whole remainder, never throw.
                            seq.push(Segment::Unknown(UnknownSegment {
                                span: ByteSpan::new(start, buffer.len() - start),
                                reason: UnknownReason::TruncatedCommand,
                            }));
                            cursor.seek(buffer.len());
                        }
                    }
                }
                None => {
                    // Unrecognized escape: resync after one byte so a
                    // missing catalog entry costs at most one byte of sync.
                    seq.push(Segment::Unknown(UnknownSegment {
                        span: ByteSpan::new(start, 1),
                        reason: UnknownReason::UnrecognizedOpcode,
                    }));
                    cursor.skip(1);
                }
            }
        }

        debug_assert!(seq.check_coverage(buffer.len()));
        seq
    }
}

/// Extract one command at `start` whose signature (`sig_len` bytes) already
/// matched. Returns the parsed command and the total bytes consumed, or
/// `Err(())` when the buffer ends before the schema is satisfied.
fn extract_command(
    desc: &CommandDescriptor,
    buffer: &[u8],
    start: usize,
    sig_len: usize,
) -> Result<(ParsedCommand, usize), ()> {
    let mut cursor = Cursor::new(buffer);
    cursor.seek(start + sig_len);

    let payload = match desc.schema {
        ParamSchema::None => ByteSpan::new(cursor.position(), 0),
        ParamSchema::Fixed { len } => {
            let offset = cursor.position();
            cursor.take(len).ok_or(())?;
            ByteSpan::new(offset, len)
        }
        ParamSchema::LenPrefixedU16 => {
            let n = cursor.read_u16_le().ok_or(())? as usize;
            let offset = cursor.position();
            cursor.take(n).ok_or(())?;
            ByteSpan::new(offset, n)
        }
        ParamSchema::LenPrefixedU32 => {
            let n = cursor.read_u32_le().ok_or(())? as usize;
            let offset = cursor.position();
            cursor.take(n).ok_or(())?;
            ByteSpan::new(offset, n)
        }
        ParamSchema::Terminated { terminator } => {
            let offset = cursor.position();
            let end = cursor.find_from_here(|b| b == terminator).ok_or(())?;
            cursor.seek(end + 1); // consume the terminator too
            ByteSpan::new(offset, end - offset)
        }
    };

    let total_len = cursor.position() - start;
    let values = decode_fields(desc, buffer, payload);

    Ok((
        ParsedCommand {
            opcode: desc.opcode.clone(),
            values,
            span: ByteSpan::new(start, total_len),
            payload,
        },
        total_len,
    ))
}

/// Decode the payload into typed values per the descriptor's field layout.
///
/// Best-effort: a payload shorter than the declared fields yields the fields
/// that fit (the command itself is still valid wire-wise; field layouts are
/// reverse-engineering hypotheses, framing is ground truth).
fn decode_fields(
    desc: &CommandDescriptor,
    buffer: &[u8],
    payload: ByteSpan,
) -> Vec<(String, ParamValue)> {
    let mut cursor = Cursor::new(buffer);
    cursor.seek(payload.offset);
    let end = payload.end();
    let mut values = Vec::with_capacity(desc.fields.len());

    for field in &desc.fields {
        let remaining = end.saturating_sub(cursor.position());
        let value = match field.kind {
            FieldKind::U8 if remaining >= 1 => cursor.read_u8().map(ParamValue::U8),
            FieldKind::U16Le if remaining >= 2 => cursor.read_u16_le().map(ParamValue::U16),
            FieldKind::U32Le if remaining >= 4 => cursor.read_u32_le().map(ParamValue::U32),
            FieldKind::Rest => {
                let span = ByteSpan::new(cursor.position(), remaining);
                cursor.seek(end);
                Some(ParamValue::Bytes(span))
            }
            _ => None,
        };
        match value {
            Some(v) => values.push((field.name.clone(), v)),
            None => break,
        }
    }

    values
}

// ============================================================================
// TESTS
// ============================================================================
