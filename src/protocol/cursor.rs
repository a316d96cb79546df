//! # Byte Cursor
//!
//! A minimal read cursor over an immutable byte buffer. All protocol parsing
//! goes through this type so bounds checking lives in exactly one place.
//!
//! ## Design
//!
//! The cursor never copies data: multi-byte reads return values decoded from
//! the underlying slice, and [`Cursor::take`] returns a sub-slice. Reads past
//! the end return `None` rather than panicking; the decoder turns that into
//! a `TruncatedCommand` segment.
//!
//! ## Byte Order
//!
//! ESC/P2 encodes multi-byte integers **little-endian**: the value 0x1234 is
//! transmitted as `[0x34, 0x12]`.

/// Read cursor over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once the cursor has consumed the whole buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Look at the next byte without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Look at the byte `n` positions ahead without consuming anything.
    #[inline]
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.buf.get(self.pos + n).copied()
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Consume `n` bytes, returning them as a slice of the underlying buffer.
    ///
    /// Returns `None` (consuming nothing) if fewer than `n` bytes remain.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(slice)
    }

    /// Skip forward `n` bytes (clamped to the end of the buffer).
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    /// Move the cursor to an absolute offset (clamped to the buffer length).
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    /// Scan forward from the current position for the first byte matching
    /// `pred`, returning its absolute offset. Does not move the cursor.
    pub fn find_from_here(&self, pred: impl Fn(u8) -> bool) -> Option<usize> {
        self.buf[self.pos..]
            .iter()
            .position(|&b| pred(b))
            .map(|i| self.pos + i)
    }
}
