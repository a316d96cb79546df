//! # ESC/P2 Wire Builders
//!
//! This module implements the byte-level command builders for the ESC/P2
//! dialect spoken by Epson F2100/F2130 direct-to-garment printers, as
//! reconstructed from USB bulk-transfer captures.
//!
//! ## Protocol Overview
//!
//! ESC/P2 commands are escape sequences:
//!
//! - Two bytes: `ESC @` (initialize)
//! - Fixed parameters: `ESC $ nL nH` (absolute horizontal position)
//! - Extended form: `ESC ( X nL nH data...` where `nL nH` is a little-endian
//!   u16 count of the parameter bytes that follow
//! - Vendor raster: `ESC * n1 n2 n3 n4 data...` with a little-endian u32
//!   payload count (the F2100 moves raster blocks larger than 64 KiB per
//!   transfer, which the classic u16 counts cannot express)
//!
//! The stand-alone `FF` byte finalizes a job and ejects the platen.
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding: a `u16` value 0x1234
//! is sent as bytes `[0x34, 0x12]`.
//!
//! ## Relationship to the Catalog
//!
//! Every builder here emits bytes that round-trip through the default
//! [`Catalog`](crate::protocol::catalog::Catalog); the decoder tests hold
//! that property for each builder.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
///
/// ESC/P2 commands begin with ESC (0x1B). This byte signals the start of a
/// control sequence rather than raster data.
pub const ESC: u8 = 0x1B;

/// FF (Form Feed) - Finalize job and eject
///
/// Sent stand-alone (not ESC-prefixed) at the end of a job. The printer
/// flushes buffered raster data and returns the platen.
/// Hex: 0x0C, Decimal: 12
pub const FF: u8 = 0x0C;

// ============================================================================
// INITIALIZATION AND JOB CONTROL
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on default state. Sent at the start of
/// every job.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## What Gets Reset
///
/// - Graphics mode is left
/// - Unit scale and derived resolution revert to defaults
/// - Channel selection and white-ink mode are cleared
/// - Head position returns to origin
///
/// ## Example
///
/// ```
/// use inkcraft::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Finalize Job (FF)
///
/// Stand-alone form feed. Flushes buffered raster data and ejects the
/// platen. This is the only catalogued command that does not start with ESC.
#[inline]
pub fn form_feed() -> Vec<u8> {
    vec![FF]
}

// ============================================================================
// SETUP COMMANDS (ESC ( X, u16 length-prefixed)
// ============================================================================

/// # Select Graphics Mode (ESC ( G)
///
/// Puts the printer in raster graphics mode. Idempotent.
///
/// ## Protocol Details
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC ( G nL nH m |
/// | Hex    | 1B 28 47 01 00 m |
///
/// `m = 1` selects graphics mode; other values are reserved. Captures from
/// the Garment Creator driver always show `m = 1`.
#[inline]
pub fn graphics_mode(mode: u8) -> Vec<u8> {
    extended(b'G', &[mode])
}

/// # Set Unit (ESC ( U)
///
/// Sets the base unit for positioning and raster rows to `base`/3600 inch.
///
/// ## Protocol Details
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC ( U nL nH d |
/// | Hex    | 1B 28 55 01 00 d |
///
/// ## Parameters
///
/// - `base`: unit denominator. `d = 10` gives 1/360 inch (360 dpi),
///   `d = 5` gives 1/720 inch (720 dpi). `d = 0` is rejected by the state
///   machine as an invalid unit.
///
/// ## Example
///
/// ```
/// use inkcraft::protocol::commands;
///
/// // 1/720 inch units (720 dpi)
/// assert_eq!(commands::set_unit(5), vec![0x1B, 0x28, 0x55, 0x01, 0x00, 5]);
/// ```
#[inline]
pub fn set_unit(base: u8) -> Vec<u8> {
    extended(b'U', &[base])
}

/// # Set Color Selection (ESC ( K)
///
/// Selects the active ink channel. The first parameter byte is reserved
/// (always 0 in captures); the second is the channel index.
///
/// ## Protocol Details
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC ( K nL nH 0 c |
/// | Hex    | 1B 28 4B 02 00 00 c |
///
/// ## Channel Indices
///
/// | c | Channel |
/// |---|---------|
/// | 0 | White   |
/// | 1 | Cyan    |
/// | 2 | Magenta |
/// | 3 | Yellow  |
/// | 4 | Black   |
#[inline]
pub fn set_color(channel: u8) -> Vec<u8> {
    extended(b'K', &[0x00, channel])
}

/// Set ink density (ESC ( i). Single density byte; semantics per print mode.
#[inline]
pub fn ink_density(density: u8) -> Vec<u8> {
    extended(b'i', &[density])
}

/// Set page format (ESC ( c): top and bottom margins in current units.
#[inline]
pub fn page_format(top: u16, bottom: u16) -> Vec<u8> {
    let mut params = Vec::with_capacity(4);
    params.extend(u16_le(top));
    params.extend(u16_le(bottom));
    extended(b'c', &params)
}

/// Set page length (ESC ( C) in current units.
#[inline]
pub fn page_length(length: u16) -> Vec<u8> {
    extended(b'C', &u16_le(length))
}

// ============================================================================
// POSITIONING COMMANDS
// ============================================================================

/// Set absolute vertical position (ESC ( V) in current units.
#[inline]
pub fn absolute_vertical(position: u16) -> Vec<u8> {
    extended(b'V', &u16_le(position))
}

/// Set relative vertical position (ESC ( v) in current units.
#[inline]
pub fn relative_vertical(offset: u16) -> Vec<u8> {
    extended(b'v', &u16_le(offset))
}

/// # Set Absolute Horizontal Position (ESC $ nL nH)
///
/// Fixed two-byte parameter form; no length prefix, unlike the `ESC ( X`
/// family.
///
/// ## Example
///
/// ```
/// use inkcraft::protocol::commands;
///
/// // 360 units = 1 inch at the default unit
/// assert_eq!(commands::absolute_horizontal(360), vec![0x1B, 0x24, 0x68, 0x01]);
/// ```
#[inline]
pub fn absolute_horizontal(position: u16) -> Vec<u8> {
    let mut out = vec![ESC, b'$'];
    out.extend(u16_le(position));
    out
}

/// Set relative horizontal position (ESC \ nL nH). Fixed two-byte form.
#[inline]
pub fn relative_horizontal(offset: u16) -> Vec<u8> {
    let mut out = vec![ESC, b'\\'];
    out.extend(u16_le(offset));
    out
}

// ============================================================================
// VENDOR DTG EXTENSIONS (white ink / underbase)
// ============================================================================

/// # White Ink Control (ESC ( W) vendor extension
///
/// Toggles white-ink output. DTG-specific: white is printed as an underbase
/// layer beneath color on dark garments.
///
/// ## Protocol Details
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 28 57 01 00 m |
///
/// `m = 1` enables, `m = 0` disables. The layout is the working hypothesis
/// recorded in the command catalog; a corrected empirical layout ships as a
/// catalog entry.
#[inline]
pub fn white_ink(enabled: bool) -> Vec<u8> {
    extended(b'W', &[enabled as u8])
}

/// # Underbase Control (ESC ( w) vendor extension
///
/// Sets the underbase density level (0 = none, 255 = maximum). Same
/// empirical-hypothesis caveat as [`white_ink`].
#[inline]
pub fn underbase(level: u8) -> Vec<u8> {
    extended(b'w', &[level])
}

// ============================================================================
// RASTER TRANSFER
// ============================================================================

/// Bytes of BitImage payload that precede the packed raster data
/// (u16 width + u16 rows).
pub const BIT_IMAGE_HEADER_LEN: usize = 4;

/// # Bit Image Transfer (ESC *, vendor u32 framing)
///
/// Transfers one block of packed raster data for the active channel.
///
/// ## Protocol Details
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 2A n1 n2 n3 n4 wL wH rL rH data... |
///
/// - `n1..n4`: little-endian u32 payload length (header + data)
/// - `wL wH`: image width in dots
/// - `rL rH`: row count in this block
/// - `data`: packed raster, one bit per dot, MSB = leftmost dot,
///   `ceil(width / 8)` bytes per row
///
/// The u32 count diverges from classic `ESC *` column counts: the F2100
/// streams raster blocks larger than 64 KiB in a single bulk transfer.
///
/// ## Example
///
/// ```
/// use inkcraft::protocol::commands;
///
/// let cmd = commands::bit_image(16, 2, &[0xFF, 0x00, 0x0F, 0xF0]);
/// // payload = 4-byte header + 4 data bytes
/// assert_eq!(&cmd[..6], &[0x1B, 0x2A, 8, 0, 0, 0]);
/// assert_eq!(&cmd[6..10], &[16, 0, 2, 0]);
/// ```
pub fn bit_image(width_dots: u16, rows: u16, data: &[u8]) -> Vec<u8> {
    let payload_len = BIT_IMAGE_HEADER_LEN + data.len();
    let mut out = Vec::with_capacity(6 + payload_len);
    out.push(ESC);
    out.push(b'*');
    out.extend(u32_le(payload_len as u32));
    out.extend(u16_le(width_dots));
    out.extend(u16_le(rows));
    out.extend_from_slice(data);
    out
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Build an `ESC ( X` extended command with a u16 length prefix.
fn extended(selector: u8, params: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + params.len());
    out.push(ESC);
    out.push(b'(');
    out.push(selector);
    out.extend(u16_le(params.len() as u16));
    out.extend_from_slice(params);
    out
}

/// Encode a u16 value as little-endian bytes [low, high].
///
/// ## Example
///
/// ```
/// use inkcraft::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

/// Encode a u32 value as little-endian bytes.
#[inline]
pub const fn u32_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_form_feed() {
        assert_eq!(form_feed(), vec![0x0C]);
    }

    #[test]
    fn test_graphics_mode() {
        assert_eq!(graphics_mode(1), vec![0x1B, 0x28, 0x47, 0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_set_unit() {
        // 1/360 inch
        assert_eq!(set_unit(10), vec![0x1B, 0x28, 0x55, 0x01, 0x00, 0x0A]);
    }

    #[test]
    fn test_set_color() {
        // Black = channel 4
        assert_eq!(set_color(4), vec![0x1B, 0x28, 0x4B, 0x02, 0x00, 0x00, 0x04]);
    }

    #[test]
    fn test_page_length() {
        assert_eq!(
            page_length(1440),
            vec![0x1B, 0x28, 0x43, 0x02, 0x00, 0xA0, 0x05]
        );
    }

    #[test]
    fn test_absolute_horizontal() {
        assert_eq!(absolute_horizontal(360), vec![0x1B, 0x24, 0x68, 0x01]);
    }

    #[test]
    fn test_white_ink() {
        assert_eq!(white_ink(true), vec![0x1B, 0x28, 0x57, 0x01, 0x00, 0x01]);
        assert_eq!(white_ink(false), vec![0x1B, 0x28, 0x57, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_underbase() {
        assert_eq!(underbase(128), vec![0x1B, 0x28, 0x77, 0x01, 0x00, 0x80]);
    }

    #[test]
    fn test_bit_image_framing() {
        let data = [0xAA; 6];
        let cmd = bit_image(24, 2, &data);
        // ESC * + u32 len(4 + 6) + width 24 + rows 2 + data
        assert_eq!(&cmd[..2], &[0x1B, 0x2A]);
        assert_eq!(&cmd[2..6], &[10, 0, 0, 0]);
        assert_eq!(&cmd[6..8], &[24, 0]);
        assert_eq!(&cmd[8..10], &[2, 0]);
        assert_eq!(&cmd[10..], &data);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
    }

    #[test]
    fn test_u32_le() {
        assert_eq!(u32_le(0x12345678), [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(u32_le(65_536), [0x00, 0x00, 0x01, 0x00]);
    }
}
