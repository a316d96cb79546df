//! # Command Model
//!
//! The semantic, in-memory representation of a printer command. The decoder
//! produces raw [`ParsedCommand`]s (opcode + typed fields + span); this
//! module interprets them into `Command` values that the state machine and
//! the driver encoder share:
//!
//! ```text
//! bytes ──decode──► ParsedCommand ──interpret──► Command ──apply──► PrinterState
//! Command ──to_bytes──► bytes                    (driver encoder direction)
//! ```
//!
//! Commands are not independently meaningful; the same opcode can be legal
//! or illegal depending on accumulated state. `Command` carries just the
//! semantics; legality lives in [`crate::printer::state`].

use crate::protocol::catalog::Opcode;
use crate::protocol::commands;
use crate::protocol::decode::{ParamValue, ParsedCommand};

// ============================================================================
// INK CHANNELS
// ============================================================================

/// Ink channels of the F2100/F2130 print head.
///
/// Channel indices are the wire values carried by `SetColorSelection`
/// (`ESC ( K`). White leads because DTG underbase is printed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InkChannel {
    White,
    Cyan,
    Magenta,
    Yellow,
    Black,
}

impl InkChannel {
    /// Wire index used by `SetColorSelection`.
    pub fn index(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Cyan => 1,
            Self::Magenta => 2,
            Self::Yellow => 3,
            Self::Black => 4,
        }
    }

    /// Channel for a wire index, if catalogued.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::White),
            1 => Some(Self::Cyan),
            2 => Some(Self::Magenta),
            3 => Some(Self::Yellow),
            4 => Some(Self::Black),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
            Self::Yellow => "yellow",
            Self::Black => "black",
        }
    }

    /// The full CMYK+White channel set.
    pub fn all() -> [Self; 5] {
        [Self::White, Self::Cyan, Self::Magenta, Self::Yellow, Self::Black]
    }
}

// ============================================================================
// COMMAND
// ============================================================================

/// One semantic printer command.
///
/// `Extension` covers commands known only through catalog data (or whose
/// parameters could not be interpreted); they decode and validate
/// generically but cannot be re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reset to power-on defaults (ESC @).
    Initialize,
    /// Enter raster graphics mode (ESC ( G). Idempotent.
    SelectGraphicsMode { mode: u8 },
    /// Set the base unit to `base`/3600 inch (ESC ( U).
    SetUnit { base: u8 },
    /// Select the active ink channel (ESC ( K).
    SetColorSelection { channel: InkChannel },
    /// Set ink density for the active channel (ESC ( i).
    SetInkDensity { density: u8 },
    /// Top/bottom margins in current units (ESC ( c).
    SetPageFormat { top: u16, bottom: u16 },
    /// Page length in current units (ESC ( C).
    SetPageLength { length: u16 },
    SetAbsoluteVertical { position: u16 },
    SetRelativeVertical { offset: u16 },
    SetAbsoluteHorizontal { position: u16 },
    SetRelativeHorizontal { offset: u16 },
    /// Vendor DTG: toggle white-ink output (ESC ( W).
    WhiteInkControl { enabled: bool },
    /// Vendor DTG: underbase density 0-255 (ESC ( w).
    UnderbaseControl { level: u8 },
    /// One raster block for the active channel (ESC * vendor framing).
    BitImage {
        width_dots: u16,
        rows: u16,
        data: Vec<u8>,
    },
    /// Finalize job and eject platen (stand-alone FF).
    FormFeed,
    /// Catalogued but not semantically modelled.
    Extension { opcode: Opcode },
}

impl Command {
    /// The opcode this command encodes/decodes as.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Initialize => Opcode::Initialize,
            Self::SelectGraphicsMode { .. } => Opcode::SelectGraphicsMode,
            Self::SetUnit { .. } => Opcode::SetUnit,
            Self::SetColorSelection { .. } => Opcode::SetColorSelection,
            Self::SetInkDensity { .. } => Opcode::SetInkDensity,
            Self::SetPageFormat { .. } => Opcode::SetPageFormat,
            Self::SetPageLength { .. } => Opcode::SetPageLength,
            Self::SetAbsoluteVertical { .. } => Opcode::SetAbsoluteVertical,
            Self::SetRelativeVertical { .. } => Opcode::SetRelativeVertical,
            Self::SetAbsoluteHorizontal { .. } => Opcode::SetAbsoluteHorizontal,
            Self::SetRelativeHorizontal { .. } => Opcode::SetRelativeHorizontal,
            Self::WhiteInkControl { .. } => Opcode::WhiteInkControl,
            Self::UnderbaseControl { .. } => Opcode::UnderbaseControl,
            Self::BitImage { .. } => Opcode::BitImage,
            Self::FormFeed => Opcode::FormFeed,
            Self::Extension { opcode } => opcode.clone(),
        }
    }

    /// Interpret a decoded command into its semantic form.
    ///
    /// Falls back to [`Command::Extension`] when the opcode has no dedicated
    /// variant or the expected fields are missing/out of range; the command
    /// is still a valid wire command either way.
    pub fn from_parsed(parsed: &ParsedCommand, buffer: &[u8]) -> Self {
        let u8_field = |name: &str| match parsed.value(name) {
            Some(ParamValue::U8(v)) => Some(*v),
            _ => None,
        };
        let u16_field = |name: &str| match parsed.value(name) {
            Some(ParamValue::U16(v)) => Some(*v),
            _ => None,
        };

        let interpreted = match parsed.opcode {
            Opcode::Initialize => Some(Self::Initialize),
            Opcode::FormFeed => Some(Self::FormFeed),
            Opcode::SelectGraphicsMode => {
                u8_field("mode").map(|mode| Self::SelectGraphicsMode { mode })
            }
            Opcode::SetUnit => u8_field("base").map(|base| Self::SetUnit { base }),
            Opcode::SetColorSelection => u8_field("channel")
                .and_then(InkChannel::from_index)
                .map(|channel| Self::SetColorSelection { channel }),
            Opcode::SetInkDensity => {
                u8_field("density").map(|density| Self::SetInkDensity { density })
            }
            Opcode::SetPageFormat => match (u16_field("top"), u16_field("bottom")) {
                (Some(top), Some(bottom)) => Some(Self::SetPageFormat { top, bottom }),
                _ => None,
            },
            Opcode::SetPageLength => {
                u16_field("length").map(|length| Self::SetPageLength { length })
            }
            Opcode::SetAbsoluteVertical => {
                u16_field("position").map(|position| Self::SetAbsoluteVertical { position })
            }
            Opcode::SetRelativeVertical => {
                u16_field("offset").map(|offset| Self::SetRelativeVertical { offset })
            }
            Opcode::SetAbsoluteHorizontal => {
                u16_field("position").map(|position| Self::SetAbsoluteHorizontal { position })
            }
            Opcode::SetRelativeHorizontal => {
                u16_field("offset").map(|offset| Self::SetRelativeHorizontal { offset })
            }
            Opcode::WhiteInkControl => {
                u8_field("mode").map(|m| Self::WhiteInkControl { enabled: m != 0 })
            }
            Opcode::UnderbaseControl => {
                u8_field("level").map(|level| Self::UnderbaseControl { level })
            }
            Opcode::BitImage => {
                let data = match parsed.value("data") {
                    Some(ParamValue::Bytes(span)) => Some(span.slice(buffer).to_vec()),
                    _ => None,
                };
                match (u16_field("width"), u16_field("rows"), data) {
                    (Some(width_dots), Some(rows), Some(data)) => Some(Self::BitImage {
                        width_dots,
                        rows,
                        data,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        interpreted.unwrap_or_else(|| Self::Extension {
            opcode: parsed.opcode.clone(),
        })
    }

    /// Encode to wire bytes.
    ///
    /// Returns `None` for [`Command::Extension`]; decode-only commands have
    /// no builder, and the driver encoder never emits them.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        let bytes = match self {
            Self::Initialize => commands::init(),
            Self::SelectGraphicsMode { mode } => commands::graphics_mode(*mode),
            Self::SetUnit { base } => commands::set_unit(*base),
            Self::SetColorSelection { channel } => commands::set_color(channel.index()),
            Self::SetInkDensity { density } => commands::ink_density(*density),
            Self::SetPageFormat { top, bottom } => commands::page_format(*top, *bottom),
            Self::SetPageLength { length } => commands::page_length(*length),
            Self::SetAbsoluteVertical { position } => commands::absolute_vertical(*position),
            Self::SetRelativeVertical { offset } => commands::relative_vertical(*offset),
            Self::SetAbsoluteHorizontal { position } => {
                commands::absolute_horizontal(*position)
            }
            Self::SetRelativeHorizontal { offset } => commands::relative_horizontal(*offset),
            Self::WhiteInkControl { enabled } => commands::white_ink(*enabled),
            Self::UnderbaseControl { level } => commands::underbase(*level),
            Self::BitImage {
                width_dots,
                rows,
                data,
            } => commands::bit_image(*width_dots, *rows, data),
            Self::FormFeed => commands::form_feed(),
            Self::Extension { .. } => return None,
        };
        Some(bytes)
    }
}

// ============================================================================
// TESTS
// ============================================================================
