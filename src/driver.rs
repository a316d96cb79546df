//! # Driver Encoder
//!
//! Turns a high-level print intent into a validated wire-ready byte job.
//!
//! ## Pipeline
//!
//! ```text
//! PrintIntent ──plan──► [Command] ──state-check──► EncodedJob { bytes, sequence }
//! ```
//!
//! Every planned command is applied to the printer state machine *before*
//! its bytes are appended. Unlike capture analysis, where violations are
//! advisory, a state error here is fatal: the encoder must never produce a
//! stream the printer would misinterpret.
//!
//! ## Job Shape
//!
//! 1. `Initialize`
//! 2. `SetUnit` derived from the requested resolution
//! 3. `SelectGraphicsMode`
//! 4. `SetColorSelection` per requested channel, in order
//! 5. `WhiteInkControl` / `UnderbaseControl` when requested
//! 6. `BitImage` chunks, whole rows each, payload within the transport limit
//! 7. `FormFeed`

use thiserror::Error;

use crate::command::{Command, InkChannel};
use crate::printer::config::PrinterConfig;
use crate::printer::state::{PrinterState, StateError};
use crate::protocol::catalog::{Catalog, Opcode};
use crate::protocol::commands::BIT_IMAGE_HEADER_LEN;
use crate::protocol::decode::{CommandSequence, Decoder};

// ============================================================================
// ERRORS
// ============================================================================

/// Why a print intent could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Raster data is empty")]
    EmptyRaster,

    /// The unit command carries a u8 denominator of 3600, so only divisors
    /// of 3600 with a quotient of 1-255 are expressible.
    #[error("Resolution {dpi} dpi has no exact unit encoding")]
    UnsupportedResolution { dpi: u16 },

    #[error("Raster length {len} is not a multiple of the {stride}-byte row stride")]
    RasterMisaligned { len: usize, stride: usize },

    #[error("White ink requested but the white channel is not in the channel list")]
    WhiteWithoutChannel,

    #[error("Chunk limit {limit} cannot fit the header plus one {stride}-byte row")]
    ChunkLimitTooSmall { limit: usize, stride: usize },

    /// A planned command is illegal for the accumulated state.
    #[error("Invalid command sequence: {0}")]
    State(#[from] StateError),

    /// A planned command has no wire encoding (decode-only extension).
    #[error("{opcode} cannot be encoded")]
    Unencodable { opcode: Opcode },
}

// ============================================================================
// PRINT INTENT
// ============================================================================

/// A device-independent description of one print job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintIntent {
    /// Requested resolution in dpi. Must divide 3600 exactly (e.g. 360, 720).
    pub resolution: u16,
    /// Channels to select, in selection order. The raster targets the last
    /// selected channel.
    pub channels: Vec<InkChannel>,
    /// Enable the white-ink underbase layer.
    pub white_ink: bool,
    /// Underbase density, 0 disables the command entirely.
    pub underbase_level: u8,
    /// Image width in dots.
    pub width_dots: u16,
    /// Packed raster, 1 bit per dot, `ceil(width_dots / 8)` bytes per row.
    pub raster: Vec<u8>,
}

impl PrintIntent {
    /// A color-only job at the printer's native resolution.
    pub fn color(width_dots: u16, raster: Vec<u8>) -> Self {
        Self {
            resolution: 720,
            channels: vec![
                InkChannel::Cyan,
                InkChannel::Magenta,
                InkChannel::Yellow,
                InkChannel::Black,
            ],
            white_ink: false,
            underbase_level: 0,
            width_dots,
            raster,
        }
    }
}

// ============================================================================
// ENCODED JOB
// ============================================================================

/// A fully validated, wire-ready job.
#[derive(Debug, Clone)]
pub struct EncodedJob {
    /// The exact bytes to send, in order.
    pub bytes: Vec<u8>,
    /// The semantic commands the bytes encode, in order.
    pub commands: Vec<Command>,
    /// Decoded view of `bytes`; its spans cover `bytes` exactly, which is
    /// what the session controller chunks transmission by.
    pub sequence: CommandSequence,
    /// Printer state after the whole job.
    pub final_state: PrinterState,
}

// ============================================================================
// ENCODER
// ============================================================================

/// Encode a print intent into a validated byte job.
///
/// `state` is the printer state the job will be sent into; pass
/// [`PrinterState::new`] for a freshly opened device. The job always begins
/// with `Initialize`, so any starting state is acceptable.
pub fn encode(
    intent: &PrintIntent,
    state: PrinterState,
    config: &PrinterConfig,
) -> Result<EncodedJob, EncodeError> {
    let stride = PrinterConfig::row_stride(intent.width_dots);

    if intent.raster.is_empty() || stride == 0 {
        return Err(EncodeError::EmptyRaster);
    }
    if intent.resolution == 0
        || 3600 % intent.resolution != 0
        || 3600 / intent.resolution > u8::MAX as u16
    {
        return Err(EncodeError::UnsupportedResolution {
            dpi: intent.resolution,
        });
    }
    if intent.raster.len() % stride != 0 {
        return Err(EncodeError::RasterMisaligned {
            len: intent.raster.len(),
            stride,
        });
    }
    let wants_white = intent.white_ink || intent.underbase_level > 0;
    if wants_white && !intent.channels.contains(&InkChannel::White) {
        return Err(EncodeError::WhiteWithoutChannel);
    }
    if config.chunk_limit < BIT_IMAGE_HEADER_LEN + stride {
        return Err(EncodeError::ChunkLimitTooSmall {
            limit: config.chunk_limit,
            stride,
        });
    }

    let mut commands = Vec::new();
    commands.push(Command::Initialize);
    commands.push(Command::SetUnit {
        base: (3600 / intent.resolution) as u8,
    });
    commands.push(Command::SelectGraphicsMode { mode: 1 });
    for channel in &intent.channels {
        commands.push(Command::SetColorSelection { channel: *channel });
    }
    if intent.white_ink {
        commands.push(Command::WhiteInkControl { enabled: true });
    }
    if intent.underbase_level > 0 {
        commands.push(Command::UnderbaseControl {
            level: intent.underbase_level,
        });
    }
    plan_raster_chunks(intent, stride, config.chunk_limit, &mut commands);
    commands.push(Command::FormFeed);

    // Validate and serialize in one pass so no byte is emitted for a
    // command the state machine rejects.
    let mut bytes = Vec::new();
    let mut state = state;
    for command in &commands {
        state.apply_mut(command)?;
        if let Command::Initialize = command {
            // The reset page limit is the default platen; re-pin it to the
            // configured model's geometry.
            state.page_width_dots = config.platen_width_dots;
        }
        let encoded = command.to_bytes().ok_or_else(|| EncodeError::Unencodable {
            opcode: command.opcode(),
        })?;
        bytes.extend(encoded);
    }

    let catalog = Catalog::default_f2000_series();
    let sequence = Decoder::new(&catalog).decode(&bytes);
    debug_assert!(sequence.check_coverage(bytes.len()));

    Ok(EncodedJob {
        bytes,
        commands,
        sequence,
        final_state: state,
    })
}

/// Split the raster into BitImage commands of whole rows, each with a
/// payload (header + data) no larger than `chunk_limit`.
fn plan_raster_chunks(
    intent: &PrintIntent,
    stride: usize,
    chunk_limit: usize,
    commands: &mut Vec<Command>,
) {
    let rows_per_chunk = ((chunk_limit - BIT_IMAGE_HEADER_LEN) / stride)
        .min(u16::MAX as usize);

    for chunk in intent.raster.chunks(rows_per_chunk * stride) {
        commands.push(Command::BitImage {
            width_dots: intent.width_dots,
            rows: (chunk.len() / stride) as u16,
            data: chunk.to_vec(),
        });
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::state::validate_sequence;
    use crate::protocol::decode::Segment;

    fn small_intent() -> PrintIntent {
        PrintIntent {
            resolution: 720,
            channels: vec![InkChannel::White, InkChannel::Black],
            white_ink: true,
            underbase_level: 128,
            width_dots: 16,
            raster: vec![0xAA; 64], // 32 rows of 2 bytes
        }
    }

    #[test]
    fn test_encode_command_order() {
        let job = encode(&small_intent(), PrinterState::new(), &PrinterConfig::F2100).unwrap();
        let opcodes: Vec<_> = job.commands.iter().map(|c| c.opcode()).collect();
        assert_eq!(
            opcodes,
            vec![
                Opcode::Initialize,
                Opcode::SetUnit,
                Opcode::SelectGraphicsMode,
                Opcode::SetColorSelection,
                Opcode::SetColorSelection,
                Opcode::WhiteInkControl,
                Opcode::UnderbaseControl,
                Opcode::BitImage,
                Opcode::FormFeed,
            ]
        );
    }

    #[test]
    fn test_encoded_bytes_replay_cleanly() {
        let job = encode(&small_intent(), PrinterState::new(), &PrinterConfig::F2100).unwrap();
        assert!(job.sequence.check_coverage(job.bytes.len()));
        let (state, findings) =
            validate_sequence(&job.sequence, &job.bytes, PrinterState::new());
        assert!(findings.is_empty(), "findings: {:?}", findings);
        assert!(state.initialized);
        assert_eq!(state, job.final_state);
    }

    #[test]
    fn test_unit_base_from_resolution() {
        let mut intent = small_intent();
        intent.resolution = 360;
        let job = encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap();
        assert!(job.commands.contains(&Command::SetUnit { base: 10 }));
        assert_eq!(job.final_state.resolution, (360, 360));
    }

    #[test]
    fn test_chunking_exact_count_and_limit() {
        // 300000 raster bytes at 2 bytes/row against a 64 KiB limit:
        // 32766 rows per chunk, so exactly 5 BitImage commands.
        let intent = PrintIntent {
            resolution: 720,
            channels: vec![InkChannel::Black],
            white_ink: false,
            underbase_level: 0,
            width_dots: 16,
            raster: vec![0x55; 300_000],
        };
        let config = PrinterConfig {
            chunk_limit: 65_536,
            ..PrinterConfig::F2100
        };
        let job = encode(&intent, PrinterState::new(), &config).unwrap();

        let chunks: Vec<_> = job
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::BitImage { rows, data, .. } => Some((*rows, data.len())),
                _ => None,
            })
            .collect();
        assert_eq!(chunks.len(), 5);

        let mut total = 0;
        for (rows, len) in &chunks {
            assert_eq!(*len, *rows as usize * 2, "whole rows only");
            assert!(BIT_IMAGE_HEADER_LEN + len <= config.chunk_limit);
            total += len;
        }
        assert_eq!(total, 300_000);

        // And the on-wire framing agrees with the planned chunks.
        let decoded: Vec<_> = job
            .sequence
            .commands()
            .filter(|(_, c)| c.opcode == Opcode::BitImage)
            .collect();
        assert_eq!(decoded.len(), 5);
    }

    #[test]
    fn test_empty_raster_rejected() {
        let mut intent = small_intent();
        intent.raster.clear();
        let err = encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap_err();
        assert_eq!(err, EncodeError::EmptyRaster);
    }

    #[test]
    fn test_unsupported_resolution_rejected() {
        let mut intent = small_intent();
        intent.resolution = 700; // 3600 / 700 is not integral
        let err = encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap_err();
        assert_eq!(err, EncodeError::UnsupportedResolution { dpi: 700 });
    }

    #[test]
    fn test_misaligned_raster_rejected() {
        let mut intent = small_intent();
        intent.raster = vec![0; 63]; // stride is 2
        let err = encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap_err();
        assert_eq!(err, EncodeError::RasterMisaligned { len: 63, stride: 2 });
    }

    #[test]
    fn test_white_without_channel_rejected() {
        let mut intent = small_intent();
        intent.channels = vec![InkChannel::Black];
        let err = encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap_err();
        assert_eq!(err, EncodeError::WhiteWithoutChannel);
    }

    #[test]
    fn test_chunk_limit_too_small_rejected() {
        let config = PrinterConfig {
            chunk_limit: BIT_IMAGE_HEADER_LEN + 1, // stride is 2
            ..PrinterConfig::F2100
        };
        let err = encode(&small_intent(), PrinterState::new(), &config).unwrap_err();
        assert!(matches!(err, EncodeError::ChunkLimitTooSmall { .. }));
    }

    #[test]
    fn test_width_beyond_platen_is_fatal() {
        let mut intent = small_intent();
        intent.width_dots = 12_000; // platen is 11520
        intent.raster = vec![0; 1500 * 2];
        let err = encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::State(StateError::BufferOverrun { .. })
        ));
    }

    #[test]
    fn test_color_preset_has_no_white() {
        let intent = PrintIntent::color(16, vec![0; 32]);
        let job = encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap();
        assert!(!job
            .commands
            .iter()
            .any(|c| matches!(c, Command::WhiteInkControl { .. })));
        // Sequence is all command segments, no stray data blocks.
        assert!(job
            .sequence
            .iter()
            .all(|s| matches!(s, Segment::Command(_))));
    }
}
