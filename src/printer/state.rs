//! # Printer State Machine
//!
//! Tracks the cumulative state a command stream puts the printer in, and
//! validates legal transitions.
//!
//! ## Why a State Machine
//!
//! ESC/P2 commands are not independently meaningful: the same opcode can be
//! legal or illegal depending on what came before (white-ink control before
//! the white channel is selected, raster data outside graphics mode). The
//! state machine is the single authority on legality:
//!
//! - the **driver encoder** consults it before emitting each command, so an
//!   invalid sequence can never reach a device;
//! - the **decoder path** applies it to captured traffic for documentation,
//!   where violations are advisory [`Finding`]s, never decode failures.
//!
//! ## Design
//!
//! `PrinterState` is an explicit value threaded through every call; there is
//! no ambient/global printer state, so analyses of different captures (or
//! sessions against different devices) cannot interfere.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::command::{Command, InkChannel};
use crate::protocol::catalog::Opcode;
use crate::protocol::decode::{CommandSequence, Segment};

use super::config::PrinterConfig;

// ============================================================================
// ERRORS
// ============================================================================

/// A command that is illegal for the accumulated printer state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Any non-Initialize command before `ESC @`.
    #[error("{opcode} before Initialize")]
    NotInitialized { opcode: Opcode },

    /// `SetUnit` with a zero base; the unit scale must be positive.
    #[error("Invalid unit base {base}")]
    InvalidUnit { base: u8 },

    /// `BitImage` outside graphics mode.
    #[error("BitImage outside graphics mode")]
    NotInGraphicsMode,

    /// Raster wider than the page.
    #[error("BitImage width {width_dots} exceeds page width {page_width_dots}")]
    BufferOverrun {
        width_dots: u16,
        page_width_dots: u16,
    },

    /// White-ink family command without the white channel selected.
    #[error("{opcode} requires the white channel to be selected")]
    UnsupportedMode { opcode: Opcode },
}

// ============================================================================
// PRINTER STATE
// ============================================================================

/// Snapshot of the printer's accumulated protocol state.
///
/// Created fresh per session or analysis; mutated only through
/// [`PrinterState::apply`] / [`PrinterState::apply_mut`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterState {
    /// `ESC @` seen.
    pub initialized: bool,
    /// Raster graphics mode active.
    pub graphics_mode: bool,
    /// Base unit denominator (unit = base/3600 inch); `None` until set.
    pub unit_base: Option<u8>,
    /// Derived resolution in dpi, both axes.
    pub resolution: (u16, u16),
    /// Every channel selected so far in this job.
    pub channels_selected: BTreeSet<InkChannel>,
    /// The channel raster data currently targets.
    pub active_channel: Option<InkChannel>,
    pub white_ink_enabled: bool,
    pub underbase_level: u8,
    /// Head position in current units. `head_y` accumulates raster rows and
    /// can exceed u16.
    pub head_x: u16,
    pub head_y: u32,
    /// Page length in current units, once declared.
    pub page_length: Option<u16>,
    /// Top/bottom margins in current units, once declared.
    pub margins: Option<(u16, u16)>,
    /// Printable width limit enforced against BitImage.
    pub page_width_dots: u16,
}

/// Default resolution before any `SetUnit` (1/360 inch base unit).
const DEFAULT_RESOLUTION: (u16, u16) = (360, 360);

impl PrinterState {
    /// Power-on state: nothing is legal until `Initialize`.
    pub fn new() -> Self {
        Self {
            initialized: false,
            graphics_mode: false,
            unit_base: None,
            resolution: DEFAULT_RESOLUTION,
            channels_selected: BTreeSet::new(),
            active_channel: None,
            white_ink_enabled: false,
            underbase_level: 0,
            head_x: 0,
            head_y: 0,
            page_length: None,
            margins: None,
            page_width_dots: PrinterConfig::F2100.platen_width_dots,
        }
    }

    /// Power-on state for a specific printer model (sets the page width
    /// limit from the platen geometry).
    pub fn for_config(config: &PrinterConfig) -> Self {
        Self {
            page_width_dots: config.platen_width_dots,
            ..Self::new()
        }
    }

    /// The canonical state right after `ESC @`: everything at defaults,
    /// ready to accept setup commands. Applying `Initialize` to *any* state
    /// yields exactly this value (idempotence).
    pub fn reset() -> Self {
        Self {
            initialized: true,
            ..Self::new()
        }
    }

    /// Apply one command, returning the successor state.
    ///
    /// Pure: `self` is unchanged. `Initialize` never fails; every other
    /// command fails with [`StateError::NotInitialized`] on an uninitialized
    /// state, then per-command preconditions apply.
    pub fn apply(&self, command: &Command) -> Result<Self, StateError> {
        if let Command::Initialize = command {
            return Ok(Self::reset());
        }
        if !self.initialized {
            return Err(StateError::NotInitialized {
                opcode: command.opcode(),
            });
        }

        let mut next = self.clone();
        match command {
            Command::Initialize => unreachable!("handled above"),

            Command::SetUnit { base } => {
                if *base == 0 {
                    return Err(StateError::InvalidUnit { base: *base });
                }
                next.unit_base = Some(*base);
                let dpi = 3600 / *base as u16;
                next.resolution = (dpi, dpi);
            }

            // Idempotent: re-selecting graphics mode is a no-op.
            Command::SelectGraphicsMode { .. } => next.graphics_mode = true,

            Command::SetColorSelection { channel } => {
                next.channels_selected.insert(*channel);
                next.active_channel = Some(*channel);
            }

            Command::WhiteInkControl { enabled } => {
                if !next.channels_selected.contains(&InkChannel::White) {
                    return Err(StateError::UnsupportedMode {
                        opcode: command.opcode(),
                    });
                }
                next.white_ink_enabled = *enabled;
            }

            Command::UnderbaseControl { level } => {
                if !next.channels_selected.contains(&InkChannel::White) {
                    return Err(StateError::UnsupportedMode {
                        opcode: command.opcode(),
                    });
                }
                next.underbase_level = *level;
            }

            Command::BitImage {
                width_dots, rows, ..
            } => {
                if !next.graphics_mode {
                    return Err(StateError::NotInGraphicsMode);
                }
                if *width_dots > next.page_width_dots {
                    return Err(StateError::BufferOverrun {
                        width_dots: *width_dots,
                        page_width_dots: next.page_width_dots,
                    });
                }
                // Raster appends at the implicit position; the head advances
                // by the rows just printed.
                next.head_y += *rows as u32;
            }

            Command::SetPageLength { length } => next.page_length = Some(*length),
            Command::SetPageFormat { top, bottom } => next.margins = Some((*top, *bottom)),

            Command::SetAbsoluteVertical { position } => next.head_y = *position as u32,
            Command::SetRelativeVertical { offset } => next.head_y += *offset as u32,
            Command::SetAbsoluteHorizontal { position } => next.head_x = *position,
            Command::SetRelativeHorizontal { offset } => {
                next.head_x = next.head_x.saturating_add(*offset)
            }

            // Job finalize: head returns to origin, graphics mode ends.
            Command::FormFeed => {
                next.graphics_mode = false;
                next.head_x = 0;
                next.head_y = 0;
            }

            // Legal once initialized; no tracked effect.
            Command::SetInkDensity { .. } | Command::Extension { .. } => {}
        }

        Ok(next)
    }

    /// In-place variant of [`PrinterState::apply`]. On error the state is
    /// left unchanged.
    pub fn apply_mut(&mut self, command: &Command) -> Result<(), StateError> {
        *self = self.apply(command)?;
        Ok(())
    }
}

impl Default for PrinterState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CAPTURE VALIDATION
// ============================================================================

/// An advisory state violation found while replaying a decoded capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Index of the offending segment in the sequence.
    pub segment_index: usize,
    /// Byte offset of the offending command in the capture.
    pub offset: usize,
    pub error: StateError,
}

/// Replay a decoded sequence through the state machine.
///
/// Violations are collected as advisory findings and the replay continues
/// with the state unchanged; capture analysis must never abort on a bad
/// trace (the trace is the evidence). Data blocks and unknown segments have
/// no state effect.
pub fn validate_sequence(
    sequence: &CommandSequence,
    buffer: &[u8],
    mut state: PrinterState,
) -> (PrinterState, Vec<Finding>) {
    let mut findings = Vec::new();

    for (index, segment) in sequence.iter().enumerate() {
        let Segment::Command(parsed) = segment else {
            continue;
        };
        let command = Command::from_parsed(parsed, buffer);
        match state.apply(&command) {
            Ok(next) => state = next,
            Err(error) => findings.push(Finding {
                segment_index: index,
                offset: parsed.span.offset,
                error,
            }),
        }
    }

    (state, findings)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::commands;
    use crate::protocol::decode::Decoder;
    use crate::protocol::Catalog;

    fn initialized() -> PrinterState {
        PrinterState::reset()
    }

    #[test]
    fn test_initialize_is_idempotent_from_any_state() {
        let mut weird = PrinterState::reset();
        weird.graphics_mode = true;
        weird.head_y = 9000;
        weird.white_ink_enabled = true;
        weird.channels_selected.insert(InkChannel::White);

        for start in [PrinterState::new(), weird, PrinterState::reset()] {
            let next = start.apply(&Command::Initialize).unwrap();
            assert_eq!(next, PrinterState::reset());
        }
    }

    #[test]
    fn test_commands_before_initialize_fail() {
        let state = PrinterState::new();
        let err = state
            .apply(&Command::SetUnit { base: 5 })
            .unwrap_err();
        assert_eq!(
            err,
            StateError::NotInitialized {
                opcode: Opcode::SetUnit
            }
        );
    }

    #[test]
    fn test_set_unit_updates_resolution() {
        let state = initialized().apply(&Command::SetUnit { base: 5 }).unwrap();
        assert_eq!(state.unit_base, Some(5));
        assert_eq!(state.resolution, (720, 720));

        let state = state.apply(&Command::SetUnit { base: 10 }).unwrap();
        assert_eq!(state.resolution, (360, 360));
    }

    #[test]
    fn test_set_unit_zero_rejected() {
        let err = initialized()
            .apply(&Command::SetUnit { base: 0 })
            .unwrap_err();
        assert_eq!(err, StateError::InvalidUnit { base: 0 });
    }

    #[test]
    fn test_graphics_mode_idempotent() {
        let once = initialized()
            .apply(&Command::SelectGraphicsMode { mode: 1 })
            .unwrap();
        let twice = once
            .apply(&Command::SelectGraphicsMode { mode: 1 })
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_bit_image_requires_graphics_mode() {
        let cmd = Command::BitImage {
            width_dots: 8,
            rows: 1,
            data: vec![0xFF],
        };
        let err = initialized().apply(&cmd).unwrap_err();
        assert_eq!(err, StateError::NotInGraphicsMode);
    }

    #[test]
    fn test_bit_image_advances_head() {
        let state = initialized()
            .apply(&Command::SelectGraphicsMode { mode: 1 })
            .unwrap();
        let state = state
            .apply(&Command::BitImage {
                width_dots: 8,
                rows: 40,
                data: vec![0; 40],
            })
            .unwrap();
        assert_eq!(state.head_y, 40);
        let state = state
            .apply(&Command::BitImage {
                width_dots: 8,
                rows: 2,
                data: vec![0; 2],
            })
            .unwrap();
        assert_eq!(state.head_y, 42);
    }

    #[test]
    fn test_bit_image_wider_than_page_overruns() {
        let mut state = initialized();
        state.graphics_mode = true;
        state.page_width_dots = 64;
        let err = state
            .apply(&Command::BitImage {
                width_dots: 72,
                rows: 1,
                data: vec![0; 9],
            })
            .unwrap_err();
        assert_eq!(
            err,
            StateError::BufferOverrun {
                width_dots: 72,
                page_width_dots: 64
            }
        );
    }

    #[test]
    fn test_white_ink_requires_white_channel() {
        let err = initialized()
            .apply(&Command::WhiteInkControl { enabled: true })
            .unwrap_err();
        assert_eq!(
            err,
            StateError::UnsupportedMode {
                opcode: Opcode::WhiteInkControl
            }
        );

        let state = initialized()
            .apply(&Command::SetColorSelection {
                channel: InkChannel::White,
            })
            .unwrap();
        let state = state
            .apply(&Command::WhiteInkControl { enabled: true })
            .unwrap();
        assert!(state.white_ink_enabled);
    }

    #[test]
    fn test_underbase_requires_white_channel() {
        let err = initialized()
            .apply(&Command::UnderbaseControl { level: 128 })
            .unwrap_err();
        assert!(matches!(err, StateError::UnsupportedMode { .. }));
    }

    #[test]
    fn test_form_feed_ends_graphics_mode() {
        let mut state = initialized();
        state.graphics_mode = true;
        state.head_y = 500;
        let state = state.apply(&Command::FormFeed).unwrap();
        assert!(!state.graphics_mode);
        assert_eq!(state.head_y, 0);
        assert!(state.initialized);
    }

    #[test]
    fn test_apply_mut_leaves_state_on_error() {
        let mut state = initialized();
        let before = state.clone();
        let err = state.apply_mut(&Command::SetUnit { base: 0 });
        assert!(err.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_validate_sequence_advisory() {
        // Initialize, then BitImage without graphics mode: one advisory
        // finding, replay continues to the FormFeed.
        let mut buf = Vec::new();
        buf.extend(commands::init());
        let bit_image_offset = buf.len();
        buf.extend(commands::bit_image(8, 1, &[0xFF]));
        buf.extend(commands::form_feed());

        let catalog = Catalog::default_f2000_series();
        let seq = Decoder::new(&catalog).decode(&buf);
        let (state, findings) = validate_sequence(&seq, &buf, PrinterState::new());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].error, StateError::NotInGraphicsMode);
        assert_eq!(findings[0].offset, bit_image_offset);
        // FormFeed still applied
        assert!(state.initialized);
        assert_eq!(state.head_y, 0);
    }

    #[test]
    fn test_validate_clean_job_has_no_findings() {
        let mut buf = Vec::new();
        buf.extend(commands::init());
        buf.extend(commands::set_unit(5));
        buf.extend(commands::graphics_mode(1));
        buf.extend(commands::set_color(0));
        buf.extend(commands::white_ink(true));
        buf.extend(commands::bit_image(8, 2, &[0xFF, 0x00]));
        buf.extend(commands::form_feed());

        let catalog = Catalog::default_f2000_series();
        let seq = Decoder::new(&catalog).decode(&buf);
        let (state, findings) = validate_sequence(&seq, &buf, PrinterState::new());

        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
        assert_eq!(state.resolution, (720, 720));
        assert!(state.white_ink_enabled);
    }

    #[test]
    fn test_for_config_sets_page_width() {
        let state = PrinterState::for_config(&PrinterConfig::F2130);
        assert_eq!(state.page_width_dots, 11520);
        assert!(!state.initialized);
    }
}
