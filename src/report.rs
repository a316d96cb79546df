//! # Analysis Report
//!
//! Renders a decoded sequence as a human-readable listing, one line per
//! segment, followed by summary statistics. This is the primary output of
//! capture analysis sessions:
//!
//! ```text
//! 0x000000  Initialize
//! 0x000002  SetUnit                   base=5
//! 0x000008  BitImage                  width=16 rows=32 data=<64 bytes>
//! 0x00004e  UNKNOWN (unrecognized opcode)  1 byte
//! 0x00004f  DATA                      12 bytes (after #2)
//! ...
//! commands: 3  unknown: 1  data bytes: 12
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::printer::state::Finding;
use crate::protocol::decode::{
    CommandSequence, ParamValue, ParsedCommand, Segment, UnknownReason,
};

/// Render the full listing with statistics.
pub fn render(sequence: &CommandSequence, buffer: &[u8]) -> String {
    render_with_findings(sequence, buffer, &[])
}

/// Render the listing, statistics, and (when present) state findings.
pub fn render_with_findings(
    sequence: &CommandSequence,
    buffer: &[u8],
    findings: &[Finding],
) -> String {
    let mut out = String::new();

    for segment in sequence.iter() {
        let _ = writeln!(out, "{}", segment_line(segment, buffer));
    }

    let stats = Stats::collect(sequence);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "commands: {}  unknown: {}  data bytes: {}",
        stats.command_count, stats.unknown_count, stats.data_bytes
    );
    if !stats.opcode_counts.is_empty() {
        let _ = writeln!(out, "by opcode:");
        for (name, count) in &stats.opcode_counts {
            let _ = writeln!(out, "  {:<24} {}", name, count);
        }
    }

    if !findings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "state findings:");
        for finding in findings {
            let _ = writeln!(
                out,
                "  0x{:06x}  segment #{}: {}",
                finding.offset, finding.segment_index, finding.error
            );
        }
    }

    out
}

/// One listing line for a segment.
fn segment_line(segment: &Segment, buffer: &[u8]) -> String {
    let span = segment.span();
    match segment {
        Segment::Command(c) => {
            let params = format_params(c, buffer);
            if params.is_empty() {
                format!("0x{:06x}  {}", span.offset, c.opcode)
            } else {
                format!("0x{:06x}  {:<24}  {}", span.offset, c.opcode.to_string(), params)
            }
        }
        Segment::Unknown(u) => {
            let reason = match u.reason {
                UnknownReason::UnrecognizedOpcode => "unrecognized opcode",
                UnknownReason::TruncatedCommand => "truncated command",
            };
            format!(
                "0x{:06x}  UNKNOWN ({})  {} byte{}",
                span.offset,
                reason,
                span.len,
                if span.len == 1 { "" } else { "s" }
            )
        }
        Segment::Data(d) => {
            let origin = match d.preceding_command {
                Some(i) => format!(" (after #{})", i),
                None => String::new(),
            };
            format!(
                "0x{:06x}  {:<24}  {} bytes{}",
                span.offset, "DATA", span.len, origin
            )
        }
    }
}

/// Space-separated `name=value` pairs for a command's decoded fields.
fn format_params(command: &ParsedCommand, _buffer: &[u8]) -> String {
    command
        .values
        .iter()
        .map(|(name, value)| match value {
            ParamValue::U8(v) => format!("{}={}", name, v),
            ParamValue::U16(v) => format!("{}={}", name, v),
            ParamValue::U32(v) => format!("{}={}", name, v),
            ParamValue::Bytes(span) => format!("{}=<{} bytes>", name, span.len),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Aggregate statistics over one decoded sequence.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub command_count: usize,
    pub unknown_count: usize,
    pub data_bytes: usize,
    pub opcode_counts: BTreeMap<String, usize>,
}

impl Stats {
    pub fn collect(sequence: &CommandSequence) -> Self {
        let mut stats = Self::default();
        for segment in sequence.iter() {
            match segment {
                Segment::Command(c) => {
                    stats.command_count += 1;
                    *stats
                        .opcode_counts
                        .entry(c.opcode.name().to_string())
                        .or_insert(0) += 1;
                }
                Segment::Unknown(_) => stats.unknown_count += 1,
                Segment::Data(d) => stats.data_bytes += d.span.len,
            }
        }
        stats
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::state::{validate_sequence, PrinterState};
    use crate::protocol::commands;
    use crate::protocol::{Catalog, Decoder};

    fn decode(buffer: &[u8]) -> CommandSequence {
        let catalog = Catalog::default_f2000_series();
        Decoder::new(&catalog).decode(buffer)
    }

    #[test]
    fn test_listing_contains_offsets_and_params() {
        let mut buf = commands::init();
        buf.extend(commands::set_unit(5));
        let seq = decode(&buf);
        let text = render(&seq, &buf);

        assert!(text.contains("0x000000  Initialize"));
        assert!(text.contains("SetUnit"));
        assert!(text.contains("base=5"));
        assert!(text.contains("commands: 2"));
    }

    #[test]
    fn test_raster_payload_is_summarized_not_dumped() {
        let buf = commands::bit_image(16, 4, &[0xFF; 8]);
        let seq = decode(&buf);
        let text = render(&seq, &buf);
        assert!(text.contains("data=<8 bytes>"));
        assert!(!text.contains("FF FF"));
    }

    #[test]
    fn test_unknown_and_data_lines() {
        let mut buf = vec![0x1B, 0x7F]; // unrecognized escape + stray byte
        buf.extend(commands::init());
        let seq = decode(&buf);
        let text = render(&seq, &buf);
        assert!(text.contains("UNKNOWN (unrecognized opcode)"));
        assert!(text.contains("DATA"));
        assert!(text.contains("unknown: 1"));
    }

    #[test]
    fn test_stats_count_by_opcode() {
        let mut buf = Vec::new();
        buf.extend(commands::set_color(0));
        buf.extend(commands::set_color(4));
        buf.extend(commands::form_feed());
        let stats = Stats::collect(&decode(&buf));
        assert_eq!(stats.opcode_counts.get("SetColorSelection"), Some(&2));
        assert_eq!(stats.opcode_counts.get("FormFeed"), Some(&1));
        assert_eq!(stats.command_count, 3);
    }

    #[test]
    fn test_findings_section() {
        // BitImage without graphics mode yields one advisory finding
        let mut buf = commands::init();
        buf.extend(commands::bit_image(8, 1, &[0x01]));
        let seq = decode(&buf);
        let (_, findings) = validate_sequence(&seq, &buf, PrinterState::new());
        let text = render_with_findings(&seq, &buf, &findings);
        assert!(text.contains("state findings:"));
        assert!(text.contains("BitImage outside graphics mode"));
    }

    #[test]
    fn test_no_findings_section_when_clean() {
        let buf = commands::init();
        let seq = decode(&buf);
        let text = render_with_findings(&seq, &buf, &[]);
        assert!(!text.contains("state findings:"));
    }
}
