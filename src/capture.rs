//! # Capture Ingestion
//!
//! Loads USB traffic captures exported as JSON and flattens them into the
//! host→device byte stream the decoder works on.
//!
//! ## Capture Format
//!
//! A capture is an ordered packet list. Payloads appear either as hex
//! strings or as raw byte arrays, depending on which export tool produced
//! the file; both are accepted:
//!
//! ```json
//! {
//!   "packets": [
//!     { "timestamp": 0.000123, "direction": "out", "data": "1b40" },
//!     { "direction": "in",  "data": [6] },
//!     { "data": "1b2847010001" }
//!   ]
//! }
//! ```
//!
//! A packet without a `direction` is host→device: the capture tooling only
//! tags the sparse device→host answers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Packet {index}: bad hex payload {value:?}")]
    InvalidHex { index: usize, value: String },
}

// ============================================================================
// CAPTURE MODEL
// ============================================================================

/// Transfer direction relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Host → device
    #[default]
    Out,
    /// Device → host
    In,
}

/// A packet payload as found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PacketData {
    /// Hex string, case-insensitive, optional whitespace between bytes.
    Hex(String),
    /// Raw byte values.
    Bytes(Vec<u8>),
}

/// One captured USB transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Seconds since capture start, when the tool recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub direction: Direction,
    pub data: PacketData,
}

impl Packet {
    /// Decode this packet's payload to bytes.
    fn bytes(&self, index: usize) -> Result<Vec<u8>, CaptureError> {
        match &self.data {
            PacketData::Bytes(b) => Ok(b.clone()),
            PacketData::Hex(s) => {
                let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                if compact.len() % 2 != 0 {
                    return Err(CaptureError::InvalidHex {
                        index,
                        value: s.clone(),
                    });
                }
                (0..compact.len())
                    .step_by(2)
                    .map(|i| {
                        u8::from_str_radix(&compact[i..i + 2], 16).map_err(|_| {
                            CaptureError::InvalidHex {
                                index,
                                value: s.clone(),
                            }
                        })
                    })
                    .collect()
            }
        }
    }
}

/// A parsed capture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub packets: Vec<Packet>,
}

impl Capture {
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Concatenate every host→device payload, in capture order.
    ///
    /// Packet boundaries are deliberately erased: the printer consumes one
    /// continuous stream, and commands routinely straddle transfers.
    pub fn host_to_device_stream(&self) -> Result<Vec<u8>, CaptureError> {
        let mut stream = Vec::new();
        for (index, packet) in self.packets.iter().enumerate() {
            if packet.direction == Direction::Out {
                stream.extend(packet.bytes(index)?);
            }
        }
        Ok(stream)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_and_array_payloads() {
        let json = r#"{
            "packets": [
                { "timestamp": 0.1, "direction": "out", "data": "1b 40" },
                { "direction": "in", "data": [6] },
                { "data": [27, 40, 71, 1, 0, 1] }
            ]
        }"#;
        let capture = Capture::from_json(json).unwrap();
        assert_eq!(capture.packets.len(), 3);

        let stream = capture.host_to_device_stream().unwrap();
        // The IN packet is filtered out, the rest concatenates in order
        assert_eq!(stream, vec![0x1B, 0x40, 0x1B, 0x28, 0x47, 0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_missing_direction_defaults_to_out() {
        let json = r#"{ "packets": [ { "data": "0c" } ] }"#;
        let capture = Capture::from_json(json).unwrap();
        assert_eq!(capture.packets[0].direction, Direction::Out);
        assert_eq!(capture.host_to_device_stream().unwrap(), vec![0x0C]);
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let json = r#"{ "packets": [ { "data": "1B2A" } ] }"#;
        let capture = Capture::from_json(json).unwrap();
        assert_eq!(
            capture.host_to_device_stream().unwrap(),
            vec![0x1B, 0x2A]
        );
    }

    #[test]
    fn test_bad_hex_reports_packet_index() {
        let json = r#"{ "packets": [ { "data": "1b40" }, { "data": "zz" } ] }"#;
        let capture = Capture::from_json(json).unwrap();
        let err = capture.host_to_device_stream().unwrap_err();
        assert!(matches!(err, CaptureError::InvalidHex { index: 1, .. }));
    }

    #[test]
    fn test_odd_length_hex_rejected() {
        let json = r#"{ "packets": [ { "data": "1b4" } ] }"#;
        let capture = Capture::from_json(json).unwrap();
        assert!(capture.host_to_device_stream().is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Capture::from_json("{ not json").is_err());
    }
}
