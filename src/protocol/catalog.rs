//! # Command Catalog
//!
//! A data-driven registry mapping opcode signatures to command descriptors.
//! The decoder consults the catalog to recognize commands; it never hardcodes
//! byte patterns itself, so a newly discovered command is a new catalog entry
//! rather than a decoder change.
//!
//! ## Lookup Rules
//!
//! - Signatures are matched **longest-first**: a 3-byte `ESC ( G` signature
//!   is never shadowed by a 2-byte `ESC $` entry sharing the ESC prefix.
//! - Registering two descriptors with the same signature is a fatal
//!   configuration error, caught when the catalog is built.
//! - The catalog is immutable after construction.
//!
//! ## Export / Import
//!
//! The catalog serializes to JSON (`{opcode, signature_hex, schema, fields,
//! description}` per entry) so the command dictionary can be reviewed,
//! documented, and extended by hand as reverse engineering progresses:
//!
//! ```
//! use inkcraft::protocol::catalog::Catalog;
//!
//! let catalog = Catalog::default_f2000_series();
//! let json = catalog.to_json().unwrap();
//! let back = Catalog::from_json(&json).unwrap();
//! assert_eq!(back.len(), catalog.len());
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Catalog construction and serialization errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two descriptors share one signature. Fails fast at build time.
    #[error("Duplicate catalog signature: {0}")]
    DuplicateSignature(String),

    /// A descriptor with an empty signature can never match.
    #[error("Empty signature for opcode {0}")]
    EmptySignature(Opcode),

    /// Signature hex in an imported catalog file could not be parsed.
    #[error("Invalid signature hex '{0}'")]
    InvalidHex(String),

    /// Malformed catalog JSON.
    #[error("Catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// OPCODE
// ============================================================================

/// Semantic identifier of a catalogued command.
///
/// Every opcode maps to exactly one descriptor in a catalog. Byte patterns
/// that match no descriptor never get an opcode; the decoder surfaces them
/// as unknown segments instead of guessing.
///
/// `Extension` carries the name of a command contributed through a catalog
/// file that this crate has no dedicated variant for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Opcode {
    Initialize,
    SelectGraphicsMode,
    SetUnit,
    SetColorSelection,
    SetInkDensity,
    SetPageFormat,
    SetPageLength,
    SetAbsoluteVertical,
    SetRelativeVertical,
    SetAbsoluteHorizontal,
    SetRelativeHorizontal,
    SelectPrintColor,
    SelectColorTables,
    BitImage,
    FormFeed,
    /// Vendor DTG extension: toggle white-ink output.
    WhiteInkControl,
    /// Vendor DTG extension: underbase density level.
    UnderbaseControl,
    /// A command known only through a catalog data file.
    Extension(String),
}

impl Opcode {
    /// Canonical name as used in catalog files and reports.
    pub fn name(&self) -> &str {
        match self {
            Self::Initialize => "Initialize",
            Self::SelectGraphicsMode => "SelectGraphicsMode",
            Self::SetUnit => "SetUnit",
            Self::SetColorSelection => "SetColorSelection",
            Self::SetInkDensity => "SetInkDensity",
            Self::SetPageFormat => "SetPageFormat",
            Self::SetPageLength => "SetPageLength",
            Self::SetAbsoluteVertical => "SetAbsoluteVertical",
            Self::SetRelativeVertical => "SetRelativeVertical",
            Self::SetAbsoluteHorizontal => "SetAbsoluteHorizontal",
            Self::SetRelativeHorizontal => "SetRelativeHorizontal",
            Self::SelectPrintColor => "SelectPrintColor",
            Self::SelectColorTables => "SelectColorTables",
            Self::BitImage => "BitImage",
            Self::FormFeed => "FormFeed",
            Self::WhiteInkControl => "WhiteInkControl",
            Self::UnderbaseControl => "UnderbaseControl",
            Self::Extension(name) => name,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Opcode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Initialize" => Self::Initialize,
            "SelectGraphicsMode" => Self::SelectGraphicsMode,
            "SetUnit" => Self::SetUnit,
            "SetColorSelection" => Self::SetColorSelection,
            "SetInkDensity" => Self::SetInkDensity,
            "SetPageFormat" => Self::SetPageFormat,
            "SetPageLength" => Self::SetPageLength,
            "SetAbsoluteVertical" => Self::SetAbsoluteVertical,
            "SetRelativeVertical" => Self::SetRelativeVertical,
            "SetAbsoluteHorizontal" => Self::SetAbsoluteHorizontal,
            "SetRelativeHorizontal" => Self::SetRelativeHorizontal,
            "SelectPrintColor" => Self::SelectPrintColor,
            "SelectColorTables" => Self::SelectColorTables,
            "BitImage" => Self::BitImage,
            "FormFeed" => Self::FormFeed,
            "WhiteInkControl" => Self::WhiteInkControl,
            "UnderbaseControl" => Self::UnderbaseControl,
            _ => Self::Extension(s),
        }
    }
}

impl From<Opcode> for String {
    fn from(op: Opcode) -> Self {
        op.name().to_string()
    }
}

// ============================================================================
// PARAMETER SCHEMA
// ============================================================================

/// How a command's parameter bytes are framed on the wire.
///
/// The schema is data, not code: the decoder interprets it generically, so
/// new framings for discovered commands require no decoder change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamSchema {
    /// No parameter bytes (e.g. `ESC @`, stand-alone `FF`).
    None,
    /// A fixed number of parameter bytes follows the signature.
    Fixed { len: usize },
    /// A little-endian u16 count follows the signature, then that many
    /// parameter bytes (`ESC ( X nL nH ...`).
    LenPrefixedU16,
    /// A little-endian u32 count; vendor raster framing for payloads
    /// larger than 64 KiB.
    LenPrefixedU32,
    /// Parameters run until (and excluding) a terminator byte.
    Terminated { terminator: u8 },
}

/// Typed layout of one parameter field inside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    U8,
    U16Le,
    U32Le,
    /// All remaining payload bytes (raster data, etc.). Must be last.
    Rest,
}

/// A named, typed parameter field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamField {
    pub name: String,
    pub kind: FieldKind,
}

impl ParamField {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

/// Immutable description of one catalogued command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub opcode: Opcode,
    /// Full signature bytes, including the start marker (e.g. `1B 28 47`).
    pub signature: Vec<u8>,
    pub schema: ParamSchema,
    /// Typed field layout of the payload. Empty = payload reported as raw.
    pub fields: Vec<ParamField>,
    pub description: String,
}

impl CommandDescriptor {
    pub fn new(
        opcode: Opcode,
        signature: &[u8],
        schema: ParamSchema,
        fields: Vec<ParamField>,
        description: &str,
    ) -> Self {
        Self {
            opcode,
            signature: signature.to_vec(),
            schema,
            fields,
            description: description.to_string(),
        }
    }

    /// Signature rendered as spaced uppercase hex, e.g. `"1B 28 47"`.
    pub fn signature_hex(&self) -> String {
        hex_string(&self.signature)
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Read-only registry of command descriptors.
///
/// Built once (fails fast on duplicate signatures), then shared by the
/// decoder, the driver encoder, and the reporting code.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Descriptors sorted by descending signature length, so a linear scan
    /// naturally yields the longest match.
    descriptors: Vec<CommandDescriptor>,
    /// Distinct first signature bytes; the command-start markers the
    /// decoder scans for (0x1B plus any registered alternates).
    start_markers: Vec<u8>,
}

impl Catalog {
    /// Build a catalog from descriptors.
    ///
    /// ## Errors
    ///
    /// - [`CatalogError::DuplicateSignature`] if two descriptors share a
    ///   signature
    /// - [`CatalogError::EmptySignature`] for a zero-length signature
    pub fn from_descriptors(
        descriptors: Vec<CommandDescriptor>,
    ) -> Result<Self, CatalogError> {
        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let mut markers: Vec<u8> = Vec::new();

        for d in &descriptors {
            if d.signature.is_empty() {
                return Err(CatalogError::EmptySignature(d.opcode.clone()));
            }
            if !seen.insert(d.signature.clone()) {
                return Err(CatalogError::DuplicateSignature(d.signature_hex()));
            }
            if !markers.contains(&d.signature[0]) {
                markers.push(d.signature[0]);
            }
        }

        let mut descriptors = descriptors;
        descriptors.sort_by(|a, b| b.signature.len().cmp(&a.signature.len()));

        Ok(Self {
            descriptors,
            start_markers: markers,
        })
    }

    /// The catalog of every command identified on the F2100/F2130 so far.
    ///
    /// Standard ESC/P2 opcodes plus the vendor white-ink and underbase
    /// extensions. Parameter layouts marked "hypothesis" in descriptions are
    /// pending empirical confirmation.
    pub fn default_f2000_series() -> Self {
        use FieldKind::*;
        use Opcode::*;

        let u8f = |name: &str| ParamField::new(name, U8);
        let u16f = |name: &str| ParamField::new(name, U16Le);

        let descriptors = vec![
            CommandDescriptor::new(
                Initialize,
                &[0x1B, b'@'],
                ParamSchema::None,
                vec![],
                "Initialize printer; reset to power-on defaults",
            ),
            CommandDescriptor::new(
                FormFeed,
                &[0x0C],
                ParamSchema::None,
                vec![],
                "Finalize job; flush raster data and eject platen",
            ),
            CommandDescriptor::new(
                SelectGraphicsMode,
                &[0x1B, b'(', b'G'],
                ParamSchema::LenPrefixedU16,
                vec![u8f("mode")],
                "Select raster graphics mode (m=1)",
            ),
            CommandDescriptor::new(
                SetUnit,
                &[0x1B, b'(', b'U'],
                ParamSchema::LenPrefixedU16,
                vec![u8f("base")],
                "Set base unit to base/3600 inch",
            ),
            CommandDescriptor::new(
                SetColorSelection,
                &[0x1B, b'(', b'K'],
                ParamSchema::LenPrefixedU16,
                vec![u8f("reserved"), u8f("channel")],
                "Select active ink channel (0=white 1=cyan 2=magenta 3=yellow 4=black)",
            ),
            CommandDescriptor::new(
                SetInkDensity,
                &[0x1B, b'(', b'i'],
                ParamSchema::LenPrefixedU16,
                vec![u8f("density")],
                "Set ink density for the active channel",
            ),
            CommandDescriptor::new(
                SetPageFormat,
                &[0x1B, b'(', b'c'],
                ParamSchema::LenPrefixedU16,
                vec![u16f("top"), u16f("bottom")],
                "Set page format (top/bottom margins in current units)",
            ),
            CommandDescriptor::new(
                SetPageLength,
                &[0x1B, b'(', b'C'],
                ParamSchema::LenPrefixedU16,
                vec![u16f("length")],
                "Set page length in current units",
            ),
            CommandDescriptor::new(
                SetAbsoluteVertical,
                &[0x1B, b'(', b'V'],
                ParamSchema::LenPrefixedU16,
                vec![u16f("position")],
                "Set absolute vertical position",
            ),
            CommandDescriptor::new(
                SetRelativeVertical,
                &[0x1B, b'(', b'v'],
                ParamSchema::LenPrefixedU16,
                vec![u16f("offset")],
                "Set relative vertical position",
            ),
            CommandDescriptor::new(
                SetAbsoluteHorizontal,
                &[0x1B, b'$'],
                ParamSchema::Fixed { len: 2 },
                vec![u16f("position")],
                "Set absolute horizontal position",
            ),
            CommandDescriptor::new(
                SetRelativeHorizontal,
                &[0x1B, b'\\'],
                ParamSchema::Fixed { len: 2 },
                vec![u16f("offset")],
                "Set relative horizontal position",
            ),
            CommandDescriptor::new(
                SelectPrintColor,
                &[0x1B, b'(', b'R'],
                ParamSchema::LenPrefixedU16,
                vec![],
                "Select print color (remote mode family)",
            ),
            CommandDescriptor::new(
                SelectColorTables,
                &[0x1B, b'(', b'r'],
                ParamSchema::LenPrefixedU16,
                vec![u8f("table")],
                "Select color tables",
            ),
            CommandDescriptor::new(
                BitImage,
                &[0x1B, b'*'],
                ParamSchema::LenPrefixedU32,
                vec![
                    u16f("width"),
                    u16f("rows"),
                    ParamField::new("data", Rest),
                ],
                "Raster block transfer for the active channel (vendor u32 framing)",
            ),
            CommandDescriptor::new(
                WhiteInkControl,
                &[0x1B, b'(', b'W'],
                ParamSchema::LenPrefixedU16,
                vec![u8f("mode")],
                "Vendor: toggle white-ink output (layout: hypothesis)",
            ),
            CommandDescriptor::new(
                UnderbaseControl,
                &[0x1B, b'(', b'w'],
                ParamSchema::LenPrefixedU16,
                vec![u8f("level")],
                "Vendor: underbase density level (layout: hypothesis)",
            ),
        ];

        // The built-in table is static; a duplicate here is a bug caught by
        // test_default_catalog_builds.
        Self::from_descriptors(descriptors)
            .expect("built-in catalog has unique signatures")
    }

    /// Look up the longest descriptor whose signature matches `buffer` at
    /// `offset`. Returns the descriptor and the number of signature bytes
    /// consumed.
    pub fn lookup(&self, buffer: &[u8], offset: usize) -> Option<(&CommandDescriptor, usize)> {
        let rest = buffer.get(offset..)?;
        // descriptors are sorted longest-first, so the first prefix match
        // is the longest match
        self.descriptors
            .iter()
            .find(|d| rest.starts_with(&d.signature))
            .map(|d| (d, d.signature.len()))
    }

    /// Find the descriptor registered for `opcode`, if any.
    pub fn descriptor_for(&self, opcode: &Opcode) -> Option<&CommandDescriptor> {
        self.descriptors.iter().find(|d| &d.opcode == opcode)
    }

    /// Whether `byte` can start a command (first byte of some signature).
    #[inline]
    pub fn is_start_marker(&self, byte: u8) -> bool {
        self.start_markers.contains(&byte)
    }

    /// The registered command-start marker bytes.
    pub fn start_markers(&self) -> &[u8] {
        &self.start_markers
    }

    /// Iterate descriptors (longest signature first).
    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.descriptors.iter()
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    // ========================================================================
    // EXPORT / IMPORT
    // ========================================================================

    /// Serialize the catalog to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            info: CatalogInfo {
                generated: chrono::Utc::now().to_rfc3339(),
                commands_count: self.descriptors.len(),
            },
            commands: self.descriptors.iter().map(CatalogEntry::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Build a catalog from an exported JSON document.
    ///
    /// The same duplicate-signature and empty-signature checks apply as for
    /// [`Catalog::from_descriptors`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let descriptors = file
            .commands
            .into_iter()
            .map(CatalogEntry::into_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_descriptors(descriptors)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_f2000_series()
    }
}

// ============================================================================
// JSON FILE MODEL
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    info: CatalogInfo,
    commands: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogInfo {
    generated: String,
    commands_count: usize,
}

/// One catalog entry as stored on disk. The signature travels as spaced hex
/// so entries can be written by hand from capture dumps.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogEntry {
    opcode: Opcode,
    signature_hex: String,
    schema: ParamSchema,
    #[serde(default)]
    fields: Vec<ParamField>,
    #[serde(default)]
    description: String,
}

impl CatalogEntry {
    fn into_descriptor(self) -> Result<CommandDescriptor, CatalogError> {
        let signature = parse_hex(&self.signature_hex)
            .ok_or_else(|| CatalogError::InvalidHex(self.signature_hex.clone()))?;
        Ok(CommandDescriptor {
            opcode: self.opcode,
            signature,
            schema: self.schema,
            fields: self.fields,
            description: self.description,
        })
    }
}

impl From<&CommandDescriptor> for CatalogEntry {
    fn from(d: &CommandDescriptor) -> Self {
        Self {
            opcode: d.opcode.clone(),
            signature_hex: d.signature_hex(),
            schema: d.schema,
            fields: d.fields.clone(),
            description: d.description.clone(),
        }
    }
}

/// Render bytes as spaced uppercase hex (`"1B 28 47"`).
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse spaced (or unspaced) hex into bytes. Returns `None` on bad input.
pub fn parse_hex(s: &str) -> Option<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() || compact.len() % 2 != 0 {
        return None;
    }
    (0..compact.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&compact[i..i + 2], 16).ok())
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_builds() {
        let catalog = Catalog::default_f2000_series();
        assert!(catalog.len() >= 15);
        assert!(catalog.is_start_marker(0x1B));
        assert!(catalog.is_start_marker(0x0C));
        assert!(!catalog.is_start_marker(0x00));
    }

    #[test]
    fn test_lookup_simple() {
        let catalog = Catalog::default_f2000_series();
        let buf = [0x1B, 0x40, 0x00];
        let (desc, consumed) = catalog.lookup(&buf, 0).unwrap();
        assert_eq!(desc.opcode, Opcode::Initialize);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_lookup_at_offset() {
        let catalog = Catalog::default_f2000_series();
        let buf = [0x00, 0x0C];
        let (desc, consumed) = catalog.lookup(&buf, 1).unwrap();
        assert_eq!(desc.opcode, Opcode::FormFeed);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_lookup_no_match() {
        let catalog = Catalog::default_f2000_series();
        // ESC followed by an uncatalogued selector
        let buf = [0x1B, 0x7F];
        assert!(catalog.lookup(&buf, 0).is_none());
    }

    #[test]
    fn test_longest_match_wins() {
        // 1-byte and 3-byte signatures over the same prefix: the longer one
        // must be chosen when it matches.
        let short = CommandDescriptor::new(
            Opcode::Extension("Short".into()),
            &[0x1B],
            ParamSchema::Fixed { len: 1 },
            vec![],
            "",
        );
        let long = CommandDescriptor::new(
            Opcode::Extension("Long".into()),
            &[0x1B, 0x61, 0x62],
            ParamSchema::None,
            vec![],
            "",
        );
        let catalog = Catalog::from_descriptors(vec![short, long]).unwrap();

        let buf = [0x1B, 0x61, 0x62];
        let (desc, consumed) = catalog.lookup(&buf, 0).unwrap();
        assert_eq!(desc.opcode, Opcode::Extension("Long".into()));
        assert_eq!(consumed, 3);

        // Prefix-only input falls back to the short signature
        let buf = [0x1B, 0x61, 0x63];
        let (desc, consumed) = catalog.lookup(&buf, 0).unwrap();
        assert_eq!(desc.opcode, Opcode::Extension("Short".into()));
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_duplicate_signature_rejected() {
        let a = CommandDescriptor::new(
            Opcode::Initialize,
            &[0x1B, 0x40],
            ParamSchema::None,
            vec![],
            "",
        );
        let b = CommandDescriptor::new(
            Opcode::Extension("Clone".into()),
            &[0x1B, 0x40],
            ParamSchema::Fixed { len: 1 },
            vec![],
            "",
        );
        let err = Catalog::from_descriptors(vec![a, b]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSignature(_)));
    }

    #[test]
    fn test_empty_signature_rejected() {
        let d = CommandDescriptor::new(
            Opcode::Extension("Ghost".into()),
            &[],
            ParamSchema::None,
            vec![],
            "",
        );
        let err = Catalog::from_descriptors(vec![d]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptySignature(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = Catalog::default_f2000_series();
        let json = catalog.to_json().unwrap();
        let back = Catalog::from_json(&json).unwrap();

        assert_eq!(back.len(), catalog.len());
        for d in catalog.descriptors() {
            let d2 = back.descriptor_for(&d.opcode).unwrap();
            assert_eq!(d2.signature, d.signature);
            assert_eq!(d2.schema, d.schema);
            assert_eq!(d2.fields, d.fields);
        }
    }

    #[test]
    fn test_import_extension_command() {
        // A command contributed as data only; no code change needed
        let json = r#"{
            "info": {"generated": "2025-01-01T00:00:00Z", "commands_count": 1},
            "commands": [{
                "opcode": "PlatenHeight",
                "signature_hex": "1B 28 48",
                "schema": {"type": "len_prefixed_u16"},
                "fields": [{"name": "height", "kind": "u16_le"}],
                "description": "Vendor: platen height adjust"
            }]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let buf = [0x1B, 0x28, 0x48, 0x02, 0x00, 0x10, 0x00];
        let (desc, _) = catalog.lookup(&buf, 0).unwrap();
        assert_eq!(desc.opcode, Opcode::Extension("PlatenHeight".into()));
    }

    #[test]
    fn test_invalid_hex_rejected() {
        let json = r#"{
            "info": {"generated": "", "commands_count": 1},
            "commands": [{
                "opcode": "Broken",
                "signature_hex": "1B 2",
                "schema": {"type": "none"}
            }]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidHex(_)));
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(hex_string(&[0x1B, 0x28, 0x47]), "1B 28 47");
        assert_eq!(parse_hex("1B 28 47"), Some(vec![0x1B, 0x28, 0x47]));
        assert_eq!(parse_hex("1b2847"), Some(vec![0x1B, 0x28, 0x47]));
        assert_eq!(parse_hex("zz"), None);
        assert_eq!(parse_hex(""), None);
    }
}
