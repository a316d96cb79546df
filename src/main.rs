//! # Inkcraft CLI
//!
//! Command-line interface for capture analysis and test printing.
//!
//! ## Usage
//!
//! ```bash
//! # Decode a capture file and print the command listing
//! inkcraft decode capture.json
//!
//! # Decode a raw byte dump instead of capture JSON
//! inkcraft decode --raw job.bin
//!
//! # Replay the stream through the state machine as well
//! inkcraft decode --validate capture.json
//!
//! # Use an extended command catalog
//! inkcraft decode --catalog extra.json capture.json
//!
//! # Export / inspect the built-in catalog
//! inkcraft catalog export --output catalog.json
//! inkcraft catalog list
//!
//! # Print a stripe test pattern (dry run shows the planned job)
//! inkcraft print --width 720 --rows 720 --dry-run
//! inkcraft print --device /dev/usb/lp0 --white
//! ```

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use inkcraft::capture::Capture;
use inkcraft::driver::{self, PrintIntent};
use inkcraft::error::InkcraftError;
use inkcraft::printer::{validate_sequence, PrinterConfig, PrinterState};
use inkcraft::protocol::{Catalog, Decoder};
use inkcraft::report;
use inkcraft::session::{RetryPolicy, SessionController};
use inkcraft::transport::LpTransport;
use inkcraft::InkChannel;

/// Inkcraft - Epson DTG printer protocol utility
#[derive(Parser, Debug)]
#[command(name = "inkcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a capture (or raw dump) into a command listing
    Decode {
        /// Capture JSON file, or a raw byte dump with --raw
        file: PathBuf,

        /// Treat the input as raw bytes instead of capture JSON
        #[arg(long)]
        raw: bool,

        /// Replay the decoded stream through the printer state machine
        #[arg(long)]
        validate: bool,

        /// Extended catalog JSON to decode with (default: built-in)
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Also write a machine-readable segment summary to FILE
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// Inspect, export, or verify command catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Print a stripe test pattern
    Print {
        /// Printer device path
        #[arg(long, default_value = "/dev/usb/lp0")]
        device: String,

        /// Pattern width in dots
        #[arg(long, default_value = "720")]
        width: u16,

        /// Pattern height in rows
        #[arg(long, default_value = "720")]
        rows: usize,

        /// Resolution in dpi (must divide 3600)
        #[arg(long, default_value = "720")]
        resolution: u16,

        /// Include a white-ink underbase pass
        #[arg(long)]
        white: bool,

        /// Underbase density (implies the white channel)
        #[arg(long, default_value = "0")]
        underbase: u8,

        /// Show the planned job instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogAction {
    /// Write the built-in catalog as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Load a catalog file and verify it builds
    Import {
        file: PathBuf,
    },
    /// List catalogued commands
    List,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), InkcraftError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            file,
            raw,
            validate,
            catalog,
            json,
        } => cmd_decode(&file, raw, validate, catalog.as_deref(), json.as_deref()),
        Commands::Catalog { action } => cmd_catalog(action),
        Commands::Print {
            device,
            width,
            rows,
            resolution,
            white,
            underbase,
            dry_run,
        } => cmd_print(&device, width, rows, resolution, white, underbase, dry_run),
    }
}

// ============================================================================
// DECODE
// ============================================================================

fn cmd_decode(
    file: &std::path::Path,
    raw: bool,
    validate: bool,
    catalog_path: Option<&std::path::Path>,
    json_out: Option<&std::path::Path>,
) -> Result<(), InkcraftError> {
    let stream = if raw {
        fs::read(file)?
    } else {
        let json = fs::read_to_string(file)?;
        Capture::from_json(&json)?.host_to_device_stream()?
    };

    let catalog = load_catalog(catalog_path)?;
    let sequence = Decoder::new(&catalog).decode(&stream);

    let findings = if validate {
        let (_, findings) = validate_sequence(&sequence, &stream, PrinterState::new());
        findings
    } else {
        Vec::new()
    };

    if let Some(path) = json_out {
        fs::write(path, segment_summary_json(&sequence)?)?;
        eprintln!("Wrote {}", path.display());
    }

    print!("{}", report::render_with_findings(&sequence, &stream, &findings));
    Ok(())
}

/// Machine-readable decode summary: one entry per segment plus totals.
fn segment_summary_json(sequence: &inkcraft::CommandSequence) -> Result<String, InkcraftError> {
    use inkcraft::protocol::Segment;

    let segments: Vec<serde_json::Value> = sequence
        .iter()
        .map(|segment| {
            let span = segment.span();
            let kind = match segment {
                Segment::Command(c) => c.opcode.name().to_string(),
                Segment::Data(_) => "DATA".to_string(),
                Segment::Unknown(_) => "UNKNOWN".to_string(),
            };
            serde_json::json!({
                "offset": span.offset,
                "len": span.len,
                "kind": kind,
            })
        })
        .collect();

    let stats = report::Stats::collect(sequence);
    let summary = serde_json::json!({
        "segments": segments,
        "commands": stats.command_count,
        "unknown": stats.unknown_count,
        "data_bytes": stats.data_bytes,
    });
    serde_json::to_string_pretty(&summary)
        .map_err(|e| InkcraftError::Io(std::io::Error::other(e)))
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<Catalog, InkcraftError> {
    match path {
        Some(p) => {
            let json = fs::read_to_string(p)?;
            Ok(Catalog::from_json(&json)?)
        }
        None => Ok(Catalog::default_f2000_series()),
    }
}

// ============================================================================
// CATALOG
// ============================================================================

fn cmd_catalog(action: CatalogAction) -> Result<(), InkcraftError> {
    match action {
        CatalogAction::Export { output } => {
            let json = Catalog::default_f2000_series().to_json()?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        CatalogAction::Import { file } => {
            let json = fs::read_to_string(&file)?;
            let catalog = Catalog::from_json(&json)?;
            println!(
                "{}: {} commands, start markers {:?}",
                file.display(),
                catalog.len(),
                catalog.start_markers()
            );
        }
        CatalogAction::List => {
            let catalog = Catalog::default_f2000_series();
            for d in catalog.descriptors() {
                println!(
                    "{:<12} {:<24} {}",
                    d.signature_hex(),
                    d.opcode.to_string(),
                    d.description
                );
            }
        }
    }
    Ok(())
}

// ============================================================================
// PRINT
// ============================================================================

fn cmd_print(
    device: &str,
    width: u16,
    rows: usize,
    resolution: u16,
    white: bool,
    underbase: u8,
    dry_run: bool,
) -> Result<(), InkcraftError> {
    let wants_white = white || underbase > 0;
    let mut channels = vec![
        InkChannel::Cyan,
        InkChannel::Magenta,
        InkChannel::Yellow,
        InkChannel::Black,
    ];
    if wants_white {
        channels.insert(0, InkChannel::White);
    }

    let intent = PrintIntent {
        resolution,
        channels,
        white_ink: white,
        underbase_level: underbase,
        width_dots: width,
        raster: stripe_pattern(width, rows),
    };

    let config = PrinterConfig::default();
    let job = driver::encode(&intent, PrinterState::new(), &config)?;

    if dry_run {
        print!("{}", report::render(&job.sequence, &job.bytes));
        return Ok(());
    }

    eprintln!("Sending {} bytes to {}...", job.bytes.len(), device);
    let transport = LpTransport::open(device)?;
    let mut session = SessionController::new(transport, RetryPolicy::default());

    // Ctrl-C stops at the next segment boundary instead of mid-write.
    let cancel = session.cancel_handle();
    let _ = ctrlc_handler(cancel);

    let outcome = session.run(&job.bytes, &job.sequence)?;
    eprintln!(
        "Done: {} segments, {} bytes, {} retries",
        outcome.segments_sent, outcome.bytes_sent, outcome.retries
    );
    Ok(())
}

/// Horizontal stripes, 8 rows on / 8 rows off. Exercises every channel and
/// gives an obvious registration check on fabric.
fn stripe_pattern(width: u16, rows: usize) -> Vec<u8> {
    let stride = PrinterConfig::row_stride(width);
    let mut raster = Vec::with_capacity(stride * rows);
    for row in 0..rows {
        let fill = if (row / 8) % 2 == 0 { 0xFF } else { 0x00 };
        raster.extend(std::iter::repeat(fill).take(stride));
    }
    raster
}

/// Flip the cancel flag on SIGINT via a minimal signal handler.
fn ctrlc_handler(
    cancel: std::sync::Arc<std::sync::atomic::AtomicBool>,
) -> Result<(), std::io::Error> {
    use std::sync::atomic::Ordering;
    use std::sync::OnceLock;

    static CANCEL: OnceLock<std::sync::Arc<std::sync::atomic::AtomicBool>> = OnceLock::new();
    let _ = CANCEL.set(cancel);

    extern "C" fn on_sigint(_: libc::c_int) {
        if let Some(flag) = CANCEL.get() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    let handler = on_sigint as extern "C" fn(libc::c_int);
    let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
    if previous == libc::SIG_ERR {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stripe_pattern_dimensions() {
        let raster = stripe_pattern(16, 32);
        assert_eq!(raster.len(), 2 * 32);
        // First band is ink, second band is blank
        assert_eq!(raster[0], 0xFF);
        assert_eq!(raster[8 * 2], 0x00);
    }

    #[test]
    fn test_stripe_pattern_alternates() {
        let raster = stripe_pattern(8, 48);
        for row in 0..48 {
            let expected = if (row / 8) % 2 == 0 { 0xFF } else { 0x00 };
            assert_eq!(raster[row], expected, "row {}", row);
        }
    }
}
