//! AER dump decoder CLI application.
//!
//! Replays recorded raw AER dumps through the streaming decoder and writes
//! the decoded events to CSV or binary files.

use aer_core::{output, AerDecoder, DecoderConfig, FieldOrder, Protocol, UnmaskConfig};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Raw AER dump decoder for neuromorphic vision sensors.
///
/// Decodes recorded address-event streams to human-readable CSV or packed binary.
#[derive(Parser, Debug)]
#[command(name = "aer-decode")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input raw dump file path
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (.csv, .bin)
    ///
    /// The output format is determined by the file extension:
    /// - .csv: Comma-separated values (human-readable)
    /// - .bin: Binary format (efficient, for programmatic access)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Wire protocol of the dump.
    ///
    /// One of: dvs128 (alias fixed4), fixed6, fixed8, icub, icub-circular
    #[arg(short, long, default_value = "dvs128")]
    protocol: String,

    /// Field order for CSV output.
    ///
    /// Comma-separated field names out of x, y, p, e, t.
    #[arg(short, long, default_value = "x,y,p,t")]
    format: String,

    /// Side length of the pixel array (used to mirror y)
    #[arg(long, default_value_t = 128)]
    retinal_size: u32,

    /// Address mask/shift overrides, e.g. --x-mask 0xFE --x-shift 1
    #[arg(long, value_parser = parse_mask)]
    x_mask: Option<u32>,
    #[arg(long)]
    x_shift: Option<u32>,
    #[arg(long, value_parser = parse_mask)]
    y_mask: Option<u32>,
    #[arg(long)]
    y_shift: Option<u32>,
    #[arg(long, value_parser = parse_mask)]
    polarity_mask: Option<u32>,
    #[arg(long)]
    polarity_shift: Option<u32>,
    #[arg(long, value_parser = parse_mask)]
    eye_mask: Option<u32>,
    #[arg(long)]
    eye_shift: Option<u32>,

    /// Ingest block size in bytes
    #[arg(long, default_value_t = aer_core::config::DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Number of buffers for the circular protocol
    #[arg(long, default_value_t = aer_core::config::DEFAULT_BANK_SLOTS)]
    bank_slots: usize,

    /// Bytes handed to the decoder per feed
    #[arg(long, default_value_t = 8192)]
    chunk_size: usize,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Parses a decimal or `0x`-prefixed hexadecimal mask.
fn parse_mask(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid mask {s:?}: {e}"))
}

impl Args {
    fn decoder_config(&self) -> Result<DecoderConfig> {
        let protocol = Protocol::from_str(&self.protocol).context("Invalid protocol")?;

        let defaults = UnmaskConfig::default();
        let unmask = UnmaskConfig {
            x_mask: self.x_mask.unwrap_or(defaults.x_mask),
            x_shift: self.x_shift.unwrap_or(defaults.x_shift),
            y_mask: self.y_mask.unwrap_or(defaults.y_mask),
            y_shift: self.y_shift.unwrap_or(defaults.y_shift),
            polarity_mask: self.polarity_mask.unwrap_or(defaults.polarity_mask),
            polarity_shift: self.polarity_shift.unwrap_or(defaults.polarity_shift),
            eye_mask: self.eye_mask.unwrap_or(defaults.eye_mask),
            eye_shift: self.eye_shift.unwrap_or(defaults.eye_shift),
            retinal_size: self.retinal_size,
        };

        let config = DecoderConfig {
            protocol,
            unmask,
            block_size: self.block_size,
            bank_slots: self.bank_slots,
        };
        config.validate().context("Invalid decoder configuration")?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let field_order = FieldOrder::from_str(&args.format)
        .context("Invalid field format. Use comma-separated: x,y,p,e,t")?;
    let config = args.decoder_config()?;
    let mut decoder = AerDecoder::new(config).context("Invalid decoder configuration")?;
    debug!(?config, "decoder configured");

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {:?}", args.input))?;
    let total_bytes = file.metadata().map(|m| m.len()).unwrap_or(0);
    let mut reader = BufReader::new(file);

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total_bytes);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40}] {bytes}/{total_bytes} {msg}")
                .context("Invalid progress template")?,
        );
        pb
    };

    let start_time = Instant::now();
    progress.set_message(format!(
        "Decoding {:?}...",
        args.input.file_name().unwrap_or_default()
    ));

    let mut events = Vec::new();
    let mut chunk = vec![0u8; args.chunk_size.max(1)];
    loop {
        let bytes_read = reader
            .read(&mut chunk)
            .context("Failed to read input")?;
        if bytes_read == 0 {
            break;
        }
        decoder.feed_raw(&chunk[..bytes_read]);
        decoder.drain(&mut events);
        decoder.reshape_if_needed();
        progress.inc(bytes_read as u64);
    }
    let stats = decoder.stats();
    let decode_duration = start_time.elapsed();

    info!(
        events = stats.events,
        sync_markers = stats.sync_markers,
        wraps = stats.wraps,
        malformed = stats.malformed,
        corrupted = stats.corrupted,
        "decoded {:?} in {:.2}s",
        args.input,
        decode_duration.as_secs_f64()
    );

    let output_ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv");

    progress.set_message(format!(
        "Writing to {:?}...",
        args.output.file_name().unwrap_or_default()
    ));

    match output_ext.to_lowercase().as_str() {
        "csv" => {
            output::write_csv(
                &args.output,
                &events,
                Some(config.unmask.retinal_size),
                field_order,
            )
            .context("Failed to write CSV output")?;
        }
        "bin" => {
            output::write_binary(&args.output, &events, config.unmask.retinal_size)
                .context("Failed to write binary output")?;
        }
        _ => {
            anyhow::bail!(
                "Unsupported output format: .{}. Use .csv or .bin",
                output_ext
            );
        }
    }

    let total_duration = start_time.elapsed();
    progress.finish_with_message(format!(
        "Done! Decoded {} events in {:.2}s",
        events.len(),
        total_duration.as_secs_f64()
    ));

    if !args.quiet {
        let events_per_sec = events.len() as f64 / total_duration.as_secs_f64();
        eprintln!();
        eprintln!("Summary:");
        eprintln!("  Input:        {:?}", args.input);
        eprintln!("  Output:       {:?}", args.output);
        eprintln!("  Protocol:     {:?}", config.protocol);
        eprintln!("  Events:       {}", stats.events);
        eprintln!("  Sync markers: {}", stats.sync_markers);
        eprintln!("  Wraps:        {}", stats.wraps);
        eprintln!("  Skipped:      {}", stats.malformed + stats.corrupted);
        eprintln!("  Duration:     {:.3}s", total_duration.as_secs_f64());
        eprintln!("  Throughput:   {:.0} events/s", events_per_sec);
    }

    Ok(())
}
