/// ByteTrain command-line tool: inspect, validate, encode and decode
/// tagged binary streams.
///
/// # Command overview
///
/// ```text
/// bt <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print offsets, sizes and kinds of every message
///   validate   Check that a stream decodes cleanly to the end
///   encode     Create a stream from a JSON manifest
///   decode     Render every message of a stream (optionally following it)
///   help       Print help information
///
/// Global options:
///   --log-level <FILTER>   tracing filter for stderr logs (default: warn)
///   -h, --help             Print help
///   -V, --version          Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                       |
/// |------|-----------------------------------------------|
/// | 0    | Success                                       |
/// | 1    | Error (I/O failure, invalid stream, etc.)     |
///
/// Logs and error details go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cmd_decode;
mod cmd_encode;
mod cmd_inspect;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The ByteTrain stream tool.
#[derive(Parser)]
#[command(name = "bt", version, about = "ByteTrain stream CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter for stderr output (`error`, `warn`, `info`, `debug`,
    /// `trace`, or a full `EnvFilter` directive).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print offsets, sizes, kinds and error counts of every message.
    Inspect(InspectArgs),
    /// Check that a stream decodes cleanly to its last byte.
    Validate(ValidateArgs),
    /// Create a stream from a JSON manifest.
    Encode(EncodeArgs),
    /// Render every message of a stream.
    Decode(DecodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `bt inspect`.
///
/// ```text
/// ┌─────────────┬────────────────────────────────────────────────────┐
/// │ Flag        │ Effect                                             │
/// ├─────────────┼────────────────────────────────────────────────────┤
/// │ --show-hex  │ Hex dump of each message's raw bytes               │
/// │ --message N │ Show only the message at index N                   │
/// └─────────────┴────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the stream file.
    pub file: PathBuf,

    /// Show a hex dump of each message (16 bytes per line).
    #[arg(long)]
    pub show_hex: bool,

    /// Inspect only the message at this zero-based index.
    #[arg(long)]
    pub message: Option<usize>,
}

/// Arguments for `bt validate`.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the stream file.
    pub file: PathBuf,
}

/// Arguments for `bt encode`. See `cmd_encode` for the manifest format.
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// Path to the JSON manifest.
    pub input: PathBuf,

    /// Output stream path.
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for `bt decode`.
///
/// ```text
/// ┌─────────────────────┬──────────────────────────────────────────────┐
/// │ Flag                │ Values / default                             │
/// ├─────────────────────┼──────────────────────────────────────────────┤
/// │ --mode              │ compact (default) | tree | json              │
/// │ --follow            │ keep waiting for data at end of file         │
/// │ --retry-interval-ms │ sleep between retries (default 100)          │
/// │ --max-retries       │ give up after N empty retries                │
/// │ --max-messages      │ stop after N messages                        │
/// │ --hide-errors       │ omit the per-message error log               │
/// │ -o / --output       │ write to file instead of stdout              │
/// └─────────────────────┴──────────────────────────────────────────────┘
/// ```
///
/// Without `--follow` or `--max-retries` the stream ends at end of file.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the stream file.
    pub file: PathBuf,

    /// Output format: `compact`, `tree`, or `json`.
    #[arg(long, default_value = "compact")]
    pub mode: String,

    /// Wait for more data at end of file instead of stopping.
    #[arg(long)]
    pub follow: bool,

    /// Milliseconds to sleep before retrying an incomplete read.
    #[arg(long, default_value_t = 100)]
    pub retry_interval_ms: u64,

    /// Give up after this many consecutive empty retries.
    #[arg(long, conflicts_with = "follow")]
    pub max_retries: Option<u32>,

    /// Stop after this many messages.
    #[arg(long)]
    pub max_messages: Option<usize>,

    /// Do not print error-log entries under each message.
    #[arg(long)]
    pub hide_errors: bool,

    /// Bytes of each buffer shown in compact and tree output.
    #[arg(long, default_value_t = 32)]
    pub preview: usize,

    /// Write rendered output to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Encode(args) => cmd_encode::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).map_err(|e| anyhow!("invalid log level: {e}"))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    Ok(())
}
