/// Implementation of `bt decode`.
///
/// Opens the stream file as a [`ReaderSource`], picks a wait policy from
/// the flags, and hands both to the session driver, which renders every
/// message in the chosen output mode.
///
/// ```text
/// ┌──────────────────────────────┬──────────────────────────────────────┐
/// │ Flags                        │ Wait policy                          │
/// ├──────────────────────────────┼──────────────────────────────────────┤
/// │ (none)                       │ NoWait: stop at end of file          │
/// │ --max-retries N              │ SleepRetry, give up after N retries  │
/// │ --follow                     │ SleepRetry without a limit           │
/// └──────────────────────────────┴──────────────────────────────────────┘
/// ```
///
/// `--retry-interval-ms` sets the sleep between retries for both
/// `SleepRetry` forms.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use bt_decoder::{NoWait, ReaderSource, SleepRetry, StreamDecoder, WaitPolicy};
use bt_driver::{DefaultDriver, DriverConfig, OutputMode, run_session};
use tracing::{info, warn};

use crate::DecodeArgs;

/// Run the `bt decode` command.
///
/// # Errors
///
/// Returns an error if `--mode` is unknown, the input cannot be opened,
/// the output cannot be written, or the stream is malformed or ends
/// mid-message.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let mode: OutputMode = args.mode.parse()?;
    let config = DriverConfig {
        mode,
        show_errors: !args.hide_errors,
        buffer_preview: args.preview,
        max_messages: args.max_messages,
    };

    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let mut decoder = StreamDecoder::new(ReaderSource::new(file), wait_policy(args));
    info!(file = %args.file.display(), ?mode, follow = args.follow, "decoding stream");

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = run_session(&mut decoder, &DefaultDriver, &config, &mut out)
        .inspect_err(|e| warn!(offset = decoder.offset(), error = %e, "session aborted"))
        .with_context(|| format!("failed to decode {}", args.file.display()))?;

    info!(
        messages = summary.messages,
        error_records = summary.error_records,
        bytes = summary.bytes,
        "decode finished"
    );
    Ok(())
}

fn wait_policy(args: &DecodeArgs) -> Box<dyn WaitPolicy> {
    let interval = Duration::from_millis(args.retry_interval_ms);
    if args.follow {
        Box::new(SleepRetry::follow(interval))
    } else if let Some(max) = args.max_retries {
        Box::new(SleepRetry::new(interval, max))
    } else {
        Box::new(NoWait)
    }
}
