/// Implementation of `bt validate`.
///
/// Decodes a stream file to its end and reports either a series of
/// success checkmarks (`✓`) or one diagnostic line (`✗`).
///
/// # Success output
///
/// ```text
/// ✓ Messages: 3 messages decoded
/// ✓ Breaks: 1 error record, all unwound
/// ✓ Stream: ends on a message boundary (28 bytes)
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: message 2 at byte 21: truncated message (stream exhausted: no wait (code 1))
/// ```
use std::fs;

use anyhow::{Context, Result, anyhow};
use bt_decoder::{DecodeError, NoWait, SliceSource, StreamDecoder};

use crate::ValidateArgs;

/// Run the `bt validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any message fails to
/// decode; the main dispatcher turns that into exit code 1.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let mut decoder = StreamDecoder::new(SliceSource::new(&bytes), NoWait);
    let mut messages = 0usize;
    let mut records = 0usize;

    loop {
        let start = decoder.offset();
        match decoder.next_message() {
            Ok(Some(message)) => {
                messages += 1;
                records += message.errors.len();
            }
            Ok(None) => break,
            Err(e) => {
                println!("✗ Error: message {messages} at byte {start}: {}", diagnostic(&e));
                return Err(anyhow!("validation failed"));
            }
        }
    }

    println!(
        "✓ Messages: {messages} message{} decoded",
        if messages == 1 { "" } else { "s" }
    );
    println!(
        "✓ Breaks: {records} error record{}, all unwound",
        if records == 1 { "" } else { "s" }
    );
    println!(
        "✓ Stream: ends on a message boundary ({} bytes)",
        decoder.offset()
    );
    Ok(())
}

/// A truncated file surfaces as exhaustion from [`NoWait`]; say so plainly.
fn diagnostic(e: &DecodeError) -> String {
    if e.is_exhausted() {
        format!("truncated message ({e})")
    } else {
        e.to_string()
    }
}
