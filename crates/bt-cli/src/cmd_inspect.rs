/// Implementation of `bt inspect`.
///
/// Decodes every message of a stream file and prints one summary line per
/// message, plus the error-log entries recorded while decoding it.
///
/// # Output format
///
/// ```text
/// Message 0 @0: integer u8 (2 bytes)
/// Message 1 @2: array of 3 (19 bytes), 1 error record
///          error@3 level=1 (1 message)
/// Message 2 @21: buffer of 5 (7 bytes)
/// ---
/// 3 messages, 28 bytes
/// ```
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result};
use bt_decoder::{NoWait, SliceSource, StreamDecoder};
use bt_types::Value;
use tracing::info;

use crate::InspectArgs;

/// Run the `bt inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a message fails to
/// decode. Messages before the failing one are still printed.
pub fn run(args: &InspectArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    info!(file = %args.file.display(), len = bytes.len(), "inspecting stream");

    let mut decoder = StreamDecoder::new(SliceSource::new(&bytes), NoWait);
    let mut count = 0usize;

    while let Some(message) = decoder
        .next_message()
        .with_context(|| format!("failed to decode message {count} at byte {}", decoder.offset()))?
    {
        let idx = count;
        count += 1;
        if let Some(target) = args.message
            && idx != target
        {
            continue;
        }

        let errors = message.errors.len();
        let error_note = match errors {
            0 => String::new(),
            1 => ", 1 error record".to_string(),
            n => format!(", {n} error records"),
        };
        println!(
            "Message {idx} @{}: {} ({} bytes){error_note}",
            message.offset,
            describe(&message.value),
            message.len
        );

        for (index, record) in &message.errors {
            let n = record.messages.len();
            println!(
                "         error@{index} level={} ({n} message{})",
                record.level,
                if n == 1 { "" } else { "s" }
            );
        }

        if args.show_hex {
            // Offsets come from the decoder over this same buffer.
            #[allow(clippy::cast_possible_truncation)]
            let (start, len) = (message.offset as usize, message.len as usize);
            println!("         Hex dump:");
            for line in hex_dump(&bytes[start..start + len]) {
                println!("           {line}");
            }
        }
    }

    println!("---");
    println!(
        "{count} message{}, {} bytes",
        if count == 1 { "" } else { "s" },
        decoder.offset()
    );
    Ok(())
}

/// Short description of a top-level value, e.g. `integer u16`,
/// `buffer of 5`, `array of 3`, `error level=1`.
fn describe(value: &Value) -> String {
    match value {
        Value::Integer { width, .. } => format!("integer u{}", width.bits()),
        Value::Buffer(bytes) => format!("buffer of {}", bytes.len()),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Error(record) => format!("error level={}", record.level),
    }
}

/// 16 bytes per line: offset, hex, printable ASCII.
fn hex_dump(raw: &[u8]) -> Vec<String> {
    raw.chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let hex = chunk
                .iter()
                .fold(String::with_capacity(chunk.len() * 3), |mut s, b| {
                    if !s.is_empty() {
                        s.push(' ');
                    }
                    let _ = write!(s, "{b:02x}");
                    s
                });
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
                .collect();
            format!("{:04x}  {hex:<48}  {ascii}", i * 16)
        })
        .collect()
}
