/// Implementation of `bt encode`.
///
/// Parses a JSON manifest describing a sequence of top-level messages and
/// writes them as one stream using `StreamEncoder`.
///
/// # Manifest format
///
/// ```json
/// {
///   "messages": [
///     { "type": "word", "value": 300 },
///     { "type": "buffer", "text": "hello" },
///     { "type": "buffer", "hex": "00ff10" },
///     { "type": "chain", "fragments": [{ "text": "ab" }, { "hex": "6364" }] },
///     { "type": "array", "items": [
///         { "type": "byte", "value": 5 },
///         { "type": "error", "level": 1, "messages": [{ "type": "byte", "value": 9 }] }
///     ] },
///     { "type": "error", "level": 0, "messages": [] }
///   ]
/// }
/// ```
///
/// # Entry types
///
/// ```text
/// ┌──────────────────────────────┬─────────────────────────────────────────┐
/// │ Type                         │ Fields                                  │
/// ├──────────────────────────────┼─────────────────────────────────────────┤
/// │ byte / word / dword / qword  │ value                                   │
/// │ buffer                       │ text or hex                             │
/// │ chain                        │ fragments: [{text or hex}]              │
/// │ array / struct               │ items: [entry]                          │
/// │ error                        │ level, messages: [entry]                │
/// └──────────────────────────────┴─────────────────────────────────────────┘
/// ```
///
/// An `error` entry with `level` ≥ 1 aborts that many enclosing arrays, so
/// it must be the last item of each array it closes.
use std::fs;

use anyhow::{Context, Result, anyhow, bail};
use bt_encoder::StreamEncoder;
use bt_wire::MagicCode;
use tracing::info;

use crate::EncodeArgs;

// ── Manifest serde types ──────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct Manifest {
    messages: Vec<Entry>,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Entry {
    Byte { value: u8 },
    Word { value: u16 },
    Dword { value: u32 },
    Qword { value: u64 },
    Buffer {
        text: Option<String>,
        hex: Option<String>,
    },
    Chain { fragments: Vec<Bytes> },
    Array { items: Vec<Entry> },
    Struct { items: Vec<Entry> },
    Error {
        level: u8,
        #[serde(default)]
        messages: Vec<Entry>,
    },
}

/// Buffer contents, given as UTF-8 text or a hex string.
#[derive(serde::Deserialize)]
struct Bytes {
    text: Option<String>,
    hex: Option<String>,
}

// ── Command ───────────────────────────────────────────────────────────────────

/// Run the `bt encode` command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or parsed, an entry is
/// invalid, or the output file cannot be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let stream = encode_manifest(&text)?;

    fs::write(&args.output, &stream)
        .with_context(|| format!("cannot write {}", args.output.display()))?;
    info!(output = %args.output.display(), len = stream.len(), "stream written");
    println!("Wrote {} bytes to {}", stream.len(), args.output.display());
    Ok(())
}

/// Parse a manifest and encode its messages.
fn encode_manifest(text: &str) -> Result<Vec<u8>> {
    let manifest: Manifest = serde_json::from_str(text).context("invalid manifest")?;

    let mut encoder = StreamEncoder::new();
    for (i, entry) in manifest.messages.iter().enumerate() {
        write_entry(&mut encoder, entry).with_context(|| format!("message {i}"))?;
    }
    encoder.encode().context("manifest does not form a valid stream")
}

fn write_entry(encoder: &mut StreamEncoder, entry: &Entry) -> Result<()> {
    match entry {
        Entry::Byte { value } => {
            encoder.byte(*value);
        }
        Entry::Word { value } => {
            encoder.word(*value);
        }
        Entry::Dword { value } => {
            encoder.dword(*value);
        }
        Entry::Qword { value } => {
            encoder.qword(*value);
        }
        Entry::Buffer { text, hex } => {
            let bytes = resolve_bytes(text.as_deref(), hex.as_deref())?;
            encoder.buffer(&bytes);
        }
        Entry::Chain { fragments } => {
            let fragments = fragments
                .iter()
                .map(|f| resolve_bytes(f.text.as_deref(), f.hex.as_deref()))
                .collect::<Result<Vec<_>>>()?;
            encoder.chain(fragments.iter().map(Vec::as_slice));
        }
        Entry::Array { items } => write_sequence(encoder, MagicCode::Array, items)?,
        Entry::Struct { items } => write_sequence(encoder, MagicCode::Struct, items)?,
        Entry::Error { level, messages } => {
            let mut inner = Ok(());
            encoder.break_with(*level, |sub| {
                for message in messages {
                    if let Err(e) = write_entry(sub, message) {
                        inner = Err(e);
                        return;
                    }
                }
            });
            inner.context("error sub-message")?;
        }
    }
    Ok(())
}

fn write_sequence(encoder: &mut StreamEncoder, magic: MagicCode, items: &[Entry]) -> Result<()> {
    let outer = encoder.depth();
    encoder.begin(magic);
    for (i, item) in items.iter().enumerate() {
        write_entry(encoder, item).with_context(|| format!("item {i}"))?;
        if encoder.depth() <= outer {
            if i + 1 < items.len() {
                bail!("item {i} aborts the {} but more items follow", magic.name());
            }
            return Ok(());
        }
    }
    encoder.end();
    Ok(())
}

fn resolve_bytes(text: Option<&str>, hex: Option<&str>) -> Result<Vec<u8>> {
    match (text, hex) {
        (Some(text), None) => Ok(text.as_bytes().to_vec()),
        (None, Some(hex)) => hex::decode(hex).with_context(|| format!("invalid hex {hex:?}")),
        (Some(_), Some(_)) => Err(anyhow!("give either `text` or `hex`, not both")),
        (None, None) => Err(anyhow!("buffer needs `text` or `hex`")),
    }
}
