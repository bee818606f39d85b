use std::fmt::Write as _;

use bt_decoder::DecodedMessage;
use bt_types::Value;

use crate::config::DriverConfig;

/// Tree renderer: one node per line, children indented two spaces.
///
/// Example output:
///
/// ```text
/// message @0 (19 bytes)
///   array (3)
///     u8 5
///     buffer (3) b"abc"
///     error level=1 (1)
///       buffer (4) b"oops"
///   errors:
///     @3 level=1 (1 message)
/// ```
pub struct TreeRenderer;

impl TreeRenderer {
    #[must_use]
    pub fn render(message: &DecodedMessage, config: &DriverConfig) -> String {
        let mut out = format!("message @{} ({} bytes)", message.offset, message.len);
        write_node(&mut out, &message.value, 1, config.buffer_preview);

        if config.show_errors && !message.errors.is_empty() {
            out.push_str("\n  errors:");
            for (index, record) in &message.errors {
                let n = record.messages.len();
                let plural = if n == 1 { "" } else { "s" };
                let _ = write!(
                    out,
                    "\n    @{index} level={} ({n} message{plural})",
                    record.level
                );
            }
        }
        out
    }
}

fn write_node(out: &mut String, value: &Value, depth: usize, preview: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Integer { width, value } => {
            let _ = write!(out, "\n{indent}u{} {value}", width.bits());
        }
        Value::Buffer(bytes) => {
            let _ = write!(
                out,
                "\n{indent}buffer ({}) {}",
                bytes.len(),
                value.preview(preview)
            );
        }
        Value::Array(items) => {
            let _ = write!(out, "\n{indent}array ({})", items.len());
            for item in items {
                write_node(out, item, depth + 1, preview);
            }
        }
        Value::Error(record) => {
            let _ = write!(
                out,
                "\n{indent}error level={} ({})",
                record.level,
                record.messages.len()
            );
            for item in &record.messages {
                write_node(out, item, depth + 1, preview);
            }
        }
    }
}
