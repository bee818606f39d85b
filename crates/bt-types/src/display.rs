use std::fmt;

use crate::value::{ErrorRecord, Value};

/// Compact single-line notation.
///
/// ```text
/// Integer   u16(300)
/// Buffer    b"abc"      (non-printable bytes escaped as \xNN)
/// Array     [u8(5), u16(300)]
/// Error     error(1)[b"timeout"]
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, usize::MAX)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record(f, self, usize::MAX)
    }
}

/// The same notation with every buffer cut to its first `limit` bytes,
/// followed by `…(+N bytes)` for the hidden rest.
pub struct Preview<'a> {
    target: Target<'a>,
    limit: usize,
}

enum Target<'a> {
    Value(&'a Value),
    List(&'a [Value]),
}

impl Value {
    #[must_use]
    pub fn preview(&self, limit: usize) -> Preview<'_> {
        Preview {
            target: Target::Value(self),
            limit,
        }
    }
}

/// [`Preview`] of a bracketed list, as used for break sub-messages.
#[must_use]
pub fn preview_list(items: &[Value], limit: usize) -> Preview<'_> {
    Preview {
        target: Target::List(items),
        limit,
    }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Target::Value(value) => write_value(f, value, self.limit),
            Target::List(items) => write_list(f, items, self.limit),
        }
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, limit: usize) -> fmt::Result {
    match value {
        Value::Integer { width, value } => write!(f, "u{}({value})", width.bits()),
        Value::Buffer(bytes) => write_buffer(f, bytes, limit),
        Value::Array(items) => write_list(f, items, limit),
        Value::Error(record) => write_record(f, record, limit),
    }
}

fn write_buffer(f: &mut fmt::Formatter<'_>, bytes: &[u8], limit: usize) -> fmt::Result {
    if bytes.len() <= limit {
        return write!(f, "b\"{}\"", bytes.escape_ascii());
    }
    write!(
        f,
        "b\"{}\"…(+{} bytes)",
        bytes[..limit].escape_ascii(),
        bytes.len() - limit
    )
}

fn write_record(f: &mut fmt::Formatter<'_>, record: &ErrorRecord, limit: usize) -> fmt::Result {
    write!(f, "error({})", record.level)?;
    write_list(f, &record.messages, limit)
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Value], limit: usize) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_value(f, item, limit)?;
    }
    f.write_str("]")
}
