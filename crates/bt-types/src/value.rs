use std::collections::BTreeMap;

use bt_wire::Width;

/// A decoded ByteTrain node.
///
/// The variant is fixed by the tag (or magic code) that produced it:
///
/// ```text
/// ┌──────────────────────────────┬──────────────────────────────┐
/// │ Wire                         │ Value                        │
/// ├──────────────────────────────┼──────────────────────────────┤
/// │ Byte / Word / Dword / Qword  │ Integer { width, value }     │
/// │ *Buffer                      │ Buffer(bytes)                │
/// │ HandlerBegin + Chain         │ Buffer(concatenated bytes)   │
/// │ HandlerBegin + Array/Struct  │ Array(values)                │
/// │ Break                        │ Error(ErrorRecord)           │
/// └──────────────────────────────┴──────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Integer { width: Width, value: u64 },
    Buffer(Vec<u8>),
    Array(Vec<Value>),
    Error(ErrorRecord),
}

/// Payload of a `Break`: the abort level and its attached sub-messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Number of enclosing composites the break terminated.
    pub level: u8,
    pub messages: Vec<Value>,
}

/// Errors discovered while decoding one message, keyed by the message
/// index of the `Break` that produced them.
///
/// Indices grow in stream order, so iteration order is discovery order.
pub type ErrorLog = BTreeMap<usize, ErrorRecord>;

impl Value {
    #[must_use]
    pub fn byte(value: u8) -> Self {
        Self::Integer {
            width: Width::Byte,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn word(value: u16) -> Self {
        Self::Integer {
            width: Width::Word,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn dword(value: u32) -> Self {
        Self::Integer {
            width: Width::Dword,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn qword(value: u64) -> Self {
        Self::Integer {
            width: Width::Qword,
            value,
        }
    }

    #[must_use]
    pub fn buffer(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Buffer(bytes.into())
    }

    #[must_use]
    pub fn error(level: u8, messages: Vec<Value>) -> Self {
        Self::Error(ErrorRecord { level, messages })
    }

    /// Short lowercase name of the variant, used in listings.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer { .. } => "integer",
            Self::Buffer(_) => "buffer",
            Self::Array(_) => "array",
            Self::Error(_) => "error",
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer { value, .. } => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_error(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Error(record) => Some(record),
            _ => None,
        }
    }

    /// Total number of nodes in this tree, the root included.
    ///
    /// Sub-messages of an `Error` are counted as part of the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + match self {
            Self::Integer { .. } | Self::Buffer(_) => 0,
            Self::Array(items) => items.iter().map(Value::node_count).sum(),
            Self::Error(record) => record.messages.iter().map(Value::node_count).sum(),
        }
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::byte(value)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Self::word(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::dword(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::qword(value)
    }
}

impl From<ErrorRecord> for Value {
    fn from(record: ErrorRecord) -> Self {
        Self::Error(record)
    }
}
