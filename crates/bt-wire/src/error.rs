/// Errors raised while interpreting raw wire identifiers.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// A tag byte that is not in the protocol's numbering table.
    #[error("unknown type tag {tag:#04X}")]
    UnknownTag { tag: u8 },

    /// A `HandlerBegin` magic code that names no known composite.
    #[error("unknown magic code {magic:#06X}")]
    UnknownMagic { magic: u16 },
}
