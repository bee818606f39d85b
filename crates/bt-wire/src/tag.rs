use crate::error::WireError;
use crate::width::Width;

/// One-byte discriminator that selects how the following bytes are read.
///
/// The numbering below is the canonical table for
/// [`PROTOCOL_VERSION`](crate::PROTOCOL_VERSION) 1.
///
/// ```text
/// ┌──────┬──────────────┬─────────────────────────────────────────────┐
/// │ Wire │ Variant      │ Payload                                     │
/// ├──────┼──────────────┼─────────────────────────────────────────────┤
/// │ 0x01 │ Byte         │ 1 byte                                      │
/// │ 0x02 │ Word         │ 2 bytes                                     │
/// │ 0x03 │ Dword        │ 4 bytes                                     │
/// │ 0x04 │ Qword        │ 8 bytes                                     │
/// │ 0x05 │ ByteBuffer   │ 1-byte length L, then L bytes               │
/// │ 0x06 │ WordBuffer   │ 2-byte length L, then L bytes               │
/// │ 0x07 │ DwordBuffer  │ 4-byte length L, then L bytes               │
/// │ 0x08 │ QwordBuffer  │ 8-byte length L, then L bytes               │
/// │ 0x09 │ HandlerBegin │ 2-byte magic code, then the nested stream   │
/// │ 0x0A │ HandlerEnd   │ none                                        │
/// │ 0x0B │ Break        │ level (1), count (1), then count messages   │
/// └──────┴──────────────┴─────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Byte = 0x01,
    Word = 0x02,
    Dword = 0x03,
    Qword = 0x04,
    ByteBuffer = 0x05,
    WordBuffer = 0x06,
    DwordBuffer = 0x07,
    QwordBuffer = 0x08,
    HandlerBegin = 0x09,
    HandlerEnd = 0x0A,
    Break = 0x0B,
}

/// Decoding shape of a [`TypeTag`].
///
/// The decoder matches on this rather than on the tag itself so the
/// scalar and buffer families collapse into one arm each, parameterised
/// by their [`Width`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagClass {
    Scalar(Width),
    Buffer(Width),
    HandlerBegin,
    HandlerEnd,
    Break,
}

impl TypeTag {
    pub const ALL: [TypeTag; 11] = [
        TypeTag::Byte,
        TypeTag::Word,
        TypeTag::Dword,
        TypeTag::Qword,
        TypeTag::ByteBuffer,
        TypeTag::WordBuffer,
        TypeTag::DwordBuffer,
        TypeTag::QwordBuffer,
        TypeTag::HandlerBegin,
        TypeTag::HandlerEnd,
        TypeTag::Break,
    ];

    #[must_use]
    pub const fn wire_id(self) -> u8 {
        self as u8
    }

    /// Parse a wire byte into a [`TypeTag`].
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownTag`] for any byte outside the table.
    pub const fn from_wire_id(id: u8) -> Result<Self, WireError> {
        match id {
            0x01 => Ok(Self::Byte),
            0x02 => Ok(Self::Word),
            0x03 => Ok(Self::Dword),
            0x04 => Ok(Self::Qword),
            0x05 => Ok(Self::ByteBuffer),
            0x06 => Ok(Self::WordBuffer),
            0x07 => Ok(Self::DwordBuffer),
            0x08 => Ok(Self::QwordBuffer),
            0x09 => Ok(Self::HandlerBegin),
            0x0A => Ok(Self::HandlerEnd),
            0x0B => Ok(Self::Break),
            tag => Err(WireError::UnknownTag { tag }),
        }
    }

    /// Scalar tag carrying an integer of `width`.
    #[must_use]
    pub const fn scalar(width: Width) -> Self {
        match width {
            Width::Byte => Self::Byte,
            Width::Word => Self::Word,
            Width::Dword => Self::Dword,
            Width::Qword => Self::Qword,
        }
    }

    /// Buffer tag whose length prefix has `width`.
    #[must_use]
    pub const fn buffer(width: Width) -> Self {
        match width {
            Width::Byte => Self::ByteBuffer,
            Width::Word => Self::WordBuffer,
            Width::Dword => Self::DwordBuffer,
            Width::Qword => Self::QwordBuffer,
        }
    }

    #[must_use]
    pub const fn class(self) -> TagClass {
        match self {
            Self::Byte => TagClass::Scalar(Width::Byte),
            Self::Word => TagClass::Scalar(Width::Word),
            Self::Dword => TagClass::Scalar(Width::Dword),
            Self::Qword => TagClass::Scalar(Width::Qword),
            Self::ByteBuffer => TagClass::Buffer(Width::Byte),
            Self::WordBuffer => TagClass::Buffer(Width::Word),
            Self::DwordBuffer => TagClass::Buffer(Width::Dword),
            Self::QwordBuffer => TagClass::Buffer(Width::Qword),
            Self::HandlerBegin => TagClass::HandlerBegin,
            Self::HandlerEnd => TagClass::HandlerEnd,
            Self::Break => TagClass::Break,
        }
    }

    #[must_use]
    pub const fn is_buffer(self) -> bool {
        matches!(self.class(), TagClass::Buffer(_))
    }
}

impl TryFrom<u8> for TypeTag {
    type Error = WireError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_wire_id(id)
    }
}
