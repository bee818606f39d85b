use crate::error::WireError;

/// Two-byte code following `HandlerBegin` that names the composite kind.
///
/// ```text
/// ┌────────┬────────┬──────────────────────────────────────────────┐
/// │ Wire   │ Kind   │ Elements                                     │
/// ├────────┼────────┼──────────────────────────────────────────────┤
/// │ 0x0001 │ Chain  │ buffers only, concatenated into one buffer   │
/// │ 0x0002 │ Array  │ any tagged message, kept in order            │
/// │ 0x0003 │ Struct │ same as Array; no field encoding is defined  │
/// └────────┴────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MagicCode {
    Chain = 0x0001,
    Array = 0x0002,
    Struct = 0x0003,
}

impl MagicCode {
    pub const ALL: [MagicCode; 3] = [MagicCode::Chain, MagicCode::Array, MagicCode::Struct];

    #[must_use]
    pub const fn wire_id(self) -> u16 {
        self as u16
    }

    /// # Errors
    ///
    /// Returns [`WireError::UnknownMagic`] for codes outside the table.
    pub const fn from_wire_id(id: u16) -> Result<Self, WireError> {
        match id {
            0x0001 => Ok(Self::Chain),
            0x0002 => Ok(Self::Array),
            0x0003 => Ok(Self::Struct),
            magic => Err(WireError::UnknownMagic { magic }),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::Array => "array",
            Self::Struct => "struct",
        }
    }
}

impl TryFrom<u16> for MagicCode {
    type Error = WireError;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        Self::from_wire_id(id)
    }
}
