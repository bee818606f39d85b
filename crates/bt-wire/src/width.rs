/// Byte widths shared by fixed-size integers and buffer length prefixes.
///
/// ```text
/// ┌────────┬───────┬──────────────────────┐
/// │ Width  │ Bytes │ Max value            │
/// ├────────┼───────┼──────────────────────┤
/// │ Byte   │ 1     │ 0xFF                 │
/// │ Word   │ 2     │ 0xFFFF               │
/// │ Dword  │ 4     │ 0xFFFF_FFFF          │
/// │ Qword  │ 8     │ 0xFFFF_FFFF_FFFF_FFFF│
/// └────────┴───────┴──────────────────────┘
/// ```
///
/// All multi-byte values on the wire are little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Width {
    Byte,
    Word,
    Dword,
    Qword,
}

impl Width {
    pub const ALL: [Width; 4] = [Width::Byte, Width::Word, Width::Dword, Width::Qword];

    /// Number of bytes this width occupies on the wire.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Dword => 4,
            Self::Qword => 8,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Byte => 8,
            Self::Word => 16,
            Self::Dword => 32,
            Self::Qword => 64,
        }
    }

    /// Largest unsigned value representable in this width.
    #[must_use]
    pub const fn max_value(self) -> u64 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
            Self::Dword => 0xFFFF_FFFF,
            Self::Qword => u64::MAX,
        }
    }

    /// Narrowest width able to hold `value`.
    ///
    /// The encoder uses this to pick the length prefix of a buffer, so a
    /// 200-byte buffer is framed as a `ByteBuffer` and a 70 000-byte one
    /// as a `DwordBuffer`.
    #[must_use]
    pub const fn smallest_for(value: u64) -> Self {
        if value <= Self::Byte.max_value() {
            Self::Byte
        } else if value <= Self::Word.max_value() {
            Self::Word
        } else if value <= Self::Dword.max_value() {
            Self::Dword
        } else {
            Self::Qword
        }
    }

    /// Decode the first [`bytes`](Self::bytes) bytes of `buf` as a
    /// little-endian unsigned integer.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than the width.
    #[must_use]
    pub fn read_le(self, buf: &[u8]) -> u64 {
        let n = self.bytes();
        let mut raw = [0u8; 8];
        raw[..n].copy_from_slice(&buf[..n]);
        u64::from_le_bytes(raw)
    }

    /// Append the low [`bytes`](Self::bytes) bytes of `value` to `out`,
    /// little-endian. Higher bytes are dropped; callers check
    /// [`max_value`](Self::max_value) first.
    pub fn write_le(self, value: u64, out: &mut Vec<u8>) {
        out.extend_from_slice(&value.to_le_bytes()[..self.bytes()]);
    }
}
