/// Limits applied while decoding an untrusted stream.
///
/// ```text
/// ┌────────────────┬─────────┬──────────────────────────────────────────┐
/// │ Field          │ Default │ Purpose                                  │
/// ├────────────────┼─────────┼──────────────────────────────────────────┤
/// │ max_depth      │ 64      │ composite nesting allowed per context    │
/// │ max_buffer_len │ 16 MiB  │ largest single buffer and chain total    │
/// └────────────────┴─────────┴──────────────────────────────────────────┘
/// ```
///
/// Both limits are enforced before any allocation or recursion happens, so
/// a hostile length prefix fails with
/// [`ProtocolError::BufferTooLarge`](crate::ProtocolError::BufferTooLarge)
/// instead of an allocation of up to 2^64 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    pub max_depth: usize,
    pub max_buffer_len: usize,
}

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default buffer limit (16 MiB).
pub const DEFAULT_MAX_BUFFER_LEN: usize = 16 * 1024 * 1024;

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
        }
    }
}
