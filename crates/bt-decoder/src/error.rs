use bt_wire::{TypeTag, WireError};

/// Violations of the ByteTrain grammar.
///
/// These are always fatal for the message being decoded: the stream is
/// not resynchronised and nothing is skipped.
///
/// ```text
/// ┌─────────────────────────┬───────────────────────────────────────────┐
/// │ Variant                 │ Cause                                     │
/// ├─────────────────────────┼───────────────────────────────────────────┤
/// │ Wire                    │ unknown tag byte or magic code            │
/// │ UnexpectedChainElement  │ non-buffer tag inside a Chain             │
/// │ NestedBreak             │ Break among another Break's sub-messages  │
/// │ UnexpectedHandlerEnd    │ HandlerEnd with no open composite         │
/// │ UnterminatedComposite   │ depth not back to 0 at message end        │
/// │ BreakNotUnwound         │ break level not back to 0 at message end  │
/// │ DepthLimitExceeded      │ nesting deeper than DecoderConfig allows  │
/// │ BufferTooLarge          │ length prefix above DecoderConfig limit   │
/// └─────────────────────────┴───────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("unexpected {tag:?} tag inside a chain (only buffers may be chained)")]
    UnexpectedChainElement { tag: TypeTag },

    #[error("nested break: a break cannot appear inside another break's sub-messages")]
    NestedBreak,

    #[error("HandlerEnd outside of any composite")]
    UnexpectedHandlerEnd,

    #[error("message ended with {depth} composite(s) still open")]
    UnterminatedComposite { depth: usize },

    #[error("break did not unwind: {remaining} level(s) left at message end")]
    BreakNotUnwound { remaining: u8 },

    #[error("composite nesting exceeds limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("buffer of {len} bytes exceeds limit of {limit}")]
    BufferTooLarge { len: u64, limit: usize },
}

/// Errors returned by [`StreamDecoder`](crate::StreamDecoder).
///
/// Exhaustion ("the data stopped") and protocol violations ("the data is
/// wrong") are separate variants.
///
/// ```text
///   DecodeError
///   ├── Exhausted { reason, code } ← wait policy gave up on an incomplete read
///   ├── Protocol(ProtocolError)    ← stream violates the grammar
///   ├── SourceContract             ← source returned the wrong number of bytes
///   └── Io(std::io::Error)         ← source failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The wait policy reported exhaustion while a read was pending.
    ///
    /// `reason` and `code` are passed through from the policy unchanged.
    #[error("stream exhausted: {reason} (code {code})")]
    Exhausted { reason: String, code: u32 },

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// A [`ByteSource`](crate::ByteSource) answered `Ready` with a length
    /// other than the one requested.
    #[error("byte source returned {got} bytes, {wanted} requested")]
    SourceContract { wanted: usize, got: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// The inner [`ProtocolError`], if this is a grammar violation.
    #[must_use]
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<WireError> for DecodeError {
    fn from(err: WireError) -> Self {
        Self::Protocol(ProtocolError::Wire(err))
    }
}
