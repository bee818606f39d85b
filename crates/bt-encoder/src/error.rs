use bt_wire::{TypeTag, Width};

/// Errors that can occur while building a ByteTrain stream.
///
/// The builder records the first misuse and reports it from
/// [`StreamEncoder::encode`](crate::StreamEncoder::encode); later calls
/// after a failure are ignored.
///
/// ```text
///   EncodeError
///   ├── EmptyStream          ← encode() with no complete message
///   ├── UnclosedComposite    ← begin() without matching end()
///   ├── NoOpenComposite      ← end() with nothing open
///   ├── InvalidChainElement  ← non-buffer written inside a chain
///   ├── ValueOutOfRange      ← integer wider than its width
///   ├── LengthOverflow       ← buffer longer than its prefix can state
///   ├── NestedBreak          ← break_with() inside a break
///   ├── BreakLevelTooDeep    ← break aborts more composites than are open
///   ├── TooManyBreakMessages ← more than 255 break sub-messages
///   └── ElementsAfterAbort   ← array items after a break closed the array
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("no messages have been written to the encoder")]
    EmptyStream,

    #[error("{depth} composite(s) left open")]
    UnclosedComposite { depth: usize },

    #[error("end() called with no open composite")]
    NoOpenComposite,

    #[error("{tag:?} cannot be written inside a chain")]
    InvalidChainElement { tag: TypeTag },

    #[error("value {value} does not fit in {width:?}")]
    ValueOutOfRange { width: Width, value: u64 },

    #[error("buffer of {len} bytes does not fit a {width:?} length prefix")]
    LengthOverflow { width: Width, len: usize },

    #[error("break_with called inside another break")]
    NestedBreak,

    #[error("break level {level} exceeds open composite depth {depth}")]
    BreakLevelTooDeep { level: u8, depth: usize },

    #[error("break carries {count} sub-messages, at most 255 allowed")]
    TooManyBreakMessages { count: usize },

    #[error("array has elements after a break that aborted it")]
    ElementsAfterAbort,
}
