use bt_types::{ErrorLog, ErrorRecord};

use crate::error::ProtocolError;

/// Per-message decoding state.
///
/// A fresh context is built for every top-level message, and a separate
/// one (in break mode) for the sub-messages attached to each `Break`. It
/// is threaded through the recursive decode by `&mut` and never shared.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────┐
/// │ Field         │ Meaning                                          │
/// ├───────────────┼──────────────────────────────────────────────────┤
/// │ depth         │ composites currently open                        │
/// │ break_level   │ enclosing loops that must still abort            │
/// │ in_break_mode │ decoding a Break's sub-messages                  │
/// │ next_index    │ message index handed to the next tag             │
/// │ errors        │ Break records keyed by their message index       │
/// └───────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default)]
pub struct DecodeContext {
    depth: usize,
    break_level: u8,
    in_break_mode: bool,
    next_index: usize,
    errors: ErrorLog,
}

impl DecodeContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for the sub-messages of a `Break`.
    #[must_use]
    pub fn for_break() -> Self {
        Self {
            in_break_mode: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn break_level(&self) -> u8 {
        self.break_level
    }

    #[must_use]
    pub fn in_break_mode(&self) -> bool {
        self.in_break_mode
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> ErrorLog {
        self.errors
    }

    /// Hand out the message index for a tag just read.
    pub(crate) fn claim_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    pub(crate) fn enter(&mut self, max_depth: usize) -> Result<(), ProtocolError> {
        if self.depth >= max_depth {
            return Err(ProtocolError::DepthLimitExceeded { limit: max_depth });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        debug_assert!(self.depth > 0, "leave() without matching enter()");
        self.depth -= 1;
    }

    /// Start unwinding for a `Break` of the given level. The caller has
    /// already rejected breaks in break mode.
    pub(crate) fn begin_break(&mut self, level: u8) {
        debug_assert!(!self.in_break_mode, "break started in break mode");
        self.break_level = level;
    }

    pub(crate) fn record_error(&mut self, index: usize, record: ErrorRecord) {
        self.errors.insert(index, record);
    }

    /// Called by a composite loop after each element. Returns `true` when
    /// the loop must terminate, having consumed one break level.
    pub(crate) fn consume_break(&mut self) -> bool {
        if self.break_level == 0 {
            return false;
        }
        self.break_level -= 1;
        true
    }

    /// Check the end-of-message invariants.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::UnterminatedComposite`] if composites are still
    /// open, [`ProtocolError::BreakNotUnwound`] if a break asked to abort
    /// more composites than were open.
    pub fn verify_balanced(&self) -> Result<(), ProtocolError> {
        if self.depth != 0 {
            return Err(ProtocolError::UnterminatedComposite { depth: self.depth });
        }
        if self.break_level != 0 {
            return Err(ProtocolError::BreakNotUnwound {
                remaining: self.break_level,
            });
        }
        Ok(())
    }
}
