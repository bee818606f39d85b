use bt_types::Value;
use bt_wire::{MagicCode, TypeTag, Width};
use tracing::debug;

use crate::error::EncodeError;

/// Builder that writes a ByteTrain stream into memory.
///
/// Methods append one tagged element each and return `&mut Self` so calls
/// chain. The encoder tracks open composites, so it can reject streams the
/// decoder would refuse: unbalanced `begin`/`end`, non-buffers inside a
/// chain, or a break that aborts more composites than are open.
///
/// # Usage
///
/// ```rust
/// use bt_encoder::StreamEncoder;
/// use bt_wire::MagicCode;
///
/// let stream = StreamEncoder::new()
///     .begin(MagicCode::Array)
///     .byte(5)
///     .word(300)
///     .end()
///     .chain([b"hello, ".as_slice(), b"world".as_slice()])
///     .encode()
///     .unwrap();
///
/// assert_eq!(&stream[..3], &[0x09, 0x02, 0x00]);
/// ```
///
/// # Breaks
///
/// [`break_with`](Self::break_with) writes a `Break` whose sub-messages
/// are produced by a closure. Its `level` aborts that many enclosing
/// composites; they receive no `HandlerEnd`:
///
/// ```text
///   enc.begin(Array)            09 02 00
///      .byte(1)                 01 01
///      .break_with(1, |e| {     0B 01 01
///          e.buffer(b"bad");    05 03 62 61 64
///      })                       (array closed by the break)
///      .byte(2)                 01 02   ← next top-level message
/// ```
#[derive(Debug, Default)]
pub struct StreamEncoder {
    buf: Vec<u8>,
    frames: Vec<MagicCode>,
    /// Complete top-level messages written so far.
    messages: usize,
    in_break: bool,
    error: Option<EncodeError>,
}

impl StreamEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of composites currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages
    }

    // ── Scalars and buffers ───────────────────────────────────────────────────

    pub fn byte(&mut self, value: u8) -> &mut Self {
        self.integer(Width::Byte, value.into())
    }

    pub fn word(&mut self, value: u16) -> &mut Self {
        self.integer(Width::Word, value.into())
    }

    pub fn dword(&mut self, value: u32) -> &mut Self {
        self.integer(Width::Dword, value.into())
    }

    pub fn qword(&mut self, value: u64) -> &mut Self {
        self.integer(Width::Qword, value)
    }

    /// Write an integer with an explicit width.
    pub fn integer(&mut self, width: Width, value: u64) -> &mut Self {
        let tag = TypeTag::scalar(width);
        if !self.admit(tag) {
            return self;
        }
        if value > width.max_value() {
            return self.fail(EncodeError::ValueOutOfRange { width, value });
        }
        self.buf.push(tag.wire_id());
        width.write_le(value, &mut self.buf);
        self.complete();
        self
    }

    /// Write a buffer using the narrowest length prefix that fits.
    pub fn buffer(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer_with_width(Width::smallest_for(bytes.len() as u64), bytes)
    }

    /// Write a buffer with a specific length-prefix width.
    pub fn buffer_with_width(&mut self, width: Width, bytes: &[u8]) -> &mut Self {
        let tag = TypeTag::buffer(width);
        if !self.admit(tag) {
            return self;
        }
        let len = bytes.len() as u64;
        if len > width.max_value() {
            return self.fail(EncodeError::LengthOverflow {
                width,
                len: bytes.len(),
            });
        }
        self.buf.push(tag.wire_id());
        width.write_le(len, &mut self.buf);
        self.buf.extend_from_slice(bytes);
        self.complete();
        self
    }

    // ── Composites ────────────────────────────────────────────────────────────

    pub fn begin(&mut self, magic: MagicCode) -> &mut Self {
        if !self.admit(TypeTag::HandlerBegin) {
            return self;
        }
        self.buf.push(TypeTag::HandlerBegin.wire_id());
        Width::Word.write_le(magic.wire_id().into(), &mut self.buf);
        self.frames.push(magic);
        self
    }

    pub fn end(&mut self) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.frames.pop().is_none() {
            return self.fail(EncodeError::NoOpenComposite);
        }
        self.buf.push(TypeTag::HandlerEnd.wire_id());
        self.complete();
        self
    }

    /// Write a whole chain: `begin(Chain)`, one buffer per fragment, `end()`.
    pub fn chain<'a>(&mut self, fragments: impl IntoIterator<Item = &'a [u8]>) -> &mut Self {
        self.begin(MagicCode::Chain);
        for fragment in fragments {
            self.buffer(fragment);
        }
        self.end()
    }

    /// Write a `Break` that aborts `level` open composites.
    ///
    /// `write` receives a fresh encoder in break mode; every complete
    /// top-level message it writes becomes one sub-message, and their
    /// number is the break's `count`. After the break, the innermost
    /// `level` composites count as closed.
    pub fn break_with(&mut self, level: u8, write: impl FnOnce(&mut StreamEncoder)) -> &mut Self {
        if !self.admit(TypeTag::Break) {
            return self;
        }
        if self.in_break {
            return self.fail(EncodeError::NestedBreak);
        }
        let depth = self.frames.len();
        if usize::from(level) > depth {
            return self.fail(EncodeError::BreakLevelTooDeep { level, depth });
        }

        let mut sub = StreamEncoder {
            in_break: true,
            ..StreamEncoder::default()
        };
        write(&mut sub);
        if let Some(err) = sub.error {
            return self.fail(err);
        }
        if !sub.frames.is_empty() {
            return self.fail(EncodeError::UnclosedComposite {
                depth: sub.frames.len(),
            });
        }
        let Ok(count) = u8::try_from(sub.messages) else {
            return self.fail(EncodeError::TooManyBreakMessages {
                count: sub.messages,
            });
        };

        self.buf
            .extend_from_slice(&[TypeTag::Break.wire_id(), level, count]);
        self.buf.extend_from_slice(&sub.buf);
        self.frames.truncate(depth - usize::from(level));
        self.complete();
        self
    }

    /// Write a decoded value tree back to the stream.
    ///
    /// Arrays are written with [`MagicCode::Array`] and `Error` nodes as
    /// breaks. When a break inside an array aborts it, the array gets no
    /// `HandlerEnd`, exactly as the decoder saw it.
    pub fn value(&mut self, value: &Value) -> &mut Self {
        match value {
            Value::Integer { width, value } => self.integer(*width, *value),
            Value::Buffer(bytes) => self.buffer(bytes),
            Value::Array(items) => {
                let outer = self.frames.len();
                self.begin(MagicCode::Array);
                for (i, item) in items.iter().enumerate() {
                    if self.error.is_some() {
                        return self;
                    }
                    self.value(item);
                    if self.frames.len() <= outer {
                        if i + 1 < items.len() {
                            return self.fail(EncodeError::ElementsAfterAbort);
                        }
                        return self;
                    }
                }
                self.end()
            }
            Value::Error(record) => self.break_with(record.level, |sub| {
                for message in &record.messages {
                    sub.value(message);
                }
            }),
        }
    }

    /// Return the encoded stream.
    ///
    /// # Errors
    ///
    /// The first builder misuse, [`EncodeError::UnclosedComposite`] if a
    /// composite is still open, or [`EncodeError::EmptyStream`] if no
    /// message was completed.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if !self.frames.is_empty() {
            return Err(EncodeError::UnclosedComposite {
                depth: self.frames.len(),
            });
        }
        if self.messages == 0 {
            return Err(EncodeError::EmptyStream);
        }
        Ok(self.buf.clone())
    }

    // ── Bookkeeping ───────────────────────────────────────────────────────────

    /// Whether `tag` may be written now. Records the error if not.
    fn admit(&mut self, tag: TypeTag) -> bool {
        if self.error.is_some() {
            return false;
        }
        let in_chain = self.frames.last() == Some(&MagicCode::Chain);
        if in_chain && !tag.is_buffer() && tag != TypeTag::Break {
            self.fail(EncodeError::InvalidChainElement { tag });
            return false;
        }
        true
    }

    fn fail(&mut self, err: EncodeError) -> &mut Self {
        debug!(error = %err, "encoder rejected element");
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    /// An element just finished; at depth zero that is a whole message.
    fn complete(&mut self) {
        if self.frames.is_empty() {
            self.messages += 1;
        }
    }
}
