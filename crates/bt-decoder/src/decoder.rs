use std::iter::FusedIterator;

use bt_types::{ErrorLog, ErrorRecord, Value};
use bt_wire::{BREAK_HEADER_LEN, MagicCode, TagClass, TypeTag, Width};
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::context::DecodeContext;
use crate::error::{DecodeError, ProtocolError};
use crate::source::{ByteSource, Take};
use crate::wait::{WaitOutcome, WaitPolicy};

/// One fully decoded top-level message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedMessage {
    /// The value tree, with `Error` nodes where breaks occurred.
    pub value: Value,
    /// Break records of this message, keyed by message index.
    pub errors: ErrorLog,
    /// Stream offset of the message's first byte.
    pub offset: u64,
    /// Number of bytes the message occupied.
    pub len: u64,
}

/// Recursive-descent decoder over a [`ByteSource`].
///
/// The decoder pulls exactly the bytes each tag needs. When the source
/// reports [`Take::Incomplete`], the [`WaitPolicy`] decides whether the
/// identical request is repeated or the stream is exhausted; the decoder
/// itself never sleeps.
///
/// ```text
///   driver ──decode_message()──▶ StreamDecoder ──take(n)──▶ ByteSource
///                                      │  ▲
///                         Incomplete   │  │ Retry / Exhausted
///                                      ▼  │
///                                   WaitPolicy
/// ```
///
/// One decoder consumes one stream; it keeps no state between messages
/// other than the byte offset.
///
/// # Example
///
/// ```rust
/// use bt_decoder::{NoWait, SliceSource, StreamDecoder};
/// use bt_types::Value;
///
/// // HandlerBegin(Array) Byte(5) Word(300) HandlerEnd
/// let bytes = [0x09, 0x02, 0x00, 0x01, 0x05, 0x02, 0x2C, 0x01, 0x0A];
/// let mut decoder = StreamDecoder::new(SliceSource::new(&bytes), NoWait);
///
/// let message = decoder.decode_message().unwrap();
/// assert_eq!(message.value, Value::Array(vec![Value::byte(5), Value::word(300)]));
/// ```
pub struct StreamDecoder<S, W> {
    source: S,
    wait: W,
    config: DecoderConfig,
    offset: u64,
}

impl<S: ByteSource, W: WaitPolicy> StreamDecoder<S, W> {
    #[must_use]
    pub fn new(source: S, wait: W) -> Self {
        Self::with_config(source, wait, DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(source: S, wait: W, config: DecoderConfig) -> Self {
        Self {
            source,
            wait,
            config,
            offset: 0,
        }
    }

    /// Bytes consumed from the source so far.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_parts(self) -> (S, W) {
        (self.source, self.wait)
    }

    /// Decode the next top-level message.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Exhausted`] when the wait policy gives up on an
    ///   incomplete read, including before the first byte.
    /// - [`DecodeError::Protocol`] when the stream violates the grammar or
    ///   the message ends with open composites or an unwound break.
    /// - [`DecodeError::Io`] / [`DecodeError::SourceContract`] when the
    ///   source fails or misbehaves.
    pub fn decode_message(&mut self) -> Result<DecodedMessage, DecodeError> {
        let start = self.offset;
        let mut ctx = DecodeContext::new();
        let value = self.decode_tagged(&mut ctx)?;
        ctx.verify_balanced()?;

        let len = self.offset - start;
        debug!(
            offset = start,
            len,
            errors = ctx.errors().len(),
            "decoded message"
        );
        Ok(DecodedMessage {
            value,
            errors: ctx.into_errors(),
            offset: start,
            len,
        })
    }

    /// Like [`decode_message`](Self::decode_message), but exhaustion
    /// before the first byte of a message is a clean end of stream and
    /// yields `Ok(None)`.
    ///
    /// Exhaustion after the message has started is still an error: the
    /// stream stopped mid-message.
    ///
    /// # Errors
    ///
    /// As [`decode_message`](Self::decode_message).
    pub fn next_message(&mut self) -> Result<Option<DecodedMessage>, DecodeError> {
        let start = self.offset;
        match self.decode_message() {
            Ok(message) => Ok(Some(message)),
            Err(DecodeError::Exhausted { reason, code }) if self.offset == start => {
                debug!(offset = start, %reason, code, "stream ended at message boundary");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Iterate over messages until the stream ends or an error occurs.
    ///
    /// The iterator yields at most one `Err` and then stops.
    pub fn messages(&mut self) -> Messages<'_, S, W> {
        Messages {
            decoder: self,
            done: false,
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Read one tag and decode the message it introduces.
    fn decode_tagged(&mut self, ctx: &mut DecodeContext) -> Result<Value, DecodeError> {
        let tag = self.read_tag()?;
        let index = ctx.claim_index();
        self.decode_body(tag, index, ctx)
    }

    /// Decode the payload of a tag that has already been read.
    fn decode_body(
        &mut self,
        tag: TypeTag,
        index: usize,
        ctx: &mut DecodeContext,
    ) -> Result<Value, DecodeError> {
        match tag.class() {
            TagClass::Scalar(width) => {
                let value = self.read_uint(width)?;
                Ok(Value::Integer { width, value })
            }
            TagClass::Buffer(width) => {
                let mut bytes = Vec::new();
                self.read_buffer_into(width, &mut bytes)?;
                Ok(Value::Buffer(bytes))
            }
            TagClass::HandlerBegin => self.read_embedded(ctx),
            TagClass::HandlerEnd => Err(ProtocolError::UnexpectedHandlerEnd.into()),
            TagClass::Break => {
                let record = self.read_break(ctx)?;
                ctx.record_error(index, record.clone());
                Ok(Value::Error(record))
            }
        }
    }

    // ── Composites ────────────────────────────────────────────────────────────

    fn read_embedded(&mut self, ctx: &mut DecodeContext) -> Result<Value, DecodeError> {
        #[allow(clippy::cast_possible_truncation)]
        let raw = self.read_uint(Width::Word)? as u16;
        let magic = MagicCode::from_wire_id(raw)?;

        ctx.enter(self.config.max_depth)?;
        trace!(magic = magic.name(), depth = ctx.depth(), "composite begin");
        let value = match magic {
            MagicCode::Chain => Value::Buffer(self.read_chain(ctx)?),
            MagicCode::Array | MagicCode::Struct => Value::Array(self.read_sequence(ctx)?),
        };
        ctx.leave();
        Ok(value)
    }

    /// Concatenate buffer fragments until `HandlerEnd` or an aborting
    /// `Break`.
    ///
    /// A break inside a chain is recorded in the error log only; the chain
    /// yields whatever bytes were joined before it.
    fn read_chain(&mut self, ctx: &mut DecodeContext) -> Result<Vec<u8>, DecodeError> {
        let mut joined = Vec::new();
        loop {
            let tag = self.read_tag()?;
            match tag.class() {
                TagClass::HandlerEnd => break,
                TagClass::Buffer(width) => {
                    ctx.claim_index();
                    self.read_buffer_into(width, &mut joined)?;
                }
                TagClass::Break => {
                    let index = ctx.claim_index();
                    let record = self.read_break(ctx)?;
                    ctx.record_error(index, record);
                }
                TagClass::Scalar(_) | TagClass::HandlerBegin => {
                    return Err(ProtocolError::UnexpectedChainElement { tag }.into());
                }
            }
            if ctx.consume_break() {
                break;
            }
        }
        Ok(joined)
    }

    /// Collect heterogeneous elements for `Array` and `Struct`.
    ///
    /// A level-0 `Break` is an ordinary element here and the loop goes on;
    /// only a pending break level ends the array before its `HandlerEnd`.
    fn read_sequence(&mut self, ctx: &mut DecodeContext) -> Result<Vec<Value>, DecodeError> {
        let mut items = Vec::new();
        loop {
            let tag = self.read_tag()?;
            if tag == TypeTag::HandlerEnd {
                break;
            }
            let index = ctx.claim_index();
            items.push(self.decode_body(tag, index, ctx)?);
            if ctx.consume_break() {
                break;
            }
        }
        Ok(items)
    }

    /// Decode a `Break` header and its sub-messages.
    ///
    /// Sets the enclosing context's break level; the sub-messages are
    /// decoded in a fresh break-mode context so their indices and state
    /// never leak into the enclosing message.
    fn read_break(&mut self, ctx: &mut DecodeContext) -> Result<ErrorRecord, DecodeError> {
        if ctx.in_break_mode() {
            return Err(ProtocolError::NestedBreak.into());
        }
        let header = self.take(BREAK_HEADER_LEN)?;
        let (level, count) = (header[0], header[1]);
        ctx.begin_break(level);

        let mut sub = DecodeContext::for_break();
        let mut messages = Vec::with_capacity(count.into());
        for _ in 0..count {
            messages.push(self.decode_tagged(&mut sub)?);
        }
        sub.verify_balanced()?;

        debug!(level, count, offset = self.offset, "break record");
        Ok(ErrorRecord { level, messages })
    }

    // ── Primitive reads ───────────────────────────────────────────────────────

    fn read_tag(&mut self) -> Result<TypeTag, DecodeError> {
        let offset = self.offset;
        let byte = self.take(1)?[0];
        let tag = TypeTag::from_wire_id(byte)?;
        trace!(offset, ?tag, "tag");
        Ok(tag)
    }

    fn read_uint(&mut self, width: Width) -> Result<u64, DecodeError> {
        let bytes = self.take(width.bytes())?;
        Ok(width.read_le(&bytes))
    }

    /// Read a length prefix of `width`, then append that many bytes to
    /// `out`. The limit applies to the final length of `out`, which bounds
    /// whole chains as well as single buffers.
    fn read_buffer_into(&mut self, width: Width, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        let declared = self.read_uint(width)?;
        let limit = self.config.max_buffer_len;
        let total = (out.len() as u64).saturating_add(declared);
        let total = usize::try_from(total)
            .ok()
            .filter(|&n| n <= limit)
            .ok_or(ProtocolError::BufferTooLarge { len: total, limit })?;

        let len = total - out.len();
        if len > 0 {
            out.extend_from_slice(&self.take(len)?);
        }
        Ok(())
    }

    /// Take exactly `n` bytes, consulting the wait policy on every
    /// incomplete result.
    fn take(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        let mut attempt = 0u32;
        loop {
            match self.source.take(n)? {
                Take::Ready(bytes) => {
                    if bytes.len() != n {
                        return Err(DecodeError::SourceContract {
                            wanted: n,
                            got: bytes.len(),
                        });
                    }
                    self.offset += n as u64;
                    return Ok(bytes);
                }
                Take::Incomplete => {
                    attempt = attempt.saturating_add(1);
                    trace!(wanted = n, attempt, offset = self.offset, "source incomplete");
                    match self.wait.on_incomplete(attempt) {
                        WaitOutcome::Retry => {}
                        WaitOutcome::Exhausted { reason, code } => {
                            debug!(%reason, code, offset = self.offset, "wait policy exhausted");
                            return Err(DecodeError::Exhausted { reason, code });
                        }
                    }
                }
            }
        }
    }
}

/// Iterator returned by [`StreamDecoder::messages`].
pub struct Messages<'a, S, W> {
    decoder: &'a mut StreamDecoder<S, W>,
    done: bool,
}

impl<S: ByteSource, W: WaitPolicy> Iterator for Messages<'_, S, W> {
    type Item = Result<DecodedMessage, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.decoder.next_message() {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: ByteSource, W: WaitPolicy> FusedIterator for Messages<'_, S, W> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;
    use crate::wait::{CODE_NO_WAIT, NoWait};
    use bt_encoder::StreamEncoder;

    fn decode(bytes: &[u8]) -> Result<DecodedMessage, DecodeError> {
        StreamDecoder::new(SliceSource::new(bytes), NoWait).decode_message()
    }

    /// Source that reports `Incomplete` before every successful take.
    struct Hesitant<'a> {
        inner: SliceSource<'a>,
        ready: bool,
    }

    impl ByteSource for Hesitant<'_> {
        fn take(&mut self, n: usize) -> std::io::Result<Take> {
            if !self.ready {
                self.ready = true;
                return Ok(Take::Incomplete);
            }
            self.ready = false;
            self.inner.take(n)
        }
    }

    struct AlwaysRetry {
        calls: u32,
    }

    impl WaitPolicy for AlwaysRetry {
        fn on_incomplete(&mut self, attempt: u32) -> WaitOutcome {
            assert_eq!(attempt, 1, "attempt counter must reset per request");
            self.calls += 1;
            WaitOutcome::Retry
        }
    }

    #[test]
    fn decodes_each_scalar_width() {
        assert_eq!(decode(&[0x01, 0x32]).unwrap().value, Value::byte(0x32));
        assert_eq!(decode(&[0x02, 0x16, 0xFC]).unwrap().value, Value::word(0xFC16));
        assert_eq!(
            decode(&[0x03, 0xDC, 0xBA, 0xAB, 0xCC]).unwrap().value,
            Value::dword(0xCCAB_BADC)
        );
        assert_eq!(
            decode(&[0x04, 0xFF, 0xFF, 0xFF, 0xFF, 0xDD, 0xDD, 0xDD, 0xDD])
                .unwrap()
                .value,
            Value::qword(0xDDDD_DDDD_FFFF_FFFF)
        );
    }

    #[test]
    fn empty_buffer_reads_no_payload() {
        let message = decode(&[0x06, 0x00, 0x00]).unwrap();
        assert_eq!(message.value, Value::buffer(vec![]));
        assert_eq!(message.len, 3);
    }

    #[test]
    fn chain_concatenates_fragments() {
        let bytes = [
            0x09, 0x01, 0x00, // HandlerBegin Chain
            0x05, 0x02, b'a', b'b', // ByteBuffer "ab"
            0x06, 0x01, 0x00, b'c', // WordBuffer "c"
            0x0A, // HandlerEnd
        ];
        assert_eq!(decode(&bytes).unwrap().value, Value::buffer(b"abc".as_slice()));
    }

    #[test]
    fn struct_decodes_like_array() {
        let bytes = [0x09, 0x03, 0x00, 0x01, 0x07, 0x0A];
        assert_eq!(
            decode(&bytes).unwrap().value,
            Value::Array(vec![Value::byte(7)])
        );
    }

    #[test]
    fn messages_track_offsets() {
        let bytes = [0x01, 0x01, 0x02, 0x02, 0x00];
        let mut decoder = StreamDecoder::new(SliceSource::new(&bytes), NoWait);
        let first = decoder.decode_message().unwrap();
        let second = decoder.decode_message().unwrap();
        assert_eq!((first.offset, first.len), (0, 2));
        assert_eq!((second.offset, second.len), (2, 3));
        assert_eq!(decoder.offset(), 5);
    }

    #[test]
    fn retry_is_transparent() {
        let payload = StreamEncoder::new()
            .begin(MagicCode::Array)
            .byte(5)
            .buffer(b"xyz")
            .end()
            .encode()
            .unwrap();

        let source = Hesitant {
            inner: SliceSource::new(&payload),
            ready: false,
        };
        let mut wait = AlwaysRetry { calls: 0 };
        let mut decoder = StreamDecoder::new(source, &mut wait);
        let message = decoder.decode_message().unwrap();

        assert_eq!(message, decode(&payload).unwrap());
        assert!(wait.calls > 0);
    }

    #[test]
    fn exhaustion_carries_policy_reason() {
        let err = decode(&[0x02, 0x01]).unwrap_err();
        match err {
            DecodeError::Exhausted { reason, code } => {
                assert_eq!(reason, "no wait");
                assert_eq!(code, CODE_NO_WAIT);
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn next_message_ends_cleanly_at_boundary() {
        let bytes = [0x01, 0x09];
        let mut decoder = StreamDecoder::new(SliceSource::new(&bytes), NoWait);
        assert!(decoder.next_message().unwrap().is_some());
        assert!(decoder.next_message().unwrap().is_none());
    }

    #[test]
    fn next_message_reports_truncation_mid_message() {
        let bytes = [0x09, 0x02, 0x00, 0x01];
        let mut decoder = StreamDecoder::new(SliceSource::new(&bytes), NoWait);
        assert!(decoder.next_message().unwrap_err().is_exhausted());
    }

    #[test]
    fn messages_iterator_stops_after_error() {
        let bytes = [0x01, 0x01, 0xEE, 0x01, 0x02];
        let mut decoder = StreamDecoder::new(SliceSource::new(&bytes), NoWait);
        let results: Vec<_> = decoder.messages().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(DecodeError::Protocol(ProtocolError::Wire(
                bt_wire::WireError::UnknownTag { tag: 0xEE }
            )))
        ));
    }

    #[test]
    fn oversized_buffer_rejected_before_allocation() {
        let config = DecoderConfig {
            max_buffer_len: 4,
            ..DecoderConfig::default()
        };
        let bytes = [0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut decoder = StreamDecoder::with_config(SliceSource::new(&bytes), NoWait, config);
        assert!(matches!(
            decoder.decode_message(),
            Err(DecodeError::Protocol(ProtocolError::BufferTooLarge {
                len: u64::MAX,
                limit: 4
            }))
        ));
    }

    #[test]
    fn chain_total_counts_toward_buffer_limit() {
        let config = DecoderConfig {
            max_buffer_len: 3,
            ..DecoderConfig::default()
        };
        let bytes = [
            0x09, 0x01, 0x00, 0x05, 0x02, b'a', b'b', 0x05, 0x02, b'c', b'd', 0x0A,
        ];
        let mut decoder = StreamDecoder::with_config(SliceSource::new(&bytes), NoWait, config);
        assert!(matches!(
            decoder.decode_message(),
            Err(DecodeError::Protocol(ProtocolError::BufferTooLarge { len: 4, limit: 3 }))
        ));
    }

    #[test]
    fn short_ready_violates_source_contract() {
        struct Liar;
        impl ByteSource for Liar {
            fn take(&mut self, _n: usize) -> std::io::Result<Take> {
                Ok(Take::Ready(Vec::new()))
            }
        }
        let err = StreamDecoder::new(Liar, NoWait).decode_message().unwrap_err();
        assert!(matches!(err, DecodeError::SourceContract { wanted: 1, got: 0 }));
    }
}
