//! Edge cases for the stream decoder.
//!
//! - **Grammar violations**: unknown tags and magics, stray `HandlerEnd`,
//!   non-buffers inside a chain.
//! - **Limits**: nesting depth and buffer length from `DecoderConfig`,
//!   checked before anything is allocated.
//! - **Empty payloads**: zero-length buffers at every prefix width, empty
//!   arrays and chains.
//! - **Waiting**: retries are invisible in the result; exhaustion at a
//!   message boundary ends the stream cleanly, mid-message it is an error.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::rc::Rc;
use std::time::Duration;

use bt_decoder::wait::CODE_RETRY_LIMIT;
use bt_decoder::{
    DecodeError, DecodedMessage, DecoderConfig, NoWait, ProtocolError, ReaderSource, SleepRetry,
    SliceSource, StreamDecoder, WaitOutcome, WaitPolicy,
};
use bt_tests::{CODE_COUNTING_LIMIT, CountingWait, StutterSource, decode_all, samples};
use bt_types::Value;
use bt_wire::{TypeTag, WireError};

fn decode_one(bytes: &[u8]) -> Result<DecodedMessage, DecodeError> {
    StreamDecoder::new(SliceSource::new(bytes), NoWait).decode_message()
}

fn decode_with(bytes: &[u8], config: DecoderConfig) -> Result<DecodedMessage, DecodeError> {
    StreamDecoder::with_config(SliceSource::new(bytes), NoWait, config).decode_message()
}

fn protocol(err: DecodeError) -> ProtocolError {
    match err {
        DecodeError::Protocol(p) => p,
        other => panic!("expected a protocol violation, got {other:?}"),
    }
}

// ── Grammar violations ────────────────────────────────────────────────────────

#[test]
fn unknown_tags_rejected() {
    for tag in [0x00u8, 0x0C, 0xFF] {
        let err = protocol(decode_one(&[tag, 0x00]).unwrap_err());
        assert_eq!(err, ProtocolError::Wire(WireError::UnknownTag { tag }));
    }
}

#[test]
fn unknown_magic_rejected() {
    let err = protocol(decode_one(&[0x09, 0x04, 0x00, 0x0A]).unwrap_err());
    assert_eq!(err, ProtocolError::Wire(WireError::UnknownMagic { magic: 4 }));
}

#[test]
fn stray_handler_end_rejected() {
    let err = protocol(decode_one(&[0x0A]).unwrap_err());
    assert_eq!(err, ProtocolError::UnexpectedHandlerEnd);
}

#[test]
fn scalar_inside_chain_rejected() {
    let err = protocol(decode_one(&[0x09, 0x01, 0x00, 0x01, 0x05, 0x0A]).unwrap_err());
    assert_eq!(
        err,
        ProtocolError::UnexpectedChainElement {
            tag: TypeTag::Byte
        }
    );
}

#[test]
fn composite_inside_chain_rejected() {
    let err = protocol(decode_one(&[0x09, 0x01, 0x00, 0x09, 0x02, 0x00]).unwrap_err());
    assert_eq!(
        err,
        ProtocolError::UnexpectedChainElement {
            tag: TypeTag::HandlerBegin
        }
    );
}

// ── Limits ────────────────────────────────────────────────────────────────────

#[test]
fn depth_limit_applies_per_context() {
    let config = DecoderConfig {
        max_depth: 2,
        ..DecoderConfig::default()
    };
    let two_deep = [0x09, 0x02, 0x00, 0x09, 0x02, 0x00, 0x0A, 0x0A];
    assert!(decode_with(&two_deep, config.clone()).is_ok());

    let three_deep = [0x09, 0x02, 0x00, 0x09, 0x02, 0x00, 0x09, 0x02, 0x00];
    let err = protocol(decode_with(&three_deep, config).unwrap_err());
    assert_eq!(err, ProtocolError::DepthLimitExceeded { limit: 2 });
}

#[test]
fn buffer_limit_checked_before_reading() {
    let config = DecoderConfig {
        max_buffer_len: 4,
        ..DecoderConfig::default()
    };
    // Only the prefix is present; the limit fires before the body is read.
    let err = protocol(decode_with(&[0x05, 0x05], config).unwrap_err());
    assert_eq!(err, ProtocolError::BufferTooLarge { len: 5, limit: 4 });
}

#[test]
fn buffer_limit_covers_chain_total() {
    let config = DecoderConfig {
        max_buffer_len: 4,
        ..DecoderConfig::default()
    };
    let bytes = [
        0x09, 0x01, 0x00, //
        0x05, 0x03, b'a', b'b', b'c', //
        0x05, 0x03, b'd', b'e', b'f', //
        0x0A,
    ];
    let err = protocol(decode_with(&bytes, config).unwrap_err());
    assert_eq!(err, ProtocolError::BufferTooLarge { len: 6, limit: 4 });
}

#[test]
fn absurd_declared_length_rejected() {
    let mut bytes = vec![0x08];
    bytes.extend_from_slice(&u64::MAX.to_le_bytes());
    let err = protocol(decode_one(&bytes).unwrap_err());
    assert!(matches!(err, ProtocolError::BufferTooLarge { len: u64::MAX, .. }));
}

// ── Empty payloads ────────────────────────────────────────────────────────────

#[test]
fn zero_length_buffers_at_every_width() {
    let bytes = [
        0x05, 0x00, //
        0x06, 0x00, 0x00, //
        0x07, 0x00, 0x00, 0x00, 0x00, //
        0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    let messages = decode_all(&bytes).unwrap();
    assert_eq!(messages.len(), 4);
    for message in &messages {
        assert_eq!(message.value, Value::Buffer(Vec::new()));
    }
    let lens: Vec<u64> = messages.iter().map(|m| m.len).collect();
    assert_eq!(lens, vec![2, 3, 5, 9]);
}

#[test]
fn empty_composites() {
    assert_eq!(
        decode_one(&[0x09, 0x02, 0x00, 0x0A]).unwrap().value,
        Value::Array(vec![])
    );
    assert_eq!(
        decode_one(&[0x09, 0x01, 0x00, 0x0A]).unwrap().value,
        Value::Buffer(vec![])
    );
    assert_eq!(
        decode_one(&[0x09, 0x03, 0x00, 0x0A]).unwrap().value,
        Value::Array(vec![])
    );
}

// ── End of stream ─────────────────────────────────────────────────────────────

#[test]
fn empty_stream_has_no_messages() {
    assert!(decode_all(&[]).unwrap().is_empty());

    let err = decode_one(&[]).unwrap_err();
    assert!(matches!(err, DecodeError::Exhausted { code: 1, .. }));
}

#[test]
fn truncated_message_is_an_error() {
    let mut bytes = samples::with_breaks();
    bytes.truncate(10);
    let err = decode_all(&bytes).unwrap_err();
    assert!(err.is_exhausted());
}

#[test]
fn unterminated_array_exhausts() {
    let err = decode_one(&[0x09, 0x02, 0x00, 0x01, 0x05]).unwrap_err();
    assert!(err.is_exhausted());
}

// ── Waiting ───────────────────────────────────────────────────────────────────

#[test]
fn retries_are_invisible() {
    let bytes = [samples::with_breaks(), samples::nested()].concat();
    let expected = decode_all(&bytes).unwrap();

    let mut wait = CountingWait::unlimited();
    let mut decoder = StreamDecoder::new(StutterSource::new(&bytes, 3), &mut wait);
    let actual: Vec<DecodedMessage> = (0..expected.len())
        .map(|_| decoder.decode_message().unwrap())
        .collect();
    let incompletes = decoder.source().incompletes;
    drop(decoder);

    assert_eq!(actual, expected);
    assert_eq!(wait.max_attempt, 3, "attempts restart for every request");
    assert_eq!(wait.calls as usize, incompletes);
}

#[test]
fn stalled_source_ends_at_boundary() {
    let bytes = samples::scalars();
    let mut decoder =
        StreamDecoder::new(StutterSource::new(&bytes, 1), CountingWait::limited(5));
    let messages: Vec<DecodedMessage> = decoder.messages().map(Result::unwrap).collect();
    assert_eq!(messages.len(), 4);
}

#[test]
fn retry_limit_mid_message() {
    let mut bytes = samples::nested();
    bytes.pop();
    let mut decoder = StreamDecoder::new(SliceSource::new(&bytes), CountingWait::limited(1));
    match decoder.decode_message().unwrap_err() {
        DecodeError::Exhausted { reason, code } => {
            assert_eq!(code, CODE_COUNTING_LIMIT);
            assert_eq!(reason, "gave up after 1 attempts");
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[test]
fn sleep_retry_gives_up_with_its_code() {
    let mut decoder = StreamDecoder::new(
        SliceSource::new(&[]),
        SleepRetry::new(Duration::ZERO, 2),
    );
    match decoder.decode_message().unwrap_err() {
        DecodeError::Exhausted { reason, code } => {
            assert_eq!(code, CODE_RETRY_LIMIT);
            assert_eq!(reason, "no data after 2 retries");
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert!(decoder.next_message().unwrap().is_none());
}

/// Reader over a buffer that a writer keeps appending to.
struct SharedReader {
    data: Rc<RefCell<Vec<u8>>>,
    pos: usize,
}

impl Read for SharedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.borrow();
        let n = buf.len().min(data.len() - self.pos);
        buf[..n].copy_from_slice(&data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Wait policy that plays the writer: each wait appends the next chunk.
struct Appender {
    data: Rc<RefCell<Vec<u8>>>,
    chunks: VecDeque<Vec<u8>>,
}

impl WaitPolicy for Appender {
    fn on_incomplete(&mut self, _attempt: u32) -> WaitOutcome {
        match self.chunks.pop_front() {
            Some(chunk) => {
                self.data.borrow_mut().extend_from_slice(&chunk);
                WaitOutcome::Retry
            }
            None => WaitOutcome::exhausted("writer closed", 7),
        }
    }
}

#[test]
fn reader_source_follows_a_growing_buffer() {
    let bytes = [samples::scalars(), samples::with_breaks(), samples::deep_break()].concat();
    let expected = decode_all(&bytes).unwrap();

    let data = Rc::new(RefCell::new(Vec::new()));
    let source = ReaderSource::new(SharedReader {
        data: Rc::clone(&data),
        pos: 0,
    });
    let wait = Appender {
        data,
        chunks: bytes.chunks(3).map(<[u8]>::to_vec).collect(),
    };

    let mut decoder = StreamDecoder::new(source, wait);
    let actual: Vec<DecodedMessage> = decoder.messages().map(Result::unwrap).collect();
    assert_eq!(actual, expected);
    assert_eq!(decoder.offset(), bytes.len() as u64);
}

/// Reader that fails with a non-retryable error.
struct Broken;

impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

#[test]
fn io_errors_propagate() {
    let mut decoder = StreamDecoder::new(ReaderSource::new(Broken), NoWait);
    let err = decoder.next_message().unwrap_err();
    assert!(matches!(err, DecodeError::Io(ref e) if e.to_string() == "disk on fire"));
}
