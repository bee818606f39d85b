//! Shared fixtures for the ByteTrain integration tests and benches.
//!
//! - [`samples`]: deterministic streams built with [`StreamEncoder`].
//! - [`StutterSource`]: a slice source that stalls before every read.
//! - [`CountingWait`]: a wait policy that records how it was consulted.

#![allow(clippy::pedantic)]

use std::io;

use bt_decoder::{
    ByteSource, DecodeError, DecodedMessage, NoWait, SliceSource, StreamDecoder, Take, WaitOutcome,
    WaitPolicy,
};

/// Decode every message of `bytes` from an in-memory slice.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<DecodedMessage>, DecodeError> {
    StreamDecoder::new(SliceSource::new(bytes), NoWait)
        .messages()
        .collect()
}

/// Source that reports [`Take::Incomplete`] `stalls` times before each
/// successful take.
pub struct StutterSource<'a> {
    inner: SliceSource<'a>,
    stalls: usize,
    left: usize,
    /// Incomplete results handed out so far.
    pub incompletes: usize,
}

impl<'a> StutterSource<'a> {
    pub fn new(bytes: &'a [u8], stalls: usize) -> Self {
        Self {
            inner: SliceSource::new(bytes),
            stalls,
            left: stalls,
            incompletes: 0,
        }
    }
}

impl ByteSource for StutterSource<'_> {
    fn take(&mut self, n: usize) -> io::Result<Take> {
        if self.left > 0 {
            self.left -= 1;
            self.incompletes += 1;
            return Ok(Take::Incomplete);
        }
        let result = self.inner.take(n)?;
        if matches!(result, Take::Ready(_)) {
            self.left = self.stalls;
        }
        Ok(result)
    }
}

/// Wait policy that retries up to `limit` attempts per request (forever
/// when `None`) and remembers how it was called.
#[derive(Debug, Default)]
pub struct CountingWait {
    pub limit: Option<u32>,
    /// Total calls to `on_incomplete`.
    pub calls: u32,
    /// Highest attempt number seen.
    pub max_attempt: u32,
}

/// Exhaustion code used by [`CountingWait`].
pub const CODE_COUNTING_LIMIT: u32 = 42;

impl CountingWait {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn limited(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

impl WaitPolicy for CountingWait {
    fn on_incomplete(&mut self, attempt: u32) -> WaitOutcome {
        self.calls += 1;
        self.max_attempt = self.max_attempt.max(attempt);
        match self.limit {
            Some(limit) if attempt > limit => {
                WaitOutcome::exhausted(format!("gave up after {limit} attempts"), CODE_COUNTING_LIMIT)
            }
            _ => WaitOutcome::Retry,
        }
    }
}

/// Deterministic sample streams.
pub mod samples {
    use bt_encoder::StreamEncoder;
    use bt_wire::MagicCode;

    /// One message per scalar width: `u8(127)`, `u16(300)`, `u32(70000)`,
    /// `u64::MAX`.
    pub fn scalars() -> Vec<u8> {
        StreamEncoder::new()
            .byte(0x7F)
            .word(300)
            .dword(70_000)
            .qword(u64::MAX)
            .encode()
            .unwrap()
    }

    /// `[u8(1), [u16(2), b"xy"], b"abcd"]` with a struct and a chain inside.
    pub fn nested() -> Vec<u8> {
        StreamEncoder::new()
            .begin(MagicCode::Array)
            .byte(1)
            .begin(MagicCode::Struct)
            .word(2)
            .buffer(b"xy")
            .end()
            .chain([b"ab".as_slice(), b"cd".as_slice()])
            .end()
            .encode()
            .unwrap()
    }

    /// An array aborted by a level-1 break, then a plain buffer message.
    ///
    /// ```text
    /// #0  [u8(1), u16(300), error(1)[b"timeout"]]   error log {3}
    /// #20 b"next"
    /// ```
    pub fn with_breaks() -> Vec<u8> {
        StreamEncoder::new()
            .begin(MagicCode::Array)
            .byte(1)
            .word(300)
            .break_with(1, |e| {
                e.buffer(b"timeout");
            })
            .buffer(b"next")
            .encode()
            .unwrap()
    }

    /// A level-2 break that unwinds two arrays at once.
    pub fn deep_break() -> Vec<u8> {
        StreamEncoder::new()
            .begin(MagicCode::Array)
            .begin(MagicCode::Array)
            .byte(7)
            .break_with(2, |e| {
                e.word(9);
            })
            .encode()
            .unwrap()
    }

    /// An array of `n` words.
    pub fn word_array(n: u16) -> Vec<u8> {
        let mut enc = StreamEncoder::new();
        enc.begin(MagicCode::Array);
        for i in 0..n {
            enc.word(i);
        }
        enc.end().encode().unwrap()
    }

    /// A single buffer message of `len` bytes.
    pub fn large_buffer(len: usize) -> Vec<u8> {
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        StreamEncoder::new().buffer(&data).encode().unwrap()
    }
}
