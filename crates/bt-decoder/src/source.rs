use std::io::{self, Read};

/// Result of a [`ByteSource::take`] request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Take {
    /// Exactly the requested number of bytes, removed from the source.
    Ready(Vec<u8>),
    /// Fewer bytes than requested are available right now. Nothing was
    /// consumed; the identical request may be repeated later.
    Incomplete,
}

/// FIFO view of one byte stream that can report "not enough data yet".
///
/// Implementations must never hand out a short read, and must never
/// reorder or drop bytes between calls. The decoder consults its
/// [`WaitPolicy`](crate::WaitPolicy) on every `Incomplete` and then
/// repeats the same request.
pub trait ByteSource {
    /// Take exactly `n` bytes, or report that they are not available yet.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the underlying stream fails. Running out
    /// of data is not an error; it is [`Take::Incomplete`].
    fn take(&mut self, n: usize) -> io::Result<Take>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn take(&mut self, n: usize) -> io::Result<Take> {
        (**self).take(n)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn take(&mut self, n: usize) -> io::Result<Take> {
        (**self).take(n)
    }
}

/// Source over an in-memory byte slice.
///
/// Reports `Incomplete` once fewer than `n` bytes remain, which with a
/// non-retrying policy is how the end of the slice surfaces.
#[derive(Clone, Debug)]
pub struct SliceSource<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    fn take(&mut self, n: usize) -> io::Result<Take> {
        if self.remaining() < n {
            return Ok(Take::Incomplete);
        }
        let bytes = self.buf[self.pos..self.pos + n].to_vec();
        self.pos += n;
        Ok(Take::Ready(bytes))
    }
}

/// Source over any [`Read`] implementation (file, pipe, socket).
///
/// Bytes read toward a request that cannot be completed yet are kept in
/// `pending` and count toward the retry of the same request, so a partial
/// read never loses data. The reader is asked for at most the bytes the
/// current request still needs.
///
/// ```text
///   read() == Ok(0)            → Incomplete (EOF for now; a growing file
///                                 may have more on the next attempt)
///   read() == Err(WouldBlock)  → Incomplete
///   read() == Err(Interrupted) → read again
///   read() == Err(other)       → Err(other)
/// ```
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
    pending: Vec<u8>,
}

impl<R: Read> ReaderSource<R> {
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    /// Bytes read from the reader but not yet handed out.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn take(&mut self, n: usize) -> io::Result<Take> {
        while self.pending.len() < n {
            let start = self.pending.len();
            self.pending.resize(n, 0);
            let result = self.inner.read(&mut self.pending[start..]);
            match result {
                Ok(0) => {
                    self.pending.truncate(start);
                    return Ok(Take::Incomplete);
                }
                Ok(read) => self.pending.truncate(start + read),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    self.pending.truncate(start);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.pending.truncate(start);
                    return Ok(Take::Incomplete);
                }
                Err(e) => {
                    self.pending.truncate(start);
                    return Err(e);
                }
            }
        }

        let rest = self.pending.split_off(n);
        Ok(Take::Ready(std::mem::replace(&mut self.pending, rest)))
    }
}
