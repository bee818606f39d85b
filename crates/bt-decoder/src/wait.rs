use std::thread;
use std::time::Duration;

use tracing::debug;

/// Decision returned by a [`WaitPolicy`] after an incomplete read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Repeat the identical read request.
    Retry,
    /// Give up; the decoder fails with
    /// [`DecodeError::Exhausted`](crate::DecodeError::Exhausted) carrying
    /// this reason and code.
    Exhausted { reason: String, code: u32 },
}

impl WaitOutcome {
    pub fn exhausted(reason: impl Into<String>, code: u32) -> Self {
        Self::Exhausted {
            reason: reason.into(),
            code,
        }
    }
}

/// Called by the decoder each time its [`ByteSource`](crate::ByteSource)
/// reports [`Take::Incomplete`](crate::Take::Incomplete).
///
/// The policy is the only place where waiting happens: it may block the
/// thread, sleep, poll something else, or give up. `attempt` is the
/// 1-based count of consecutive incomplete results for the current read
/// request and resets once the request is satisfied.
pub trait WaitPolicy {
    fn on_incomplete(&mut self, attempt: u32) -> WaitOutcome;
}

impl<W: WaitPolicy + ?Sized> WaitPolicy for &mut W {
    fn on_incomplete(&mut self, attempt: u32) -> WaitOutcome {
        (**self).on_incomplete(attempt)
    }
}

impl<W: WaitPolicy + ?Sized> WaitPolicy for Box<W> {
    fn on_incomplete(&mut self, attempt: u32) -> WaitOutcome {
        (**self).on_incomplete(attempt)
    }
}

/// Exhaustion code reported by [`NoWait`].
pub const CODE_NO_WAIT: u32 = 1;

/// Exhaustion code reported by [`SleepRetry`] once its attempts run out.
pub const CODE_RETRY_LIMIT: u32 = 2;

/// Never waits: the first incomplete read exhausts the stream.
///
/// This is the right policy for complete inputs such as a finished file,
/// where "incomplete" can only mean the data has ended.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoWait;

impl WaitPolicy for NoWait {
    fn on_incomplete(&mut self, _attempt: u32) -> WaitOutcome {
        WaitOutcome::exhausted("no wait", CODE_NO_WAIT)
    }
}

/// Sleeps for a fixed interval between attempts.
///
/// With `max_attempts: None` it retries forever, which follows a file
/// that another process is still appending to.
#[derive(Clone, Debug)]
pub struct SleepRetry {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl SleepRetry {
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }

    /// Retry forever.
    #[must_use]
    pub fn follow(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }
}

impl WaitPolicy for SleepRetry {
    fn on_incomplete(&mut self, attempt: u32) -> WaitOutcome {
        if let Some(max) = self.max_attempts
            && attempt > max
        {
            debug!(attempt, max, "retry limit reached");
            return WaitOutcome::exhausted(
                format!("no data after {max} retries"),
                CODE_RETRY_LIMIT,
            );
        }
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
        WaitOutcome::Retry
    }
}
