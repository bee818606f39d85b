use std::io::Write;

use bt_decoder::{ByteSource, StreamDecoder, WaitPolicy};
use tracing::info;

use crate::config::DriverConfig;
use crate::driver::MessageRenderer;
use crate::error::DriverError;

/// Totals for one [`run_session`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub messages: usize,
    /// Break records across all messages.
    pub error_records: usize,
    /// Stream offset when the session stopped.
    pub bytes: u64,
}

/// Decode messages until the stream ends, writing one rendering per
/// message to `out`.
///
/// The session stops cleanly when the wait policy exhausts the stream at
/// a message boundary, or after `config.max_messages` messages.
///
/// # Errors
///
/// Any decode failure (including exhaustion mid-message), render failure
/// or write failure ends the session with an error.
pub fn run_session<S, W>(
    decoder: &mut StreamDecoder<S, W>,
    renderer: &impl MessageRenderer,
    config: &DriverConfig,
    out: &mut impl Write,
) -> Result<SessionSummary, DriverError>
where
    S: ByteSource,
    W: WaitPolicy,
{
    let mut summary = SessionSummary::default();
    while config.max_messages.is_none_or(|max| summary.messages < max) {
        let Some(message) = decoder.next_message()? else {
            break;
        };
        writeln!(out, "{}", renderer.render(&message, config)?)?;
        summary.messages += 1;
        summary.error_records += message.errors.len();
    }
    out.flush()?;

    summary.bytes = decoder.offset();
    info!(
        messages = summary.messages,
        error_records = summary.error_records,
        bytes = summary.bytes,
        "session finished"
    );
    Ok(summary)
}
