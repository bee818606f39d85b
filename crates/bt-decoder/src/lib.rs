#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod decoder;
pub mod error;
pub mod source;
pub mod wait;

pub use config::DecoderConfig;
pub use context::DecodeContext;
pub use decoder::{DecodedMessage, Messages, StreamDecoder};
pub use error::{DecodeError, ProtocolError};
pub use source::{ByteSource, ReaderSource, SliceSource, Take};
pub use wait::{NoWait, SleepRetry, WaitOutcome, WaitPolicy};
