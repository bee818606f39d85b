#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;

pub use encoder::StreamEncoder;
pub use error::EncodeError;
