#![warn(clippy::pedantic)]

pub mod error;
pub mod magic;
pub mod tag;
pub mod width;

pub use error::WireError;
pub use magic::MagicCode;
pub use tag::{TagClass, TypeTag};
pub use width::Width;

/// Version of the tag and magic numbering tables defined in this crate.
///
/// Any change to a wire id in [`TypeTag`] or [`MagicCode`] must bump this.
pub const PROTOCOL_VERSION: u8 = 1;

/// Size of the magic code that follows a `HandlerBegin` tag.
pub const MAGIC_LEN: usize = 2;

/// Size of the `level` + `count` header that follows a `Break` tag.
pub const BREAK_HEADER_LEN: usize = 2;
