#![warn(clippy::pedantic)]

pub mod display;
pub mod value;

pub use display::{Preview, preview_list};
pub use value::{ErrorLog, ErrorRecord, Value};
