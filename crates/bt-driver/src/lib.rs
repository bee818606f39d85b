#![warn(clippy::pedantic)]

pub mod config;
pub mod driver;
pub mod error;
pub mod render_compact;
pub mod render_json;
pub mod render_tree;
pub mod session;

pub use config::{DriverConfig, OutputMode};
pub use driver::{DefaultDriver, MessageRenderer};
pub use error::DriverError;
pub use session::{SessionSummary, run_session};
