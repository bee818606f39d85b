use std::str::FromStr;

use crate::error::DriverError;

/// Configuration for rendering decoded messages.
///
/// ```text
/// ┌────────────────┬────────────────────────────────────────────────┐
/// │ Field          │ Purpose                                        │
/// ├────────────────┼────────────────────────────────────────────────┤
/// │ mode           │ Compact, Tree or Json output                   │
/// │ show_errors    │ list the message's error log after the value   │
/// │ buffer_preview │ bytes of each buffer shown in text modes       │
/// │ max_messages   │ stop a session after this many messages        │
/// └────────────────┴────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    pub mode: OutputMode,
    pub show_errors: bool,
    pub buffer_preview: usize,
    pub max_messages: Option<usize>,
}

impl Default for DriverConfig {
    /// Compact output, errors shown, 32-byte buffer previews, no limit.
    fn default() -> Self {
        Self {
            mode: OutputMode::Compact,
            show_errors: true,
            buffer_preview: 32,
            max_messages: None,
        }
    }
}

/// Output format for a rendered message.
///
/// - **Compact**: one line per message, like `Value`'s `Display`.
/// - **Tree**: one line per node, children indented by two spaces.
/// - **Json**: one JSON object per message; buffers as hex strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Compact,
    Tree,
    Json,
}

impl FromStr for OutputMode {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "tree" => Ok(Self::Tree),
            "json" => Ok(Self::Json),
            _ => Err(DriverError::UnknownMode {
                name: s.to_string(),
            }),
        }
    }
}
