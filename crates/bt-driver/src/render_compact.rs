use std::fmt::Write as _;

use bt_decoder::DecodedMessage;
use bt_types::preview_list;

use crate::config::DriverConfig;

/// Compact renderer: one line per message, one extra line per error.
///
/// Example output:
///
/// ```text
/// #0 [u8(5), u16(300), error(1)[b"oops"]]
///   error@3 level=1: [b"oops"]
/// ```
pub struct CompactRenderer;

impl CompactRenderer {
    #[must_use]
    pub fn render(message: &DecodedMessage, config: &DriverConfig) -> String {
        let mut out = format!(
            "#{} {}",
            message.offset,
            message.value.preview(config.buffer_preview)
        );

        if config.show_errors {
            for (index, record) in &message.errors {
                let _ = write!(
                    out,
                    "\n  error@{index} level={}: {}",
                    record.level,
                    preview_list(&record.messages, config.buffer_preview)
                );
            }
        }
        out
    }
}
