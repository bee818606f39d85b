use bt_decoder::DecodedMessage;

use crate::config::{DriverConfig, OutputMode};
use crate::error::DriverError;
use crate::render_compact::CompactRenderer;
use crate::render_json::JsonRenderer;
use crate::render_tree::TreeRenderer;

/// Turns one decoded message into printable text.
///
/// Implementations are stateless; everything they need comes through
/// [`DriverConfig`].
///
/// ```text
/// DecodedMessage ──▶ MessageRenderer::render() ──▶ String
///                            │
///                      DriverConfig
///                 (mode, show_errors, preview)
/// ```
pub trait MessageRenderer {
    /// # Errors
    ///
    /// Returns [`DriverError::Json`] if JSON output cannot be produced.
    fn render(&self, message: &DecodedMessage, config: &DriverConfig)
    -> Result<String, DriverError>;
}

/// Dispatches to the renderer selected by `config.mode`.
pub struct DefaultDriver;

impl MessageRenderer for DefaultDriver {
    fn render(
        &self,
        message: &DecodedMessage,
        config: &DriverConfig,
    ) -> Result<String, DriverError> {
        match config.mode {
            OutputMode::Compact => Ok(CompactRenderer::render(message, config)),
            OutputMode::Tree => Ok(TreeRenderer::render(message, config)),
            OutputMode::Json => JsonRenderer::render(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_decoder::{NoWait, SliceSource, StreamDecoder};
    use bt_encoder::StreamEncoder;
    use bt_wire::MagicCode;

    fn message() -> DecodedMessage {
        let stream = StreamEncoder::new()
            .begin(MagicCode::Array)
            .byte(5)
            .buffer(b"abc")
            .break_with(1, |e| {
                e.buffer(b"oops");
            })
            .encode()
            .unwrap();
        StreamDecoder::new(SliceSource::new(&stream), NoWait)
            .decode_message()
            .unwrap()
    }

    fn render(mode: OutputMode) -> String {
        let config = DriverConfig {
            mode,
            ..DriverConfig::default()
        };
        DefaultDriver.render(&message(), &config).unwrap()
    }

    #[test]
    fn compact_mode() {
        assert_eq!(
            render(OutputMode::Compact),
            "#0 [u8(5), b\"abc\", error(1)[b\"oops\"]]\n  error@3 level=1: [b\"oops\"]"
        );
    }

    #[test]
    fn tree_mode() {
        let expected = [
            "message @0 (19 bytes)",
            "  array (3)",
            "    u8 5",
            "    buffer (3) b\"abc\"",
            "    error level=1 (1)",
            "      buffer (4) b\"oops\"",
            "  errors:",
            "    @3 level=1 (1 message)",
        ]
        .join("\n");
        assert_eq!(render(OutputMode::Tree), expected);
    }

    #[test]
    fn json_mode() {
        let parsed: serde_json::Value =
            serde_json::from_str(&render(OutputMode::Json)).unwrap();
        assert_eq!(parsed["offset"], 0);
        assert_eq!(parsed["value"][1]["hex"], "616263");
        assert_eq!(parsed["errors"][0]["index"], 3);
        assert_eq!(parsed["errors"][0]["level"], 1);
    }

    #[test]
    fn errors_can_be_hidden() {
        let config = DriverConfig {
            show_errors: false,
            ..DriverConfig::default()
        };
        let text = DefaultDriver.render(&message(), &config).unwrap();
        assert!(!text.contains("error@"));
    }
}
