use bt_decoder::DecodedMessage;
use bt_types::Value;
use serde_json::{Map, json};

use crate::error::DriverError;

/// JSON renderer: one object per message, on a single line.
///
/// ```text
/// ┌──────────────┬─────────────────────────────────────────────┐
/// │ Value        │ JSON                                        │
/// ├──────────────┼─────────────────────────────────────────────┤
/// │ Integer      │ {"u16": 300}                                │
/// │ Buffer       │ {"hex": "616263"}                           │
/// │ Array        │ [ ... ]                                     │
/// │ Error        │ {"error": {"level": 1, "messages": [ ... ]}}│
/// └──────────────┴─────────────────────────────────────────────┘
/// ```
///
/// The message object is
/// `{"offset", "len", "value", "errors": [{"index", "level", "messages"}]}`.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns [`DriverError::Json`] if serialisation fails.
    pub fn render(message: &DecodedMessage) -> Result<String, DriverError> {
        let errors: Vec<serde_json::Value> = message
            .errors
            .iter()
            .map(|(index, record)| {
                json!({
                    "index": index,
                    "level": record.level,
                    "messages": record.messages.iter().map(to_json).collect::<Vec<_>>(),
                })
            })
            .collect();

        let object = json!({
            "offset": message.offset,
            "len": message.len,
            "value": to_json(&message.value),
            "errors": errors,
        });
        Ok(serde_json::to_string(&object)?)
    }
}

/// Convert one value tree into its JSON form.
#[must_use]
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Integer { width, value } => {
            let mut map = Map::new();
            map.insert(format!("u{}", width.bits()), json!(value));
            serde_json::Value::Object(map)
        }
        Value::Buffer(bytes) => json!({ "hex": hex::encode(bytes) }),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Error(record) => json!({
            "error": {
                "level": record.level,
                "messages": record.messages.iter().map(to_json).collect::<Vec<_>>(),
            }
        }),
    }
}
