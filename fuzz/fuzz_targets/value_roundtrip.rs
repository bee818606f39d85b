#![no_main]

use arbitrary::Arbitrary;
use bt_decoder::{DecoderConfig, NoWait, SliceSource, StreamDecoder};
use bt_encoder::StreamEncoder;
use bt_types::Value;
use libfuzzer_sys::fuzz_target;

// Fuzz target: value tree → StreamEncoder → StreamDecoder.
//
// Trees the encoder rejects (nested breaks, items after an aborting
// break, levels deeper than the nesting) are skipped. Everything the
// encoder accepts must decode back to the same values.

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Byte(u8),
    Word(u16),
    Dword(u32),
    Qword(u64),
    Buffer(Vec<u8>),
    Array(Vec<FuzzValue>),
    Error { level: u8, messages: Vec<FuzzValue> },
}

impl FuzzValue {
    fn to_value(&self) -> Value {
        match self {
            Self::Byte(v) => Value::byte(*v),
            Self::Word(v) => Value::word(*v),
            Self::Dword(v) => Value::dword(*v),
            Self::Qword(v) => Value::qword(*v),
            Self::Buffer(b) => Value::buffer(b.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Error { level, messages } => {
                Value::error(level % 4, messages.iter().map(Self::to_value).collect())
            }
        }
    }
}

fuzz_target!(|messages: Vec<FuzzValue>| {
    let values: Vec<Value> = messages.iter().map(FuzzValue::to_value).collect();

    let mut enc = StreamEncoder::new();
    for value in &values {
        enc.value(value);
    }
    let Ok(bytes) = enc.encode() else {
        return;
    };

    let config = DecoderConfig {
        max_depth: usize::MAX,
        ..DecoderConfig::default()
    };
    let mut decoder = StreamDecoder::with_config(SliceSource::new(&bytes), NoWait, config);
    let decoded: Vec<Value> = decoder
        .messages()
        .map(|m| m.expect("encoder output decodes").value)
        .collect();

    assert_eq!(decoded, values);
    assert_eq!(decoder.offset(), bytes.len() as u64);
});
