#![no_main]

use bt_decoder::{DecoderConfig, NoWait, SliceSource, StreamDecoder};
use bt_encoder::StreamEncoder;
use libfuzzer_sys::fuzz_target;

// Fuzz target: StreamDecoder over arbitrary bytes.
//
// Catches bugs in:
// - Unknown tags and magics
// - Break levels deeper than the nesting
// - Oversized or truncated buffers
// - Depth accounting across nested composites and breaks
//
// Every message that decodes must re-encode, and the re-encoded stream
// must decode to the same value.
fuzz_target!(|data: &[u8]| {
    let config = DecoderConfig {
        max_depth: 32,
        max_buffer_len: 1 << 16,
    };
    let mut decoder = StreamDecoder::with_config(SliceSource::new(data), NoWait, config.clone());

    while let Ok(Some(message)) = decoder.next_message() {
        assert_eq!(message.offset + message.len, decoder.offset());

        let mut enc = StreamEncoder::new();
        enc.value(&message.value);
        let bytes = enc.encode().expect("decoded values re-encode");

        let again = StreamDecoder::with_config(SliceSource::new(&bytes), NoWait, config.clone())
            .decode_message()
            .expect("re-encoded value decodes");
        assert_eq!(again.value, message.value);
    }
});
