//! In-band error (`Break`) handling across composites.
//!
//! A break of level L is recorded at its own message index, then
//! terminates exactly L enclosing composite loops. Level 0 terminates
//! nothing; decoding continues with the next element.

use bt_decoder::{DecodeError, DecodedMessage, NoWait, ProtocolError, SliceSource, StreamDecoder};
use bt_tests::{decode_all, samples};
use bt_types::{ErrorRecord, Value};

fn decode_one(bytes: &[u8]) -> Result<DecodedMessage, DecodeError> {
    StreamDecoder::new(SliceSource::new(bytes), NoWait).decode_message()
}

fn record(level: u8, messages: Vec<Value>) -> ErrorRecord {
    ErrorRecord { level, messages }
}

// ── Levels ────────────────────────────────────────────────────────────────────

#[test]
fn level_zero_in_array_continues() {
    // Array[ Byte 1, Break(0)[Byte 9], Byte 2 ] End
    let bytes = [
        0x09, 0x02, 0x00, //
        0x01, 0x01, //
        0x0B, 0x00, 0x01, 0x01, 0x09, //
        0x01, 0x02, //
        0x0A,
    ];
    let message = decode_one(&bytes).unwrap();
    assert_eq!(
        message.value,
        Value::Array(vec![
            Value::byte(1),
            Value::error(0, vec![Value::byte(9)]),
            Value::byte(2),
        ])
    );
    assert_eq!(message.errors.len(), 1);
    assert_eq!(message.errors[&2], record(0, vec![Value::byte(9)]));
    assert_eq!(message.len, bytes.len() as u64);
}

#[test]
fn level_one_aborts_the_array_without_handler_end() {
    let messages = decode_all(&samples::with_breaks()).unwrap();
    assert_eq!(messages.len(), 2);

    let first = &messages[0];
    assert_eq!(
        first.value,
        Value::Array(vec![
            Value::byte(1),
            Value::word(300),
            Value::error(1, vec![Value::buffer(*b"timeout")]),
        ])
    );
    assert_eq!(
        first.errors.keys().copied().collect::<Vec<_>>(),
        vec![3],
        "HandlerBegin=0, Byte=1, Word=2, Break=3"
    );
    assert_eq!((first.offset, first.len), (0, 20));

    assert_eq!(messages[1].value, Value::buffer(*b"next"));
    assert_eq!(messages[1].offset, 20);
    assert!(messages[1].errors.is_empty());
}

#[test]
fn level_two_unwinds_two_arrays() {
    let messages = decode_all(&samples::deep_break()).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].value,
        Value::Array(vec![Value::Array(vec![
            Value::byte(7),
            Value::error(2, vec![Value::word(9)]),
        ])])
    );
    assert_eq!(messages[0].errors[&3], record(2, vec![Value::word(9)]));
}

#[test]
fn level_one_at_depth_two_resumes_outer() {
    // Array[ Array[ Byte 7, Break(1)[] ], Byte 8 ] End
    let bytes = [
        0x09, 0x02, 0x00, //
        0x09, 0x02, 0x00, //
        0x01, 0x07, //
        0x0B, 0x01, 0x00, //
        0x01, 0x08, //
        0x0A,
    ];
    let message = decode_one(&bytes).unwrap();
    assert_eq!(
        message.value,
        Value::Array(vec![
            Value::Array(vec![Value::byte(7), Value::error(1, vec![])]),
            Value::byte(8),
        ])
    );
    assert_eq!(message.errors.keys().copied().collect::<Vec<_>>(), vec![3]);
    assert_eq!(message.errors[&3], record(1, vec![]));
    assert_eq!(message.len, 14);
}

#[test]
fn level_deeper_than_nesting_is_not_unwound() {
    // Array[ Break(2)[] ]: one loop terminated, one level left over.
    let bytes = [0x09, 0x02, 0x00, 0x0B, 0x02, 0x00];
    let err = decode_one(&bytes).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Protocol(ProtocolError::BreakNotUnwound { remaining: 1 })
    ));
}

// ── Top level ─────────────────────────────────────────────────────────────────

#[test]
fn top_level_level_zero_break_is_a_message() {
    let message = decode_one(&[0x0B, 0x00, 0x00]).unwrap();
    assert_eq!(message.value, Value::error(0, vec![]));
    assert_eq!(message.errors[&0], record(0, vec![]));
}

#[test]
fn top_level_break_with_level_fails() {
    let err = decode_one(&[0x0B, 0x01, 0x00]).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Protocol(ProtocolError::BreakNotUnwound { remaining: 1 })
    ));
}

// ── Sub-messages ──────────────────────────────────────────────────────────────

#[test]
fn sub_messages_may_be_composites() {
    // Break(0) with two sub-messages: Array[Byte 1] and Word 2.
    let bytes = [
        0x0B, 0x00, 0x02, //
        0x09, 0x02, 0x00, 0x01, 0x01, 0x0A, //
        0x02, 0x02, 0x00,
    ];
    let message = decode_one(&bytes).unwrap();
    assert_eq!(
        message.value,
        Value::error(0, vec![Value::Array(vec![Value::byte(1)]), Value::word(2)])
    );
    assert_eq!(message.len, bytes.len() as u64);
}

#[test]
fn nested_break_is_rejected() {
    let err = decode_one(&[0x0B, 0x00, 0x01, 0x0B, 0x00, 0x00]).unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(matches!(err, DecodeError::Protocol(ProtocolError::NestedBreak)));
}

#[test]
fn nested_break_inside_sub_message_array_is_rejected() {
    let bytes = [0x0B, 0x00, 0x01, 0x09, 0x02, 0x00, 0x0B, 0x00, 0x00];
    let err = decode_one(&bytes).unwrap_err();
    assert!(matches!(err, DecodeError::Protocol(ProtocolError::NestedBreak)));
}

#[test]
fn nested_break_is_rejected_before_its_header() {
    // The inner Break has no level or count bytes.
    let err = decode_one(&[0x0B, 0x00, 0x01, 0x0B]).unwrap_err();
    assert!(matches!(err, DecodeError::Protocol(ProtocolError::NestedBreak)));
}

#[test]
fn missing_sub_messages_exhaust_the_stream() {
    // Break announces two sub-messages but carries one.
    let err = decode_one(&[0x0B, 0x00, 0x02, 0x01, 0x05]).unwrap_err();
    assert!(err.is_exhausted());
}

// ── Chains ────────────────────────────────────────────────────────────────────

#[test]
fn break_in_chain_goes_to_the_error_log_only() {
    // Chain[ "ab", Break(1)[Byte 9] ]: the break ends the chain.
    let bytes = [
        0x09, 0x01, 0x00, //
        0x05, 0x02, b'a', b'b', //
        0x0B, 0x01, 0x01, 0x01, 0x09,
    ];
    let message = decode_one(&bytes).unwrap();
    assert_eq!(message.value, Value::buffer(*b"ab"));
    assert_eq!(message.errors[&2], record(1, vec![Value::byte(9)]));
    assert_eq!(message.len, bytes.len() as u64);
}

#[test]
fn level_zero_break_in_chain_keeps_joining() {
    let bytes = [
        0x09, 0x01, 0x00, //
        0x05, 0x02, b'a', b'b', //
        0x0B, 0x00, 0x00, //
        0x05, 0x01, b'c', //
        0x0A,
    ];
    let message = decode_one(&bytes).unwrap();
    assert_eq!(message.value, Value::buffer(*b"abc"));
    assert_eq!(message.errors[&2], record(0, vec![]));
}

#[test]
fn break_in_inner_chain_aborts_outer_array() {
    // Array[ Chain[ "x", Break(2)[] ] ]
    let bytes = [
        0x09, 0x02, 0x00, //
        0x09, 0x01, 0x00, //
        0x05, 0x01, b'x', //
        0x0B, 0x02, 0x00,
    ];
    let message = decode_one(&bytes).unwrap();
    assert_eq!(message.value, Value::Array(vec![Value::buffer(*b"x")]));
    assert_eq!(message.errors[&3], record(2, vec![]));
}

// ── Independence ──────────────────────────────────────────────────────────────

#[test]
fn error_logs_are_per_message() {
    let bytes = [samples::with_breaks(), samples::with_breaks()].concat();
    let messages = decode_all(&bytes).unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].errors.keys().collect::<Vec<_>>(), vec![&3]);
    assert!(messages[1].errors.is_empty());
    assert_eq!(messages[2].errors.keys().collect::<Vec<_>>(), vec![&3]);
    assert!(messages[3].errors.is_empty());
}
