//! Per-field byte encodings.
//!
//! Every encoding except a non-terminal blob preserves the natural order of
//! its kind under lexicographic byte comparison:
//! - `Bool`: one byte, `0x00` / `0x01`
//! - `Int`: sign-flipped big-endian `i64`
//! - `Uint`: big-endian `u64`
//! - `Text`: UTF-8 with `0x00` escaped as `0x00 0xFF`, terminated by `0x00 0x00`
//! - `Blob`, terminal position: raw bytes to the end of the key
//! - `Blob`, any other position: `u16` big-endian length then raw bytes
//!
//! The length-prefixed blob sorts by length first, so it is not ordered.

use crate::{db::codec::KeyDecodeError, model::field::FieldKind, value::Value};

const LENGTH_BYTES: usize = 2;
const ESCAPE: u8 = 0x00;
const ESCAPED_ZERO: u8 = 0xFF;
const TERMINATOR: u8 = 0x00;

///
/// FieldEncodeError
///

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum FieldEncodeError {
    KindMismatch { expected: FieldKind, actual: FieldKind },
    SegmentTooLarge { len: usize },
}

/// Whether the encoding of `kind` at this position is order-preserving.
#[must_use]
pub(crate) const fn is_ordered(kind: FieldKind, terminal: bool) -> bool {
    !matches!(kind, FieldKind::Blob) || terminal
}

/// Append the encoding of one field value.
pub(crate) fn encode_field(
    kind: FieldKind,
    terminal: bool,
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<(), FieldEncodeError> {
    match (kind, value) {
        (FieldKind::Bool, Value::Bool(v)) => out.push(u8::from(*v)),
        (FieldKind::Int, Value::Int(v)) => out.extend_from_slice(&ordered_i64_bytes(*v)),
        (FieldKind::Uint, Value::Uint(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (FieldKind::Text, Value::Text(v)) => push_terminated_bytes(out, v.as_bytes()),
        (FieldKind::Blob, Value::Blob(v)) if terminal => out.extend_from_slice(v),
        (FieldKind::Blob, Value::Blob(v)) => {
            let len = u16::try_from(v.len())
                .map_err(|_| FieldEncodeError::SegmentTooLarge { len: v.len() })?;
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(v);
        }
        (expected, actual) => {
            return Err(FieldEncodeError::KindMismatch {
                expected,
                actual: actual.kind(),
            });
        }
    }

    Ok(())
}

/// Consume one field encoding from the front of `input`.
pub(crate) fn decode_field(
    field: &'static str,
    kind: FieldKind,
    terminal: bool,
    input: &mut &[u8],
) -> Result<Value, KeyDecodeError> {
    let value = match kind {
        FieldKind::Bool => match take(field, input, 1)? {
            [0] => Value::Bool(false),
            [1] => Value::Bool(true),
            [byte] => return Err(KeyDecodeError::InvalidBool { field, byte: *byte }),
            _ => return Err(KeyDecodeError::Truncated { field }),
        },
        FieldKind::Int => Value::Int(i64_from_ordered(take_array(field, input)?)),
        FieldKind::Uint => Value::Uint(u64::from_be_bytes(take_array(field, input)?)),
        FieldKind::Text => {
            let bytes = take_terminated_bytes(field, input)?;
            let text =
                String::from_utf8(bytes).map_err(|_| KeyDecodeError::InvalidUtf8 { field })?;
            Value::Text(text)
        }
        FieldKind::Blob if terminal => {
            let bytes = input.to_vec();
            *input = &[];
            Value::Blob(bytes)
        }
        FieldKind::Blob => {
            let len = u16::from_be_bytes(take_array(field, input)?);
            Value::Blob(take(field, input, usize::from(len))?.to_vec())
        }
    };

    Ok(value)
}

fn take<'a>(
    field: &'static str,
    input: &mut &'a [u8],
    len: usize,
) -> Result<&'a [u8], KeyDecodeError> {
    if input.len() < len {
        return Err(KeyDecodeError::Truncated { field });
    }
    let (head, rest) = input.split_at(len);
    *input = rest;

    Ok(head)
}

fn take_array<const N: usize>(
    field: &'static str,
    input: &mut &[u8],
) -> Result<[u8; N], KeyDecodeError> {
    let bytes = take(field, input, N)?;

    <[u8; N]>::try_from(bytes).map_err(|_| KeyDecodeError::Truncated { field })
}

fn push_terminated_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    for &byte in bytes {
        if byte == ESCAPE {
            out.extend_from_slice(&[ESCAPE, ESCAPED_ZERO]);
        } else {
            out.push(byte);
        }
    }

    out.extend_from_slice(&[ESCAPE, TERMINATOR]);
}

fn take_terminated_bytes(
    field: &'static str,
    input: &mut &[u8],
) -> Result<Vec<u8>, KeyDecodeError> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < input.len() {
        let byte = input[i];
        if byte != ESCAPE {
            out.push(byte);
            i += 1;
            continue;
        }

        match input.get(i + 1) {
            Some(&TERMINATOR) => {
                *input = &input[i + LENGTH_BYTES..];
                return Ok(out);
            }
            Some(&ESCAPED_ZERO) => {
                out.push(0);
                i += LENGTH_BYTES;
            }
            Some(&other) => return Err(KeyDecodeError::InvalidEscape { field, byte: other }),
            None => break,
        }
    }

    Err(KeyDecodeError::Truncated { field })
}

const fn ordered_i64_bytes(value: i64) -> [u8; 8] {
    let biased = value.cast_unsigned() ^ (1u64 << 63);
    biased.to_be_bytes()
}

const fn i64_from_ordered(bytes: [u8; 8]) -> i64 {
    (u64::from_be_bytes(bytes) ^ (1u64 << 63)).cast_signed()
}

///
/// TESTS
///
