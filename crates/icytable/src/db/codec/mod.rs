//! Module: codec
//! Responsibility: turning key tuples into store keys and back.
//! Owns the byte layout of every entry in both stores:
//! - commitment: `prefix(table, 0) ‖ pk → record`
//! - unique secondary: `prefix(table, index) ‖ index key → pk key`
//! - non-unique secondary: `prefix(table, index) ‖ index key ‖ pk → ∅`
//!
//! Prefixes are `table id ‖ index id`, both big-endian `u32`.

mod field;
mod index;
mod key;
mod primary;
mod unique;

pub use index::IndexKeyCodec;
pub use key::KeyCodec;
pub use primary::PrimaryKeyCodec;
pub use unique::UniqueKeyCodec;

use crate::{error::InternalError, model::field::FieldKind, value::Value};
use thiserror::Error as ThisError;

///
/// KeyEncodeError
/// Caller-supplied values that cannot be encoded under an index.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum KeyEncodeError {
    #[error("key has {len} values but index ({fields}) has {max} fields")]
    TooManyValues {
        fields: String,
        len: usize,
        max: usize,
    },

    #[error("key has {len} values but a full key for ({fields}) needs {expected}")]
    IncompleteKey {
        fields: String,
        len: usize,
        expected: usize,
    },

    #[error("field '{field}' expects {expected}, got {actual}")]
    KindMismatch {
        field: &'static str,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("field '{field}' segment exceeds max length: {len} bytes")]
    SegmentTooLarge { field: &'static str, len: usize },

    #[error("record has no value for field '{field}'")]
    MissingField { field: &'static str },
}

impl From<KeyEncodeError> for InternalError {
    fn from(err: KeyEncodeError) -> Self {
        Self::codec_unsupported(err.to_string())
    }
}

///
/// KeyDecodeError
/// Stored bytes that do not parse under the index that owns them.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum KeyDecodeError {
    #[error("key does not start with the index prefix")]
    PrefixMismatch,

    #[error("truncated segment for field '{field}'")]
    Truncated { field: &'static str },

    #[error("invalid bool byte {byte:#04x} for field '{field}'")]
    InvalidBool { field: &'static str, byte: u8 },

    #[error("invalid escape byte {byte:#04x} for field '{field}'")]
    InvalidEscape { field: &'static str, byte: u8 },

    #[error("field '{field}' is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    #[error("{0} trailing bytes after key")]
    TrailingBytes(usize),
}

impl From<KeyDecodeError> for InternalError {
    fn from(err: KeyDecodeError) -> Self {
        Self::codec_corruption(err.to_string())
    }
}

///
/// DecodedEntry
/// One index entry split into its index key and the primary key it names.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedEntry {
    pub keys: Vec<Value>,
    pub primary_key: Vec<Value>,
    pub primary_key_bytes: Vec<u8>,
}
