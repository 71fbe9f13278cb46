mod cbor;

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

/// Generic CBOR serialization infrastructure for stored record bytes.
///
/// This module is format-level only:
/// - Callers that need bounded decode pass explicit limits.
/// - Store size policy lives in `db::store`, not here.

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("deserialize size limit exceeded: {len} bytes (limit {max_bytes})")]
    DeserializeSizeLimitExceeded { len: usize, max_bytes: usize },
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        // Encoding a record is a caller-side failure; failing to decode stored
        // bytes means the store holds something we never wrote.
        let class = match &err {
            SerializeError::Serialize(_) => ErrorClass::Unsupported,
            SerializeError::Deserialize(_) | SerializeError::DeserializeSizeLimitExceeded { .. } => {
                ErrorClass::Corruption
            }
        };

        Self::new(class, ErrorOrigin::Serialize, err.to_string())
    }
}

/// Serialize a value using the crate's storage format.
pub fn serialize<T>(ty: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    cbor::serialize(ty)
}

/// Deserialize a value produced by [`serialize`], rejecting payloads larger
/// than `max_bytes` before decoding.
pub fn deserialize_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    cbor::deserialize_bounded(bytes, max_bytes)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Sample {
        id: u64,
        name: String,
    }

    #[test]
    fn bounded_decode_rejects_oversized_payload() {
        let bytes = serialize(&Sample {
            id: 1,
            name: "abcdefgh".into(),
        })
        .unwrap();

        let err = deserialize_bounded::<Sample>(&bytes, 4).unwrap_err();
        assert!(matches!(
            err,
            SerializeError::DeserializeSizeLimitExceeded { max_bytes: 4, .. }
        ));
        assert_eq!(InternalError::from(err).class, ErrorClass::Corruption);
    }

    #[test]
    fn garbage_bytes_surface_as_corruption() {
        let err = deserialize_bounded::<Sample>(&[0xff, 0x00, 0x13], 1024).unwrap_err();

        assert_eq!(InternalError::from(err).class, ErrorClass::Corruption);
    }
}
