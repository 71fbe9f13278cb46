use crate::{MAX_KEY_BYTES, MAX_VALUE_BYTES, error::InternalError, traits::Storable};
use canic_cdk::structures::storable::Bound;
use std::borrow::Cow;
use thiserror::Error as ThisError;

///
/// RawEntryError
/// Construction / storage-boundary errors.
///

#[derive(Debug, ThisError)]
pub(crate) enum RawEntryError {
    #[error("key exceeds max size: {len} bytes (limit {max})")]
    KeyTooLarge { len: usize, max: u32 },

    #[error("value exceeds max size: {len} bytes (limit {max})")]
    ValueTooLarge { len: usize, max: u32 },
}

impl From<RawEntryError> for InternalError {
    fn from(err: RawEntryError) -> Self {
        Self::store_unsupported(err.to_string())
    }
}

///
/// RawKey
///
/// Encoded store key. Ordering is plain byte order; the key codec is
/// responsible for making that order meaningful.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RawKey(Vec<u8>);

impl RawKey {
    /// Construct a raw key, enforcing `max` (itself capped by `MAX_KEY_BYTES`).
    pub(crate) fn try_new(bytes: Vec<u8>, max: u32) -> Result<Self, RawEntryError> {
        let max = max.min(MAX_KEY_BYTES);
        if bytes.len() > max as usize {
            return Err(RawEntryError::KeyTooLarge {
                len: bytes.len(),
                max,
            });
        }

        Ok(Self(bytes))
    }

    /// Wrap bytes that are only used as a range bound, never stored.
    pub(crate) const fn bound(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Storable for RawKey {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.0)
    }

    fn from_bytes(bytes: Cow<'_, [u8]>) -> Self {
        // Trusted store boundary: bounded by BOUND
        Self(bytes.into_owned())
    }

    fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    const BOUND: Bound = Bound::Bounded {
        max_size: MAX_KEY_BYTES,
        is_fixed_size: false,
    };
}

///
/// RawValue
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawValue(Vec<u8>);

impl RawValue {
    /// Construct a raw value, enforcing `max` (itself capped by `MAX_VALUE_BYTES`).
    pub(crate) fn try_new(bytes: Vec<u8>, max: u32) -> Result<Self, RawEntryError> {
        let max = max.min(MAX_VALUE_BYTES);
        if bytes.len() > max as usize {
            return Err(RawEntryError::ValueTooLarge {
                len: bytes.len(),
                max,
            });
        }

        Ok(Self(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Storable for RawValue {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.0)
    }

    fn from_bytes(bytes: Cow<'_, [u8]>) -> Self {
        Self(bytes.into_owned())
    }

    fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    const BOUND: Bound = Bound::Bounded {
        max_size: MAX_VALUE_BYTES,
        is_fixed_size: false,
    };
}

///
/// TESTS
///
