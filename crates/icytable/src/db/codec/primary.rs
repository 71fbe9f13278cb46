use crate::{
    db::codec::{KeyCodec, KeyEncodeError},
    error::InternalError,
    model::table::{ModelError, TableModel},
    serialize::{deserialize_bounded, serialize},
    traits::Record,
    value::{Value, format_key},
};
use std::marker::PhantomData;

///
/// PrimaryKeyCodec
///
/// Key codec of the commitment store plus the record value codec.
/// The primary key always ends the stored key, so a trailing blob field
/// keeps its ordered raw encoding.
///

pub struct PrimaryKeyCodec<R: Record> {
    key: KeyCodec,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> PrimaryKeyCodec<R> {
    pub(crate) fn new() -> Result<Self, ModelError> {
        let model = R::MODEL;
        let key = KeyCodec::new(
            model,
            TableModel::PRIMARY_KEY_INDEX_ID,
            model.primary_key,
            true,
        )?;

        Ok(Self {
            key,
            _marker: PhantomData,
        })
    }

    #[must_use]
    pub const fn key_codec(&self) -> &KeyCodec {
        &self.key
    }

    /// Project the primary key tuple of a record.
    pub fn primary_key(&self, record: &R) -> Result<Vec<Value>, KeyEncodeError> {
        self.key.project(record)
    }

    /// Encode the commitment-store key of a record.
    pub fn encode_record_key(&self, record: &R) -> Result<Vec<u8>, KeyEncodeError> {
        let values = self.primary_key(record)?;

        self.key.encode_full_key(&values)
    }

    /// Encode the stored value of a record.
    pub fn encode_value(&self, record: &R) -> Result<Vec<u8>, InternalError> {
        Ok(serialize(record)?)
    }

    /// Decode a stored entry back into a record.
    ///
    /// The record's own primary key must match the key it is stored under;
    /// a mismatch means the entry was written under the wrong key.
    pub fn unmarshal(&self, key: &[u8], value: &[u8], max_bytes: usize) -> Result<R, InternalError> {
        let stored_key = self.key.decode_key(key)?;
        let record: R = deserialize_bounded(value, max_bytes)?;

        let record_key = self
            .primary_key(&record)
            .map_err(|err| InternalError::store_corruption(err.to_string()))?;
        if record_key != stored_key {
            return Err(InternalError::store_corruption(format!(
                "{}: record primary key {} does not match stored key {}",
                R::MODEL.name,
                format_key(&record_key),
                format_key(&stored_key),
            )));
        }

        Ok(record)
    }
}

///
/// TESTS
///
