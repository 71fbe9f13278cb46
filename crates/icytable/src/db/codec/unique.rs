use crate::{
    db::codec::{DecodedEntry, KeyCodec, KeyDecodeError, KeyEncodeError},
    model::{
        index::IndexModel,
        table::{ModelError, TableModel},
    },
    value::Value,
};

///
/// UniqueKeyCodec
///
/// Entry layout: `prefix ‖ index key → primary key`. The index key is the
/// whole stored key, so at most one entry exists per index key.
///

#[derive(Clone, Debug)]
pub struct UniqueKeyCodec {
    key: KeyCodec,
    primary: KeyCodec,
}

impl UniqueKeyCodec {
    pub(crate) fn new(
        table: &'static TableModel,
        index: &IndexModel,
        primary: &KeyCodec,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            key: KeyCodec::new(table, index.id, index.fields, true)?,
            primary: primary.clone(),
        })
    }

    #[must_use]
    pub const fn key_codec(&self) -> &KeyCodec {
        &self.key
    }

    /// Encode `(key, value)` for one record's entry.
    pub fn encode_entry(
        &self,
        index_values: &[Value],
        primary_values: &[Value],
    ) -> Result<(Vec<u8>, Vec<u8>), KeyEncodeError> {
        let key = self.key.encode_full_key(index_values)?;
        let value = self.primary.encode_full_key(primary_values)?;

        Ok((key, value))
    }

    pub fn decode_entry(&self, key: &[u8], value: &[u8]) -> Result<DecodedEntry, KeyDecodeError> {
        Ok(DecodedEntry {
            keys: self.key.decode_key(key)?,
            primary_key: self.primary.decode_key(value)?,
            primary_key_bytes: value.to_vec(),
        })
    }
}
