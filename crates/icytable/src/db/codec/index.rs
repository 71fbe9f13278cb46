use crate::{
    db::codec::{DecodedEntry, KeyCodec, KeyDecodeError, KeyEncodeError},
    model::{
        index::IndexModel,
        table::{ModelError, TableModel},
    },
    value::Value,
};

///
/// IndexKeyCodec
///
/// Entry layout: `prefix ‖ index key ‖ primary key body → ∅`.
/// Index fields are never terminal here because the primary key follows,
/// so a blob anywhere in the index key is length-prefixed.
///

#[derive(Clone, Debug)]
pub struct IndexKeyCodec {
    key: KeyCodec,
    primary: KeyCodec,
}

impl IndexKeyCodec {
    pub(crate) fn new(
        table: &'static TableModel,
        index: &IndexModel,
        primary: &KeyCodec,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            key: KeyCodec::new(table, index.id, index.fields, false)?,
            primary: primary.clone(),
        })
    }

    #[must_use]
    pub const fn key_codec(&self) -> &KeyCodec {
        &self.key
    }

    pub fn encode_entry_key(
        &self,
        index_values: &[Value],
        primary_values: &[Value],
    ) -> Result<Vec<u8>, KeyEncodeError> {
        self.primary.check_full(primary_values)?;

        let mut out = self.key.encode_full_key(index_values)?;
        self.primary.encode_body(primary_values, &mut out)?;

        Ok(out)
    }

    pub fn decode_entry_key(&self, bytes: &[u8]) -> Result<DecodedEntry, KeyDecodeError> {
        let mut input = self.key.strip_prefix(bytes)?;
        let keys = self.key.decode_body(&mut input)?;

        let mut primary_key_bytes = self.primary.prefix().to_vec();
        primary_key_bytes.extend_from_slice(input);
        let primary_key = self.primary.decode_body(&mut input)?;
        if !input.is_empty() {
            return Err(KeyDecodeError::TrailingBytes(input.len()));
        }

        Ok(DecodedEntry {
            keys,
            primary_key,
            primary_key_bytes,
        })
    }
}

///
/// TESTS
///
