use crate::{
    db::{
        backend::{Backend, ReadBackend},
        codec::{KeyCodec, PrimaryKeyCodec, UniqueKeyCodec},
        index::{Index, Indexer, PrimaryKeyIndex, UniqueIndex},
        iterator::{EntrySource, IndexIterator, prefix_key_bounds, range_key_bounds},
        list::ListOptions,
        store::{KvReader, KvWriter},
    },
    error::InternalError,
    model::index::IndexModel,
    obs::sink::{OpKind, Span},
    traits::Record,
    value::Value,
};
use std::sync::Arc;

///
/// UniqueKeyIndex
///
/// Secondary index whose full key names at most one record. Lookups go
/// index store → primary key → commitment store.
///

pub struct UniqueKeyIndex<R: Record> {
    model: &'static IndexModel,
    codec: Arc<UniqueKeyCodec>,
    primary: Arc<PrimaryKeyIndex<R>>,
}

impl<R: Record> UniqueKeyIndex<R> {
    pub(crate) const fn new(
        model: &'static IndexModel,
        codec: Arc<UniqueKeyCodec>,
        primary: Arc<PrimaryKeyIndex<R>>,
    ) -> Self {
        Self {
            model,
            codec,
            primary,
        }
    }

    #[must_use]
    pub const fn index_model(&self) -> &'static IndexModel {
        self.model
    }

    // Encoded primary key owning `key`, if any.
    fn owner(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<Option<Vec<u8>>, InternalError> {
        let index_key = self.codec.key_codec().encode_full_key(key)?;

        backend.index_store_reader().get(&index_key)
    }

    fn missing_record(&self) -> InternalError {
        InternalError::index_corruption(format!(
            "{}: unique index {} refers to a missing record",
            R::MODEL.name,
            self.model
        ))
    }
}

impl<R: Record> Index<R> for UniqueKeyIndex<R> {
    fn key_codec(&self) -> &KeyCodec {
        self.codec.key_codec()
    }

    fn range_iterator<'b>(
        &'b self,
        backend: &'b dyn ReadBackend,
        start: &[Value],
        end: &[Value],
        options: ListOptions,
    ) -> Result<IndexIterator<'b, R>, InternalError> {
        let codec = self.codec.key_codec();
        let bounds = range_key_bounds(codec, start, end, &options)?;

        IndexIterator::new(
            backend,
            self.primary.codec(),
            EntrySource::Unique(&self.codec),
            codec.prefix(),
            bounds,
            &options,
        )
    }

    fn prefix_iterator<'b>(
        &'b self,
        backend: &'b dyn ReadBackend,
        prefix: &[Value],
        options: ListOptions,
    ) -> Result<IndexIterator<'b, R>, InternalError> {
        let codec = self.codec.key_codec();
        let bounds = prefix_key_bounds(codec, prefix)?;

        IndexIterator::new(
            backend,
            self.primary.codec(),
            EntrySource::Unique(&self.codec),
            codec.prefix(),
            bounds,
            &options,
        )
    }
}

impl<R: Record> UniqueIndex<R> for UniqueKeyIndex<R> {
    fn has(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<bool, InternalError> {
        let _span = Span::new(OpKind::Has, R::MODEL.name, backend.config().metrics_enabled);

        Ok(self.owner(backend, key)?.is_some())
    }

    fn get(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<Option<R>, InternalError> {
        let mut span = Span::new(OpKind::Get, R::MODEL.name, backend.config().metrics_enabled);
        let Some(pk) = self.owner(backend, key)? else {
            return Ok(None);
        };

        let record = self
            .primary
            .load(backend, &pk)?
            .ok_or_else(|| self.missing_record())?;
        span.set_rows(1);

        Ok(Some(record))
    }

    fn delete_by_key(&self, backend: &mut dyn Backend, key: &[Value]) -> Result<(), InternalError> {
        let Some(pk) = self.owner(&*backend, key)? else {
            return Ok(());
        };
        if !backend.commitment_store_reader().has(&pk)? {
            return Err(self.missing_record());
        }
        let pk_values = self.primary.codec().key_codec().decode_key(&pk)?;

        self.primary.delete_by_key(backend, &pk_values)
    }
}

///
/// UniqueIndexer
///
/// Maintains `index key → primary key` entries and rejects a key that is
/// already owned by a different record.
///

pub(crate) struct UniqueIndexer<R: Record> {
    model: &'static IndexModel,
    codec: Arc<UniqueKeyCodec>,
    primary: Arc<PrimaryKeyCodec<R>>,
}

impl<R: Record> UniqueIndexer<R> {
    pub(crate) const fn new(
        model: &'static IndexModel,
        codec: Arc<UniqueKeyCodec>,
        primary: Arc<PrimaryKeyCodec<R>>,
    ) -> Self {
        Self {
            model,
            codec,
            primary,
        }
    }

    fn entry(&self, record: &R) -> Result<(Vec<u8>, Vec<u8>), InternalError> {
        let keys = self.codec.key_codec().project(record)?;
        let pk = self.primary.primary_key(record)?;

        Ok(self.codec.encode_entry(&keys, &pk)?)
    }
}

impl<R: Record> Indexer<R> for UniqueIndexer<R> {
    fn index_model(&self) -> &'static IndexModel {
        self.model
    }

    fn on_insert(&self, writer: &mut dyn KvWriter, new: &R) -> Result<(), InternalError> {
        let (key, value) = self.entry(new)?;

        if let Some(owner) = writer.get(&key)?
            && owner != value
        {
            return Err(InternalError::index_violation(
                R::MODEL.name,
                self.model.fields,
            ));
        }

        writer.set(&key, &value)
    }

    fn on_update(
        &self,
        writer: &mut dyn KvWriter,
        new: &R,
        existing: &R,
    ) -> Result<(), InternalError> {
        let (new_key, new_value) = self.entry(new)?;
        let (old_key, old_value) = self.entry(existing)?;
        if new_key == old_key && new_value == old_value {
            return Ok(());
        }

        writer.delete(&old_key)?;
        self.on_insert(writer, new)
    }

    fn on_delete(&self, writer: &mut dyn KvWriter, record: &R) -> Result<(), InternalError> {
        let (key, _) = self.entry(record)?;

        writer.delete(&key)
    }
}
