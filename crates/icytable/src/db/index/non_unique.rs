use crate::{
    db::{
        backend::ReadBackend,
        codec::{IndexKeyCodec, KeyCodec, PrimaryKeyCodec},
        index::{Index, Indexer, PrimaryKeyIndex},
        iterator::{EntrySource, IndexIterator, prefix_key_bounds, range_key_bounds},
        list::ListOptions,
        store::KvWriter,
    },
    error::InternalError,
    model::index::IndexModel,
    traits::Record,
    value::Value,
};
use std::sync::Arc;

///
/// NonUniqueIndex
///
/// Secondary index where many records may share a key. Entries carry the
/// primary key in the stored key itself, so they are unique per record.
///

pub struct NonUniqueIndex<R: Record> {
    model: &'static IndexModel,
    codec: Arc<IndexKeyCodec>,
    primary: Arc<PrimaryKeyIndex<R>>,
}

impl<R: Record> NonUniqueIndex<R> {
    pub(crate) const fn new(
        model: &'static IndexModel,
        codec: Arc<IndexKeyCodec>,
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
}

impl<R: Record> Index<R> for NonUniqueIndex<R> {
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
            EntrySource::NonUnique(&self.codec),
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
            EntrySource::NonUnique(&self.codec),
            codec.prefix(),
            bounds,
            &options,
        )
    }
}

///
/// NonUniqueIndexer
///

pub(crate) struct NonUniqueIndexer<R: Record> {
    model: &'static IndexModel,
    codec: Arc<IndexKeyCodec>,
    primary: Arc<PrimaryKeyCodec<R>>,
}

impl<R: Record> NonUniqueIndexer<R> {
    pub(crate) const fn new(
        model: &'static IndexModel,
        codec: Arc<IndexKeyCodec>,
        primary: Arc<PrimaryKeyCodec<R>>,
    ) -> Self {
        Self {
            model,
            codec,
            primary,
        }
    }

    fn entry_key(&self, record: &R) -> Result<Vec<u8>, InternalError> {
        let keys = self.codec.key_codec().project(record)?;
        let pk = self.primary.primary_key(record)?;

        Ok(self.codec.encode_entry_key(&keys, &pk)?)
    }
}

impl<R: Record> Indexer<R> for NonUniqueIndexer<R> {
    fn index_model(&self) -> &'static IndexModel {
        self.model
    }

    fn on_insert(&self, writer: &mut dyn KvWriter, new: &R) -> Result<(), InternalError> {
        let key = self.entry_key(new)?;

        writer.set(&key, &[])
    }

    fn on_update(
        &self,
        writer: &mut dyn KvWriter,
        new: &R,
        existing: &R,
    ) -> Result<(), InternalError> {
        let new_key = self.entry_key(new)?;
        let old_key = self.entry_key(existing)?;
        if new_key == old_key {
            return Ok(());
        }

        writer.delete(&old_key)?;
        writer.set(&new_key, &[])
    }

    fn on_delete(&self, writer: &mut dyn KvWriter, record: &R) -> Result<(), InternalError> {
        let key = self.entry_key(record)?;

        writer.delete(&key)
    }
}
