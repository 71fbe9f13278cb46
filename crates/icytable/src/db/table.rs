use crate::{
    db::{
        backend::{Backend, ReadBackend},
        codec::{IndexKeyCodec, UniqueKeyCodec},
        index::{
            Index, NonUniqueIndex, NonUniqueIndexer, PrimaryKeyIndex, SaveMode, SecondaryIndex,
            UniqueIndex, UniqueIndexer, UniqueKeyIndex,
        },
        iterator::IndexIterator,
        list::ListOptions,
    },
    error::InternalError,
    model::index::IndexModel,
    traits::Record,
    value::Value,
};
use std::sync::Arc;

///
/// Table
///
/// Every index of one record type, built from `R::MODEL`. The primary-key
/// index carries one indexer per secondary index, so mutations through the
/// table (or the primary index directly) keep both stores in step.
///

pub struct Table<R: Record> {
    primary: Arc<PrimaryKeyIndex<R>>,
    secondary: Vec<SecondaryIndex<R>>,
}

enum PendingIndex {
    Unique(&'static IndexModel, Arc<UniqueKeyCodec>),
    NonUnique(&'static IndexModel, Arc<IndexKeyCodec>),
}

impl<R: Record> Table<R> {
    /// Validate the model and build every index.
    pub fn new() -> Result<Self, InternalError> {
        let model = R::MODEL;
        let mut primary = PrimaryKeyIndex::<R>::new()?;
        let pk_codec = primary.shared_codec();

        let mut pending = Vec::with_capacity(model.indexes.len());
        for index in model.indexes {
            if index.unique {
                let codec = Arc::new(UniqueKeyCodec::new(model, index, pk_codec.key_codec())?);
                primary.register_indexer(Box::new(UniqueIndexer::new(
                    index,
                    Arc::clone(&codec),
                    Arc::clone(&pk_codec),
                )));
                pending.push(PendingIndex::Unique(index, codec));
            } else {
                let codec = Arc::new(IndexKeyCodec::new(model, index, pk_codec.key_codec())?);
                primary.register_indexer(Box::new(NonUniqueIndexer::new(
                    index,
                    Arc::clone(&codec),
                    Arc::clone(&pk_codec),
                )));
                pending.push(PendingIndex::NonUnique(index, codec));
            }
        }

        let primary = Arc::new(primary);
        let secondary = pending
            .into_iter()
            .map(|p| match p {
                PendingIndex::Unique(index, codec) => SecondaryIndex::Unique(UniqueKeyIndex::new(
                    index,
                    codec,
                    Arc::clone(&primary),
                )),
                PendingIndex::NonUnique(index, codec) => SecondaryIndex::NonUnique(
                    NonUniqueIndex::new(index, codec, Arc::clone(&primary)),
                ),
            })
            .collect();

        Ok(Self { primary, secondary })
    }

    #[must_use]
    pub fn primary_key(&self) -> &PrimaryKeyIndex<R> {
        &self.primary
    }

    #[must_use]
    pub fn indexes(&self) -> &[SecondaryIndex<R>] {
        &self.secondary
    }

    /// Secondary index with exactly these fields.
    #[must_use]
    pub fn index(&self, fields: &[&str]) -> Option<&SecondaryIndex<R>> {
        self.secondary
            .iter()
            .find(|index| index.index_model().fields == fields)
    }

    /// Unique index with exactly these fields; the primary key counts.
    #[must_use]
    pub fn unique_index(&self, fields: &[&str]) -> Option<&dyn UniqueIndex<R>> {
        if R::MODEL.primary_key == fields {
            return Some(self.primary.as_ref());
        }

        self.index(fields)
            .and_then(SecondaryIndex::as_unique)
            .map(|index| index as &dyn UniqueIndex<R>)
    }

    pub fn insert(&self, backend: &mut dyn Backend, record: &R) -> Result<(), InternalError> {
        self.primary.save(backend, record, SaveMode::Insert)
    }

    pub fn update(&self, backend: &mut dyn Backend, record: &R) -> Result<(), InternalError> {
        self.primary.save(backend, record, SaveMode::Update)
    }

    pub fn save(&self, backend: &mut dyn Backend, record: &R) -> Result<(), InternalError> {
        self.primary.save(backend, record, SaveMode::Upsert)
    }

    /// Delete the stored record with this record's primary key.
    pub fn delete(&self, backend: &mut dyn Backend, record: &R) -> Result<(), InternalError> {
        let pk = self.primary.codec().primary_key(record)?;

        self.primary.delete_by_key(backend, &pk)
    }

    pub fn has(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<bool, InternalError> {
        self.primary.has(backend, key)
    }

    pub fn get(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<Option<R>, InternalError> {
        self.primary.get(backend, key)
    }

    /// Scan records in primary-key order.
    pub fn list<'b>(
        &'b self,
        backend: &'b dyn ReadBackend,
        options: ListOptions,
    ) -> Result<IndexIterator<'b, R>, InternalError> {
        self.primary.iterator(backend, options)
    }
}
