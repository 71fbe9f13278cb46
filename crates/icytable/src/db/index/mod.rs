//! Module: index
//! Responsibility: the index contracts and their three implementations.
//!
//! The primary-key index is authoritative and owns every mutation. Secondary
//! indexes are read paths plus an `Indexer` the primary fans out to inside
//! each batch.

mod non_unique;
mod primary;
mod unique;

#[cfg(test)]
mod tests;

pub use non_unique::NonUniqueIndex;
pub use primary::{PrimaryKeyIndex, SaveMode};
pub use unique::UniqueKeyIndex;

pub(crate) use non_unique::NonUniqueIndexer;
pub(crate) use unique::UniqueIndexer;

use crate::{
    db::{
        backend::{Backend, ReadBackend},
        codec::KeyCodec,
        iterator::IndexIterator,
        list::ListOptions,
        store::KvWriter,
    },
    error::InternalError,
    model::{index::IndexModel, table::TableModel},
    traits::Record,
    value::Value,
};
use std::cmp::Ordering;

///
/// Index
///
/// Read surface shared by every index of a table. Indexes are stateless;
/// all state lives in the backend passed to each call.
///

pub trait Index<R: Record> {
    fn key_codec(&self) -> &KeyCodec;

    /// Ordered scan of `[start, end]`.
    ///
    /// `start` must not sort after `end` and the bounds may only differ on
    /// ordered fields. A partial `end` includes every key it prefixes; a full
    /// `end` is an inclusive exact bound.
    fn range_iterator<'b>(
        &'b self,
        backend: &'b dyn ReadBackend,
        start: &[Value],
        end: &[Value],
        options: ListOptions,
    ) -> Result<IndexIterator<'b, R>, InternalError>;

    /// Ordered scan of every entry whose key starts with `prefix`.
    fn prefix_iterator<'b>(
        &'b self,
        backend: &'b dyn ReadBackend,
        prefix: &[Value],
        options: ListOptions,
    ) -> Result<IndexIterator<'b, R>, InternalError>;

    /// Ordered scan of the whole index.
    fn iterator<'b>(
        &'b self,
        backend: &'b dyn ReadBackend,
        options: ListOptions,
    ) -> Result<IndexIterator<'b, R>, InternalError> {
        self.prefix_iterator(backend, &[], options)
    }

    fn table_model(&self) -> &'static TableModel {
        R::MODEL
    }

    fn field_names(&self) -> Vec<&'static str> {
        self.key_codec().field_names()
    }

    fn compare_keys(&self, a: &[Value], b: &[Value]) -> Ordering {
        self.key_codec().compare_keys(a, b)
    }

    fn is_fully_ordered(&self) -> bool {
        self.key_codec().is_fully_ordered()
    }
}

///
/// UniqueIndex
///
/// An index where a full key names at most one record. Keys are matched
/// positionally against the index fields.
///

pub trait UniqueIndex<R: Record>: Index<R> {
    fn has(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<bool, InternalError>;

    fn get(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<Option<R>, InternalError>;

    /// Delete the record this key names. Absence is not an error.
    fn delete_by_key(&self, backend: &mut dyn Backend, key: &[Value]) -> Result<(), InternalError>;
}

///
/// Indexer
///
/// Keeps one secondary index in step with the commitment store. Called by
/// the primary-key index inside an open batch; `writer` is the batch's
/// index-store view, and any error aborts the whole batch.
///

pub trait Indexer<R: Record> {
    fn index_model(&self) -> &'static IndexModel;

    fn on_insert(&self, writer: &mut dyn KvWriter, new: &R) -> Result<(), InternalError>;

    fn on_update(
        &self,
        writer: &mut dyn KvWriter,
        new: &R,
        existing: &R,
    ) -> Result<(), InternalError>;

    fn on_delete(&self, writer: &mut dyn KvWriter, record: &R) -> Result<(), InternalError>;
}

///
/// SecondaryIndex
/// Closed set of secondary index variants.
///

pub enum SecondaryIndex<R: Record> {
    Unique(UniqueKeyIndex<R>),
    NonUnique(NonUniqueIndex<R>),
}

impl<R: Record> SecondaryIndex<R> {
    #[must_use]
    pub const fn index_model(&self) -> &'static IndexModel {
        match self {
            Self::Unique(index) => index.index_model(),
            Self::NonUnique(index) => index.index_model(),
        }
    }

    #[must_use]
    pub const fn as_unique(&self) -> Option<&UniqueKeyIndex<R>> {
        match self {
            Self::Unique(index) => Some(index),
            Self::NonUnique(_) => None,
        }
    }
}

impl<R: Record> Index<R> for SecondaryIndex<R> {
    fn key_codec(&self) -> &KeyCodec {
        match self {
            Self::Unique(index) => index.key_codec(),
            Self::NonUnique(index) => index.key_codec(),
        }
    }

    fn range_iterator<'b>(
        &'b self,
        backend: &'b dyn ReadBackend,
        start: &[Value],
        end: &[Value],
        options: ListOptions,
    ) -> Result<IndexIterator<'b, R>, InternalError> {
        match self {
            Self::Unique(index) => index.range_iterator(backend, start, end, options),
            Self::NonUnique(index) => index.range_iterator(backend, start, end, options),
        }
    }

    fn prefix_iterator<'b>(
        &'b self,
        backend: &'b dyn ReadBackend,
        prefix: &[Value],
        options: ListOptions,
    ) -> Result<IndexIterator<'b, R>, InternalError> {
        match self {
            Self::Unique(index) => index.prefix_iterator(backend, prefix, options),
            Self::NonUnique(index) => index.prefix_iterator(backend, prefix, options),
        }
    }
}
