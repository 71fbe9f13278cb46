use crate::{
    db::{
        backend::{Backend, ReadBackend},
        batch::BatchWriter,
        codec::{KeyCodec, PrimaryKeyCodec},
        index::{Index, Indexer, UniqueIndex},
        iterator::{EntrySource, IndexIterator, prefix_key_bounds, range_key_bounds},
        list::ListOptions,
        store::{KvReader, KvWriter},
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent, OpKind, Span},
    traits::Record,
    value::{Value, format_key},
};
use std::sync::Arc;
use tracing::{debug, warn};

///
/// SaveMode
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SaveMode {
    /// Fail with a conflict when the primary key already exists.
    Insert,
    /// Fail with not-found when the primary key does not exist.
    Update,
    /// Insert or replace.
    #[default]
    Upsert,
}

///
/// PrimaryKeyIndex
///
/// The authoritative index: its entries in the commitment store define
/// which records exist. Every mutation goes through here and fans out to
/// the registered secondary indexers inside one batch.
///

pub struct PrimaryKeyIndex<R: Record> {
    codec: Arc<PrimaryKeyCodec<R>>,
    indexers: Vec<Box<dyn Indexer<R>>>,
}

impl<R: Record> PrimaryKeyIndex<R> {
    pub fn new() -> Result<Self, InternalError> {
        R::MODEL.validate()?;

        Ok(Self {
            codec: Arc::new(PrimaryKeyCodec::new()?),
            indexers: Vec::new(),
        })
    }

    /// Add an indexer the primary index fans every mutation out to.
    pub fn register_indexer(&mut self, indexer: Box<dyn Indexer<R>>) {
        self.indexers.push(indexer);
    }

    #[must_use]
    pub fn codec(&self) -> &PrimaryKeyCodec<R> {
        &self.codec
    }

    pub(crate) fn shared_codec(&self) -> Arc<PrimaryKeyCodec<R>> {
        Arc::clone(&self.codec)
    }

    /// Insert, update or upsert one record.
    pub fn save(
        &self,
        backend: &mut dyn Backend,
        record: &R,
        mode: SaveMode,
    ) -> Result<(), InternalError> {
        let table = R::MODEL.name;
        let mut span = Span::new(OpKind::Save, table, backend.config().metrics_enabled);

        let pk = self.codec.primary_key(record)?;
        let key = self.codec.key_codec().encode_full_key(&pk)?;
        let existing = self.load(&*backend, &key)?;

        match (mode, &existing) {
            (SaveMode::Insert, Some(_)) => {
                return Err(InternalError::table_conflict(format!(
                    "{table}: record already exists: {}",
                    format_key(&pk)
                )));
            }
            (SaveMode::Update, None) => {
                return Err(InternalError::table_not_found(format!(
                    "{table} {}",
                    format_key(&pk)
                )));
            }
            _ => {}
        }

        if let Some(hooks) = backend.hooks() {
            let result = match &existing {
                Some(old) => hooks.on_update(record, old),
                None => hooks.on_insert(record),
            };
            result.inspect_err(|err| self.hook_aborted(&*backend, err))?;
        }

        let value = self.codec.encode_value(record)?;

        let metrics_enabled = backend.config().metrics_enabled;
        let mut batch = BatchWriter::new(backend);
        batch.commitment_store()?.set(&key, &value)?;
        {
            let mut writer = batch.index_store()?;
            for indexer in &self.indexers {
                let result = match &existing {
                    Some(old) => indexer.on_update(&mut writer, record, old),
                    None => indexer.on_insert(&mut writer, record),
                };
                result.inspect_err(|err| {
                    if err.class == ErrorClass::Conflict && err.origin == ErrorOrigin::Index {
                        warn!(table, index = %indexer.index_model(), "unique index conflict");
                        sink::record_if(metrics_enabled, MetricsEvent::UniqueViolation { table });
                    }
                })?;
            }
        }
        let (inserts, removes) = batch.index_delta();
        batch.write()?;

        sink::record_if(
            metrics_enabled,
            MetricsEvent::IndexDelta {
                table,
                inserts,
                removes,
            },
        );
        debug!(table, key = %format_key(&pk), ?mode, "record saved");
        span.set_rows(1);

        Ok(())
    }

    // Read the stored record under an encoded primary key.
    pub(crate) fn load(
        &self,
        backend: &dyn ReadBackend,
        key: &[u8],
    ) -> Result<Option<R>, InternalError> {
        let Some(value) = backend.commitment_store_reader().get(key)? else {
            return Ok(None);
        };
        let max = backend.config().max_value_bytes as usize;

        self.codec.unmarshal(key, &value, max).map(Some)
    }

    fn hook_aborted(&self, backend: &dyn ReadBackend, err: &InternalError) {
        let table = R::MODEL.name;

        warn!(table, error = %err, "mutation rejected by backend hook");
        sink::record_if(
            backend.config().metrics_enabled,
            MetricsEvent::HookAbort { table },
        );
    }
}

impl<R: Record> Index<R> for PrimaryKeyIndex<R> {
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
            &self.codec,
            EntrySource::Primary,
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
            &self.codec,
            EntrySource::Primary,
            codec.prefix(),
            bounds,
            &options,
        )
    }
}

impl<R: Record> UniqueIndex<R> for PrimaryKeyIndex<R> {
    fn has(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<bool, InternalError> {
        let _span = Span::new(OpKind::Has, R::MODEL.name, backend.config().metrics_enabled);
        let key = self.codec.key_codec().encode_full_key(key)?;

        backend.commitment_store_reader().has(&key)
    }

    fn get(&self, backend: &dyn ReadBackend, key: &[Value]) -> Result<Option<R>, InternalError> {
        let mut span = Span::new(OpKind::Get, R::MODEL.name, backend.config().metrics_enabled);
        let key = self.codec.key_codec().encode_full_key(key)?;

        let record = self.load(backend, &key)?;
        span.set_rows(u64::from(record.is_some()));

        Ok(record)
    }

    fn delete_by_key(&self, backend: &mut dyn Backend, key: &[Value]) -> Result<(), InternalError> {
        let table = R::MODEL.name;
        let metrics_enabled = backend.config().metrics_enabled;
        let mut span = Span::new(OpKind::Delete, table, metrics_enabled);

        let encoded = self.codec.key_codec().encode_full_key(key)?;
        let Some(record) = self.load(&*backend, &encoded)? else {
            return Ok(());
        };

        if let Some(hooks) = backend.hooks() {
            hooks
                .on_delete(&record)
                .inspect_err(|err| self.hook_aborted(&*backend, err))?;
        }

        let mut batch = BatchWriter::new(backend);
        batch.commitment_store()?.delete(&encoded)?;
        {
            let mut writer = batch.index_store()?;
            for indexer in &self.indexers {
                indexer.on_delete(&mut writer, &record)?;
            }
        }
        let (inserts, removes) = batch.index_delta();
        batch.write()?;

        sink::record_if(
            metrics_enabled,
            MetricsEvent::IndexDelta {
                table,
                inserts,
                removes,
            },
        );
        debug!(table, key = %format_key(key), "record deleted");
        span.set_rows(1);

        Ok(())
    }
}
