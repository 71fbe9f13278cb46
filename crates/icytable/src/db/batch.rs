//! Module: batch
//! Responsibility: buffered writes spanning the commitment store and the
//! index store, applied together or not at all.
//!
//! `write` plans every buffered op into raw entries first (the only step
//! that can fail) and then applies them. Nothing unapplied survives
//! `close`, and `Drop` closes.

use crate::{
    config::EngineConfig,
    db::{
        backend::Backend,
        store::{KvReader, KvStore, KvWriter, RawKey, RawValue},
    },
    error::InternalError,
    obs::sink::{self, MetricsEvent},
};
use std::collections::BTreeMap;
use tracing::debug;

///
/// BufferedOp
///

#[derive(Clone, Debug, Eq, PartialEq)]
enum BufferedOp {
    Set(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

///
/// OpBuffer
/// Ops in issue order plus the latest pending state per key.
///

#[derive(Debug, Default)]
struct OpBuffer {
    ops: Vec<BufferedOp>,
    latest: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl OpBuffer {
    fn push(&mut self, op: BufferedOp) {
        match &op {
            BufferedOp::Set(key, value) => {
                self.latest.insert(key.clone(), Some(value.clone()));
            }
            BufferedOp::Delete(key) => {
                self.latest.insert(key.clone(), None);
            }
        }
        self.ops.push(op);
    }

    fn len(&self) -> usize {
        self.ops.len()
    }

    fn counts(&self) -> (u64, u64) {
        self.ops.iter().fold((0, 0), |(sets, deletes), op| match op {
            BufferedOp::Set(..) => (sets + 1, deletes),
            BufferedOp::Delete(_) => (sets, deletes + 1),
        })
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.latest.clear();
    }

    fn plan(&self, config: &EngineConfig) -> Result<Vec<PlannedOp>, InternalError> {
        self.ops
            .iter()
            .map(|op| match op {
                BufferedOp::Set(key, value) => Ok(PlannedOp::Set(
                    RawKey::try_new(key.clone(), config.max_key_bytes)?,
                    RawValue::try_new(value.clone(), config.max_value_bytes)?,
                )),
                BufferedOp::Delete(key) => Ok(PlannedOp::Delete(RawKey::try_new(
                    key.clone(),
                    config.max_key_bytes,
                )?)),
            })
            .collect()
    }
}

///
/// PlannedOp
/// A buffered op whose raw entry has passed store limits.
///

enum PlannedOp {
    Set(RawKey, RawValue),
    Delete(RawKey),
}

fn apply(store: &mut KvStore, ops: Vec<PlannedOp>) {
    for op in ops {
        match op {
            PlannedOp::Set(key, value) => store.apply_set(key, value),
            PlannedOp::Delete(key) => store.apply_delete(&key),
        }
    }
}

///
/// BufferedWriter
///
/// Write view over one store for the lifetime of a batch. Reads see this
/// view's own pending ops first, then the store.
///

pub struct BufferedWriter<'w> {
    store: &'w KvStore,
    buffer: &'w mut OpBuffer,
}

impl KvReader for BufferedWriter<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, InternalError> {
        match self.buffer.latest.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.store.get(key),
        }
    }
}

impl KvWriter for BufferedWriter<'_> {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), InternalError> {
        self.buffer
            .push(BufferedOp::Set(key.to_vec(), value.to_vec()));

        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), InternalError> {
        self.buffer.push(BufferedOp::Delete(key.to_vec()));

        Ok(())
    }
}

///
/// BatchWriter
///
/// Owns the write borrow of a backend for its whole scope, so a second
/// writer on the same backend cannot exist at the same time.
///

pub struct BatchWriter<'a> {
    backend: &'a mut dyn Backend,
    commitment: OpBuffer,
    index: OpBuffer,
    closed: bool,
}

impl<'a> BatchWriter<'a> {
    pub fn new(backend: &'a mut dyn Backend) -> Self {
        Self {
            backend,
            commitment: OpBuffer::default(),
            index: OpBuffer::default(),
            closed: false,
        }
    }

    /// Write view over the commitment store.
    pub fn commitment_store(&mut self) -> Result<BufferedWriter<'_>, InternalError> {
        self.ensure_open()?;

        Ok(BufferedWriter {
            store: self.backend.commitment_store_reader(),
            buffer: &mut self.commitment,
        })
    }

    /// Write view over the index store.
    pub fn index_store(&mut self) -> Result<BufferedWriter<'_>, InternalError> {
        self.ensure_open()?;

        Ok(BufferedWriter {
            store: self.backend.index_store_reader(),
            buffer: &mut self.index,
        })
    }

    /// Number of buffered ops as `(commitment, index)`.
    #[must_use]
    pub fn pending(&self) -> (usize, usize) {
        (self.commitment.len(), self.index.len())
    }

    /// Buffered index-store ops as `(sets, deletes)`.
    #[must_use]
    pub fn index_delta(&self) -> (u64, u64) {
        self.index.counts()
    }

    /// Apply every buffered op: commitment ops first, then index ops, each
    /// in issue order. On error neither store has changed and the buffers
    /// are kept until `close`.
    pub fn write(&mut self) -> Result<(), InternalError> {
        self.ensure_open()?;

        let config = self.backend.config().clone();
        let commitment_ops = self.commitment.plan(&config)?;
        let index_ops = self.index.plan(&config)?;
        let counts = (commitment_ops.len() as u64, index_ops.len() as u64);

        apply(self.backend.commitment_store_mut(), commitment_ops);
        apply(self.backend.index_store_mut(), index_ops);

        self.commitment.clear();
        self.index.clear();

        debug!(
            commitment_ops = counts.0,
            index_ops = counts.1,
            "batch written"
        );
        sink::record_if(
            config.metrics_enabled,
            MetricsEvent::BatchWrite {
                commitment_ops: counts.0,
                index_ops: counts.1,
            },
        );

        Ok(())
    }

    /// Discard anything unapplied. Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            let (commitment, index) = self.pending();
            if commitment + index > 0 {
                debug!(commitment, index, "batch closed with unapplied ops");
            }
        }
        self.commitment.clear();
        self.index.clear();
        self.closed = true;
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), InternalError> {
        if self.closed {
            return Err(InternalError::store_invariant("batch writer is closed"));
        }

        Ok(())
    }
}

impl Drop for BatchWriter<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        db::backend::{ReadBackend, StoreBackend},
        error::{ErrorClass, ErrorOrigin},
        test_support::test_backend,
    };

    #[test]
    fn nothing_is_visible_before_write() {
        let mut backend = test_backend();
        {
            let mut batch = BatchWriter::new(&mut backend);
            batch.commitment_store().unwrap().set(b"k", b"v").unwrap();
            batch.index_store().unwrap().set(b"i", b"").unwrap();

            assert_eq!(batch.pending(), (1, 1));
        }

        assert!(backend.commitment_store_reader().is_empty());
        assert!(backend.index_store_reader().is_empty());
    }

    #[test]
    fn write_applies_both_stores_in_issue_order() {
        let mut backend = test_backend();
        {
            let mut batch = BatchWriter::new(&mut backend);
            let mut commitment = batch.commitment_store().unwrap();
            commitment.set(b"k", b"1").unwrap();
            commitment.set(b"k", b"2").unwrap();
            commitment.set(b"gone", b"x").unwrap();
            commitment.delete(b"gone").unwrap();
            batch.index_store().unwrap().set(b"i", b"").unwrap();

            batch.write().unwrap();
        }

        let commitment = backend.commitment_store_reader();
        assert_eq!(commitment.get(b"k").unwrap(), Some(b"2".to_vec()));
        assert_eq!(commitment.get(b"gone").unwrap(), None);
        assert!(backend.index_store_reader().has(b"i").unwrap());
    }

    #[test]
    fn buffered_view_reads_its_own_writes() {
        let mut backend = test_backend();
        let mut batch = BatchWriter::new(&mut backend);
        let mut index = batch.index_store().unwrap();

        index.set(b"a", b"1").unwrap();
        assert_eq!(index.get(b"a").unwrap(), Some(b"1".to_vec()));

        index.delete(b"a").unwrap();
        assert!(!index.has(b"a").unwrap());
    }

    #[test]
    fn oversized_index_entry_leaves_both_stores_untouched() {
        let config = EngineConfig {
            max_key_bytes: 4,
            ..EngineConfig::default()
        };
        let mut backend = test_backend().with_config(config).unwrap();
        {
            let mut batch = BatchWriter::new(&mut backend);
            batch.commitment_store().unwrap().set(b"ok", b"v").unwrap();
            batch
                .index_store()
                .unwrap()
                .set(b"too-long", b"")
                .unwrap();

            let err = batch.write().unwrap_err();
            assert_eq!(err.class, ErrorClass::Unsupported);
            assert_eq!(err.origin, ErrorOrigin::Store);
        }

        assert!(backend.commitment_store_reader().is_empty());
        assert!(backend.index_store_reader().is_empty());
    }

    #[test]
    fn close_is_idempotent_and_blocks_further_use() {
        let mut backend: StoreBackend = test_backend();
        let mut batch = BatchWriter::new(&mut backend);
        batch.commitment_store().unwrap().set(b"k", b"v").unwrap();

        batch.close();
        batch.close();

        assert!(batch.is_closed());
        assert_eq!(batch.pending(), (0, 0));
        assert_eq!(
            batch.write().unwrap_err().class,
            ErrorClass::InvariantViolation
        );
        assert!(batch.commitment_store().is_err());
    }
}
