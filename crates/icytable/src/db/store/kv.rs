use crate::{
    db::{
        list::Direction,
        store::{
            RawKey, RawValue,
            range::{envelope_is_empty, raw_bound},
        },
    },
    error::InternalError,
};
use canic_cdk::structures::{BTreeMap, DefaultMemoryImpl, memory::VirtualMemory};
use std::ops::Bound;

///
/// KvReader
///
/// Point-read surface of one store. Absence is `Ok(None)`, never an error.
///

pub trait KvReader {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, InternalError>;

    fn has(&self, key: &[u8]) -> Result<bool, InternalError> {
        Ok(self.get(key)?.is_some())
    }
}

///
/// KvWriter
///
/// Mutation surface handed to indexers. Inside a batch every call is
/// buffered; nothing reaches the store until the batch is written.
///

pub trait KvWriter: KvReader {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), InternalError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), InternalError>;
}

///
/// KvStore
///
/// Ordered byte-keyed map over one stable-memory region.
///

pub struct KvStore {
    map: BTreeMap<RawKey, RawValue, VirtualMemory<DefaultMemoryImpl>>,
}

impl KvStore {
    #[must_use]
    /// Initialize a store with the provided backing memory.
    pub fn init(memory: VirtualMemory<DefaultMemoryImpl>) -> Self {
        Self {
            map: BTreeMap::init(memory),
        }
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Snapshot every entry in key order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.map
            .iter()
            .map(|entry| (entry.key().as_bytes().to_vec(), entry.value().into_vec()))
            .collect()
    }

    /// First entry inside `(lower, upper)` in the given direction.
    ///
    /// Iterators call this once per step with a lower/upper bound narrowed
    /// past the last key they returned, so no map borrow outlives the call.
    #[must_use]
    pub(crate) fn seek(
        &self,
        lower: &Bound<Vec<u8>>,
        upper: &Bound<Vec<u8>>,
        direction: Direction,
    ) -> Option<(Vec<u8>, Vec<u8>)> {
        if envelope_is_empty(lower, upper) {
            return None;
        }

        let mut range = self.map.range((raw_bound(lower), raw_bound(upper)));
        let entry = match direction {
            Direction::Asc => range.next(),
            Direction::Desc => range.next_back(),
        }?;

        Some((entry.key().as_bytes().to_vec(), entry.value().into_vec()))
    }

    // Apply-phase mutations. Limits were checked when the batch was planned.
    pub(crate) fn apply_set(&mut self, key: RawKey, value: RawValue) {
        self.map.insert(key, value);
    }

    pub(crate) fn apply_delete(&mut self, key: &RawKey) {
        self.map.remove(key);
    }
}

impl KvReader for KvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, InternalError> {
        Ok(self
            .map
            .get(&RawKey::bound(key.to_vec()))
            .map(RawValue::into_vec))
    }

    fn has(&self, key: &[u8]) -> Result<bool, InternalError> {
        Ok(self.map.contains_key(&RawKey::bound(key.to_vec())))
    }
}

///
/// TESTS
///
