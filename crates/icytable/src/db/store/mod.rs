//! Module: store
//! Responsibility: the two physical stores behind a backend and the raw
//! byte types they hold.
//! Does not own: key layout (codec) or batching (batch).

mod kv;
mod raw;
pub(crate) mod range;

pub use kv::{KvReader, KvStore, KvWriter};
pub use raw::{RawKey, RawValue};

use canic_cdk::structures::{DefaultMemoryImpl, memory::VirtualMemory};
use derive_more::{Deref, DerefMut};

///
/// CommitmentStore
///
/// Authoritative store: primary key bytes to encoded record bytes.
/// Existence of a record is defined by an entry here.
///

#[derive(Deref, DerefMut)]
pub struct CommitmentStore(KvStore);

impl CommitmentStore {
    #[must_use]
    pub fn init(memory: VirtualMemory<DefaultMemoryImpl>) -> Self {
        Self(KvStore::init(memory))
    }
}

///
/// IndexStore
///
/// Auxiliary store holding secondary index entries for every table on
/// the backend. Always derivable from the commitment store.
///

#[derive(Deref, DerefMut)]
pub struct IndexStore(KvStore);

impl IndexStore {
    #[must_use]
    pub fn init(memory: VirtualMemory<DefaultMemoryImpl>) -> Self {
        Self(KvStore::init(memory))
    }
}
