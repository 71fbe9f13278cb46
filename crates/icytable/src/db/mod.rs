//! Storage engine: stores, backends, key codecs, indexes and batches.

pub mod backend;
pub mod batch;
pub mod codec;
pub mod commitment;
mod direction;
pub mod index;
pub mod iterator;
pub mod list;
pub mod registry;
pub mod store;
pub mod table;

// re-exports
pub use backend::{Backend, Hooks, ReadBackend, StoreBackend};
pub use batch::{BatchWriter, BufferedWriter};
pub use commitment::commitment_root;
pub use index::{
    Index, Indexer, NonUniqueIndex, PrimaryKeyIndex, SaveMode, SecondaryIndex, UniqueIndex,
    UniqueKeyIndex,
};
pub use iterator::IndexIterator;
pub use list::ListOptions;
pub use registry::BackendRegistry;
pub use table::Table;
