//! Core runtime for IcyTable: typed records stored by primary key in a
//! commitment store, secondary index entries kept in a separate index store,
//! and the batch discipline that moves both stores together.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod serialize;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Maximum number of fields allowed in a single index (primary or secondary).
pub const MAX_INDEX_FIELDS: usize = 8;

/// Hard ceiling on encoded key length accepted by the stores.
pub const MAX_KEY_BYTES: u32 = 1024;

/// Hard ceiling on stored value length accepted by the stores.
pub const MAX_VALUE_BYTES: u32 = 4 * 1024 * 1024;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, serializers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            Index, ListOptions, Table, UniqueIndex,
            list::{Cursor, Direction},
        },
        model::{
            field::{FieldKind, FieldModel},
            index::IndexModel,
            table::TableModel,
        },
        traits::{Record, RecordView},
        value::Value,
    };
}
