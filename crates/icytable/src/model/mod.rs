//! Static, runtime-only descriptors for tables, fields and indexes.
//! Keeps the storage core decoupled from any schema/codegen layer.

pub mod field;
pub mod index;
pub mod table;
