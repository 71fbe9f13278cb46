use crate::{model::table::TableModel, value::Value};
use serde::{Serialize, de::DeserializeOwned};

pub use canic_cdk::structures::storable::Storable;

///
/// Record
///
/// A structured value stored in one table. The reflection surface is
/// deliberately small: the static model plus by-name field projection.
/// Stored bytes are the CBOR encoding of the whole record.
///

pub trait Record: Clone + Serialize + DeserializeOwned + 'static {
    const MODEL: &'static TableModel;

    /// Project one field by name; `None` when the record has no such field.
    fn get_value(&self, field: &str) -> Option<Value>;
}

///
/// RecordView
///
/// Type-erased view of a record handed to backend hooks, which are shared
/// by every table on a backend and therefore cannot be generic.
///

pub trait RecordView {
    fn model(&self) -> &'static TableModel;

    fn value(&self, field: &str) -> Option<Value>;
}

impl<R: Record> RecordView for R {
    fn model(&self) -> &'static TableModel {
        R::MODEL
    }

    fn value(&self, field: &str) -> Option<Value> {
        self.get_value(field)
    }
}
