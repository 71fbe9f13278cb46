//! Shared fixtures for unit tests: in-process memory, backends and two
//! hand-written record types.

use crate::{
    db::backend::StoreBackend,
    model::{
        field::{FieldKind, FieldModel},
        index::IndexModel,
        table::TableModel,
    },
    traits::Record,
    value::Value,
};
use canic_cdk::structures::{
    DefaultMemoryImpl,
    memory::{MemoryId, MemoryManager, VirtualMemory},
};
use serde::{Deserialize, Serialize};

/// Fresh, isolated memory region.
#[must_use]
pub(crate) fn test_memory(id: u8) -> VirtualMemory<DefaultMemoryImpl> {
    let manager = MemoryManager::init(DefaultMemoryImpl::default());

    manager.get(MemoryId::new(id))
}

/// Backend over two fresh memory regions, default config, no hooks.
#[must_use]
pub(crate) fn test_backend() -> StoreBackend {
    StoreBackend::init(test_memory(0), test_memory(1))
}

///
/// Listing
///
/// Primary key `(category, price)`, a unique index on `sku` and a
/// non-unique index on `seller`. Every key field is ordered.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Listing {
    pub category: i64,
    pub price: i64,
    pub sku: String,
    pub seller: String,
}

impl Listing {
    pub(crate) fn new(category: i64, price: i64, sku: &str, seller: &str) -> Self {
        Self {
            category,
            price,
            sku: sku.to_string(),
            seller: seller.to_string(),
        }
    }

    pub(crate) fn pk(category: i64, price: i64) -> Vec<Value> {
        vec![Value::Int(category), Value::Int(price)]
    }
}

static LISTING_FIELDS: [FieldModel; 4] = [
    FieldModel::new("category", FieldKind::Int),
    FieldModel::new("price", FieldKind::Int),
    FieldModel::new("sku", FieldKind::Text),
    FieldModel::new("seller", FieldKind::Text),
];
static LISTING_INDEXES: [IndexModel; 2] = [
    IndexModel::new(1, &["sku"], true),
    IndexModel::new(2, &["seller"], false),
];
static LISTING_MODEL: TableModel = TableModel::new(
    1,
    "listing",
    &LISTING_FIELDS,
    &["category", "price"],
    &LISTING_INDEXES,
);

impl Record for Listing {
    const MODEL: &'static TableModel = &LISTING_MODEL;

    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "category" => Some(self.category.into()),
            "price" => Some(self.price.into()),
            "sku" => Some(self.sku.as_str().into()),
            "seller" => Some(self.seller.as_str().into()),
            _ => None,
        }
    }
}

///
/// Document
///
/// Primary key `(owner, path)` with a blob owner, so the primary key is not
/// fully ordered. A non-unique index on the `digest` blob.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Document {
    pub owner: Vec<u8>,
    pub path: String,
    pub digest: Vec<u8>,
}

impl Document {
    pub(crate) fn new(owner: &[u8], path: &str, digest: &[u8]) -> Self {
        Self {
            owner: owner.to_vec(),
            path: path.to_string(),
            digest: digest.to_vec(),
        }
    }
}

static DOCUMENT_FIELDS: [FieldModel; 3] = [
    FieldModel::new("owner", FieldKind::Blob),
    FieldModel::new("path", FieldKind::Text),
    FieldModel::new("digest", FieldKind::Blob),
];
static DOCUMENT_INDEXES: [IndexModel; 1] = [IndexModel::new(1, &["digest"], false)];
static DOCUMENT_MODEL: TableModel = TableModel::new(
    2,
    "document",
    &DOCUMENT_FIELDS,
    &["owner", "path"],
    &DOCUMENT_INDEXES,
);

impl Record for Document {
    const MODEL: &'static TableModel = &DOCUMENT_MODEL;

    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "owner" => Some(self.owner.clone().into()),
            "path" => Some(self.path.as_str().into()),
            "digest" => Some(self.digest.clone().into()),
            _ => None,
        }
    }
}

///
/// Sample
///
/// Primary key `(bucket, tag, seq)` with a blob in the middle, so ranges may
/// only vary on `bucket` and `seq`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Sample {
    pub bucket: i64,
    pub tag: Vec<u8>,
    pub seq: i64,
}

impl Sample {
    pub(crate) fn new(bucket: i64, tag: &[u8], seq: i64) -> Self {
        Self {
            bucket,
            tag: tag.to_vec(),
            seq,
        }
    }
}

static SAMPLE_FIELDS: [FieldModel; 3] = [
    FieldModel::new("bucket", FieldKind::Int),
    FieldModel::new("tag", FieldKind::Blob),
    FieldModel::new("seq", FieldKind::Int),
];
static SAMPLE_MODEL: TableModel = TableModel::new(
    3,
    "sample",
    &SAMPLE_FIELDS,
    &["bucket", "tag", "seq"],
    &[],
);

impl Record for Sample {
    const MODEL: &'static TableModel = &SAMPLE_MODEL;

    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "bucket" => Some(self.bucket.into()),
            "tag" => Some(self.tag.clone().into()),
            "seq" => Some(self.seq.into()),
            _ => None,
        }
    }
}
