use super::*;
use crate::{
    db::{batch::BatchWriter, store::KvWriter, table::Table},
    error::{ErrorClass, ErrorOrigin, InternalError},
    test_support::{Listing, test_backend},
    traits::RecordView,
};

struct Silent;

impl Hooks for Silent {}

#[test]
fn default_hooks_allow_every_mutation() {
    let table = Table::<Listing>::new().unwrap();
    let mut backend = test_backend().with_hooks(Silent);
    let record = Listing::new(1, 1, "a", "alice");

    table.insert(&mut backend, &record).unwrap();
    table.update(&mut backend, &record).unwrap();
    table.delete(&mut backend, &record).unwrap();

    assert!(backend.commitment_store_reader().is_empty());
    assert!(backend.hooks().is_some());
}

#[test]
fn update_hook_sees_both_versions() {
    struct FrozenSeller;

    impl Hooks for FrozenSeller {
        fn on_update(
            &self,
            new: &dyn RecordView,
            existing: &dyn RecordView,
        ) -> Result<(), InternalError> {
            if new.value("seller") != existing.value("seller") {
                return Err(InternalError::hook_aborted("seller is frozen"));
            }

            Ok(())
        }
    }

    let table = Table::<Listing>::new().unwrap();
    let mut backend = test_backend().with_hooks(FrozenSeller);
    table
        .insert(&mut backend, &Listing::new(1, 1, "a", "alice"))
        .unwrap();

    table
        .update(&mut backend, &Listing::new(1, 1, "b", "alice"))
        .unwrap();
    let err = table
        .update(&mut backend, &Listing::new(1, 1, "b", "bob"))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Aborted);
    let stored = table.get(&backend, &Listing::pk(1, 1)).unwrap().unwrap();
    assert_eq!(stored.seller, "alice");
    assert_eq!(stored.sku, "b");
}

#[test]
fn invalid_config_is_rejected() {
    let config = EngineConfig {
        max_key_bytes: 0,
        ..EngineConfig::default()
    };

    assert!(test_backend().with_config(config).is_err());
}

#[test]
fn narrowed_key_limit_rejects_large_keys() {
    let config = EngineConfig {
        max_key_bytes: 16,
        ..EngineConfig::default()
    };
    let table = Table::<Listing>::new().unwrap();
    let mut backend = test_backend().with_config(config).unwrap();

    let long_sku = "x".repeat(64);
    let err = table
        .insert(&mut backend, &Listing::new(1, 1, &long_sku, "alice"))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Store);
    assert!(backend.commitment_store_reader().is_empty());
    assert!(backend.index_store_reader().is_empty());
}

#[test]
fn commitment_root_ignores_write_order() {
    let table = Table::<Listing>::new().unwrap();
    let a = Listing::new(1, 1, "a", "alice");
    let b = Listing::new(2, 2, "b", "bob");

    let mut first = test_backend();
    table.insert(&mut first, &a).unwrap();
    table.insert(&mut first, &b).unwrap();

    let mut second = test_backend();
    table.insert(&mut second, &b).unwrap();
    table.insert(&mut second, &a).unwrap();

    assert_eq!(first.commitment_root(), second.commitment_root());
    assert_ne!(first.commitment_root(), test_backend().commitment_root());
}

#[test]
fn commitment_root_tracks_logical_contents_only() {
    let table = Table::<Listing>::new().unwrap();
    let mut backend = test_backend();
    let empty = backend.commitment_root();
    let record = Listing::new(1, 1, "a", "alice");

    table.insert(&mut backend, &record).unwrap();
    let one = backend.commitment_root();
    assert_ne!(one, empty);

    {
        let mut batch = BatchWriter::new(&mut backend);
        batch.index_store().unwrap().set(b"unrelated", b"").unwrap();
        batch.write().unwrap();
    }
    assert_eq!(backend.commitment_root(), one);

    table.delete(&mut backend, &record).unwrap();
    assert_eq!(backend.commitment_root(), empty);
}

#[test]
fn clear_empties_both_stores() {
    let table = Table::<Listing>::new().unwrap();
    let mut backend = test_backend();
    table
        .insert(&mut backend, &Listing::new(1, 1, "a", "alice"))
        .unwrap();

    backend.clear();

    assert!(backend.commitment_store_reader().is_empty());
    assert!(backend.index_store_reader().is_empty());
}
