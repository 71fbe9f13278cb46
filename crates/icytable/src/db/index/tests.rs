use super::*;
use crate::{
    db::{
        backend::{Hooks, StoreBackend},
        batch::BatchWriter,
        list::{Direction, ListOptions},
        store::{KvReader, KvWriter},
        table::Table,
    },
    error::{ErrorClass, ErrorOrigin},
    obs::{MetricsEvent, MetricsSink, OpKind, with_metrics_sink},
    test_support::{Document, Listing, Sample, test_backend},
    traits::RecordView,
};
use proptest::prelude::*;
use std::{cell::RefCell, rc::Rc};

fn listing_table() -> Table<Listing> {
    Table::new().unwrap()
}

fn listing(category: i64, price: i64) -> Listing {
    Listing::new(category, price, &format!("sku-{category}-{price}"), "alice")
}

fn seed(table: &Table<Listing>, backend: &mut StoreBackend, rows: &[(i64, i64)]) {
    for (category, price) in rows {
        table.insert(backend, &listing(*category, *price)).unwrap();
    }
}

fn pks(iter: IndexIterator<'_, Listing>) -> Vec<(i64, i64)> {
    iter.map(|r| {
        let r = r.unwrap();
        (r.category, r.price)
    })
    .collect()
}

fn index_len(backend: &StoreBackend) -> u64 {
    backend.index_store_reader().len()
}

//
// point reads and lifecycle
//

#[test]
fn insert_then_get_and_has_round_trip() {
    let table = listing_table();
    let mut backend = test_backend();
    let record = Listing::new(3, 300, "sku-a", "alice");

    table.insert(&mut backend, &record).unwrap();

    let pk = Listing::pk(3, 300);
    assert!(table.has(&backend, &pk).unwrap());
    assert_eq!(table.get(&backend, &pk).unwrap(), Some(record));
}

#[test]
fn absent_key_is_not_an_error() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 10)]);
    let root = backend.commitment_root();

    let pk = Listing::pk(9, 9);
    assert!(!table.has(&backend, &pk).unwrap());
    assert_eq!(table.get(&backend, &pk).unwrap(), None);

    table.primary_key().delete_by_key(&mut backend, &pk).unwrap();
    assert_eq!(backend.commitment_root(), root);
}

#[test]
fn point_read_with_partial_key_is_encoding_error() {
    let table = listing_table();
    let backend = test_backend();

    let err = table.get(&backend, &[Value::Int(1)]).unwrap_err();

    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Codec);
}

#[test]
fn delete_is_idempotent() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 10)]);
    let pk = Listing::pk(1, 10);

    table.primary_key().delete_by_key(&mut backend, &pk).unwrap();
    table.primary_key().delete_by_key(&mut backend, &pk).unwrap();

    assert!(!table.has(&backend, &pk).unwrap());
    assert_eq!(index_len(&backend), 0);
}

#[test]
fn save_modes_enforce_existence() {
    let table = listing_table();
    let mut backend = test_backend();
    let record = listing(1, 10);

    let err = table.update(&mut backend, &record).unwrap_err();
    assert!(err.is_not_found());

    table.insert(&mut backend, &record).unwrap();
    let err = table.insert(&mut backend, &record).unwrap_err();
    assert_eq!(err.class, ErrorClass::Conflict);
    assert_eq!(err.origin, ErrorOrigin::Table);

    table.save(&mut backend, &record).unwrap();
    table.update(&mut backend, &record).unwrap();
}

#[test]
fn stored_value_that_does_not_decode_is_corruption() {
    let table = listing_table();
    let mut backend = test_backend();
    let pk = Listing::pk(1, 1);
    let key = table.primary_key().key_codec().encode_key(&pk).unwrap();
    {
        let mut batch = BatchWriter::new(&mut backend);
        batch.commitment_store().unwrap().set(&key, &[0xFF]).unwrap();
        batch.write().unwrap();
    }

    let err = table.get(&backend, &pk).unwrap_err();

    assert_eq!(err.class, ErrorClass::Corruption);
}

//
// iteration
//

#[test]
fn range_covers_partial_end_block() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 10), (1, 20), (2, 5)]);
    let primary = table.primary_key();

    let iter = primary
        .range_iterator(&backend, &[Value::Int(1)], &[Value::Int(1)], ListOptions::new())
        .unwrap();
    assert_eq!(pks(iter), [(1, 10), (1, 20)]);

    let iter = primary
        .range_iterator(
            &backend,
            &Listing::pk(1, 10),
            &Listing::pk(1, 20),
            ListOptions::new(),
        )
        .unwrap();
    assert_eq!(pks(iter), [(1, 10), (1, 20)]);

    let iter = primary
        .range_iterator(
            &backend,
            &Listing::pk(1, 15),
            &[Value::Int(2)],
            ListOptions::new(),
        )
        .unwrap();
    assert_eq!(pks(iter), [(1, 20), (2, 5)]);
}

#[test]
fn exclusive_bounds_drop_their_key() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 10), (1, 20), (2, 5)]);
    let primary = table.primary_key();
    let (start, end) = (Listing::pk(1, 10), Listing::pk(2, 5));

    let iter = primary
        .range_iterator(&backend, &start, &end, ListOptions::new().exclusive_start())
        .unwrap();
    assert_eq!(pks(iter), [(1, 20), (2, 5)]);

    let iter = primary
        .range_iterator(&backend, &start, &end, ListOptions::new().exclusive_end())
        .unwrap();
    assert_eq!(pks(iter), [(1, 10), (1, 20)]);
}

#[test]
fn inverted_range_is_rejected() {
    let table = listing_table();
    let backend = test_backend();

    let err = table
        .primary_key()
        .range_iterator(&backend, &[Value::Int(2)], &[Value::Int(1)], ListOptions::new())
        .err()
        .unwrap();

    assert_eq!(err.class, ErrorClass::Validation);
}

#[test]
fn range_varying_on_unordered_field_is_rejected() {
    let table = Table::<Document>::new().unwrap();
    let mut backend = test_backend();
    table
        .insert(&mut backend, &Document::new(b"a", "x.txt", b"d1"))
        .unwrap();
    table
        .insert(&mut backend, &Document::new(b"a", "y.txt", b"d2"))
        .unwrap();
    let primary = table.primary_key();

    assert!(!primary.is_fully_ordered());
    let err = primary
        .range_iterator(
            &backend,
            &[Value::Blob(b"a".to_vec())],
            &[Value::Blob(b"b".to_vec())],
            ListOptions::new(),
        )
        .err()
        .unwrap();
    assert_eq!(err.class, ErrorClass::Validation);

    let paths = primary
        .range_iterator(
            &backend,
            &[Value::Blob(b"a".to_vec()), Value::from("a")],
            &[Value::Blob(b"a".to_vec()), Value::from("x.txt")],
            ListOptions::new(),
        )
        .unwrap()
        .map(|r| r.unwrap().path)
        .collect::<Vec<_>>();
    assert_eq!(paths, ["x.txt"]);
}

#[test]
fn range_varying_on_inner_unordered_field_is_rejected() {
    let table = Table::<Sample>::new().unwrap();
    let mut backend = test_backend();
    for sample in [
        Sample::new(1, &[0xFF], 1),
        Sample::new(1, &[0, 0], 1),
        Sample::new(2, &[0xFF], 1),
    ] {
        table.insert(&mut backend, &sample).unwrap();
    }
    let primary = table.primary_key();

    let err = primary
        .range_iterator(
            &backend,
            &[Value::Int(1), Value::Blob(vec![0, 0])],
            &[Value::Int(2), Value::Blob(vec![1, 0])],
            ListOptions::new(),
        )
        .err()
        .unwrap();
    assert_eq!(err.class, ErrorClass::Validation);

    let buckets = primary
        .range_iterator(&backend, &[Value::Int(1)], &[Value::Int(2)], ListOptions::new())
        .unwrap()
        .map(|r| r.unwrap().bucket)
        .collect::<Vec<_>>();
    assert_eq!(buckets, [1, 1, 2]);
}

#[test]
fn prefix_iterator_yields_only_prefixed_entries() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(0, 7), (1, 10), (1, 20), (2, 5)]);
    let primary = table.primary_key();

    let iter = primary
        .prefix_iterator(&backend, &[Value::Int(1)], ListOptions::new())
        .unwrap();
    assert_eq!(pks(iter), [(1, 10), (1, 20)]);

    let iter = primary
        .prefix_iterator(&backend, &Listing::pk(1, 20), ListOptions::new())
        .unwrap();
    assert_eq!(pks(iter), [(1, 20)]);

    let err = primary
        .prefix_iterator(&backend, &[Value::from("1")], ListOptions::new())
        .err()
        .unwrap();
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn descending_iteration_reverses_order() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 10), (1, 20), (2, 5)]);

    let iter = table
        .list(&backend, ListOptions::new().direction(Direction::Desc))
        .unwrap();

    assert_eq!(pks(iter), [(2, 5), (1, 20), (1, 10)]);
}

#[test]
fn cursor_resumes_after_last_entry() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 1), (1, 2), (1, 3), (2, 1), (3, 1)]);

    for direction in [Direction::Asc, Direction::Desc] {
        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let mut options = ListOptions::new().direction(direction).limit(2);
            if let Some(c) = cursor.take() {
                options = options.cursor(c);
            }
            let mut iter = table.list(&backend, options).unwrap();
            let mut page = 0;
            while iter.advance().unwrap() {
                let pk = iter.primary_key().unwrap();
                seen.push(pk.to_vec());
                cursor = iter.cursor();
                page += 1;
            }
            if page < 2 {
                break;
            }
        }

        let mut expected = vec![(1, 1), (1, 2), (1, 3), (2, 1), (3, 1)]
            .into_iter()
            .map(|(c, p)| Listing::pk(c, p))
            .collect::<Vec<_>>();
        if direction == Direction::Desc {
            expected.reverse();
        }
        assert_eq!(seen, expected);
    }
}

#[test]
fn offset_skips_and_limit_caps() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 1), (1, 2), (1, 3), (1, 4)]);

    let iter = table
        .list(&backend, ListOptions::new().offset(1).limit(2))
        .unwrap();

    assert_eq!(pks(iter), [(1, 2), (1, 3)]);
}

#[test]
fn cursor_from_another_index_is_rejected() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 1)]);
    let seller = table.index(&["seller"]).unwrap();

    let cursor = {
        let mut iter = seller.iterator(&backend, ListOptions::new()).unwrap();
        assert!(iter.advance().unwrap());
        iter.cursor().unwrap()
    };

    let err = table
        .list(&backend, ListOptions::new().cursor(cursor))
        .err()
        .unwrap();
    assert_eq!(err.class, ErrorClass::Validation);
}

#[test]
fn unpositioned_iterator_has_no_current_entry() {
    let table = listing_table();
    let mut backend = test_backend();
    seed(&table, &mut backend, &[(1, 1)]);

    let mut iter = table.list(&backend, ListOptions::new()).unwrap();
    assert!(iter.keys().is_none());
    assert_eq!(iter.record().unwrap_err().class, ErrorClass::InvariantViolation);

    assert!(iter.advance().unwrap());
    assert_eq!(iter.keys().unwrap(), Listing::pk(1, 1).as_slice());

    iter.close();
    iter.close();
    assert!(!iter.advance().unwrap());
}

proptest! {
    #[test]
    fn iteration_order_matches_compare_keys(
        rows in prop::collection::btree_set((-4i64..4, any::<i64>()), 0..32)
    ) {
        let table = listing_table();
        let mut backend = test_backend();
        for (category, price) in &rows {
            table.insert(&mut backend, &listing(*category, *price)).unwrap();
        }
        let primary = table.primary_key();
        prop_assert!(primary.is_fully_ordered());

        let mut iter = primary.iterator(&backend, ListOptions::new()).unwrap();
        let mut keys = Vec::new();
        while iter.advance().unwrap() {
            keys.push(iter.keys().unwrap().to_vec());
        }

        for pair in keys.windows(2) {
            prop_assert_eq!(primary.compare_keys(&pair[0], &pair[1]), std::cmp::Ordering::Less);
        }
        let expected = rows.iter().map(|(c, p)| Listing::pk(*c, *p)).collect::<Vec<_>>();
        prop_assert_eq!(keys, expected);
    }
}

//
// secondary indexes
//

#[test]
fn non_unique_index_lists_records_by_key_then_primary_key() {
    let table = listing_table();
    let mut backend = test_backend();
    table.insert(&mut backend, &Listing::new(2, 1, "a", "bob")).unwrap();
    table.insert(&mut backend, &Listing::new(1, 1, "b", "bob")).unwrap();
    table.insert(&mut backend, &Listing::new(1, 2, "c", "carol")).unwrap();
    let seller = table.index(&["seller"]).unwrap();

    let mut iter = seller
        .prefix_iterator(&backend, &[Value::from("bob")], ListOptions::new())
        .unwrap();
    let mut found = Vec::new();
    while iter.advance().unwrap() {
        assert_eq!(iter.keys().unwrap(), &[Value::from("bob")]);
        found.push((iter.primary_key().unwrap().to_vec(), iter.record().unwrap().sku));
    }

    assert_eq!(
        found,
        [
            (Listing::pk(1, 1), "b".to_string()),
            (Listing::pk(2, 1), "a".to_string()),
        ]
    );
    assert!(table.unique_index(&["seller"]).is_none());
}

#[test]
fn update_moves_secondary_entries() {
    let table = listing_table();
    let mut backend = test_backend();
    let before = Listing::new(1, 10, "sku-1", "alice");
    table.insert(&mut backend, &before).unwrap();
    let entries = index_len(&backend);

    let after = Listing {
        seller: "bob".to_string(),
        ..before
    };
    table.update(&mut backend, &after).unwrap();

    let seller = table.index(&["seller"]).unwrap();
    let alice = seller
        .prefix_iterator(&backend, &[Value::from("alice")], ListOptions::new())
        .unwrap()
        .count();
    let bob = seller
        .prefix_iterator(&backend, &[Value::from("bob")], ListOptions::new())
        .unwrap()
        .map(Result::unwrap)
        .collect::<Vec<_>>();

    assert_eq!(alice, 0);
    assert_eq!(bob, [after]);
    assert_eq!(index_len(&backend), entries);
}

#[test]
fn unchanged_update_writes_no_index_ops() {
    let table = listing_table();
    let mut backend = test_backend();
    let record = listing(1, 10);
    table.insert(&mut backend, &record).unwrap();

    let events = Rc::new(CaptureSink::default());
    with_metrics_sink(events.clone(), || table.save(&mut backend, &record)).unwrap();

    assert!(events.0.borrow().contains(&MetricsEvent::IndexDelta {
        table: "listing",
        inserts: 0,
        removes: 0,
    }));
}

#[test]
fn delete_removes_every_secondary_entry() {
    let table = listing_table();
    let mut backend = test_backend();
    let record = listing(4, 40);
    table.insert(&mut backend, &record).unwrap();
    assert_eq!(index_len(&backend), 2);

    table.delete(&mut backend, &record).unwrap();

    assert!(backend.commitment_store_reader().is_empty());
    assert_eq!(index_len(&backend), 0);
}

#[test]
fn unique_index_point_operations() {
    let table = listing_table();
    let mut backend = test_backend();
    let record = Listing::new(5, 50, "sku-x", "alice");
    table.insert(&mut backend, &record).unwrap();
    let sku = [Value::from("sku-x")];

    let unique = table.unique_index(&["sku"]).unwrap();
    assert!(unique.has(&backend, &sku).unwrap());
    assert_eq!(unique.get(&backend, &sku).unwrap(), Some(record));
    assert_eq!(unique.get(&backend, &[Value::from("nope")]).unwrap(), None);

    unique.delete_by_key(&mut backend, &sku).unwrap();
    unique.delete_by_key(&mut backend, &sku).unwrap();

    assert!(!table.has(&backend, &Listing::pk(5, 50)).unwrap());
    assert_eq!(index_len(&backend), 0);
}

#[test]
fn dangling_unique_entry_is_corruption_for_get_and_delete() {
    let table = listing_table();
    let mut backend = test_backend();
    table
        .insert(&mut backend, &Listing::new(6, 60, "orphan", "alice"))
        .unwrap();
    let pk_key = table
        .primary_key()
        .key_codec()
        .encode_key(&Listing::pk(6, 60))
        .unwrap();
    {
        let mut batch = BatchWriter::new(&mut backend);
        batch.commitment_store().unwrap().delete(&pk_key).unwrap();
        batch.write().unwrap();
    }
    let entries = index_len(&backend);
    let sku = [Value::from("orphan")];
    let unique = table.unique_index(&["sku"]).unwrap();

    let err = unique.get(&backend, &sku).unwrap_err();
    assert_eq!(err.class, ErrorClass::Corruption);
    assert_eq!(err.origin, ErrorOrigin::Index);

    let err = unique.delete_by_key(&mut backend, &sku).unwrap_err();
    assert_eq!(err.class, ErrorClass::Corruption);
    assert_eq!(err.origin, ErrorOrigin::Index);
    assert_eq!(index_len(&backend), entries);
}

#[test]
fn unique_conflict_leaves_state_unchanged() {
    let table = listing_table();
    let mut backend = test_backend();
    table
        .insert(&mut backend, &Listing::new(1, 1, "dup", "alice"))
        .unwrap();
    let root = backend.commitment_root();
    let entries = index_len(&backend);

    let err = table
        .insert(&mut backend, &Listing::new(2, 2, "dup", "bob"))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Conflict);
    assert_eq!(err.origin, ErrorOrigin::Index);
    assert_eq!(backend.commitment_root(), root);
    assert_eq!(index_len(&backend), entries);
    assert!(!table.has(&backend, &Listing::pk(2, 2)).unwrap());
}

#[test]
fn unique_key_can_move_between_records_in_sequence() {
    let table = listing_table();
    let mut backend = test_backend();
    let first = Listing::new(1, 1, "shared", "alice");
    table.insert(&mut backend, &first).unwrap();

    table
        .update(
            &mut backend,
            &Listing {
                sku: "freed".to_string(),
                ..first
            },
        )
        .unwrap();
    table
        .insert(&mut backend, &Listing::new(2, 2, "shared", "bob"))
        .unwrap();

    let owner = table
        .unique_index(&["sku"])
        .unwrap()
        .get(&backend, &[Value::from("shared")])
        .unwrap()
        .unwrap();
    assert_eq!(owner.category, 2);
}

//
// atomicity
//

struct FailingIndexer;

impl Indexer<Listing> for FailingIndexer {
    fn index_model(&self) -> &'static IndexModel {
        &Listing::MODEL.indexes[1]
    }

    fn on_insert(&self, writer: &mut dyn KvWriter, _: &Listing) -> Result<(), InternalError> {
        writer.set(b"marker", b"")
    }

    fn on_update(
        &self,
        _: &mut dyn KvWriter,
        _: &Listing,
        _: &Listing,
    ) -> Result<(), InternalError> {
        Ok(())
    }

    fn on_delete(&self, writer: &mut dyn KvWriter, _: &Listing) -> Result<(), InternalError> {
        writer.delete(b"marker")?;

        Err(InternalError::hook_aborted("indexer refused delete"))
    }
}

#[test]
fn failing_indexer_aborts_delete_atomically() {
    let mut primary = PrimaryKeyIndex::<Listing>::new().unwrap();
    primary.register_indexer(Box::new(FailingIndexer));
    let mut backend = test_backend();
    let record = listing(1, 1);
    primary
        .save(&mut backend, &record, SaveMode::Insert)
        .unwrap();
    let root = backend.commitment_root();

    let err = primary
        .delete_by_key(&mut backend, &Listing::pk(1, 1))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Aborted);
    assert_eq!(backend.commitment_root(), root);
    assert!(backend.index_store_reader().has(b"marker").unwrap());
    assert_eq!(
        primary.get(&backend, &Listing::pk(1, 1)).unwrap(),
        Some(record)
    );
}

struct ProtectCategory(i64);

impl Hooks for ProtectCategory {
    fn on_insert(&self, record: &dyn RecordView) -> Result<(), InternalError> {
        self.check(record)
    }

    fn on_delete(&self, record: &dyn RecordView) -> Result<(), InternalError> {
        self.check(record)
    }
}

impl ProtectCategory {
    fn check(&self, record: &dyn RecordView) -> Result<(), InternalError> {
        if record.value("category") == Some(Value::Int(self.0)) {
            return Err(InternalError::hook_aborted(format!(
                "{} category {} is protected",
                record.model().name,
                self.0
            )));
        }

        Ok(())
    }
}

#[test]
fn hook_veto_on_insert_leaves_both_stores_untouched() {
    let table = listing_table();
    let mut backend = test_backend().with_hooks(ProtectCategory(7));

    let err = table.insert(&mut backend, &listing(7, 1)).unwrap_err();

    assert_eq!(err.class, ErrorClass::Aborted);
    assert_eq!(err.origin, ErrorOrigin::Hook);
    assert!(backend.commitment_store_reader().is_empty());
    assert_eq!(index_len(&backend), 0);

    table.insert(&mut backend, &listing(1, 1)).unwrap();
    assert_eq!(index_len(&backend), 2);
}

#[test]
fn hook_veto_on_delete_keeps_record_and_entries() {
    let table = listing_table();
    let mut backend = test_backend().with_hooks(ProtectCategory(3));
    // protected rows can only exist if they were written before the hook
    let mut seeded = test_backend();
    table.insert(&mut seeded, &listing(3, 1)).unwrap();
    table.insert(&mut backend, &listing(4, 1)).unwrap();
    let root = backend.commitment_root();

    table
        .primary_key()
        .delete_by_key(&mut backend, &Listing::pk(4, 1))
        .unwrap();
    assert_ne!(backend.commitment_root(), root);

    let mut guarded = seeded.with_hooks(ProtectCategory(3));
    let root = guarded.commitment_root();
    let err = table
        .primary_key()
        .delete_by_key(&mut guarded, &Listing::pk(3, 1))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Aborted);
    assert_eq!(guarded.commitment_root(), root);
    assert_eq!(index_len(&guarded), 2);
}

//
// metrics
//

#[derive(Default)]
struct CaptureSink(RefCell<Vec<MetricsEvent>>);

impl MetricsSink for CaptureSink {
    fn record(&self, event: MetricsEvent) {
        self.0.borrow_mut().push(event);
    }
}

#[test]
fn save_and_delete_emit_metrics_events() {
    let table = listing_table();
    let mut backend = test_backend();
    let record = listing(1, 1);
    let events = Rc::new(CaptureSink::default());

    with_metrics_sink(events.clone(), || {
        table.insert(&mut backend, &record).unwrap();
        table.delete(&mut backend, &record).unwrap();
    });

    let events = events.0.borrow();
    assert!(events.contains(&MetricsEvent::OpStart {
        kind: OpKind::Save,
        table: "listing",
    }));
    assert!(events.contains(&MetricsEvent::IndexDelta {
        table: "listing",
        inserts: 2,
        removes: 0,
    }));
    assert!(events.contains(&MetricsEvent::IndexDelta {
        table: "listing",
        inserts: 0,
        removes: 2,
    }));
    assert!(events.contains(&MetricsEvent::OpFinish {
        kind: OpKind::Delete,
        table: "listing",
        rows_touched: 1,
    }));
}

#[test]
fn disabled_metrics_emit_nothing() {
    let table = listing_table();
    let config = crate::config::EngineConfig {
        metrics_enabled: false,
        ..Default::default()
    };
    let mut backend = test_backend().with_config(config).unwrap();
    let events = Rc::new(CaptureSink::default());

    with_metrics_sink(events.clone(), || {
        table.insert(&mut backend, &listing(1, 1)).unwrap();
        let _ = table.list(&backend, ListOptions::new()).unwrap().count();
    });

    assert!(events.0.borrow().is_empty());
}
