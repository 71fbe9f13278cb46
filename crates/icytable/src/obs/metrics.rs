use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for storage operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub tables: BTreeMap<String, TableCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Entrypoints
    pub get_calls: u64,
    pub has_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub scan_calls: u64,

    // Rows touched
    pub rows_loaded: u64,
    pub rows_scanned: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,

    // Index maintenance
    pub index_inserts: u64,
    pub index_removes: u64,
    pub unique_violations: u64,

    // Batches
    pub hook_aborts: u64,
    pub batch_writes: u64,
    pub batch_commitment_ops: u64,
    pub batch_index_ops: u64,
}

///
/// TableCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TableCounters {
    pub get_calls: u64,
    pub has_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub scan_calls: u64,
    pub rows_loaded: u64,
    pub rows_scanned: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,
    pub index_inserts: u64,
    pub index_removes: u64,
    pub unique_violations: u64,
    pub hook_aborts: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Borrow global ops and one table's counters together.
pub(crate) fn with_table_mut(table: &str, f: impl FnOnce(&mut EventOps, &mut TableCounters)) {
    with_state_mut(|m| {
        let entry = m.tables.entry(table.to_string()).or_default();
        f(&mut m.ops, entry);
    });
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Raw counters at the time of the report.
    pub counters: Option<EventState>,
    /// Per-table counters and averages.
    pub table_counters: Vec<TableSummary>,
}

///
/// TableSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub get_calls: u64,
    pub scan_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub rows_scanned: u64,
    pub rows_deleted: u64,
    pub avg_rows_per_scan: f64,
    pub index_inserts: u64,
    pub index_removes: u64,
    pub unique_violations: u64,
    pub hook_aborts: u64,
}

/// Build a metrics report from in-memory counters.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut table_counters = snap
        .tables
        .iter()
        .map(|(name, c)| TableSummary {
            name: name.clone(),
            get_calls: c.get_calls,
            scan_calls: c.scan_calls,
            save_calls: c.save_calls,
            delete_calls: c.delete_calls,
            rows_scanned: c.rows_scanned,
            rows_deleted: c.rows_deleted,
            avg_rows_per_scan: if c.scan_calls > 0 {
                c.rows_scanned as f64 / c.scan_calls as f64
            } else {
                0.0
            },
            index_inserts: c.index_inserts,
            index_removes: c.index_removes,
            unique_violations: c.unique_violations,
            hook_aborts: c.hook_aborts,
        })
        .collect::<Vec<_>>();

    // busiest scanners first, then by name
    table_counters.sort_by(|a, b| {
        match b
            .avg_rows_per_scan
            .partial_cmp(&a.avg_rows_per_scan)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        }
    });

    EventReport {
        counters: Some(snap),
        table_counters,
    }
}

///
/// TESTS
///
