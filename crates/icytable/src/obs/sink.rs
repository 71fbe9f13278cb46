//! Metrics sink boundary.
//!
//! Storage code MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics::{self, EventOps, TableCounters};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// OpKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpKind {
    Get,
    Has,
    Save,
    Delete,
    Scan,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    OpStart {
        kind: OpKind,
        table: &'static str,
    },
    OpFinish {
        kind: OpKind,
        table: &'static str,
        rows_touched: u64,
    },
    RowsScanned {
        table: &'static str,
        rows_scanned: u64,
    },
    IndexDelta {
        table: &'static str,
        inserts: u64,
        removes: u64,
    },
    UniqueViolation {
        table: &'static str,
    },
    HookAbort {
        table: &'static str,
    },
    BatchWrite {
        commitment_ops: u64,
        index_ops: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default sink writing into the thread-local metrics state.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::OpStart { kind, table } => {
                metrics::with_table_mut(table, |ops, t| bump_calls(ops, t, kind));
            }

            MetricsEvent::OpFinish {
                kind,
                table,
                rows_touched,
            } => {
                metrics::with_table_mut(table, |ops, t| bump_rows(ops, t, kind, rows_touched));
            }

            MetricsEvent::RowsScanned {
                table,
                rows_scanned,
            } => {
                metrics::with_table_mut(table, |ops, t| {
                    ops.rows_scanned = ops.rows_scanned.saturating_add(rows_scanned);
                    t.rows_scanned = t.rows_scanned.saturating_add(rows_scanned);
                });
            }

            MetricsEvent::IndexDelta {
                table,
                inserts,
                removes,
            } => {
                metrics::with_table_mut(table, |ops, t| {
                    ops.index_inserts = ops.index_inserts.saturating_add(inserts);
                    ops.index_removes = ops.index_removes.saturating_add(removes);
                    t.index_inserts = t.index_inserts.saturating_add(inserts);
                    t.index_removes = t.index_removes.saturating_add(removes);
                });
            }

            MetricsEvent::UniqueViolation { table } => {
                metrics::with_table_mut(table, |ops, t| {
                    ops.unique_violations = ops.unique_violations.saturating_add(1);
                    t.unique_violations = t.unique_violations.saturating_add(1);
                });
            }

            MetricsEvent::HookAbort { table } => {
                metrics::with_table_mut(table, |ops, t| {
                    ops.hook_aborts = ops.hook_aborts.saturating_add(1);
                    t.hook_aborts = t.hook_aborts.saturating_add(1);
                });
            }

            MetricsEvent::BatchWrite {
                commitment_ops,
                index_ops,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.batch_writes = m.ops.batch_writes.saturating_add(1);
                    m.ops.batch_commitment_ops =
                        m.ops.batch_commitment_ops.saturating_add(commitment_ops);
                    m.ops.batch_index_ops = m.ops.batch_index_ops.saturating_add(index_ops);
                });
            }
        }
    }
}

fn bump_calls(ops: &mut EventOps, table: &mut TableCounters, kind: OpKind) {
    let (global, local) = match kind {
        OpKind::Get => (&mut ops.get_calls, &mut table.get_calls),
        OpKind::Has => (&mut ops.has_calls, &mut table.has_calls),
        OpKind::Save => (&mut ops.save_calls, &mut table.save_calls),
        OpKind::Delete => (&mut ops.delete_calls, &mut table.delete_calls),
        OpKind::Scan => (&mut ops.scan_calls, &mut table.scan_calls),
    };
    *global = global.saturating_add(1);
    *local = local.saturating_add(1);
}

fn bump_rows(ops: &mut EventOps, table: &mut TableCounters, kind: OpKind, rows: u64) {
    let (global, local) = match kind {
        OpKind::Get => (&mut ops.rows_loaded, &mut table.rows_loaded),
        OpKind::Save => (&mut ops.rows_saved, &mut table.rows_saved),
        OpKind::Delete => (&mut ops.rows_deleted, &mut table.rows_deleted),
        // scans report rows through RowsScanned as they advance
        OpKind::Has | OpKind::Scan => return,
    };
    *global = global.saturating_add(rows);
    *local = local.saturating_add(rows);
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Record an event only when metrics are enabled for the backend.
pub(crate) fn record_if(enabled: bool, event: MetricsEvent) {
    if enabled {
        record(event);
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// Span
/// RAII guard that emits start/finish events for one storage call.
/// Finish accounting happens on every exit path.
///

pub(crate) struct Span {
    kind: OpKind,
    table: &'static str,
    rows: u64,
    enabled: bool,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: OpKind, table: &'static str, enabled: bool) -> Self {
        record_if(enabled, MetricsEvent::OpStart { kind, table });

        Self {
            kind,
            table,
            rows: 0,
            enabled,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record_if(
            self.enabled,
            MetricsEvent::OpFinish {
                kind: self.kind,
                table: self.table,
                rows_touched: self.rows,
            },
        );
    }
}

///
/// TESTS
///
