//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Storage code never touches metrics state directly; it emits
//! `MetricsEvent`s through `sink::record`. Human-readable diagnostics go
//! through `tracing` at the call sites.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, TableCounters, TableSummary};
pub use sink::{
    MetricsEvent, MetricsSink, OpKind, metrics_report, metrics_reset_all, with_metrics_sink,
};
