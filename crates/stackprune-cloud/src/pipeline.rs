//! Consumption loop: filter every listed resource, then record or delete it
//!
//! Deletion is attempted once per resource. A failing cascade is recorded in
//! `failed_to_delete` and the run moves on; nothing is retried in-run, since
//! repeating a half-finished cascade could leave things worse off.

use crate::fanin::Merged;
use crate::filter::Filter;
use crate::lister::Listed;
use crate::report::RunReport;
use crate::resource::{Kind, Resource};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Whether the run deletes anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DryRun,
    Live,
}

impl Mode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Mode::DryRun } else { Mode::Live }
    }
}

/// Terminal state of one eligible resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Did not pass the filters
    Skipped,
    /// Eligible, but the run is a dry run
    Found,
    Deleted,
    FailedToDelete,
    /// Eligible, but cancellation arrived before its delete started
    Cancelled,
}

pub struct Pipeline {
    filter: Filter,
    kind_filters: HashMap<Kind, Filter>,
    mode: Mode,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(filter: Filter, mode: Mode, cancel: CancellationToken) -> Self {
        Self {
            filter,
            kind_filters: HashMap::new(),
            mode,
            cancel,
        }
    }

    /// Add kind-specific predicates, evaluated before the run-wide filter
    pub fn with_kind_filter(mut self, kind: Kind, filter: Filter) -> Self {
        let existing = self.kind_filters.remove(&kind).unwrap_or_default();
        self.kind_filters.insert(kind, existing.chain(filter));
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn admits(&self, resource: &dyn Resource) -> bool {
        let kind_ok = self
            .kind_filters
            .get(&resource.kind())
            .is_none_or(|f| f.accepts(resource));
        kind_ok && self.filter.accepts(resource)
    }

    /// Run one resource through the filters and, in live mode, its delete
    pub async fn process(&self, resource: &dyn Resource, report: &mut RunReport) -> Disposition {
        if !self.admits(resource) {
            return Disposition::Skipped;
        }
        if self.cancel.is_cancelled() {
            return Disposition::Cancelled;
        }

        report.add_found(resource);
        if self.mode == Mode::DryRun {
            return Disposition::Found;
        }

        tracing::info!(
            "Deleting {} {:?} (created at {})...",
            resource.kind(),
            resource.id(),
            resource.timestamp().to_rfc3339()
        );
        // An in-flight delete always runs to completion, even if cancelled meanwhile.
        match resource.delete().await {
            Ok(()) => {
                tracing::info!("Deleted {} {:?}", resource.kind(), resource.id());
                report.add_deleted(resource);
                Disposition::Deleted
            }
            Err(e) => {
                tracing::error!("Error deleting {} {:?}: {}", resource.kind(), resource.id(), e);
                report.add_failed_to_delete(resource, &e);
                Disposition::FailedToDelete
            }
        }
    }

    /// Consume the merged lister output until every lister has finished
    ///
    /// After cancellation, remaining resources are drained without being
    /// processed so that the incomplete markers of interrupted kinds still
    /// reach the report.
    pub async fn run(&self, mut merged: Merged, timestamp: DateTime<Utc>) -> RunReport {
        let mut report = RunReport::new(timestamp);
        let mut cancelled = false;
        while let Some(item) = merged.next().await {
            match item {
                Listed::Resource(_) if cancelled => {}
                Listed::Resource(resource) => {
                    if self.process(resource.as_ref(), &mut report).await == Disposition::Cancelled {
                        tracing::warn!("Run cancelled, no further deletions will be attempted");
                        cancelled = true;
                    }
                }
                Listed::Incomplete { kind, listed, error } => {
                    report.add_incomplete(kind, listed, error);
                }
            }
        }
        report
    }
}
