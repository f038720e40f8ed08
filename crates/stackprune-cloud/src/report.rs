//! Run report
//!
//! Append-only record of what a run found, deleted and failed to delete.
//! Only the consuming task writes to it; it is serialized once at the end.

use crate::error::DeleteError;
use crate::resource::{Kind, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a resource as it appears in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    #[serde(rename = "type")]
    pub kind: String,

    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Why the deletion failed, only on `failed_to_delete` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResourceSummary {
    pub fn of(resource: &dyn Resource) -> Self {
        Self {
            kind: resource.kind().label().to_string(),
            id: resource.id().to_string(),
            name: resource.name().to_string(),
            cluster_id: resource.cluster_id().map(str::to_string),
            created_at: resource.timestamp(),
            error: None,
        }
    }
}

/// A kind whose listing ended before the catalog did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteKind {
    #[serde(rename = "type")]
    pub kind: String,
    pub listed: usize,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub found: Vec<ResourceSummary>,
    pub deleted: Vec<ResourceSummary>,
    pub failed_to_delete: Vec<ResourceSummary>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incomplete: Vec<IncompleteKind>,
}

impl RunReport {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            found: Vec::new(),
            deleted: Vec::new(),
            failed_to_delete: Vec::new(),
            incomplete: Vec::new(),
        }
    }

    pub fn add_found(&mut self, resource: &dyn Resource) {
        self.found.push(ResourceSummary::of(resource));
    }

    pub fn add_deleted(&mut self, resource: &dyn Resource) {
        self.deleted.push(ResourceSummary::of(resource));
    }

    pub fn add_failed_to_delete(&mut self, resource: &dyn Resource, error: &DeleteError) {
        let mut summary = ResourceSummary::of(resource);
        summary.error = Some(error.to_string());
        self.failed_to_delete.push(summary);
    }

    pub fn add_incomplete(&mut self, kind: Kind, listed: usize, error: impl Into<String>) {
        self.incomplete.push(IncompleteKind {
            kind: kind.label().to_string(),
            listed,
            error: error.into(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_to_delete.is_empty()
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
