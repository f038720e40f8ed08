//! Explicit exemptions supplied by the operator

use crate::error::{CloudError, Result};
use crate::resource::{Kind, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One line of the ignore list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreEntry {
    /// Kind label (`volume`) or selector (`volumes`)
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `{kind, id}` and `{kind, name}` pairs exempt from deletion
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    ids: HashSet<(Kind, String)>,
    names: HashSet<(Kind, String)>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set, rejecting unknown kinds and entries with neither id nor name
    pub fn from_entries(entries: impl IntoIterator<Item = IgnoreEntry>) -> Result<Self> {
        let mut set = Self::new();
        for entry in entries {
            let kind: Kind = entry.kind.parse()?;
            if entry.id.is_none() && entry.name.is_none() {
                return Err(CloudError::InvalidIgnoreEntry {
                    kind: entry.kind,
                    reason: "either id or name is required".to_string(),
                });
            }
            if let Some(id) = entry.id {
                set.ids.insert((kind, id));
            }
            if let Some(name) = entry.name {
                set.names.insert((kind, name));
            }
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.ids.len() + self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }

    /// Whether the resource is exempt, by id or by name, scoped to its kind
    pub fn contains(&self, resource: &dyn Resource) -> bool {
        let kind = resource.kind();
        self.ids.contains(&(kind, resource.id().to_string()))
            || self.names.contains(&(kind, resource.name().to_string()))
    }
}
