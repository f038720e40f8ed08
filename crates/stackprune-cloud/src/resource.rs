//! Resource abstraction
//!
//! Every kind of cloud resource the pruner knows about implements
//! [`Resource`]. Filters, the fan-in and the report only ever see
//! `dyn Resource`, so adding a kind never touches them.

use crate::error::{CloudError, DeleteError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One category of cloud resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    FloatingIp,
    LoadBalancer,
    Server,
    Router,
    Trunk,
    Port,
    Network,
    VolumeSnapshot,
    Volume,
    SecurityGroup,
    Share,
    ApplicationCredential,
    Container,
    Image,
}

impl Kind {
    /// All kinds, in the order their listers are started
    pub const ALL: [Kind; 14] = [
        Kind::FloatingIp,
        Kind::LoadBalancer,
        Kind::Server,
        Kind::Router,
        Kind::Trunk,
        Kind::Port,
        Kind::Network,
        Kind::VolumeSnapshot,
        Kind::Volume,
        Kind::SecurityGroup,
        Kind::Share,
        Kind::ApplicationCredential,
        Kind::Container,
        Kind::Image,
    ];

    /// Human label, used in logs, the report and ignore entries
    pub fn label(self) -> &'static str {
        match self {
            Kind::FloatingIp => "floating ip",
            Kind::LoadBalancer => "load balancer",
            Kind::Server => "server",
            Kind::Router => "router",
            Kind::Trunk => "trunk",
            Kind::Port => "port",
            Kind::Network => "network",
            Kind::VolumeSnapshot => "volume snapshot",
            Kind::Volume => "volume",
            Kind::SecurityGroup => "security group",
            Kind::Share => "share",
            Kind::ApplicationCredential => "application credential",
            Kind::Container => "container",
            Kind::Image => "image",
        }
    }

    /// Selector used by `--include` / `--exclude`
    pub fn selector(self) -> &'static str {
        match self {
            Kind::FloatingIp => "floatingips",
            Kind::LoadBalancer => "loadbalancers",
            Kind::Server => "servers",
            Kind::Router => "routers",
            Kind::Trunk => "trunks",
            Kind::Port => "ports",
            Kind::Network => "networks",
            Kind::VolumeSnapshot => "volumesnapshots",
            Kind::Volume => "volumes",
            Kind::SecurityGroup => "securitygroups",
            Kind::Share => "shares",
            Kind::ApplicationCredential => "appcreds",
            Kind::Container => "containers",
            Kind::Image => "images",
        }
    }

    pub fn from_selector(selector: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|k| k.selector() == selector)
    }

    pub fn from_label(label: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|k| k.label() == label)
    }

    /// Comma separated list of every selector, for help and error messages
    pub fn selectors() -> String {
        Kind::ALL
            .iter()
            .map(|k| k.selector())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the selector (`floatingips`) or the label (`floating ip`)
impl FromStr for Kind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Kind::from_selector(s)
            .or_else(|| Kind::from_label(s))
            .ok_or_else(|| CloudError::UnknownKind(s.to_string()))
    }
}

/// A listed cloud resource
///
/// Values are immutable once a lister produced them; `delete` is an action
/// on the remote object, never a mutation of the value. The optional facets
/// default to "absent": a kind without tags reports no protection tags and
/// no cluster affinity.
#[async_trait]
pub trait Resource: Send + Sync {
    fn kind(&self) -> Kind;

    /// Service-unique identifier, stable for the whole run
    fn id(&self) -> &str;

    /// Display name, not guaranteed unique
    fn name(&self) -> &str;

    /// Instant staleness is measured from (creation time for most kinds)
    fn timestamp(&self) -> DateTime<Utc>;

    /// Cluster owning the resource, if it can be inferred
    fn cluster_id(&self) -> Option<&str> {
        None
    }

    /// Tags, for kinds that carry them
    fn tags(&self) -> Option<&[String]> {
        None
    }

    /// Delete the resource, tearing down dependent children first
    async fn delete(&self) -> Result<(), DeleteError>;
}

pub type BoxedResource = Box<dyn Resource>;

impl<'a> fmt::Debug for dyn Resource + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// Tag prefixes that carry a cluster identifier
pub const CLUSTER_TAG_PREFIXES: [&str; 2] = ["openshiftClusterID=", "PROW_CLUSTER_NAME="];

/// Extract the cluster identifier from `key=value` tags
pub fn cluster_from_tags<'a>(tags: &'a [String], prefixes: &[&str]) -> Option<&'a str> {
    tags.iter().find_map(|tag| {
        prefixes
            .iter()
            .find_map(|prefix| tag.strip_prefix(prefix))
            .filter(|value| !value.is_empty())
    })
}
