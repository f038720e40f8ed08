//! Raw catalog records as the services return them
//!
//! Only the fields the pruner reads are modelled; everything else in the
//! payloads is ignored.

use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// A record that can serve as a paging marker
pub trait Record {
    fn marker(&self) -> &str;
}

macro_rules! record_marker {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn marker(&self) -> &str {
                &self.id
            }
        })*
    };
}

record_marker!(
    FloatingIpRecord,
    LoadBalancerRecord,
    ServerRecord,
    RouterRecord,
    PortRecord,
    TrunkRecord,
    NetworkRecord,
    VolumeSnapshotRecord,
    VolumeRecord,
    SecurityGroupRecord,
    ShareRecord,
    ShareSnapshotRecord,
    AppCredRecord,
    ImageRecord,
);

// ============ Network ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FloatingIpRecord {
    pub id: String,
    #[serde(default)]
    pub floating_ip_address: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouterRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixedIp {
    #[serde(default)]
    pub subnet_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub device_owner: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrunkRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityGroupRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ============ Load balancer ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadBalancerRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ============ Compute ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Only present from microversion 2.26 on
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

// ============ Block storage ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeAttachment {
    #[serde(default)]
    pub attachment_id: String,
    #[serde(default)]
    pub server_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<VolumeAttachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeSnapshotRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
}

// ============ Shared file systems ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareSnapshotRecord {
    pub id: String,
}

// ============ Identity ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppCredRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "timestamp::lenient_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

// ============ Image ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ============ Object store ============

/// Headers of a container that the pruner cares about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerInfo {
    pub name: String,
    /// `X-Container-Meta-Openshiftclusterid`
    pub cluster_id: Option<String>,
    /// `X-Timestamp`
    pub created_at: Option<DateTime<Utc>>,
}

/// Reply of a Swift bulk-delete request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BulkDeleteReply {
    #[serde(rename = "Number Deleted", default)]
    pub deleted: u64,
    #[serde(rename = "Number Not Found", default)]
    pub not_found: u64,
    /// `[object, reason]` pairs
    #[serde(rename = "Errors", default)]
    pub errors: Vec<(String, String)>,
}
