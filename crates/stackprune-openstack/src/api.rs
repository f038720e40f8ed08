//! Service seams
//!
//! One trait per OpenStack service, covering exactly the calls the kinds
//! need. Listing calls return one [`Page`] per invocation; `marker` is the
//! `next_marker` of the previous page. The REST implementations live in
//! [`crate::rest`], test doubles in the crate's test-only fake cloud.

use crate::model::*;
use async_trait::async_trait;
use stackprune_cloud::{Page, ServiceResult};

/// Neutron
#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn list_floating_ips(&self, marker: Option<String>) -> ServiceResult<Page<FloatingIpRecord>>;
    async fn delete_floating_ip(&self, id: &str) -> ServiceResult<()>;

    async fn list_routers(&self, marker: Option<String>) -> ServiceResult<Page<RouterRecord>>;
    /// Ports of `device_owner=network:router_interface` attached to the router
    async fn router_interface_ports(&self, router_id: &str) -> ServiceResult<Vec<PortRecord>>;
    async fn remove_router_interface(&self, router_id: &str, subnet_id: &str) -> ServiceResult<()>;
    async fn delete_router(&self, id: &str) -> ServiceResult<()>;

    async fn list_trunks(&self, marker: Option<String>) -> ServiceResult<Page<TrunkRecord>>;
    async fn delete_trunk(&self, id: &str) -> ServiceResult<()>;

    async fn list_ports(&self, marker: Option<String>) -> ServiceResult<Page<PortRecord>>;
    async fn delete_port(&self, id: &str) -> ServiceResult<()>;

    async fn list_networks(&self, marker: Option<String>) -> ServiceResult<Page<NetworkRecord>>;
    async fn delete_network(&self, id: &str) -> ServiceResult<()>;

    async fn list_security_groups(&self, marker: Option<String>) -> ServiceResult<Page<SecurityGroupRecord>>;
    async fn delete_security_group(&self, id: &str) -> ServiceResult<()>;
}

/// Octavia
#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    async fn list_load_balancers(&self, marker: Option<String>) -> ServiceResult<Page<LoadBalancerRecord>>;
    /// Cascading delete: listeners, pools and members go with it
    async fn delete_load_balancer(&self, id: &str) -> ServiceResult<()>;
}

/// Nova
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn list_servers(&self, marker: Option<String>) -> ServiceResult<Page<ServerRecord>>;
    async fn delete_server(&self, id: &str) -> ServiceResult<()>;
}

/// Cinder
#[async_trait]
pub trait BlockStorageApi: Send + Sync {
    async fn list_volumes(&self, marker: Option<String>) -> ServiceResult<Page<VolumeRecord>>;
    /// Needs volume API 3.44 or later
    async fn delete_attachment(&self, attachment_id: &str) -> ServiceResult<()>;
    /// Cascading delete: the volume's snapshots go with it
    async fn delete_volume(&self, id: &str) -> ServiceResult<()>;

    async fn list_snapshots(&self, marker: Option<String>) -> ServiceResult<Page<VolumeSnapshotRecord>>;
    async fn delete_snapshot(&self, id: &str) -> ServiceResult<()>;
}

/// Manila
#[async_trait]
pub trait ShareApi: Send + Sync {
    async fn list_shares(&self, marker: Option<String>) -> ServiceResult<Page<ShareRecord>>;
    async fn list_share_snapshots(
        &self,
        share_id: &str,
        marker: Option<String>,
    ) -> ServiceResult<Page<ShareSnapshotRecord>>;
    async fn delete_share_snapshot(&self, id: &str) -> ServiceResult<()>;
    async fn delete_share(&self, id: &str) -> ServiceResult<()>;
}

/// Keystone, scoped to the token's user
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn list_application_credentials(
        &self,
        marker: Option<String>,
    ) -> ServiceResult<Page<AppCredRecord>>;
    async fn delete_application_credential(&self, id: &str) -> ServiceResult<()>;
}

/// Glance
#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn list_images(&self, marker: Option<String>) -> ServiceResult<Page<ImageRecord>>;
    async fn delete_image(&self, id: &str) -> ServiceResult<()>;
}

/// Swift
#[async_trait]
pub trait ObjectStoreApi: Send + Sync {
    /// Container names; the marker is the last name seen
    async fn list_containers(&self, marker: Option<String>) -> ServiceResult<Page<String>>;
    async fn container_info(&self, container: &str) -> ServiceResult<ContainerInfo>;
    async fn list_objects(
        &self,
        container: &str,
        limit: usize,
        marker: Option<String>,
    ) -> ServiceResult<Page<String>>;
    async fn bulk_delete(&self, container: &str, objects: &[String]) -> ServiceResult<BulkDeleteReply>;
    async fn delete_container(&self, container: &str) -> ServiceResult<()>;
}
