//! In-memory cloud implementing every service trait
//!
//! Calls are logged as `"<operation> <args>"` strings so tests can assert
//! on exact call sequences; any logged call can be made to fail.

use crate::api::*;
use crate::model::*;
use async_trait::async_trait;
use stackprune_cloud::{BoxedResource, KindLister, ListError, Listed, Page, ResourceSink, ServiceError, ServiceResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Default)]
pub struct FakeState {
    pub floating_ips: Vec<FloatingIpRecord>,
    pub routers: Vec<RouterRecord>,
    pub router_ports: HashMap<String, Vec<PortRecord>>,
    pub trunks: Vec<TrunkRecord>,
    pub ports: Vec<PortRecord>,
    pub networks: Vec<NetworkRecord>,
    pub security_groups: Vec<SecurityGroupRecord>,
    pub load_balancers: Vec<LoadBalancerRecord>,
    pub servers: Vec<ServerRecord>,
    pub volumes: Vec<VolumeRecord>,
    pub volume_snapshots: Vec<VolumeSnapshotRecord>,
    pub shares: Vec<ShareRecord>,
    pub share_snapshots: HashMap<String, Vec<ShareSnapshotRecord>>,
    pub app_creds: Vec<AppCredRecord>,
    pub images: Vec<ImageRecord>,
    pub containers: Vec<ContainerInfo>,
    pub objects: HashMap<String, Vec<String>>,
    /// Per-container `[object, reason]` pairs returned by bulk delete
    pub bulk_errors: HashMap<String, Vec<(String, String)>>,
}

pub struct FakeCloud {
    page_size: usize,
    state: Mutex<FakeState>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, ServiceError>>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self {
            page_size: 2,
            state: Mutex::new(FakeState::default()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, seed: impl FnOnce(&mut FakeState)) -> Self {
        seed(&mut self.state.lock().unwrap());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Make the call logged as `call` fail with `error`
    pub fn fail(&self, call: &str, error: ServiceError) {
        self.failures.lock().unwrap().insert(call.to_string(), error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Logged calls starting with `prefix`
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn call(&self, call: String) -> ServiceResult<()> {
        let failure = self.failures.lock().unwrap().get(&call).cloned();
        self.calls.lock().unwrap().push(call);
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn page<T: Clone + Record>(&self, items: &[T], marker: Option<String>) -> Page<T> {
        let start = marker
            .and_then(|m| items.iter().position(|i| i.marker() == m))
            .map_or(0, |p| p + 1);
        let end = (start + self.page_size).min(items.len());
        let slice = items[start..end].to_vec();
        let next_marker = (end < items.len()).then(|| items[end - 1].marker().to_string());
        Page {
            items: slice,
            next_marker,
        }
    }

    fn name_page(names: &[String], limit: usize, marker: Option<String>) -> Page<String> {
        let start = marker
            .and_then(|m| names.iter().position(|n| *n == m))
            .map_or(0, |p| p + 1);
        let end = (start + limit).min(names.len());
        let next_marker = (end < names.len()).then(|| names[end - 1].clone());
        Page {
            items: names[start..end].to_vec(),
            next_marker,
        }
    }
}

/// Run a lister to completion and collect what it emitted
pub async fn drain(lister: &dyn KindLister) -> (Result<(), ListError>, Vec<BoxedResource>) {
    let (tx, mut rx) = mpsc::channel(256);
    let sink = ResourceSink::new(lister.kind(), tx);
    let outcome = lister.list(&sink).await;
    drop(sink);
    let mut resources = Vec::new();
    while let Some(item) = rx.recv().await {
        if let Listed::Resource(r) = item {
            resources.push(r);
        }
    }
    (outcome, resources)
}

fn marker_arg(marker: &Option<String>) -> &str {
    marker.as_deref().unwrap_or("-")
}

#[async_trait]
impl NetworkApi for FakeCloud {
    async fn list_floating_ips(&self, marker: Option<String>) -> ServiceResult<Page<FloatingIpRecord>> {
        self.call(format!("list_floating_ips {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().floating_ips, marker))
    }

    async fn delete_floating_ip(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_floating_ip {id}"))
    }

    async fn list_routers(&self, marker: Option<String>) -> ServiceResult<Page<RouterRecord>> {
        self.call(format!("list_routers {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().routers, marker))
    }

    async fn router_interface_ports(&self, router_id: &str) -> ServiceResult<Vec<PortRecord>> {
        self.call(format!("router_interface_ports {router_id}"))?;
        Ok(self.state().router_ports.get(router_id).cloned().unwrap_or_default())
    }

    async fn remove_router_interface(&self, router_id: &str, subnet_id: &str) -> ServiceResult<()> {
        self.call(format!("remove_router_interface {router_id} {subnet_id}"))
    }

    async fn delete_router(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_router {id}"))
    }

    async fn list_trunks(&self, marker: Option<String>) -> ServiceResult<Page<TrunkRecord>> {
        self.call(format!("list_trunks {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().trunks, marker))
    }

    async fn delete_trunk(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_trunk {id}"))
    }

    async fn list_ports(&self, marker: Option<String>) -> ServiceResult<Page<PortRecord>> {
        self.call(format!("list_ports {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().ports, marker))
    }

    async fn delete_port(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_port {id}"))
    }

    async fn list_networks(&self, marker: Option<String>) -> ServiceResult<Page<NetworkRecord>> {
        self.call(format!("list_networks {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().networks, marker))
    }

    async fn delete_network(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_network {id}"))
    }

    async fn list_security_groups(&self, marker: Option<String>) -> ServiceResult<Page<SecurityGroupRecord>> {
        self.call(format!("list_security_groups {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().security_groups, marker))
    }

    async fn delete_security_group(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_security_group {id}"))
    }
}

#[async_trait]
impl LoadBalancerApi for FakeCloud {
    async fn list_load_balancers(&self, marker: Option<String>) -> ServiceResult<Page<LoadBalancerRecord>> {
        self.call(format!("list_load_balancers {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().load_balancers, marker))
    }

    async fn delete_load_balancer(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_load_balancer {id}"))
    }
}

#[async_trait]
impl ComputeApi for FakeCloud {
    async fn list_servers(&self, marker: Option<String>) -> ServiceResult<Page<ServerRecord>> {
        self.call(format!("list_servers {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().servers, marker))
    }

    async fn delete_server(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_server {id}"))
    }
}

#[async_trait]
impl BlockStorageApi for FakeCloud {
    async fn list_volumes(&self, marker: Option<String>) -> ServiceResult<Page<VolumeRecord>> {
        self.call(format!("list_volumes {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().volumes, marker))
    }

    async fn delete_attachment(&self, attachment_id: &str) -> ServiceResult<()> {
        self.call(format!("delete_attachment {attachment_id}"))
    }

    async fn delete_volume(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_volume {id}"))
    }

    async fn list_snapshots(&self, marker: Option<String>) -> ServiceResult<Page<VolumeSnapshotRecord>> {
        self.call(format!("list_snapshots {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().volume_snapshots, marker))
    }

    async fn delete_snapshot(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_snapshot {id}"))
    }
}

#[async_trait]
impl ShareApi for FakeCloud {
    async fn list_shares(&self, marker: Option<String>) -> ServiceResult<Page<ShareRecord>> {
        self.call(format!("list_shares {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().shares, marker))
    }

    async fn list_share_snapshots(
        &self,
        share_id: &str,
        marker: Option<String>,
    ) -> ServiceResult<Page<ShareSnapshotRecord>> {
        self.call(format!("list_share_snapshots {share_id} {}", marker_arg(&marker)))?;
        let snapshots = self.state().share_snapshots.get(share_id).cloned().unwrap_or_default();
        Ok(self.page(&snapshots, marker))
    }

    async fn delete_share_snapshot(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_share_snapshot {id}"))
    }

    async fn delete_share(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_share {id}"))
    }
}

#[async_trait]
impl IdentityApi for FakeCloud {
    async fn list_application_credentials(
        &self,
        marker: Option<String>,
    ) -> ServiceResult<Page<AppCredRecord>> {
        self.call(format!("list_application_credentials {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().app_creds, marker))
    }

    async fn delete_application_credential(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_application_credential {id}"))
    }
}

#[async_trait]
impl ImageApi for FakeCloud {
    async fn list_images(&self, marker: Option<String>) -> ServiceResult<Page<ImageRecord>> {
        self.call(format!("list_images {}", marker_arg(&marker)))?;
        Ok(self.page(&self.state().images, marker))
    }

    async fn delete_image(&self, id: &str) -> ServiceResult<()> {
        self.call(format!("delete_image {id}"))
    }
}

#[async_trait]
impl ObjectStoreApi for FakeCloud {
    async fn list_containers(&self, marker: Option<String>) -> ServiceResult<Page<String>> {
        self.call(format!("list_containers {}", marker_arg(&marker)))?;
        let names: Vec<String> = self.state().containers.iter().map(|c| c.name.clone()).collect();
        Ok(Self::name_page(&names, self.page_size, marker))
    }

    async fn container_info(&self, container: &str) -> ServiceResult<ContainerInfo> {
        self.call(format!("container_info {container}"))?;
        self.state()
            .containers
            .iter()
            .find(|c| c.name == container)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("container {container}")))
    }

    async fn list_objects(
        &self,
        container: &str,
        limit: usize,
        marker: Option<String>,
    ) -> ServiceResult<Page<String>> {
        self.call(format!("list_objects {container} {}", marker_arg(&marker)))?;
        let state = self.state();
        if !state.containers.iter().any(|c| c.name == container) {
            return Err(ServiceError::NotFound(format!("container {container}")));
        }
        let names = state.objects.get(container).cloned().unwrap_or_default();
        Ok(Self::name_page(&names, limit, marker))
    }

    async fn bulk_delete(&self, container: &str, objects: &[String]) -> ServiceResult<BulkDeleteReply> {
        self.call(format!("bulk_delete {container} {}", objects.join(",")))?;
        let errors = self.state().bulk_errors.get(container).cloned().unwrap_or_default();
        Ok(BulkDeleteReply {
            deleted: objects.len().saturating_sub(errors.len()) as u64,
            not_found: 0,
            errors,
        })
    }

    async fn delete_container(&self, container: &str) -> ServiceResult<()> {
        self.call(format!("delete_container {container}"))?;
        let mut state = self.state();
        let before = state.containers.len();
        state.containers.retain(|c| c.name != container);
        if state.containers.len() == before {
            return Err(ServiceError::NotFound(format!("container {container}")));
        }
        Ok(())
    }
}
