//! REST implementations of the service traits

use crate::api::*;
use crate::client::ServiceClient;
use crate::model::*;
use crate::timestamp;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use stackprune_cloud::{Page, ServiceError, ServiceResult};

/// Items requested per page from every catalog
pub const PAGE_SIZE: usize = 100;

const VOLUME_ATTACHMENTS_VERSION: &str = "volume 3.44";

// ============ Paging helpers ============

/// Pull the array under `key` out of a listing response
pub fn decode_items<T: DeserializeOwned>(mut body: Value, key: &str) -> ServiceResult<Vec<T>> {
    let items = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ServiceError::Decode(format!("missing \"{key}\" in listing response")))?;
    serde_json::from_value(items).map_err(|e| ServiceError::Decode(format!("{key}: {e}")))
}

/// A short page is the last one; otherwise continue after its last item
pub fn page_from<T: Record>(items: Vec<T>, limit: usize) -> Page<T> {
    let next_marker = if items.len() < limit {
        None
    } else {
        items.last().map(|r| r.marker().to_string())
    };
    Page { items, next_marker }
}

fn with_query(mut url: Url, pairs: &[(&str, &str)]) -> Url {
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    url
}

fn paged_url(client: &ServiceClient, path: &[&str], marker: Option<&str>, extra: &[(&str, &str)]) -> Url {
    let limit = PAGE_SIZE.to_string();
    let mut pairs = vec![("limit", limit.as_str())];
    pairs.extend_from_slice(extra);
    if let Some(marker) = marker {
        pairs.push(("marker", marker));
    }
    with_query(client.url(path), &pairs)
}

async fn list_page<T: DeserializeOwned + Record>(
    client: &ServiceClient,
    path: &[&str],
    key: &str,
    marker: Option<String>,
    extra: &[(&str, &str)],
) -> ServiceResult<Page<T>> {
    let url = paged_url(client, path, marker.as_deref(), extra);
    let body = client.get_json(url, key).await?;
    Ok(page_from(decode_items(body, key)?, PAGE_SIZE))
}

async fn delete_one(client: &ServiceClient, path: &[&str], what: &str) -> ServiceResult<()> {
    client.delete(client.url(path), what).await
}

// ============ Neutron ============

pub struct RestNetwork {
    client: ServiceClient,
}

impl RestNetwork {
    pub fn new(client: ServiceClient) -> Self {
        Self {
            client: client.versioned("v2.0"),
        }
    }
}

#[async_trait]
impl NetworkApi for RestNetwork {
    async fn list_floating_ips(&self, marker: Option<String>) -> ServiceResult<Page<FloatingIpRecord>> {
        list_page(&self.client, &["floatingips"], "floatingips", marker, &[]).await
    }

    async fn delete_floating_ip(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["floatingips", id], &format!("floating ip {id}")).await
    }

    async fn list_routers(&self, marker: Option<String>) -> ServiceResult<Page<RouterRecord>> {
        list_page(&self.client, &["routers"], "routers", marker, &[]).await
    }

    async fn router_interface_ports(&self, router_id: &str) -> ServiceResult<Vec<PortRecord>> {
        let filters = [("device_id", router_id), ("device_owner", "network:router_interface")];
        let mut ports = Vec::new();
        let mut marker = None;
        loop {
            let page: Page<PortRecord> = list_page(&self.client, &["ports"], "ports", marker, &filters).await?;
            ports.extend(page.items);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Ok(ports),
            }
        }
    }

    async fn remove_router_interface(&self, router_id: &str, subnet_id: &str) -> ServiceResult<()> {
        let url = self.client.url(["routers", router_id, "remove_router_interface"]);
        self.client
            .put_json(
                url,
                &json!({ "subnet_id": subnet_id }),
                &format!("router {router_id} interface on subnet {subnet_id}"),
            )
            .await
    }

    async fn delete_router(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["routers", id], &format!("router {id}")).await
    }

    async fn list_trunks(&self, marker: Option<String>) -> ServiceResult<Page<TrunkRecord>> {
        list_page(&self.client, &["trunks"], "trunks", marker, &[]).await
    }

    async fn delete_trunk(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["trunks", id], &format!("trunk {id}")).await
    }

    async fn list_ports(&self, marker: Option<String>) -> ServiceResult<Page<PortRecord>> {
        list_page(&self.client, &["ports"], "ports", marker, &[]).await
    }

    async fn delete_port(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["ports", id], &format!("port {id}")).await
    }

    async fn list_networks(&self, marker: Option<String>) -> ServiceResult<Page<NetworkRecord>> {
        list_page(&self.client, &["networks"], "networks", marker, &[]).await
    }

    async fn delete_network(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["networks", id], &format!("network {id}")).await
    }

    async fn list_security_groups(&self, marker: Option<String>) -> ServiceResult<Page<SecurityGroupRecord>> {
        list_page(&self.client, &["security-groups"], "security_groups", marker, &[]).await
    }

    async fn delete_security_group(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["security-groups", id], &format!("security group {id}")).await
    }
}

// ============ Octavia ============

pub struct RestLoadBalancer {
    client: ServiceClient,
}

impl RestLoadBalancer {
    pub fn new(client: ServiceClient) -> Self {
        Self {
            client: client.versioned("v2"),
        }
    }
}

#[async_trait]
impl LoadBalancerApi for RestLoadBalancer {
    async fn list_load_balancers(&self, marker: Option<String>) -> ServiceResult<Page<LoadBalancerRecord>> {
        list_page(&self.client, &["lbaas", "loadbalancers"], "loadbalancers", marker, &[]).await
    }

    async fn delete_load_balancer(&self, id: &str) -> ServiceResult<()> {
        let url = with_query(self.client.url(["lbaas", "loadbalancers", id]), &[("cascade", "true")]);
        self.client.delete(url, &format!("load balancer {id}")).await
    }
}

// ============ Nova ============

pub struct RestCompute {
    client: ServiceClient,
}

impl RestCompute {
    /// Server tags need compute microversion 2.26
    pub fn new(client: ServiceClient) -> Self {
        Self {
            client: client.with_microversion("X-OpenStack-Nova-API-Version", "2.26"),
        }
    }
}

#[async_trait]
impl ComputeApi for RestCompute {
    async fn list_servers(&self, marker: Option<String>) -> ServiceResult<Page<ServerRecord>> {
        list_page(&self.client, &["servers", "detail"], "servers", marker, &[]).await
    }

    async fn delete_server(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["servers", id], &format!("server {id}")).await
    }
}

// ============ Cinder ============

pub struct RestBlockStorage {
    client: ServiceClient,
}

impl RestBlockStorage {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlockStorageApi for RestBlockStorage {
    async fn list_volumes(&self, marker: Option<String>) -> ServiceResult<Page<VolumeRecord>> {
        list_page(&self.client, &["volumes", "detail"], "volumes", marker, &[]).await
    }

    async fn delete_attachment(&self, attachment_id: &str) -> ServiceResult<()> {
        let request = self
            .client
            .request(Method::DELETE, self.client.url(["attachments", attachment_id]))
            .header("OpenStack-API-Version", VOLUME_ATTACHMENTS_VERSION);
        self.client
            .send(request, &format!("volume attachment {attachment_id}"))
            .await?;
        Ok(())
    }

    async fn delete_volume(&self, id: &str) -> ServiceResult<()> {
        let url = with_query(self.client.url(["volumes", id]), &[("cascade", "true")]);
        self.client.delete(url, &format!("volume {id}")).await
    }

    async fn list_snapshots(&self, marker: Option<String>) -> ServiceResult<Page<VolumeSnapshotRecord>> {
        list_page(&self.client, &["snapshots", "detail"], "snapshots", marker, &[]).await
    }

    async fn delete_snapshot(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["snapshots", id], &format!("volume snapshot {id}")).await
    }
}

// ============ Manila ============

/// Manila pages by offset; the marker carries the next offset
pub struct RestShare {
    client: ServiceClient,
}

impl RestShare {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    async fn offset_page<T: DeserializeOwned>(
        &self,
        path: &[&str],
        key: &str,
        marker: Option<String>,
        extra: &[(&str, &str)],
    ) -> ServiceResult<Page<T>> {
        let offset: usize = marker.as_deref().and_then(|m| m.parse().ok()).unwrap_or(0);
        let limit = PAGE_SIZE.to_string();
        let offset_str = offset.to_string();
        let mut pairs = vec![("limit", limit.as_str()), ("offset", offset_str.as_str())];
        pairs.extend_from_slice(extra);

        let body = self.client.get_json(with_query(self.client.url(path), &pairs), key).await?;
        let items: Vec<T> = decode_items(body, key)?;
        let next_marker = (items.len() >= PAGE_SIZE).then(|| (offset + items.len()).to_string());
        Ok(Page { items, next_marker })
    }
}

#[async_trait]
impl ShareApi for RestShare {
    async fn list_shares(&self, marker: Option<String>) -> ServiceResult<Page<ShareRecord>> {
        self.offset_page(&["shares", "detail"], "shares", marker, &[]).await
    }

    async fn list_share_snapshots(
        &self,
        share_id: &str,
        marker: Option<String>,
    ) -> ServiceResult<Page<ShareSnapshotRecord>> {
        self.offset_page(&["snapshots", "detail"], "snapshots", marker, &[("share_id", share_id)])
            .await
    }

    async fn delete_share_snapshot(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["snapshots", id], &format!("share snapshot {id}")).await
    }

    async fn delete_share(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["shares", id], &format!("share {id}")).await
    }
}

// ============ Keystone ============

pub struct RestIdentity {
    client: ServiceClient,
    user_id: String,
}

impl RestIdentity {
    pub fn new(client: ServiceClient, user_id: impl Into<String>) -> Self {
        Self {
            client: client.versioned("v3"),
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl IdentityApi for RestIdentity {
    /// Keystone does not page application credentials
    async fn list_application_credentials(
        &self,
        _marker: Option<String>,
    ) -> ServiceResult<Page<AppCredRecord>> {
        let url = self
            .client
            .url(["users", self.user_id.as_str(), "application_credentials"]);
        let body = self.client.get_json(url, "application_credentials").await?;
        Ok(Page::last(decode_items(body, "application_credentials")?))
    }

    async fn delete_application_credential(&self, id: &str) -> ServiceResult<()> {
        delete_one(
            &self.client,
            &["users", self.user_id.as_str(), "application_credentials", id],
            &format!("application credential {id}"),
        )
        .await
    }
}

// ============ Glance ============

pub struct RestImage {
    client: ServiceClient,
}

impl RestImage {
    pub fn new(client: ServiceClient) -> Self {
        Self {
            client: client.versioned("v2"),
        }
    }
}

#[async_trait]
impl ImageApi for RestImage {
    /// Glance signals more pages with a `next` link instead of a full page
    async fn list_images(&self, marker: Option<String>) -> ServiceResult<Page<ImageRecord>> {
        let url = paged_url(&self.client, &["images"], marker.as_deref(), &[]);
        let body = self.client.get_json(url, "images").await?;
        let has_next = body.get("next").is_some_and(|n| !n.is_null());
        let items: Vec<ImageRecord> = decode_items(body, "images")?;
        let next_marker = if has_next {
            items.last().map(|i| i.marker().to_string())
        } else {
            None
        };
        Ok(Page { items, next_marker })
    }

    async fn delete_image(&self, id: &str) -> ServiceResult<()> {
        delete_one(&self.client, &["images", id], &format!("image {id}")).await
    }
}

// ============ Swift ============

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

pub struct RestObjectStore {
    client: ServiceClient,
}

impl RestObjectStore {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Swift answers an empty listing with 204 and no body
    async fn list_names(&self, url: Url, limit: usize, what: &str) -> ServiceResult<Page<String>> {
        let response = self.client.send(self.client.request(Method::GET, url), what).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let entries: Vec<NamedEntry> = if text.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&text).map_err(|e| ServiceError::Decode(format!("{what}: {e}")))?
        };
        let names: Vec<String> = entries.into_iter().map(|e| e.name).collect();
        let next_marker = if names.len() < limit {
            None
        } else {
            names.last().cloned()
        };
        Ok(Page {
            items: names,
            next_marker,
        })
    }

    /// `/<container>/<object>` relative to the account, percent-encoded
    fn object_path(&self, container: &str, object: &str) -> String {
        let full = self.client.url([container, object]);
        let account = self.client.base().path().trim_end_matches('/');
        full.path()
            .strip_prefix(account)
            .unwrap_or(full.path())
            .to_string()
    }
}

/// Lines of a bulk-delete request body
pub fn bulk_delete_body(paths: impl IntoIterator<Item = String>) -> String {
    paths.into_iter().map(|p| p + "\n").collect()
}

pub fn container_info_from_headers(container: &str, headers: &HeaderMap) -> ContainerInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    ContainerInfo {
        name: container.to_string(),
        cluster_id: header("x-container-meta-openshiftclusterid").map(str::to_string),
        created_at: header("x-timestamp").and_then(timestamp::parse_unix),
    }
}

#[async_trait]
impl ObjectStoreApi for RestObjectStore {
    async fn list_containers(&self, marker: Option<String>) -> ServiceResult<Page<String>> {
        let limit = PAGE_SIZE.to_string();
        let mut pairs = vec![("format", "json"), ("limit", limit.as_str())];
        if let Some(marker) = marker.as_deref() {
            pairs.push(("marker", marker));
        }
        let url = with_query(self.client.base().clone(), &pairs);
        self.list_names(url, PAGE_SIZE, "containers").await
    }

    async fn container_info(&self, container: &str) -> ServiceResult<ContainerInfo> {
        let headers = self
            .client
            .head(self.client.url([container]), &format!("container {container}"))
            .await?;
        Ok(container_info_from_headers(container, &headers))
    }

    async fn list_objects(
        &self,
        container: &str,
        limit: usize,
        marker: Option<String>,
    ) -> ServiceResult<Page<String>> {
        let limit_str = limit.to_string();
        let mut pairs = vec![("format", "json"), ("limit", limit_str.as_str())];
        if let Some(marker) = marker.as_deref() {
            pairs.push(("marker", marker));
        }
        let url = with_query(self.client.url([container]), &pairs);
        self.list_names(url, limit, &format!("objects of container {container}"))
            .await
    }

    async fn bulk_delete(&self, container: &str, objects: &[String]) -> ServiceResult<BulkDeleteReply> {
        let body = bulk_delete_body(objects.iter().map(|o| self.object_path(container, o)));
        let mut url = self.client.base().clone();
        url.set_query(Some("bulk-delete"));

        let request = self
            .client
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "text/plain")
            .header(ACCEPT, "application/json")
            .body(body);
        let what = format!("bulk delete in container {container}");
        let response = self.client.send(request, &what).await?;
        response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(format!("{what}: {e}")))
    }

    async fn delete_container(&self, container: &str) -> ServiceResult<()> {
        delete_one(&self.client, &[container], &format!("container {container}")).await
    }
}
