//! Swift containers
//!
//! Containers only carry a cluster id in a metadata header and have no
//! creation time worth trusting, so each one borrows its timestamp from the
//! network of the same cluster. The network table is drained in full before
//! the first container is emitted.

use super::OPENSHIFT_CLUSTER_TAG;
use crate::api::{NetworkApi, ObjectStoreApi};
use crate::model::ContainerInfo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{
    DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, ServiceError, ServiceResult,
    cluster_from_tags,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Objects listed and bulk-deleted per request
pub const BULK_DELETE_PAGE: usize = 50;

/// Creation time of each cluster's network, keyed by cluster id
#[derive(Debug, Clone, Default)]
pub struct NetworkAffinity {
    created_at: HashMap<String, DateTime<Utc>>,
}

impl NetworkAffinity {
    /// Page through every network and remember the tagged ones
    pub async fn collect(api: &dyn NetworkApi) -> ServiceResult<Self> {
        let mut affinity = Self::default();
        let mut marker = None;
        loop {
            let page = api.list_networks(marker.take()).await?;
            for network in &page.items {
                if let Some(cluster) = cluster_from_tags(&network.tags, &OPENSHIFT_CLUSTER_TAG) {
                    affinity
                        .created_at
                        .entry(cluster.to_string())
                        .or_insert(network.created_at);
                }
            }
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Ok(affinity),
            }
        }
    }

    pub fn created_at(&self, cluster_id: &str) -> Option<DateTime<Utc>> {
        self.created_at.get(cluster_id).copied()
    }

    pub fn len(&self) -> usize {
        self.created_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created_at.is_empty()
    }
}

impl FromIterator<(String, DateTime<Utc>)> for NetworkAffinity {
    fn from_iter<I: IntoIterator<Item = (String, DateTime<Utc>)>>(iter: I) -> Self {
        Self {
            created_at: iter.into_iter().collect(),
        }
    }
}

pub struct Container {
    info: ContainerInfo,
    network_created_at: Option<DateTime<Utc>>,
    api: Arc<dyn ObjectStoreApi>,
}

impl Container {
    /// Bulk-delete every object, one listing page at a time
    async fn empty(&self) -> Result<(), DeleteError> {
        let name = self.info.name.as_str();
        let mut marker = None;
        loop {
            let page = match self.api.list_objects(name, BULK_DELETE_PAGE, marker.take()).await {
                Ok(page) => page,
                // Gone already; the container delete below settles it.
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(DeleteError::step("list container objects")(e)),
            };
            if page.items.is_empty() {
                return Ok(());
            }

            let reply = self
                .api
                .bulk_delete(name, &page.items)
                .await
                .map_err(DeleteError::step("bulk delete container objects"))?;
            if !reply.errors.is_empty() {
                return Err(DeleteError::BulkDelete {
                    container: name.to_string(),
                    failures: reply.errors,
                });
            }
            tracing::debug!("Deleted {} objects from container {:?}", reply.deleted, name);

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Ok(()),
            }
        }
    }
}

#[async_trait]
impl Resource for Container {
    fn kind(&self) -> Kind {
        Kind::Container
    }

    fn id(&self) -> &str {
        &self.info.name
    }

    fn name(&self) -> &str {
        &self.info.name
    }

    /// Cluster network creation, else `X-Timestamp`, else the epoch
    fn timestamp(&self) -> DateTime<Utc> {
        self.network_created_at
            .or(self.info.created_at)
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    fn cluster_id(&self) -> Option<&str> {
        self.info.cluster_id.as_deref()
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        if let Err(e) = self.empty().await {
            tracing::warn!("Bulk deleting of container {:?} objects failed: {}", self.info.name, e);
            return Err(e);
        }
        tracing::info!("Deleting container {:?}", self.info.name);
        match self.api.delete_container(&self.info.name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::info!(
                    "Cannot find container {:?}, it has probably been deleted already",
                    self.info.name
                );
                Ok(())
            }
            Err(e) => Err(DeleteError::step("delete container")(e)),
        }
    }
}

/// Lists containers against an already collected network table
pub struct ContainerLister {
    api: Arc<dyn ObjectStoreApi>,
    affinity: NetworkAffinity,
}

impl ContainerLister {
    pub fn new(api: Arc<dyn ObjectStoreApi>, affinity: NetworkAffinity) -> Self {
        Self { api, affinity }
    }

    fn container(&self, info: ContainerInfo) -> Container {
        let network_created_at = info
            .cluster_id
            .as_deref()
            .and_then(|cluster| self.affinity.created_at(cluster));
        Container {
            info,
            network_created_at,
            api: Arc::clone(&self.api),
        }
    }
}

#[async_trait]
impl KindLister for ContainerLister {
    fn kind(&self) -> Kind {
        Kind::Container
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        let mut marker = None;
        loop {
            let page = match self.api.list_containers(marker.take()).await {
                Ok(page) => page,
                Err(ServiceError::Forbidden(reason)) => {
                    tracing::info!(
                        "Skipping container listing, the user is not authorized to list containers: {}",
                        reason
                    );
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            for name in &page.items {
                let info = match self.api.container_info(name).await {
                    Ok(info) => info,
                    Err(e) if e.is_not_found() => continue,
                    Err(e) => return Err(e.into()),
                };
                sink.emit(Box::new(self.container(info))).await?;
            }
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Ok(()),
            }
        }
    }
}

/// Container lister that first drains the network catalog into a
/// [`NetworkAffinity`] table
pub struct NetworkBackedContainerLister {
    store: Arc<dyn ObjectStoreApi>,
    network: Arc<dyn NetworkApi>,
}

impl NetworkBackedContainerLister {
    pub fn new(store: Arc<dyn ObjectStoreApi>, network: Arc<dyn NetworkApi>) -> Self {
        Self { store, network }
    }
}

#[async_trait]
impl KindLister for NetworkBackedContainerLister {
    fn kind(&self) -> Kind {
        Kind::Container
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        let affinity = NetworkAffinity::collect(self.network.as_ref()).await?;
        tracing::debug!("Collected {} cluster networks for container dating", affinity.len());
        ContainerLister::new(Arc::clone(&self.store), affinity)
            .list(sink)
            .await
    }
}
