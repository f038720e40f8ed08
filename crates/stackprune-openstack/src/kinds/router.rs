use super::OPENSHIFT_CLUSTER_TAG;
use crate::api::NetworkApi;
use crate::model::RouterRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{
    DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, ServiceResult, cluster_from_tags,
};
use std::sync::Arc;

/// A Neutron router along with the subnets it is plugged into
pub struct Router {
    record: RouterRecord,
    subnets: Vec<String>,
    api: Arc<dyn NetworkApi>,
}

#[async_trait]
impl Resource for Router {
    fn kind(&self) -> Kind {
        Kind::Router
    }

    fn id(&self) -> &str {
        &self.record.id
    }

    fn name(&self) -> &str {
        &self.record.name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    fn cluster_id(&self) -> Option<&str> {
        cluster_from_tags(&self.record.tags, &OPENSHIFT_CLUSTER_TAG)
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.record.tags)
    }

    /// Unplug every subnet, then delete the router. The first failed detach
    /// aborts; the router is left for the next run.
    async fn delete(&self) -> Result<(), DeleteError> {
        for subnet in &self.subnets {
            tracing::debug!("Removing interface of router {} on subnet {}", self.record.id, subnet);
            self.api
                .remove_router_interface(&self.record.id, subnet)
                .await
                .map_err(DeleteError::step("remove router interface"))?;
        }
        self.api
            .delete_router(&self.record.id)
            .await
            .map_err(DeleteError::step("delete router"))
    }
}

pub struct RouterLister {
    api: Arc<dyn NetworkApi>,
}

impl RouterLister {
    pub fn new(api: Arc<dyn NetworkApi>) -> Self {
        Self { api }
    }

    /// Distinct subnets of the router's interface ports, in port order
    async fn interface_subnets(&self, router_id: &str) -> ServiceResult<Vec<String>> {
        let ports = self.api.router_interface_ports(router_id).await?;
        let mut subnets: Vec<String> = Vec::new();
        for fixed_ip in ports.iter().flat_map(|p| p.fixed_ips.iter()) {
            if !fixed_ip.subnet_id.is_empty() && !subnets.contains(&fixed_ip.subnet_id) {
                subnets.push(fixed_ip.subnet_id.clone());
            }
        }
        Ok(subnets)
    }
}

#[async_trait]
impl KindLister for RouterLister {
    fn kind(&self) -> Kind {
        Kind::Router
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        let mut marker = None;
        loop {
            let page = self.api.list_routers(marker.take()).await?;
            for record in page.items {
                let subnets = self.interface_subnets(&record.id).await?;
                sink.emit(Box::new(Router {
                    record,
                    subnets,
                    api: Arc::clone(&self.api),
                }))
                .await?;
            }
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Ok(()),
            }
        }
    }
}
