use super::OPENSHIFT_CLUSTER_TAG;
use crate::api::NetworkApi;
use crate::model::PortRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{
    BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, cluster_from_tags, paginate,
};
use std::sync::Arc;

pub struct Port {
    record: PortRecord,
    api: Arc<dyn NetworkApi>,
}

impl Port {
    /// Ports Neutron manages itself (router interfaces, DHCP, floating IP
    /// gateways, OVN metadata) go away with their owner and cannot be
    /// deleted on their own.
    pub fn is_infrastructure(record: &PortRecord) -> bool {
        record.device_owner.starts_with("network:") || record.device_id.contains("ovnmeta")
    }
}

#[async_trait]
impl Resource for Port {
    fn kind(&self) -> Kind {
        Kind::Port
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

    async fn delete(&self) -> Result<(), DeleteError> {
        self.api
            .delete_port(&self.record.id)
            .await
            .map_err(DeleteError::step("delete port"))
    }
}

pub struct PortLister {
    api: Arc<dyn NetworkApi>,
}

impl PortLister {
    pub fn new(api: Arc<dyn NetworkApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for PortLister {
    fn kind(&self) -> Kind {
        Kind::Port
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_ports(marker),
            |record| {
                if Port::is_infrastructure(&record) {
                    return None;
                }
                Some(Box::new(Port {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}
