use crate::api::LoadBalancerApi;
use crate::model::LoadBalancerRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, paginate};
use std::sync::Arc;

/// An Octavia load balancer; its listeners and pools go with it
pub struct LoadBalancer {
    record: LoadBalancerRecord,
    api: Arc<dyn LoadBalancerApi>,
}

#[async_trait]
impl Resource for LoadBalancer {
    fn kind(&self) -> Kind {
        Kind::LoadBalancer
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

    fn tags(&self) -> Option<&[String]> {
        Some(&self.record.tags)
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        self.api
            .delete_load_balancer(&self.record.id)
            .await
            .map_err(DeleteError::step("delete load balancer"))
    }
}

pub struct LoadBalancerLister {
    api: Arc<dyn LoadBalancerApi>,
}

impl LoadBalancerLister {
    pub fn new(api: Arc<dyn LoadBalancerApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for LoadBalancerLister {
    fn kind(&self) -> Kind {
        Kind::LoadBalancer
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_load_balancers(marker),
            |record| {
                Some(Box::new(LoadBalancer {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}
