use super::OPENSHIFT_CLUSTER_TAG;
use crate::api::NetworkApi;
use crate::model::TrunkRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{
    BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, cluster_from_tags, paginate,
};
use std::sync::Arc;

pub struct Trunk {
    record: TrunkRecord,
    api: Arc<dyn NetworkApi>,
}

#[async_trait]
impl Resource for Trunk {
    fn kind(&self) -> Kind {
        Kind::Trunk
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
            .delete_trunk(&self.record.id)
            .await
            .map_err(DeleteError::step("delete trunk"))
    }
}

pub struct TrunkLister {
    api: Arc<dyn NetworkApi>,
}

impl TrunkLister {
    pub fn new(api: Arc<dyn NetworkApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for TrunkLister {
    fn kind(&self) -> Kind {
        Kind::Trunk
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_trunks(marker),
            |record| {
                Some(Box::new(Trunk {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}
