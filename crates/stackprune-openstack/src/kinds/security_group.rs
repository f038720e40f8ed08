use super::OPENSHIFT_CLUSTER_TAG;
use crate::api::NetworkApi;
use crate::model::SecurityGroupRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{
    BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, cluster_from_tags, paginate,
};
use std::sync::Arc;

pub struct SecurityGroup {
    record: SecurityGroupRecord,
    api: Arc<dyn NetworkApi>,
}

#[async_trait]
impl Resource for SecurityGroup {
    fn kind(&self) -> Kind {
        Kind::SecurityGroup
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
            .delete_security_group(&self.record.id)
            .await
            .map_err(DeleteError::step("delete security group"))
    }
}

pub struct SecurityGroupLister {
    api: Arc<dyn NetworkApi>,
}

impl SecurityGroupLister {
    pub fn new(api: Arc<dyn NetworkApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for SecurityGroupLister {
    fn kind(&self) -> Kind {
        Kind::SecurityGroup
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_security_groups(marker),
            |record| {
                Some(Box::new(SecurityGroup {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}
