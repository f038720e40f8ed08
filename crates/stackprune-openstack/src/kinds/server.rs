use crate::api::ComputeApi;
use crate::model::ServerRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, paginate};
use std::sync::Arc;

const CLUSTER_METADATA_KEY: &str = "openshiftClusterID";

pub struct Server {
    record: ServerRecord,
    api: Arc<dyn ComputeApi>,
}

#[async_trait]
impl Resource for Server {
    fn kind(&self) -> Kind {
        Kind::Server
    }

    fn id(&self) -> &str {
        &self.record.id
    }

    fn name(&self) -> &str {
        &self.record.name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.record.created
    }

    fn cluster_id(&self) -> Option<&str> {
        self.record
            .metadata
            .get(CLUSTER_METADATA_KEY)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn tags(&self) -> Option<&[String]> {
        self.record.tags.as_deref()
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        self.api
            .delete_server(&self.record.id)
            .await
            .map_err(DeleteError::step("delete server"))
    }
}

pub struct ServerLister {
    api: Arc<dyn ComputeApi>,
}

impl ServerLister {
    pub fn new(api: Arc<dyn ComputeApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for ServerLister {
    fn kind(&self) -> Kind {
        Kind::Server
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_servers(marker),
            |record| {
                Some(Box::new(Server {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCloud, drain};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_cluster_from_metadata_and_optional_tags() {
        let fake = Arc::new(FakeCloud::new().with(|s| {
            s.servers = vec![
                ServerRecord {
                    id: "s1".to_string(),
                    name: "master-0".to_string(),
                    metadata: HashMap::from([(CLUSTER_METADATA_KEY.to_string(), "ci-op-1".to_string())]),
                    tags: Some(vec!["shiftstack-prune=keep".to_string()]),
                    ..Default::default()
                },
                ServerRecord {
                    id: "s2".to_string(),
                    name: "metrics".to_string(),
                    ..Default::default()
                },
            ];
        }));

        let (outcome, servers) = drain(&ServerLister::new(fake)).await;
        outcome.unwrap();
        assert_eq!(servers[0].cluster_id(), Some("ci-op-1"));
        assert_eq!(servers[0].tags().map(<[String]>::len), Some(1));
        assert_eq!(servers[1].cluster_id(), None);
        assert_eq!(servers[1].tags(), None);
    }
}
