use crate::api::NetworkApi;
use crate::model::FloatingIpRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{
    BoxedResource, CLUSTER_TAG_PREFIXES, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink,
    cluster_from_tags, paginate,
};
use std::sync::Arc;

/// A floating IP, named after its address
pub struct FloatingIp {
    record: FloatingIpRecord,
    api: Arc<dyn NetworkApi>,
}

#[async_trait]
impl Resource for FloatingIp {
    fn kind(&self) -> Kind {
        Kind::FloatingIp
    }

    fn id(&self) -> &str {
        &self.record.id
    }

    fn name(&self) -> &str {
        &self.record.floating_ip_address
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    /// CI jobs tag floating IPs with either the installer or the Prow cluster name
    fn cluster_id(&self) -> Option<&str> {
        cluster_from_tags(&self.record.tags, &CLUSTER_TAG_PREFIXES)
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.record.tags)
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        self.api
            .delete_floating_ip(&self.record.id)
            .await
            .map_err(DeleteError::step("delete floating ip"))
    }
}

pub struct FloatingIpLister {
    api: Arc<dyn NetworkApi>,
}

impl FloatingIpLister {
    pub fn new(api: Arc<dyn NetworkApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for FloatingIpLister {
    fn kind(&self) -> Kind {
        Kind::FloatingIp
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_floating_ips(marker),
            |record| {
                Some(Box::new(FloatingIp {
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

    fn fip(id: &str, address: &str, tags: &[&str]) -> FloatingIpRecord {
        FloatingIpRecord {
            id: id.to_string(),
            floating_ip_address: address.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_lists_every_page_in_order() {
        let fake = Arc::new(FakeCloud::new().with(|s| {
            s.floating_ips = vec![
                fip("f1", "10.0.0.1", &["openshiftClusterID=ci-1"]),
                fip("f2", "10.0.0.2", &["PROW_CLUSTER_NAME=ci-2"]),
                fip("f3", "10.0.0.3", &[]),
            ];
        }));
        let lister = FloatingIpLister::new(fake.clone());

        let (outcome, resources) = drain(&lister).await;
        outcome.unwrap();
        let names: Vec<&str> = resources.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        assert_eq!(resources[0].cluster_id(), Some("ci-1"));
        assert_eq!(resources[1].cluster_id(), Some("ci-2"));
        assert_eq!(resources[2].cluster_id(), None);
        assert_eq!(fake.calls_to("list_floating_ips"), vec!["list_floating_ips -", "list_floating_ips f2"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let fake = Arc::new(FakeCloud::new());
        let resource = FloatingIp {
            record: fip("f1", "10.0.0.1", &[]),
            api: fake.clone(),
        };
        resource.delete().await.unwrap();
        assert_eq!(fake.calls(), vec!["delete_floating_ip f1"]);
    }
}
