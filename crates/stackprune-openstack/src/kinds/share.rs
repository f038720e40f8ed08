use crate::api::ShareApi;
use crate::model::ShareRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, paginate};
use std::sync::Arc;

const CLUSTER_METADATA_KEY: &str = "manila.csi.openstack.org/cluster";

/// A Manila share
pub struct Share {
    record: ShareRecord,
    api: Arc<dyn ShareApi>,
}

impl Share {
    async fn delete_snapshots(&self) -> Result<(), DeleteError> {
        let mut marker = None;
        loop {
            let page = self
                .api
                .list_share_snapshots(&self.record.id, marker.take())
                .await
                .map_err(DeleteError::step("list share snapshots"))?;
            for snapshot in &page.items {
                self.api
                    .delete_share_snapshot(&snapshot.id)
                    .await
                    .map_err(DeleteError::step("delete share snapshot"))?;
            }
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Ok(()),
            }
        }
    }
}

#[async_trait]
impl Resource for Share {
    fn kind(&self) -> Kind {
        Kind::Share
    }

    fn id(&self) -> &str {
        &self.record.id
    }

    fn name(&self) -> &str {
        self.record.name.as_deref().unwrap_or_default()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    fn cluster_id(&self) -> Option<&str> {
        self.record
            .metadata
            .get(CLUSTER_METADATA_KEY)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        self.delete_snapshots().await?;
        self.api
            .delete_share(&self.record.id)
            .await
            .map_err(DeleteError::step("delete share"))
    }
}

pub struct ShareLister {
    api: Arc<dyn ShareApi>,
}

impl ShareLister {
    pub fn new(api: Arc<dyn ShareApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for ShareLister {
    fn kind(&self) -> Kind {
        Kind::Share
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_shares(marker),
            |record| {
                Some(Box::new(Share {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}
