use crate::api::BlockStorageApi;
use crate::model::VolumeRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, paginate};
use std::sync::Arc;

const CLUSTER_METADATA_KEY: &str = "cinder.csi.openstack.org/cluster";

/// A Cinder volume, possibly still attached to servers
pub struct Volume {
    record: VolumeRecord,
    api: Arc<dyn BlockStorageApi>,
}

#[async_trait]
impl Resource for Volume {
    fn kind(&self) -> Kind {
        Kind::Volume
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

    /// Detach every attachment, then delete with cascade so snapshots go too
    async fn delete(&self) -> Result<(), DeleteError> {
        for attachment in &self.record.attachments {
            tracing::debug!(
                "Detaching volume {} (attachment {})",
                self.record.id,
                attachment.attachment_id
            );
            self.api
                .delete_attachment(&attachment.attachment_id)
                .await
                .map_err(DeleteError::step("detach volume"))?;
        }
        self.api
            .delete_volume(&self.record.id)
            .await
            .map_err(DeleteError::step("delete volume"))
    }
}

pub struct VolumeLister {
    api: Arc<dyn BlockStorageApi>,
}

impl VolumeLister {
    pub fn new(api: Arc<dyn BlockStorageApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for VolumeLister {
    fn kind(&self) -> Kind {
        Kind::Volume
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_volumes(marker),
            |record| {
                Some(Box::new(Volume {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}
