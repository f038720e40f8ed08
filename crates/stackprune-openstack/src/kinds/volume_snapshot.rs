use crate::api::BlockStorageApi;
use crate::model::VolumeSnapshotRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, paginate};
use std::sync::Arc;

/// A Cinder snapshot; carries neither tags nor a cluster
pub struct VolumeSnapshot {
    record: VolumeSnapshotRecord,
    api: Arc<dyn BlockStorageApi>,
}

#[async_trait]
impl Resource for VolumeSnapshot {
    fn kind(&self) -> Kind {
        Kind::VolumeSnapshot
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

    async fn delete(&self) -> Result<(), DeleteError> {
        self.api
            .delete_snapshot(&self.record.id)
            .await
            .map_err(DeleteError::step("delete volume snapshot"))
    }
}

pub struct VolumeSnapshotLister {
    api: Arc<dyn BlockStorageApi>,
}

impl VolumeSnapshotLister {
    pub fn new(api: Arc<dyn BlockStorageApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for VolumeSnapshotLister {
    fn kind(&self) -> Kind {
        Kind::VolumeSnapshot
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_snapshots(marker),
            |record| {
                Some(Box::new(VolumeSnapshot {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}
