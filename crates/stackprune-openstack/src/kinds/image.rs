use super::OPENSHIFT_CLUSTER_TAG;
use crate::api::ImageApi;
use crate::model::ImageRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{
    BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, cluster_from_tags, paginate,
};
use std::sync::Arc;

pub struct Image {
    record: ImageRecord,
    api: Arc<dyn ImageApi>,
}

#[async_trait]
impl Resource for Image {
    fn kind(&self) -> Kind {
        Kind::Image
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
        cluster_from_tags(&self.record.tags, &OPENSHIFT_CLUSTER_TAG)
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.record.tags)
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        self.api
            .delete_image(&self.record.id)
            .await
            .map_err(DeleteError::step("delete image"))
    }
}

pub struct ImageLister {
    api: Arc<dyn ImageApi>,
}

impl ImageLister {
    pub fn new(api: Arc<dyn ImageApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for ImageLister {
    fn kind(&self) -> Kind {
        Kind::Image
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_images(marker),
            |record| {
                Some(Box::new(Image {
                    record,
                    api: Arc::clone(&self.api),
                }) as BoxedResource)
            },
        )
        .await
    }
}
