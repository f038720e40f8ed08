//! In-memory resources for exercising filters, fan-in and the pipeline

use crate::error::{DeleteError, ServiceError};
use crate::resource::{BoxedResource, Kind, Resource};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct StubResource {
    pub kind: Kind,
    pub id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub cluster_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub fail_delete: bool,
    pub deletes: Arc<Mutex<Vec<String>>>,
}

impl StubResource {
    pub fn new(kind: Kind, id: &str, age: Duration) -> Self {
        Self {
            kind,
            id: id.to_string(),
            name: id.to_string(),
            timestamp: Utc::now() - age,
            cluster_id: None,
            tags: None,
            fail_delete: false,
            deletes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn in_cluster(mut self, cluster_id: &str) -> Self {
        self.cluster_id = Some(cluster_id.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn recording(mut self, deletes: &Arc<Mutex<Vec<String>>>) -> Self {
        self.deletes = Arc::clone(deletes);
        self
    }

    pub fn boxed(self) -> BoxedResource {
        Box::new(self)
    }
}

#[async_trait]
impl Resource for StubResource {
    fn kind(&self) -> Kind {
        self.kind
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn cluster_id(&self) -> Option<&str> {
        self.cluster_id.as_deref()
    }

    fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        self.deletes.lock().unwrap().push(self.id.clone());
        if self.fail_delete {
            return Err(DeleteError::step("delete stub")(ServiceError::Api {
                status: 500,
                message: "boom".to_string(),
            }));
        }
        Ok(())
    }
}
