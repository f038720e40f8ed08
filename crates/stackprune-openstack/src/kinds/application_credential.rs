use crate::api::IdentityApi;
use crate::model::AppCredRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stackprune_cloud::{BoxedResource, DeleteError, Kind, KindLister, ListError, Resource, ResourceSink, paginate};
use std::sync::Arc;

const CLUSTER_DESCRIPTION_PREFIX: &str = "PROW_CLUSTER_NAME=";

/// A Keystone application credential that expires
///
/// Staleness is measured from the expiry rather than the creation time:
/// a credential becomes eligible once it has been expired for the TTL.
pub struct ApplicationCredential {
    record: AppCredRecord,
    expires_at: DateTime<Utc>,
    api: Arc<dyn IdentityApi>,
}

impl ApplicationCredential {
    /// Credentials without an expiry are never listed
    pub fn perishable(record: AppCredRecord, api: Arc<dyn IdentityApi>) -> Option<Self> {
        let expires_at = record.expires_at?;
        Some(Self {
            record,
            expires_at,
            api,
        })
    }
}

#[async_trait]
impl Resource for ApplicationCredential {
    fn kind(&self) -> Kind {
        Kind::ApplicationCredential
    }

    fn id(&self) -> &str {
        &self.record.id
    }

    fn name(&self) -> &str {
        &self.record.name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// CI writes `PROW_CLUSTER_NAME=<name>` as one word of the description
    fn cluster_id(&self) -> Option<&str> {
        self.record
            .description
            .as_deref()?
            .split(' ')
            .find_map(|word| word.strip_prefix(CLUSTER_DESCRIPTION_PREFIX))
            .filter(|v| !v.is_empty())
    }

    async fn delete(&self) -> Result<(), DeleteError> {
        self.api
            .delete_application_credential(&self.record.id)
            .await
            .map_err(DeleteError::step("delete application credential"))
    }
}

pub struct ApplicationCredentialLister {
    api: Arc<dyn IdentityApi>,
}

impl ApplicationCredentialLister {
    pub fn new(api: Arc<dyn IdentityApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl KindLister for ApplicationCredentialLister {
    fn kind(&self) -> Kind {
        Kind::ApplicationCredential
    }

    async fn list(&self, sink: &ResourceSink) -> Result<(), ListError> {
        paginate(
            sink,
            |marker| self.api.list_application_credentials(marker),
            |record| {
                ApplicationCredential::perishable(record, Arc::clone(&self.api))
                    .map(|c| Box::new(c) as BoxedResource)
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCloud, drain};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_only_perishable_credentials_are_listed() {
        let expiry = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let fake = Arc::new(FakeCloud::new().with(|s| {
            s.app_creds = vec![
                AppCredRecord {
                    id: "ac1".to_string(),
                    name: "forever".to_string(),
                    ..Default::default()
                },
                AppCredRecord {
                    id: "ac2".to_string(),
                    name: "ci-job".to_string(),
                    description: Some("created by PROW_CLUSTER_NAME=build05 for e2e".to_string()),
                    expires_at: Some(expiry),
                },
            ];
        }));

        let (outcome, creds) = drain(&ApplicationCredentialLister::new(fake)).await;
        outcome.unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].id(), "ac2");
        assert_eq!(creds[0].timestamp(), expiry);
        assert_eq!(creds[0].cluster_id(), Some("build05"));
        assert_eq!(creds[0].kind().label(), "application credential");
    }
}
