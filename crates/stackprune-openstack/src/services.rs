//! Service discovery and lister wiring
//!
//! Network, compute, block storage, identity and image are expected in every
//! cloud; a selected kind that needs one of them and does not find it is a
//! configuration error. Load balancer, object store and shared file system
//! are optional: without them their kind lists nothing.

use crate::api::*;
use crate::client::{ServiceClient, Session};
use crate::error::{OpenStackError, Result};
use crate::kinds::*;
use crate::rest::*;
use async_trait::async_trait;
use stackprune_cloud::{Kind, KindLister, ListError, ResourceSink, ServiceError};
use std::sync::Arc;

const NETWORK: &[&str] = &["network"];
const COMPUTE: &[&str] = &["compute"];
const BLOCK_STORAGE: &[&str] = &["block-storage", "volumev3", "volume"];
const IDENTITY: &[&str] = &["identity"];
const IMAGE: &[&str] = &["image"];
const LOAD_BALANCER: &[&str] = &["load-balancer"];
const OBJECT_STORE: &[&str] = &["object-store"];
const SHARED_FILE_SYSTEM: &[&str] = &["sharev2", "shared-file-system"];

/// Service handles of one cloud; `None` where the catalog has no endpoint
#[derive(Default, Clone)]
pub struct Services {
    pub network: Option<Arc<dyn NetworkApi>>,
    pub compute: Option<Arc<dyn ComputeApi>>,
    pub block_storage: Option<Arc<dyn BlockStorageApi>>,
    pub identity: Option<Arc<dyn IdentityApi>>,
    pub image: Option<Arc<dyn ImageApi>>,
    pub load_balancer: Option<Arc<dyn LoadBalancerApi>>,
    pub object_store: Option<Arc<dyn ObjectStoreApi>>,
    pub share: Option<Arc<dyn ShareApi>>,
}

fn lookup(session: &Session, service_types: &[&str]) -> Result<Option<ServiceClient>> {
    match session.service(service_types) {
        Ok(client) => Ok(Some(client)),
        Err(e) if e.is_endpoint_not_found() => {
            tracing::debug!("No {} endpoint in the service catalog", service_types[0]);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn require<T: ?Sized>(handle: &Option<Arc<T>>, kind: Kind, service: &'static str) -> Result<Arc<T>> {
    handle
        .clone()
        .ok_or(OpenStackError::MissingService { kind, service })
}

impl Services {
    /// Resolve every service the pruner knows from the session's catalog
    pub fn discover(session: &Session) -> Result<Self> {
        Ok(Self {
            network: lookup(session, NETWORK)?
                .map(|c| Arc::new(RestNetwork::new(c)) as Arc<dyn NetworkApi>),
            compute: lookup(session, COMPUTE)?
                .map(|c| Arc::new(RestCompute::new(c)) as Arc<dyn ComputeApi>),
            block_storage: lookup(session, BLOCK_STORAGE)?
                .map(|c| Arc::new(RestBlockStorage::new(c)) as Arc<dyn BlockStorageApi>),
            identity: lookup(session, IDENTITY)?.map(|c| {
                Arc::new(RestIdentity::new(c, session.user_id())) as Arc<dyn IdentityApi>
            }),
            image: lookup(session, IMAGE)?.map(|c| Arc::new(RestImage::new(c)) as Arc<dyn ImageApi>),
            load_balancer: lookup(session, LOAD_BALANCER)?
                .map(|c| Arc::new(RestLoadBalancer::new(c)) as Arc<dyn LoadBalancerApi>),
            object_store: lookup(session, OBJECT_STORE)?
                .map(|c| Arc::new(RestObjectStore::new(c)) as Arc<dyn ObjectStoreApi>),
            share: lookup(session, SHARED_FILE_SYSTEM)?
                .map(|c| Arc::new(RestShare::new(c)) as Arc<dyn ShareApi>),
        })
    }

    /// One lister per kind, in the order given
    pub fn listers(&self, kinds: &[Kind]) -> Result<Vec<Box<dyn KindLister>>> {
        kinds.iter().map(|kind| self.lister(*kind)).collect()
    }

    fn lister(&self, kind: Kind) -> Result<Box<dyn KindLister>> {
        let lister: Box<dyn KindLister> = match kind {
            Kind::FloatingIp => Box::new(FloatingIpLister::new(require(&self.network, kind, "network")?)),
            Kind::Router => Box::new(RouterLister::new(require(&self.network, kind, "network")?)),
            Kind::Trunk => Box::new(TrunkLister::new(require(&self.network, kind, "network")?)),
            Kind::Port => Box::new(PortLister::new(require(&self.network, kind, "network")?)),
            Kind::Network => Box::new(NetworkLister::new(require(&self.network, kind, "network")?)),
            Kind::SecurityGroup => {
                Box::new(SecurityGroupLister::new(require(&self.network, kind, "network")?))
            }
            Kind::Server => Box::new(ServerLister::new(require(&self.compute, kind, "compute")?)),
            Kind::Volume => Box::new(VolumeLister::new(require(
                &self.block_storage,
                kind,
                "block-storage",
            )?)),
            Kind::VolumeSnapshot => Box::new(VolumeSnapshotLister::new(require(
                &self.block_storage,
                kind,
                "block-storage",
            )?)),
            Kind::ApplicationCredential => Box::new(ApplicationCredentialLister::new(require(
                &self.identity,
                kind,
                "identity",
            )?)),
            Kind::Image => Box::new(ImageLister::new(require(&self.image, kind, "image")?)),
            Kind::LoadBalancer => match &self.load_balancer {
                Some(api) => Box::new(LoadBalancerLister::new(Arc::clone(api))),
                None => Box::new(UnavailableLister::new(kind, "load-balancer")),
            },
            Kind::Share => match &self.share {
                Some(api) => Box::new(ShareLister::new(Arc::clone(api))),
                None => Box::new(UnavailableLister::new(kind, "sharev2")),
            },
            Kind::Container => match &self.object_store {
                Some(store) => Box::new(NetworkBackedContainerLister::new(
                    Arc::clone(store),
                    require(&self.network, kind, "network")?,
                )),
                None => Box::new(UnavailableLister::new(kind, "object-store")),
            },
        };
        Ok(lister)
    }
}

/// Stand-in for a kind whose optional service is absent from this cloud
pub struct UnavailableLister {
    kind: Kind,
    service: &'static str,
}

impl UnavailableLister {
    pub fn new(kind: Kind, service: &'static str) -> Self {
        Self { kind, service }
    }
}

#[async_trait]
impl KindLister for UnavailableLister {
    fn kind(&self) -> Kind {
        self.kind
    }

    async fn list(&self, _sink: &ResourceSink) -> std::result::Result<(), ListError> {
        Err(ServiceError::EndpointNotFound(self.service.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCloud, drain};

    fn core_services(fake: &Arc<FakeCloud>) -> Services {
        let network: Arc<dyn NetworkApi> = fake.clone();
        let compute: Arc<dyn ComputeApi> = fake.clone();
        let block_storage: Arc<dyn BlockStorageApi> = fake.clone();
        let identity: Arc<dyn IdentityApi> = fake.clone();
        let image: Arc<dyn ImageApi> = fake.clone();
        Services {
            network: Some(network),
            compute: Some(compute),
            block_storage: Some(block_storage),
            identity: Some(identity),
            image: Some(image),
            ..Default::default()
        }
    }

    #[test]
    fn test_every_kind_gets_a_lister() {
        let fake = Arc::new(FakeCloud::new());
        let listers = core_services(&fake).listers(&Kind::ALL).unwrap();
        let kinds: Vec<Kind> = listers.iter().map(|l| l.kind()).collect();
        assert_eq!(kinds, Kind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_missing_optional_service_lists_nothing() {
        let fake = Arc::new(FakeCloud::new());
        let listers = core_services(&fake).listers(&[Kind::Share]).unwrap();

        let (outcome, resources) = drain(listers[0].as_ref()).await;
        assert!(resources.is_empty());
        assert!(matches!(
            outcome,
            Err(ListError::Service(ServiceError::EndpointNotFound(ref s))) if s == "sharev2"
        ));
    }

    #[test]
    fn test_missing_required_service_is_an_error() {
        let fake = Arc::new(FakeCloud::new());
        let services = Services {
            compute: None,
            ..core_services(&fake)
        };
        let err = services.listers(&[Kind::Port, Kind::Server]).err().unwrap();
        assert!(matches!(
            err,
            OpenStackError::MissingService {
                kind: Kind::Server,
                service: "compute"
            }
        ));

        // Kinds that do not need compute are still fine.
        assert!(services.listers(&[Kind::Port, Kind::Volume]).is_ok());
    }
}
