//! The resource kinds of an OpenStack tenant
//!
//! Each module pairs a [`Resource`](stackprune_cloud::Resource)
//! implementation with the [`KindLister`](stackprune_cloud::KindLister)
//! that produces it. Composite kinds (routers, volumes, shares, containers)
//! tear their children down inside `delete`.

pub mod application_credential;
pub mod container;
pub mod floating_ip;
pub mod image;
pub mod load_balancer;
pub mod network;
pub mod port;
pub mod router;
pub mod security_group;
pub mod server;
pub mod share;
pub mod trunk;
pub mod volume;
pub mod volume_snapshot;

pub use application_credential::{ApplicationCredential, ApplicationCredentialLister};
pub use container::{Container, ContainerLister, NetworkAffinity, NetworkBackedContainerLister};
pub use floating_ip::{FloatingIp, FloatingIpLister};
pub use image::{Image, ImageLister};
pub use load_balancer::{LoadBalancer, LoadBalancerLister};
pub use network::{Network, NetworkLister};
pub use port::{Port, PortLister};
pub use router::{Router, RouterLister};
pub use security_group::{SecurityGroup, SecurityGroupLister};
pub use server::{Server, ServerLister};
pub use share::{Share, ShareLister};
pub use trunk::{Trunk, TrunkLister};
pub use volume::{Volume, VolumeLister};
pub use volume_snapshot::{VolumeSnapshot, VolumeSnapshotLister};

/// Tag prefix installer-created Neutron and Glance resources carry
pub(crate) const OPENSHIFT_CLUSTER_TAG: [&str; 1] = ["openshiftClusterID="];
