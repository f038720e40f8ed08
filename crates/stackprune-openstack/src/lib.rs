//! OpenStack backend for stackprune
//!
//! Implements the fourteen resource kinds the pruner knows on top of the
//! OpenStack REST APIs:
//!
//! - Neutron: floating IPs, routers, trunks, ports, networks, security groups
//! - Octavia: load balancers (optional service)
//! - Nova: servers
//! - Cinder: volumes and volume snapshots
//! - Manila: shares (optional service)
//! - Keystone: application credentials
//! - Glance: installer images
//! - Swift: containers (optional service)
//!
//! # Example
//!
//! ```ignore
//! use stackprune_openstack::{EndpointOptions, Services, Session};
//! use stackprune_cloud::Kind;
//!
//! let session = Session::connect(&auth_url, &token, EndpointOptions::default()).await?;
//! let services = Services::discover(&session)?;
//! for lister in services.listers(&Kind::ALL)? {
//!     fan_in.spawn(lister);
//! }
//! ```

pub mod api;
pub mod client;
pub mod defaults;
pub mod error;
pub mod kinds;
pub mod model;
pub mod rest;
pub mod services;
pub mod timestamp;

#[cfg(test)]
mod testing;

pub use client::{EndpointOptions, Session};
pub use defaults::default_rules;
pub use error::{OpenStackError, Result};
pub use services::{Services, UnavailableLister};
