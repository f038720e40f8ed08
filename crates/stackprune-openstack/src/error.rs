//! OpenStack binding error types

use stackprune_cloud::{Kind, ServiceError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("Invalid auth URL {url}: {reason}")]
    InvalidAuthUrl { url: String, reason: String },

    #[error("Token validation failed: {0}")]
    Authentication(String),

    #[error("{kind} requires the {service} service, which this cloud does not expose")]
    MissingService { kind: Kind, service: &'static str },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Cloud(#[from] stackprune_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, OpenStackError>;
