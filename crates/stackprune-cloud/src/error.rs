//! Error types shared by every kind of resource

use thiserror::Error;

/// Errors raised while configuring a run
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Unknown resource type: {0}")]
    UnknownKind(String),

    #[error("Invalid ignore entry for {kind}: {reason}")]
    InvalidIgnoreEntry { kind: String, reason: String },

    #[error("Invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Failure reported by a cloud service collaborator
///
/// The classification is what the pipeline cares about: `NotFound` may mean
/// "already gone", `EndpointNotFound` means the service does not exist in
/// this cloud at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No endpoint for service type {0}")]
    EndpointNotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    pub fn is_endpoint_not_found(&self) -> bool {
        matches!(self, ServiceError::EndpointNotFound(_))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Failure of one step of a (possibly cascading) delete
#[derive(Error, Debug, Clone)]
pub enum DeleteError {
    #[error("{step}: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("bulk delete of {container} left {} object(s): {}", .failures.len(), format_failures(.failures))]
    BulkDelete {
        container: String,
        failures: Vec<(String, String)>,
    },
}

impl DeleteError {
    /// Wrap a service error with the name of the step that raised it.
    ///
    /// Meant for `map_err(DeleteError::step("delete router"))`.
    pub fn step(step: &'static str) -> impl FnOnce(ServiceError) -> DeleteError {
        move |source| DeleteError::Step { step, source }
    }
}

fn format_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(object, reason)| format!("{object} ({reason})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a kind lister stopped
#[derive(Error, Debug)]
pub enum ListError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("consumer went away")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_display() {
        let err = DeleteError::step("remove router interface")(ServiceError::Api {
            status: 409,
            message: "port in use".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "remove router interface: API error (409): port in use"
        );
    }

    #[test]
    fn test_bulk_delete_display() {
        let err = DeleteError::BulkDelete {
            container: "bucket".to_string(),
            failures: vec![
                ("a.txt".to_string(), "409 Conflict".to_string()),
                ("b.txt".to_string(), "500 Internal Error".to_string()),
            ],
        };
        assert_eq!(
            err.to_string(),
            "bulk delete of bucket left 2 object(s): a.txt (409 Conflict), b.txt (500 Internal Error)"
        );
    }

    #[test]
    fn test_classification() {
        assert!(ServiceError::NotFound("x".into()).is_not_found());
        assert!(ServiceError::EndpointNotFound("image".into()).is_endpoint_not_found());
        assert!(!ServiceError::Forbidden("x".into()).is_not_found());
    }
}
