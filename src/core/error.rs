//! # Error Handling Module
//!
//! All fallible routing operations return [`RouterResult`]. Every variant
//! of [`RouterError`] is recoverable by the caller; nothing in this crate
//! is fatal to the process, and no operation leaves partial mutation behind
//! when it fails.

use thiserror::Error;

/// Main result type used throughout the routing core
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors surfaced by balancer construction and registry operations
///
/// The `#[error("...")]` attribute from `thiserror` implements `Display`
/// with the given message for each variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Balancer construction rejected its configuration
    /// (e.g. a zero point multiplier for consistent hashing)
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A registry operation referenced a service id that is not registered
    #[error("Service not found: {service_id}")]
    ServiceNotFound { service_id: String },

    /// A registry operation referenced a node id that is not registered
    #[error("Node not found: {node_id}")]
    NodeNotFound { node_id: String },

    /// `assign` was called on a balancer that currently holds zero nodes.
    /// The caller may retry once a node has been added. `service_id` is
    /// empty when the error is raised by a balancer used outside a
    /// registry; the registry stamps the real id on propagation.
    #[error("No available node for service: {service_id}")]
    NoAvailableNode { service_id: String },
}

impl RouterError {
    /// Create an invalid-configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a service-not-found error
    pub fn service_not_found(service_id: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_id: service_id.into(),
        }
    }

    /// Create a node-not-found error
    pub fn node_not_found(node_id: impl Into<String>) -> Self {
        Self::NodeNotFound {
            node_id: node_id.into(),
        }
    }

    /// Create a no-available-node error for the given service
    pub fn no_available_node(service_id: impl Into<String>) -> Self {
        Self::NoAvailableNode {
            service_id: service_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = RouterError::service_not_found("payments");
        assert_eq!(err.to_string(), "Service not found: payments");

        let err = RouterError::invalid_config("pointMultiplier must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: pointMultiplier must be positive"
        );
    }
}
