//! # Core Types Module
//!
//! Value types shared by the registry and every balancer. [`Node`] and
//! [`Request`] are immutable after construction and freely shared across
//! threads; mutation only ever happens through registry and balancer
//! operations, never by reaching into these values.
//!
//! Node identity is its `id` string, and maps throughout the crate are
//! keyed by that string directly, so no custom equality is needed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::load_balancing::balancer::LoadBalancer;

/// Hash function used by the consistent hashing balancer.
///
/// Supplied by the caller; the only requirement is determinism (same input,
/// same output) so the ring stays stable across calls. See
/// [`default_hasher`](crate::load_balancing::consistent_hash::default_hasher)
/// for the SHA-256-based default.
pub type HashFn = Arc<dyn Fn(&str) -> u64 + Send + Sync>;

/// A backend endpoint that requests can be routed to
///
/// Weight controls the node's share of traffic: proportional ring coverage
/// under consistent hashing, consecutive-request quota under round robin.
/// Weight is fixed for the node's lifetime; changing a node's share means
/// removing it and re-adding it with a new weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier; this is the node's identity everywhere
    pub id: String,

    /// Routing weight (>= 1)
    pub weight: u32,

    /// Endpoint address, opaque to the routing core
    pub address: String,
}

impl Node {
    /// Create a node with the default weight of 1
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self::with_weight(id, 1, address)
    }

    /// Create a node with an explicit weight. A weight of 0 is clamped to 1
    /// so the node is never unreachable by construction.
    pub fn with_weight(id: impl Into<String>, weight: u32, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            weight: weight.max(1),
            address: address.into(),
        }
    }
}

/// A single request to be routed
///
/// Ephemeral: constructed per dispatch and never retained by the core.
/// `id` is the routing key under consistent hashing, so callers wanting
/// session affinity should keep it stable across related requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Unique request identifier
    pub id: String,

    /// Id of the target service
    pub service_id: String,

    /// Method being invoked on the service
    pub method: String,
}

impl Request {
    /// Create a new request
    pub fn new(
        id: impl Into<String>,
        service_id: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service_id: service_id.into(),
            method: method.into(),
        }
    }
}

/// A logical service: an id, the methods it supports, and the balancer
/// that distributes its traffic
///
/// The balancer is chosen when the service is constructed and never
/// swapped for the service's lifetime. The method list is informational;
/// routing does not enforce it.
#[derive(Clone, Serialize)]
pub struct Service {
    /// Unique service identifier
    pub id: String,

    /// Methods the service supports
    pub methods: Vec<String>,

    /// The balancer owning this service's node membership
    #[serde(skip)]
    pub balancer: Arc<dyn LoadBalancer>,
}

impl Service {
    /// Create a new service bound to the given balancer
    pub fn new(
        id: impl Into<String>,
        methods: Vec<String>,
        balancer: Arc<dyn LoadBalancer>,
    ) -> Self {
        Self {
            id: id.into(),
            methods,
            balancer,
        }
    }

    /// Whether the service advertises the given method
    pub fn supports_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("id", &self.id)
            .field("methods", &self.methods)
            .field("algorithm", &self.balancer.algorithm_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_weight_clamped_to_one() {
        let node = Node::with_weight("n1", 0, "127.0.0.1:9000");
        assert_eq!(node.weight, 1);
    }

    #[test]
    fn test_default_weight_is_one() {
        let node = Node::new("n1", "127.0.0.1:9000");
        assert_eq!(node.weight, 1);
    }
}
