//! # Service Router Library
//!
//! A concurrent request-routing core. A [`Registry`] owns a set of named
//! services; each service binds its backend nodes to exactly one
//! [`LoadBalancer`] strategy, chosen at construction:
//!
//! 1. **Consistent Hashing**: a hash ring with weighted virtual points, so
//!    membership changes remap only the keys owned by the affected node
//! 2. **Weighted Round Robin**: deterministic rotation where a node of
//!    weight `w` receives `w` consecutive requests per cycle
//!
//! All operations are synchronous and in-memory; callers drive the registry
//! from as many threads as they like. Transport, health checking, and node
//! construction live outside this crate.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use service_router::{Node, Request, Registry, Service};
//! use service_router::load_balancing::WeightedRoundRobinBalancer;
//!
//! let registry = Registry::new();
//! let balancer = Arc::new(WeightedRoundRobinBalancer::new());
//! registry.register(Service::new("billing", vec!["charge".into()], balancer));
//! registry
//!     .add_node("billing", Node::with_weight("node-a", 2, "10.0.0.1:8080"))
//!     .unwrap();
//!
//! let request = Request::new("req-1", "billing", "charge");
//! let node = registry.get_handler(&request).unwrap();
//! assert_eq!(node.id, "node-a");
//! ```

/// Core building blocks: error types, configuration, and the value types
/// (nodes, requests, services) shared by every balancer
pub mod core;

/// Load balancing strategies and the trait they implement
pub mod load_balancing;

/// The registry that maps service ids to services and dispatches
/// routing operations to the right balancer
pub mod registry;

pub use crate::core::config::{BalancerConfig, BalancerStrategy};
pub use crate::core::error::{RouterError, RouterResult};
pub use crate::core::types::{HashFn, Node, Request, Service};
pub use crate::load_balancing::balancer::{BalancerStats, LoadBalancer};
pub use crate::registry::Registry;
