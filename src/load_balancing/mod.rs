//! # Load Balancing Module
//!
//! Strategies for distributing a service's requests across its nodes.
//! Both implement the [`LoadBalancer`] trait:
//!
//! 1. [`ConsistentHashBalancer`]: hash-ring routing with weighted virtual
//!    points, minimal key movement on membership change
//! 2. [`WeightedRoundRobinBalancer`]: deterministic rotation, `weight`
//!    consecutive requests per node per cycle

pub mod balancer;
pub mod consistent_hash;
pub mod round_robin;

pub use balancer::{BalancerStats, LoadBalancer};
pub use consistent_hash::ConsistentHashBalancer;
pub use round_robin::WeightedRoundRobinBalancer;
