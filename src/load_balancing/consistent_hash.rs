//! # Consistent Hashing Balancer
//!
//! Routes by hashing the request id onto a ring of virtual points. Each
//! node owns `point_multiplier * weight` points, so heavier nodes cover
//! proportionally more of the keyspace, and removing a node remaps only
//! the keys its own points covered.
//!
//! The ring is a `BTreeMap` behind a `parking_lot::RwLock`: lookups take
//! the read lock and proceed concurrently, membership changes take the
//! write lock. Per-node point lists live in a `DashMap` keyed by node id,
//! so bookkeeping for one node never contends with another's.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::error::{RouterError, RouterResult};
use crate::core::types::{HashFn, Node, Request};
use crate::load_balancing::balancer::{AssignmentCounters, BalancerStats, LoadBalancer};

/// Default hash function: SHA-256, first 8 digest bytes as a big-endian u64
pub fn default_hasher() -> HashFn {
    Arc::new(|s: &str| {
        let mut hasher = Sha256::new();
        hasher.update(s.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[0..8]);
        u64::from_be_bytes(bytes)
    })
}

/// Hash-ring balancer with weighted virtual points
pub struct ConsistentHashBalancer {
    /// The ring: point hash -> owning node
    ring: RwLock<BTreeMap<u64, Arc<Node>>>,
    /// Points owned by each node id, so removal erases exactly those
    /// without rescanning the ring
    points: DashMap<String, Vec<u64>>,
    hash: HashFn,
    point_multiplier: u32,
    counters: AssignmentCounters,
}

impl ConsistentHashBalancer {
    /// Create a balancer with the given hash function and point multiplier.
    ///
    /// Fails with [`RouterError::InvalidConfig`] when `point_multiplier`
    /// is zero; a multiplier of 1 still yields `weight` points per node.
    pub fn new(hash: HashFn, point_multiplier: u32) -> RouterResult<Self> {
        if point_multiplier == 0 {
            return Err(RouterError::invalid_config(
                "point_multiplier must be positive",
            ));
        }
        Ok(Self {
            ring: RwLock::new(BTreeMap::new()),
            points: DashMap::new(),
            hash,
            point_multiplier,
            counters: AssignmentCounters::default(),
        })
    }

    /// Create a balancer using the default SHA-256 hasher
    pub fn with_default_hasher(point_multiplier: u32) -> RouterResult<Self> {
        Self::new(default_hasher(), point_multiplier)
    }

    /// Compute the virtual points for a node: one hash per
    /// `(replica index, weight index)` pair
    fn points_for(&self, node: &Node) -> Vec<u64> {
        let multiplier = u64::from(self.point_multiplier);
        let mut points = Vec::with_capacity(self.point_multiplier as usize * node.weight as usize);
        for i in 0..multiplier {
            for j in 0..u64::from(node.weight) {
                let point = (self.hash)(&format!("{}{}", i * multiplier + j, node.id));
                points.push(point);
            }
        }
        points
    }

    /// Erase a node's recorded points from the ring. Skips ring entries
    /// that a later insertion overwrote (point collisions are
    /// last-write-wins, and the colliding owner keeps the slot). Returns
    /// whether the node had any recorded points.
    fn erase_points(&self, node_id: &str) -> bool {
        let Some((_, points)) = self.points.remove(node_id) else {
            return false;
        };
        let mut ring = self.ring.write();
        for point in points {
            if ring.get(&point).map_or(false, |n| n.id == node_id) {
                ring.remove(&point);
            }
        }
        true
    }
}

impl LoadBalancer for ConsistentHashBalancer {
    /// Insert `point_multiplier * weight` virtual points for the node.
    ///
    /// Re-adding a present id erases the old points first (idempotent
    /// replace). If two nodes hash to the same point the later insertion
    /// wins that slot; with a 64-bit hash this is vanishingly rare and is
    /// deliberately not treated as an error.
    fn add_node(&self, node: Arc<Node>) {
        self.erase_points(&node.id);

        let points = self.points_for(&node);
        {
            let mut ring = self.ring.write();
            for point in &points {
                ring.insert(*point, Arc::clone(&node));
            }
        }
        debug!(
            node_id = %node.id,
            weight = node.weight,
            points = points.len(),
            algorithm = "consistent_hash",
            "Added node to hash ring"
        );
        self.points.insert(node.id.clone(), points);
    }

    /// Erase every point the node owns. Unknown ids are a no-op.
    fn remove_node(&self, node_id: &str) {
        if self.erase_points(node_id) {
            debug!(
                node_id = %node_id,
                algorithm = "consistent_hash",
                "Removed node from hash ring"
            );
        }
    }

    /// Hash the request id and walk clockwise to the owning point: the
    /// smallest ring key strictly greater than the request hash, wrapping
    /// to the ring's first point when none exists.
    fn assign(&self, request: &Request) -> RouterResult<Arc<Node>> {
        let key = (self.hash)(&request.id);
        let ring = self.ring.read();

        let successor = ring
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .or_else(|| ring.iter().next());

        match successor {
            Some((point, node)) => {
                self.counters.record_success();
                debug!(
                    request_id = %request.id,
                    key,
                    point,
                    node_id = %node.id,
                    algorithm = "consistent_hash",
                    "Assigned request to node"
                );
                Ok(Arc::clone(node))
            }
            None => {
                self.counters.record_failure();
                Err(RouterError::no_available_node(""))
            }
        }
    }

    fn algorithm_name(&self) -> &'static str {
        "consistent_hash"
    }

    fn node_count(&self) -> usize {
        self.points.len()
    }

    fn stats(&self) -> BalancerStats {
        self.counters.snapshot(self.algorithm_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hasher_is_deterministic() {
        let hash = default_hasher();
        assert_eq!(hash("req-42"), hash("req-42"));
        assert_ne!(hash("req-42"), hash("req-43"));
    }

    #[test]
    fn test_point_count_scales_with_weight() {
        let balancer = ConsistentHashBalancer::with_default_hasher(10).unwrap();
        balancer.add_node(Arc::new(Node::with_weight("a", 3, "10.0.0.1:80")));

        let points = balancer.points.get("a").unwrap();
        assert_eq!(points.len(), 30);
        assert_eq!(balancer.ring.read().len(), 30);
    }

    #[test]
    fn test_readd_replaces_points() {
        let balancer = ConsistentHashBalancer::with_default_hasher(10).unwrap();
        balancer.add_node(Arc::new(Node::with_weight("a", 1, "10.0.0.1:80")));
        balancer.add_node(Arc::new(Node::with_weight("a", 2, "10.0.0.1:80")));

        assert_eq!(balancer.node_count(), 1);
        assert_eq!(balancer.ring.read().len(), 20);
    }
}
