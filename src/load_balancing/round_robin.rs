//! # Weighted Round Robin Balancer
//!
//! Rotates through the registered nodes in insertion order, handing each
//! node `weight` consecutive requests before moving on. O(1) per
//! assignment, no randomness; the cost is bursty locality, since a
//! weight-`w` node receives its `w` requests back to back rather than
//! interleaved.
//!
//! All three operations share one `parking_lot::Mutex`: the rotation
//! cursor and the in-quota counter must be read and advanced atomically
//! with the assignment itself, so no finer-grained locking is safe here.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::error::{RouterError, RouterResult};
use crate::core::types::{Node, Request};
use crate::load_balancing::balancer::{AssignmentCounters, BalancerStats, LoadBalancer};

/// Rotation state, only ever touched with the mutex held
struct Rotation {
    nodes: Vec<Arc<Node>>,
    /// Index of the node currently receiving traffic. Kept signed so
    /// removal can decrement it below zero; normalized with `rem_euclid`
    /// on the next assignment.
    assign_to: isize,
    /// Requests the current node has received in its current turn
    current_assignments: u32,
}

/// Deterministic weighted-rotation balancer
pub struct WeightedRoundRobinBalancer {
    rotation: Mutex<Rotation>,
    counters: AssignmentCounters,
}

impl WeightedRoundRobinBalancer {
    /// Create an empty balancer
    pub fn new() -> Self {
        Self {
            rotation: Mutex::new(Rotation {
                nodes: Vec::new(),
                assign_to: 0,
                current_assignments: 0,
            }),
            counters: AssignmentCounters::default(),
        }
    }
}

impl Default for WeightedRoundRobinBalancer {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalancer for WeightedRoundRobinBalancer {
    /// Append the node to the rotation. Re-adding a present id replaces
    /// that entry in place without disturbing the rotation order.
    fn add_node(&self, node: Arc<Node>) {
        let mut rotation = self.rotation.lock();
        if let Some(existing) = rotation.nodes.iter_mut().find(|n| n.id == node.id) {
            *existing = node;
            return;
        }
        debug!(
            node_id = %node.id,
            weight = node.weight,
            algorithm = "weighted_round_robin",
            "Added node to rotation"
        );
        rotation.nodes.push(node);
    }

    /// Remove the node from the rotation. Removal restarts the current
    /// node's quota and steps the cursor back one slot, so the node that
    /// shifted into the removed position is neither skipped nor served
    /// twice; exact fairness across a removal event is deliberately not
    /// preserved. Unknown ids are a no-op.
    fn remove_node(&self, node_id: &str) {
        let mut rotation = self.rotation.lock();
        let Some(index) = rotation.nodes.iter().position(|n| n.id == node_id) else {
            return;
        };
        rotation.nodes.remove(index);
        rotation.assign_to -= 1;
        rotation.current_assignments = 0;
        debug!(
            node_id = %node_id,
            remaining = rotation.nodes.len(),
            algorithm = "weighted_round_robin",
            "Removed node from rotation"
        );
    }

    /// Serve the node under the cursor and advance the rotation once the
    /// node has received `weight` requests in this turn.
    fn assign(&self, request: &Request) -> RouterResult<Arc<Node>> {
        let mut rotation = self.rotation.lock();
        if rotation.nodes.is_empty() {
            self.counters.record_failure();
            return Err(RouterError::no_available_node(""));
        }

        let len = rotation.nodes.len() as isize;
        rotation.assign_to = rotation.assign_to.rem_euclid(len);

        let current = Arc::clone(&rotation.nodes[rotation.assign_to as usize]);
        rotation.current_assignments += 1;
        // >= rather than ==: an in-place replace can shrink the weight
        // below an in-flight quota counter
        if rotation.current_assignments >= current.weight {
            rotation.assign_to += 1;
            rotation.current_assignments = 0;
        }

        self.counters.record_success();
        debug!(
            request_id = %request.id,
            node_id = %current.id,
            algorithm = "weighted_round_robin",
            "Assigned request to node"
        );
        Ok(current)
    }

    fn algorithm_name(&self) -> &'static str {
        "weighted_round_robin"
    }

    fn node_count(&self) -> usize {
        self.rotation.lock().nodes.len()
    }

    fn stats(&self) -> BalancerStats {
        self.counters.snapshot(self.algorithm_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> Request {
        Request::new(id, "svc", "call")
    }

    #[test]
    fn test_single_node_always_selected() {
        let balancer = WeightedRoundRobinBalancer::new();
        balancer.add_node(Arc::new(Node::new("a", "10.0.0.1:80")));

        for i in 0..5 {
            let node = balancer.assign(&request(&format!("r{i}"))).unwrap();
            assert_eq!(node.id, "a");
        }
    }

    #[test]
    fn test_readd_replaces_in_place() {
        let balancer = WeightedRoundRobinBalancer::new();
        balancer.add_node(Arc::new(Node::with_weight("a", 1, "10.0.0.1:80")));
        balancer.add_node(Arc::new(Node::with_weight("a", 3, "10.0.0.1:81")));

        assert_eq!(balancer.node_count(), 1);
        let node = balancer.assign(&request("r0")).unwrap();
        assert_eq!(node.weight, 3);
        assert_eq!(node.address, "10.0.0.1:81");
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let balancer = WeightedRoundRobinBalancer::new();
        balancer.add_node(Arc::new(Node::new("a", "10.0.0.1:80")));
        balancer.remove_node("ghost");

        assert_eq!(balancer.node_count(), 1);
        assert_eq!(balancer.assign(&request("r0")).unwrap().id, "a");
    }
}
