//! Core trait implemented by every load balancing strategy, plus the
//! statistics snapshot both strategies expose.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::error::RouterResult;
use crate::core::types::{Node, Request};

/// Capability contract for a routing strategy
///
/// Implementations must be safe to drive from many threads at once:
/// `assign` may race with `add_node`/`remove_node` and with other `assign`
/// calls. How much those calls contend is up to the strategy — the ring
/// balancer lets lookups proceed concurrently, round robin serializes
/// everything behind one lock because its rotation state must advance
/// atomically with assignment.
pub trait LoadBalancer: Send + Sync {
    /// Register a node for routing.
    ///
    /// Re-adding an id that is already present is an idempotent replace:
    /// the previous registration is discarded and the new node takes its
    /// place.
    fn add_node(&self, node: Arc<Node>);

    /// Unregister a node by id. Removing an id that is not currently
    /// registered is a no-op.
    fn remove_node(&self, node_id: &str);

    /// Select exactly one currently-registered node for the request.
    ///
    /// Fails with [`RouterError::NoAvailableNode`](crate::RouterError) when
    /// the balancer holds zero nodes.
    fn assign(&self, request: &Request) -> RouterResult<Arc<Node>>;

    /// Strategy name for logging and stats
    fn algorithm_name(&self) -> &'static str;

    /// Number of nodes currently registered
    fn node_count(&self) -> usize;

    /// Snapshot of assignment counters
    fn stats(&self) -> BalancerStats;
}

impl std::fmt::Debug for dyn LoadBalancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalancer")
            .field("algorithm", &self.algorithm_name())
            .finish()
    }
}

/// Point-in-time balancer statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct BalancerStats {
    pub algorithm: String,
    pub total_assignments: u64,
    pub failed_assignments: u64,
}

/// Atomic assignment counters maintained by each strategy
#[derive(Debug, Default)]
pub(crate) struct AssignmentCounters {
    total: AtomicU64,
    failed: AtomicU64,
}

impl AssignmentCounters {
    pub(crate) fn record_success(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, algorithm: &'static str) -> BalancerStats {
        BalancerStats {
            algorithm: algorithm.to_string(),
            total_assignments: self.total.load(Ordering::Relaxed),
            failed_assignments: self.failed.load(Ordering::Relaxed),
        }
    }
}
