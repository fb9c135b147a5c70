//! # Configuration Module
//!
//! Declarative balancer configuration, deserializable from JSON/YAML with
//! serde. [`BalancerConfig::build`] validates the configuration and
//! constructs the matching [`LoadBalancer`] implementation, so callers that
//! load routing config from files never touch strategy constructors
//! directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{RouterError, RouterResult};
use crate::core::types::HashFn;
use crate::load_balancing::balancer::LoadBalancer;
use crate::load_balancing::consistent_hash::{default_hasher, ConsistentHashBalancer};
use crate::load_balancing::round_robin::WeightedRoundRobinBalancer;

/// Default number of virtual points per unit of node weight
pub const DEFAULT_POINT_MULTIPLIER: u32 = 160;

/// Which routing strategy a service uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancerStrategy {
    /// Hash-ring routing with weighted virtual points
    ConsistentHash,
    /// Deterministic weighted rotation
    RoundRobin,
}

/// Balancer configuration for one service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancerConfig {
    /// Selected strategy
    pub strategy: BalancerStrategy,

    /// Virtual points per unit of weight (consistent hashing only).
    /// Defaults to [`DEFAULT_POINT_MULTIPLIER`] when absent; a value of
    /// zero is rejected at build time.
    #[serde(default)]
    pub point_multiplier: Option<u32>,
}

impl BalancerConfig {
    /// Shorthand for a round robin configuration
    pub fn round_robin() -> Self {
        Self {
            strategy: BalancerStrategy::RoundRobin,
            point_multiplier: None,
        }
    }

    /// Shorthand for a consistent hashing configuration
    pub fn consistent_hash(point_multiplier: u32) -> Self {
        Self {
            strategy: BalancerStrategy::ConsistentHash,
            point_multiplier: Some(point_multiplier),
        }
    }

    /// Build the configured balancer, hashing ring points with the
    /// crate's default SHA-256 hasher
    pub fn build(&self) -> RouterResult<Arc<dyn LoadBalancer>> {
        self.build_with_hasher(default_hasher())
    }

    /// Build the configured balancer with a caller-supplied hash function
    ///
    /// Fails with [`RouterError::InvalidConfig`] when the strategy is
    /// consistent hashing and the point multiplier is zero. The hasher is
    /// ignored by round robin.
    pub fn build_with_hasher(&self, hash: HashFn) -> RouterResult<Arc<dyn LoadBalancer>> {
        match self.strategy {
            BalancerStrategy::RoundRobin => Ok(Arc::new(WeightedRoundRobinBalancer::new())),
            BalancerStrategy::ConsistentHash => {
                let multiplier = self.point_multiplier.unwrap_or(DEFAULT_POINT_MULTIPLIER);
                if multiplier == 0 {
                    return Err(RouterError::invalid_config(
                        "point_multiplier must be positive for consistent_hash",
                    ));
                }
                Ok(Arc::new(ConsistentHashBalancer::new(hash, multiplier)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_round_robin() {
        let balancer = BalancerConfig::round_robin().build().unwrap();
        assert_eq!(balancer.algorithm_name(), "weighted_round_robin");
    }

    #[test]
    fn test_build_consistent_hash_defaults_multiplier() {
        let config = BalancerConfig {
            strategy: BalancerStrategy::ConsistentHash,
            point_multiplier: None,
        };
        let balancer = config.build().unwrap();
        assert_eq!(balancer.algorithm_name(), "consistent_hash");
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        let err = BalancerConfig::consistent_hash(0).build().unwrap_err();
        assert!(matches!(err, RouterError::InvalidConfig { .. }));
    }
}
