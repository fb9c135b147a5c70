//! # Service Registry
//!
//! The single entry point external callers drive. The registry owns every
//! registered [`Service`] and every [`Node`], and forwards membership and
//! assignment operations to the target service's balancer.
//!
//! Both top-level maps are `DashMap`s, so reads and writes on independent
//! keys never contend; per-balancer synchronization is each strategy's own
//! business. Failed operations leave no partial mutation behind: existence
//! checks happen before anything is inserted or removed.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::core::error::{RouterError, RouterResult};
use crate::core::types::{Node, Request, Service};

/// Orchestrator over services, nodes, and their balancers
pub struct Registry {
    /// service id -> service
    services: DashMap<String, Service>,
    /// node id -> node, across all services
    nodes: DashMap<String, Arc<Node>>,
    /// service id -> ids of the nodes registered to it, so deregistering
    /// a service can drop exactly its nodes from the global map
    membership: DashMap<String, Vec<String>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
            nodes: DashMap::new(),
            membership: DashMap::new(),
        }
    }

    /// Register a service, keyed by its id.
    ///
    /// Re-registering an existing id replaces the service; the previous
    /// registration's nodes are dropped from the global node map so they
    /// do not dangle without a balancer.
    pub fn register(&self, service: Service) {
        let service_id = service.id.clone();
        if self.services.contains_key(&service_id) {
            self.drop_membership(&service_id);
        }
        self.services.insert(service_id.clone(), service);
        debug!(service_id = %service_id, "Registered service");
    }

    /// Deregister a service and drop its nodes from the global node map.
    ///
    /// Fails with [`RouterError::ServiceNotFound`] for an unknown id.
    pub fn deregister(&self, service_id: &str) -> RouterResult<()> {
        if self.services.remove(service_id).is_none() {
            return Err(RouterError::service_not_found(service_id));
        }
        self.drop_membership(service_id);
        debug!(service_id = %service_id, "Deregistered service");
        Ok(())
    }

    /// Add a node to a service: record it in the global node map and
    /// forward it to the service's balancer.
    ///
    /// Fails with [`RouterError::ServiceNotFound`] before any mutation
    /// when the service id is unregistered.
    pub fn add_node(&self, service_id: &str, node: Node) -> RouterResult<()> {
        let service = self
            .services
            .get(service_id)
            .ok_or_else(|| RouterError::service_not_found(service_id))?;

        let node = Arc::new(node);
        self.nodes.insert(node.id.clone(), Arc::clone(&node));

        let mut members = self.membership.entry(service_id.to_string()).or_default();
        if !members.iter().any(|id| id == &node.id) {
            members.push(node.id.clone());
        }
        drop(members);

        debug!(
            service_id = %service_id,
            node_id = %node.id,
            weight = node.weight,
            "Added node to service"
        );
        service.balancer.add_node(node);
        Ok(())
    }

    /// Remove a node from a service: drop it from the global node map and
    /// forward the removal to the service's balancer.
    ///
    /// The service is checked first ([`RouterError::ServiceNotFound`]),
    /// then the node ([`RouterError::NodeNotFound`]); the two failures are
    /// reported distinctly and nothing is mutated before both checks pass.
    pub fn remove_node(&self, service_id: &str, node_id: &str) -> RouterResult<()> {
        let service = self
            .services
            .get(service_id)
            .ok_or_else(|| RouterError::service_not_found(service_id))?;

        let (_, node) = self
            .nodes
            .remove(node_id)
            .ok_or_else(|| RouterError::node_not_found(node_id))?;

        if let Some(mut members) = self.membership.get_mut(service_id) {
            members.retain(|id| id != node_id);
        }

        debug!(
            service_id = %service_id,
            node_id = %node.id,
            "Removed node from service"
        );
        service.balancer.remove_node(node_id);
        Ok(())
    }

    /// Resolve the request's target service and let its balancer pick a
    /// node.
    ///
    /// Fails with [`RouterError::ServiceNotFound`] for an unknown service
    /// id; a balancer-level [`RouterError::NoAvailableNode`] is propagated
    /// stamped with the request's service id.
    pub fn get_handler(&self, request: &Request) -> RouterResult<Arc<Node>> {
        let service = self
            .services
            .get(&request.service_id)
            .ok_or_else(|| RouterError::service_not_found(&request.service_id))?;

        service.balancer.assign(request).map_err(|err| match err {
            RouterError::NoAvailableNode { .. } => {
                RouterError::no_available_node(&request.service_id)
            }
            other => other,
        })
    }

    /// Look up a node by id
    pub fn get_node(&self, node_id: &str) -> Option<Arc<Node>> {
        self.nodes.get(node_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot of all registered services
    pub fn list_services(&self) -> Vec<Service> {
        self.services
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of registered services
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Number of registered nodes across all services
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drop a service's recorded nodes from the global node map
    fn drop_membership(&self, service_id: &str) {
        if let Some((_, members)) = self.membership.remove(service_id) {
            for node_id in members {
                self.nodes.remove(&node_id);
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
