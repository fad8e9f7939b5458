//! Heartbeat-based node discovery.
//!
//! Each known peer carries a last-heartbeat timestamp and a liveness
//! flag, heartbeats refresh it, and a periodic sweep marks stale peers
//! dead. This is status-reporting only: discovery never adds or removes
//! nodes on the hash ring; ring membership is fixed at seed time by
//! `distcache-server::AppState`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// A peer as tracked by discovery: its address and whether it has been
/// heard from recently.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    /// The node's identifier on the hash ring.
    pub node_id: String,
    /// Host or address string used to reach the peer.
    pub address: String,
    /// TCP port of the peer's client listener.
    pub port: u16,
    /// When this node's last heartbeat was observed.
    pub last_heartbeat: Instant,
    /// Whether the node is considered alive.
    pub is_alive: bool,
}

/// Tracks known peers and their liveness via periodic heartbeats.
pub struct Discovery {
    node_id: String,
    heartbeat_interval: Duration,
    node_timeout: Duration,
    known_nodes: RwLock<HashMap<String, NodeInfo>>,
}

impl Discovery {
    /// Creates discovery state for `node_id`, registering it as
    /// immediately alive.
    #[must_use]
    pub fn new(node_id: String, heartbeat_interval: Duration, node_timeout: Duration) -> Self {
        let mut known_nodes = HashMap::new();
        known_nodes.insert(
            node_id.clone(),
            NodeInfo {
                node_id: node_id.clone(),
                address: "localhost".to_string(),
                port: 0,
                last_heartbeat: Instant::now(),
                is_alive: true,
            },
        );
        Self {
            node_id,
            heartbeat_interval,
            node_timeout,
            known_nodes: RwLock::new(known_nodes),
        }
    }

    /// How often heartbeats should be broadcast.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Registers a seed node to track from startup, before any
    /// heartbeat from it has been observed.
    pub fn add_seed_node(&self, node_id: String) {
        let mut nodes = self.known_nodes.write();
        nodes.insert(
            node_id.clone(),
            NodeInfo {
                node_id: node_id.clone(),
                address: node_id,
                port: 0,
                last_heartbeat: Instant::now(),
                is_alive: true,
            },
        );
    }

    /// Refreshes this node's own heartbeat timestamp and sweeps for
    /// peers that have gone quiet.
    pub fn broadcast_heartbeat(&self) {
        let mut nodes = self.known_nodes.write();
        if let Some(info) = nodes.get_mut(&self.node_id) {
            info.last_heartbeat = Instant::now();
        }
        Self::cleanup_dead_nodes(&mut nodes, &self.node_id, self.node_timeout);
    }

    /// Records a heartbeat received from `node_id`, marking it alive.
    pub fn record_heartbeat(&self, node_id: &str) {
        let mut nodes = self.known_nodes.write();
        if let Some(info) = nodes.get_mut(node_id) {
            info.last_heartbeat = Instant::now();
            info.is_alive = true;
        }
    }

    fn cleanup_dead_nodes(nodes: &mut HashMap<String, NodeInfo>, self_id: &str, timeout: Duration) {
        let now = Instant::now();
        for (id, info) in nodes.iter_mut() {
            if id != self_id && now.duration_since(info.last_heartbeat) > timeout {
                info.is_alive = false;
            }
        }
    }

    /// Returns every peer currently considered alive.
    #[must_use]
    pub fn get_alive_nodes(&self) -> Vec<NodeInfo> {
        self.known_nodes
            .read()
            .values()
            .filter(|n| n.is_alive)
            .cloned()
            .collect()
    }

    /// Whether `node_id` is known and currently considered alive.
    #[must_use]
    pub fn is_node_alive(&self, node_id: &str) -> bool {
        self.known_nodes
            .read()
            .get(node_id)
            .is_some_and(|n| n.is_alive)
    }
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
