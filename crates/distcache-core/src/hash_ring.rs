//! Consistent-hash ring for key-to-node placement.
//!
//! Maps keys to nodes with minimal re-mapping under membership change. Each
//! physical node is represented by a fixed number of virtual positions on a
//! 32-bit ring, which smooths out load imbalance without the cost of a
//! balanced-tree-per-key scheme.

use std::collections::BTreeMap;

use parking_lot::RwLock;

/// FNV-1a offset basis. Part of the wire contract: nodes and clients must
/// agree on key placement, so this constant must not change without a
/// coordinated cluster upgrade.
const FNV_SEED: u32 = 2_166_136_261;
/// FNV-1a prime, applied per byte as `h = (h XOR byte) * prime`.
const FNV_PRIME: u32 = 16_777_619;

/// Number of virtual positions inserted per physical node.
pub const DEFAULT_VIRTUAL_NODES: usize = 3;

/// Sentinel node id returned by `get_node` when the ring is empty.
pub const FALLBACK_NODE: &str = "localhost";

/// FNV-1a (32-bit) over the UTF-8 bytes of `input`, byte-for-byte compatible
/// with the reference placement function.
#[must_use]
pub fn fnv1a(input: &str) -> u32 {
    let mut hash = FNV_SEED;
    for byte in input.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Consistent-hash ring mapping 32-bit positions to node identifiers.
///
/// Read-only after seed loading in this design: membership changes are
/// expected only during startup, not driven by live cluster events.
pub struct HashRing {
    ring: RwLock<BTreeMap<u32, String>>,
    virtual_nodes: usize,
}

impl HashRing {
    /// Creates an empty ring using the default virtual-node count.
    #[must_use]
    pub fn new() -> Self {
        Self::with_virtual_nodes(DEFAULT_VIRTUAL_NODES)
    }

    /// Creates an empty ring with an explicit virtual-node count per
    /// physical node.
    #[must_use]
    pub fn with_virtual_nodes(virtual_nodes: usize) -> Self {
        Self {
            ring: RwLock::new(BTreeMap::new()),
            virtual_nodes,
        }
    }

    /// Inserts `virtual_nodes` positions for `node_id`, each the hash of
    /// `"{node_id}:{i}"` for `i` in `[0, virtual_nodes)`.
    ///
    /// If a virtual position collides with an existing one, the later
    /// insert wins (map semantics) — collisions never panic.
    pub fn add_node(&self, node_id: &str) {
        let mut ring = self.ring.write();
        for i in 0..self.virtual_nodes {
            let position = fnv1a(&format!("{node_id}:{i}"));
            ring.insert(position, node_id.to_string());
        }
        tracing::info!(node_id, virtual_nodes = self.virtual_nodes, "added node to hash ring");
    }

    /// Removes every virtual position owned by `node_id`.
    pub fn remove_node(&self, node_id: &str) {
        let mut ring = self.ring.write();
        ring.retain(|_, owner| owner != node_id);
        tracing::info!(node_id, "removed node from hash ring");
    }

    /// Returns the node owning `key`: the owner of the smallest position
    /// `>= hash(key)`, wrapping to the smallest position overall if none
    /// exists. Returns [`FALLBACK_NODE`] when the ring is empty.
    #[must_use]
    pub fn get_node(&self, key: &str) -> String {
        let ring = self.ring.read();
        if ring.is_empty() {
            return FALLBACK_NODE.to_string();
        }

        let key_hash = fnv1a(key);
        match ring.range(key_hash..).next() {
            Some((_, node)) => node.clone(),
            None => ring.values().next().expect("ring is non-empty").clone(),
        }
    }

    /// Returns the set of distinct physical node ids currently in the ring.
    #[must_use]
    pub fn get_all_nodes(&self) -> Vec<String> {
        let ring = self.ring.read();
        let mut seen = Vec::new();
        for node in ring.values() {
            if !seen.contains(node) {
                seen.push(node.clone());
            }
        }
        seen
    }

    /// Number of virtual positions currently occupied.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.read().len()
    }

    /// True if the ring has no positions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.read().is_empty()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "hash_ring_tests.rs"]
mod tests;
