//! Weighted consistent hash ring used to route a guild (or user) to a node.
//!
//! Each node is hashed onto `weight * replicas` points around a 32-bit SHA-1
//! ring (§4.3: "first 4 bytes of SHA-1 … as big-endian unsigned 32-bit").
//! Looking up a key walks clockwise from the key's hash to the first point
//! in the ring, which names the owning node. Removing a node only
//! reassigns the keys that mapped to its own virtual points.

use std::collections::BTreeMap;

use sha1::{Digest, Sha1};

/// Default virtual points placed on the ring per unit of weight (§4.3:
/// constructor "takes `replicas` … default 128").
pub const DEFAULT_REPLICAS: u32 = 128;

/// First 4 bytes of SHA-1 as a big-endian `u32` (§4.3).
fn ring_hash(input: &str) -> u32 {
    let digest = Sha1::digest(input.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// A weighted consistent hash ring over a set of named nodes.
///
/// Not internally synchronized; callers that mutate the ring from multiple
/// tasks should wrap it in a `RwLock` (as `Hub`/`Gateway` state does).
#[derive(Debug, Clone)]
pub struct HashRing {
    points: BTreeMap<u32, String>,
    weights: BTreeMap<String, u32>,
    replicas: u32,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS)
    }
}

impl HashRing {
    /// Build an empty ring with `replicas` virtual points per unit of
    /// weight.
    #[must_use]
    pub fn new(replicas: u32) -> Self {
        Self {
            points: BTreeMap::new(),
            weights: BTreeMap::new(),
            replicas,
        }
    }

    /// Build a ring (at the default replica count) from an initial
    /// `(node_id, weight)` set.
    #[must_use]
    pub fn from_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        Self::from_nodes_with_replicas(DEFAULT_REPLICAS, nodes)
    }

    /// Build a ring from an initial `(node_id, weight)` set at a given
    /// replica count.
    #[must_use]
    pub fn from_nodes_with_replicas<I>(replicas: u32, nodes: I) -> Self
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let mut ring = Self::new(replicas);
        for (node, weight) in nodes {
            ring.add(&node, weight);
        }
        ring
    }

    /// Add (or reweight) a node, placing `weight * replicas` points on the
    /// ring for it. A weight of zero removes the node.
    pub fn add(&mut self, node: &str, weight: u32) {
        if weight == 0 {
            self.remove(node);
            return;
        }
        self.remove(node);
        self.weights.insert(node.to_string(), weight);
        let count = weight * self.replicas;
        for i in 0..count {
            let point = ring_hash(&format!("{node}#{i}"));
            self.points.insert(point, node.to_string());
        }
    }

    /// Remove a node and all of its virtual points from the ring.
    pub fn remove(&mut self, node: &str) {
        if self.weights.remove(node).is_none() {
            return;
        }
        self.points.retain(|_, owner| owner != node);
    }

    /// Returns `true` if the ring has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of distinct nodes currently on the ring.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.weights.len()
    }

    /// Look up the node responsible for `key`, walking clockwise from the
    /// key's hash to the nearest point. Returns `None` if the ring is empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let hash = ring_hash(key);
        let owner = self
            .points
            .range(hash..)
            .next()
            .or_else(|| self.points.iter().next())
            .map(|(_, node)| node.as_str());
        owner
    }

    /// All node ids currently present on the ring, in insertion-independent
    /// (sorted) order.
    #[must_use]
    pub fn nodes(&self) -> Vec<&str> {
        self.weights.keys().map(String::as_str).collect()
    }
}
