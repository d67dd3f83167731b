//  Copyright 2026 meshcache contributors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! Consistent-hash ring with virtual nodes (spec §3, §4.B).

use std::collections::HashMap;

/// A pluggable hash function from bytes to a 32-bit ring position.
pub trait RingHasher: Send + Sync {
    fn hash(&self, data: &[u8]) -> u32;
}

/// CRC32/IEEE, matching `hash/crc32.ChecksumIEEE` in the source this was
/// ported from. The default hasher; swapping it changes key placement and
/// must be done identically on every node sharing a ring.
#[derive(Debug, Default, Clone, Copy)]
pub struct Crc32IeeeHasher;

impl RingHasher for Crc32IeeeHasher {
    fn hash(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

/// Default replica (virtual node) count. Smooths load distribution across
/// a small peer set; 50 is the value the source uses.
pub const DEFAULT_REPLICAS: usize = 50;

/// Deterministic key → peer mapping via consistent hashing with virtual
/// nodes.
///
/// Construction is the only way to change membership: there is no removal
/// API (spec §4.B "no removal API is required by the core"). Rebuild a new
/// `HashRing` from the full peer set on any membership change.
pub struct HashRing {
    hasher: Box<dyn RingHasher>,
    replicas: usize,
    // Sorted ascending; parallel to nothing else, looked up via `positions_map`.
    positions: Vec<u32>,
    positions_map: HashMap<u32, String>,
}

impl HashRing {
    /// Construct an empty ring with the default hasher and replica count.
    pub fn new() -> Self {
        Self::with_hasher(DEFAULT_REPLICAS, Box::new(Crc32IeeeHasher))
    }

    /// Construct a ring with an explicit replica count and hash function.
    pub fn with_hasher(replicas: usize, hasher: Box<dyn RingHasher>) -> Self {
        Self {
            hasher,
            replicas,
            positions: Vec::new(),
            positions_map: HashMap::new(),
        }
    }

    /// Add peers to the ring. For each peer and each replica index
    /// `i ∈ [0, replicas)`, computes `H(itoa(i) ++ peer)`, appends the
    /// position, and maps it to the peer. Re-sorts positions after all
    /// peers are added. Hash collisions are tolerated; the last write to
    /// the position → peer map wins.
    pub fn add<S: AsRef<str>>(&mut self, peers: impl IntoIterator<Item = S>) {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let mut buf = i.to_string().into_bytes();
                buf.extend_from_slice(peer.as_bytes());
                let position = self.hasher.hash(&buf);
                self.positions.push(position);
                self.positions_map.insert(position, peer.to_string());
            }
        }
        self.positions.sort_unstable();
    }

    /// Whether the ring has no peers.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Look up the peer owning `key`. Returns `None` on an empty ring.
    ///
    /// Computes `h = H(key)`, finds the smallest ring position `>= h` via
    /// binary search, wrapping to index 0 if `h` is past the last position.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }
        let h = self.hasher.hash(key.as_bytes());
        let idx = self.positions.partition_point(|&p| p < h);
        let idx = if idx == self.positions.len() { 0 } else { idx };
        let position = self.positions[idx];
        self.positions_map.get(&position).map(String::as_str)
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}
