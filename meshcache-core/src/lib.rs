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

//! The four cooperating subsystems of meshcache: a bounded LRU store, a
//! consistent-hash ring, a single-flight request coalescer, and the
//! namespace (`Group`) that wires them together behind a process-wide
//! registry.

pub mod group;
pub mod hash_ring;
pub mod lru;
pub mod peer;
pub mod registry;
pub mod singleflight;

pub use group::{Group, GroupConfig, Loader, LoaderFn};
pub use hash_ring::{Crc32IeeeHasher, HashRing, RingHasher, DEFAULT_REPLICAS};
pub use lru::Store;
pub use peer::{PeerFetcher, PeerPicker};
pub use registry::Registry;
pub use singleflight::Coalescer;
