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

//! meshcache: a distributed, in-memory cache fronting a slow authoritative
//! source. This crate is a thin facade over [`meshcache_core`] (the LRU
//! store, consistent-hash ring, single-flight coalescer, and namespace
//! registry) and [`meshcache_transport`] (the HTTP peer protocol).
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use meshcache::{Error, Group, GroupConfig, Loader, Registry, Result};
//!
//! struct SlowDb;
//!
//! #[async_trait]
//! impl Loader for SlowDb {
//!     async fn load(&self, key: &str) -> Result<Vec<u8>> {
//!         Err(Error::LoaderFailure(format!("{key} not exist")))
//!     }
//! }
//!
//! # async fn run() -> Result<()> {
//! let group: Arc<Group> =
//!     Registry::global().new_group("scores", GroupConfig::default(), Arc::new(SlowDb))?;
//! let _ = group.get("Tom").await;
//! # Ok(())
//! # }
//! ```

pub use meshcache_common::{Error, Result, Value};
pub use meshcache_core::{
    Coalescer, Crc32IeeeHasher, Group, GroupConfig, HashRing, Loader, LoaderFn, PeerFetcher, PeerPicker, Registry,
    RingHasher, Store, DEFAULT_REPLICAS,
};
pub use meshcache_transport::{HttpPeerFetcher, HttpPeerPool, Request, Response, DEFAULT_PREFIX};
