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

//! Peer contracts consumed by [`crate::group::Group`] (spec §4.F).
//!
//! The core depends on nothing else from the transport layer: a
//! `PeerPicker` to find the owner of a key, and a `PeerFetcher` to fetch
//! bytes from that owner over the network. Both are supplied by
//! `meshcache-transport`.

use std::sync::Arc;

use async_trait::async_trait;
use meshcache_common::Result;

/// Finds the remote owner of a key, if any.
///
/// Implementations return `None` when the picker judges this node to be the
/// owner, or when its ring is empty -- both cases mean "serve this locally."
pub trait PeerPicker: Send + Sync {
    fn pick(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}

/// Performs the network round-trip to fetch a key from another node.
#[async_trait]
pub trait PeerFetcher: Send + Sync {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}
