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

//! HTTP transport for meshcache: the wire protocol of spec §6 and the
//! concrete [`PeerPicker`]/[`PeerFetcher`] pair that runs over it.
//!
//! [`PeerPicker`]: meshcache_core::PeerPicker
//! [`PeerFetcher`]: meshcache_core::PeerFetcher

mod pool;
mod wire;

pub use pool::{HttpPeerFetcher, HttpPeerPool, DEFAULT_PREFIX};
pub use wire::{Request, Response};
