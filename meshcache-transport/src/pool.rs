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

//! The HTTP peer pool: a concrete [`PeerPicker`] over a [`HashRing`], a
//! [`PeerFetcher`] client for the wire protocol of spec §6, and the axum
//! routes a node serves that protocol on.
//!
//! Grounded on `original_source/DuCache/http.go`'s `HttpPool`/`httpGetter`
//! pair: `Set` becomes [`HttpPeerPool::set_peers`], `PickPeer` becomes
//! [`PeerPicker::pick`], and `httpGetter.Get` becomes [`HttpPeerFetcher::fetch`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use meshcache_common::{Error, Result};
use meshcache_core::{HashRing, PeerFetcher, PeerPicker, Registry};
use parking_lot::RwLock;
use prost::Message;
use tracing::{debug, info};

use crate::wire;

/// Default URL prefix for inter-node requests, matching
/// `original_source/DuCache/http.go`'s `defaultPrefix`.
pub const DEFAULT_PREFIX: &str = "/ducache/";

struct Inner {
    ring: HashRing,
    fetchers: HashMap<String, Arc<HttpPeerFetcher>>,
}

/// Both the server side (`axum` routes, via [`HttpPeerPool::router`]) and
/// the client side (`PeerPicker`) of a node's participation in the mesh.
pub struct HttpPeerPool {
    /// This node's own address, e.g. `http://localhost:9999`. Used both to
    /// build this node's listen routes and to recognize "the ring picked
    /// me" so the core falls back to the local loader instead of looping
    /// back over HTTP to itself.
    base_url: String,
    prefix: String,
    inner: RwLock<Inner>,
}

impl HttpPeerPool {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_prefix(base_url, DEFAULT_PREFIX)
    }

    pub fn with_prefix(base_url: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            prefix: prefix.into(),
            inner: RwLock::new(Inner {
                ring: HashRing::new(),
                fetchers: HashMap::new(),
            }),
        }
    }

    /// Replace the peer set. Rebuilds the ring from scratch and one HTTP
    /// client per peer, matching `HttpPool.Set`'s "rebuild on membership
    /// change" contract (spec §4.B: no incremental removal API).
    pub fn set_peers(&self, peers: &[String]) {
        let mut ring = HashRing::new();
        ring.add(peers.iter().map(String::as_str));

        let mut fetchers = HashMap::new();
        for peer in peers {
            fetchers.insert(
                peer.clone(),
                Arc::new(HttpPeerFetcher::new(format!("{peer}{}", self.prefix))),
            );
        }

        *self.inner.write() = Inner { ring, fetchers };
    }

    /// Centralizes the "am I the picked peer" comparison (spec §9's open
    /// question about this predicate).
    pub fn is_self(&self, peer: &str) -> bool {
        peer == self.base_url
    }

    /// The axum router serving this node's side of the wire protocol:
    /// `GET <prefix>/<group>/<key>`.
    pub fn router(&self) -> Router {
        Router::new().route(&format!("{}{{group}}/{{key}}", self.prefix), get(handle_get))
    }

    /// Maps a fetcher returned from [`PeerPicker::pick`] back to the peer
    /// address it was built for, by identity. Test-only: lets tests assert
    /// on which peer was actually picked instead of just that *a* fetcher
    /// came back.
    #[cfg(test)]
    fn peer_address_of(&self, fetcher: &Arc<dyn PeerFetcher>) -> Option<String> {
        let inner = self.inner.read();
        inner
            .fetchers
            .iter()
            .find(|(_, f)| Arc::ptr_eq(&(Arc::clone(f) as Arc<dyn PeerFetcher>), fetcher))
            .map(|(peer, _)| peer.clone())
    }
}

impl PeerPicker for HttpPeerPool {
    fn pick(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let inner = self.inner.read();
        let peer = inner.ring.get(key)?;
        if self.is_self(peer) {
            return None;
        }
        let fetcher = inner.fetchers.get(peer)?.clone();
        debug!(base_url = %self.base_url, peer, key, "picked peer");
        Some(fetcher as Arc<dyn PeerFetcher>)
    }
}

/// HTTP client side of the wire protocol: fetches `group`/`key` from one
/// peer's `HttpPeerPool::router`.
pub struct HttpPeerFetcher {
    // "http://peer:port/meshcache/"
    base_url: String,
    client: reqwest::Client,
}

impl HttpPeerFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PeerFetcher for HttpPeerFetcher {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(key)
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| Error::PeerFailure(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::PeerFailure(format!("server returned: {}", response.status())));
        }

        let body = response.bytes().await.map_err(|err| Error::PeerFailure(err.to_string()))?;
        let decoded = wire::Response::decode(body).map_err(|err| Error::SerializationFailure(err.to_string()))?;
        Ok(decoded.value)
    }
}

async fn handle_get(Path((group, key)): Path<(String, String)>) -> Response {
    if group.is_empty() || key.is_empty() {
        return (StatusCode::BAD_REQUEST, "bad request").into_response();
    }

    info!(group, key, "GET");

    let Some(g) = Registry::global().get_group(&group) else {
        return (StatusCode::NOT_FOUND, format!("no such group: {group}")).into_response();
    };

    match g.get(&key).await {
        Ok(value) => {
            let body = wire::Response { value: value.to_vec() }.encode_to_vec();
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/octet-stream")], body).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_exclusion_matches_own_base_url() {
        let pool = HttpPeerPool::new("http://localhost:9999");
        assert!(pool.is_self("http://localhost:9999"));
        assert!(!pool.is_self("http://localhost:9998"));
    }

    #[test]
    fn picking_with_no_peers_configured_returns_none() {
        let pool = HttpPeerPool::new("http://localhost:9999");
        assert!(pool.pick("Tom").is_none());
    }

    #[test]
    fn picking_self_falls_back_to_local() {
        let pool = HttpPeerPool::new("http://localhost:9999");
        pool.set_peers(&["http://localhost:9999".to_string()]);
        // The only peer in the ring is this node itself, so every key must
        // resolve to "serve locally."
        assert!(pool.pick("Tom").is_none());
        assert!(pool.pick("Jack").is_none());
    }

    #[test]
    fn picking_among_others_never_returns_self() {
        let pool = HttpPeerPool::new("http://localhost:9999");
        pool.set_peers(&[
            "http://localhost:9999".to_string(),
            "http://localhost:10000".to_string(),
            "http://localhost:10001".to_string(),
        ]);
        let mut saw_a_pick = false;
        for key in ["Tom", "Jack", "Sam", "some other key"] {
            if let Some(fetcher) = pool.pick(key) {
                saw_a_pick = true;
                let address = pool.peer_address_of(&fetcher).expect("picked fetcher must be one of the configured peers");
                assert_ne!(address, "http://localhost:9999", "pick() must never hand back this node's own address");
            }
        }
        assert!(saw_a_pick, "at least one of these keys should resolve to a remote peer");
    }
}
