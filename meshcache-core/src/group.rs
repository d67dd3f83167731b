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

//! Namespace orchestration: local hit → peer fetch → loader (spec §3, §4.D).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use meshcache_common::{Error, Result, Value};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::lru::Store;
use crate::peer::PeerPicker;
use crate::singleflight::Coalescer;

/// Produces the authoritative bytes for a key on a local miss.
///
/// Mirrors the source's `Getter` interface: anything that can answer
/// "given this key, what are the bytes" qualifies, whether it's a type
/// implementing the trait or a bare async closure via [`LoaderFn`].
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapts a plain `async fn(&str) -> Result<Vec<u8>>`-shaped closure into a
/// [`Loader`], the function-adapter form spec §9 calls for.
pub struct LoaderFn<F>(F);

impl<F> LoaderFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

type BoxFut<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> BoxFut<'_> + Send + Sync,
{
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key).await
    }
}

/// Per-namespace configuration.
#[derive(Debug, Clone, Copy)]
pub struct GroupConfig {
    /// Byte budget for the namespace's LRU store. `0` means unbounded.
    pub max_bytes: usize,
    /// Whether to populate the local store after a successful peer fetch.
    /// Defaults to `false`, matching the source (spec §9's open question):
    /// the source does not double-cache a value that is already resident
    /// on its owning peer.
    pub populate_on_peer_fetch: bool,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            max_bytes: 0,
            populate_on_peer_fetch: false,
        }
    }
}

/// A named, independently sized cache with its own loader (spec's
/// "Namespace"/"Group").
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    store: Mutex<Store>,
    peer_picker: RwLock<Option<Arc<dyn PeerPicker>>>,
    coalescer: Coalescer<std::result::Result<Value, Error>>,
    populate_on_peer_fetch: bool,
}

impl Group {
    pub(crate) fn new(name: String, loader: Arc<dyn Loader>, config: GroupConfig) -> Arc<Self> {
        Arc::new(Self {
            name,
            loader,
            store: Mutex::new(Store::new(config.max_bytes)),
            peer_picker: RwLock::new(None),
            coalescer: Coalescer::new(),
            populate_on_peer_fetch: config.populate_on_peer_fetch,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register the peer picker for this namespace. May only be called
    /// once per namespace; a second call is a programming error (spec
    /// §4.D), so it panics rather than silently overwriting.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) {
        let mut guard = self.peer_picker.write();
        assert!(
            guard.is_none(),
            "register_peers called more than once on group {:?}",
            self.name
        );
        *guard = Some(picker);
    }

    /// Fetch `key`: local hit, else a coalesced peer-or-loader miss.
    pub async fn get(&self, key: &str) -> Result<Value> {
        if key.is_empty() {
            return Err(Error::InvalidInput("key is required".to_string()));
        }

        if let Some(value) = self.store.lock().get(key) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.coalescer.do_call(key, self.load(key)).await
    }

    async fn load(&self, key: &str) -> std::result::Result<Value, Error> {
        let picker = self.peer_picker.read().clone();
        if let Some(picker) = picker {
            if let Some(peer) = picker.pick(key) {
                match peer.fetch(&self.name, key).await {
                    Ok(bytes) => {
                        let value = Value::from(bytes);
                        if self.populate_on_peer_fetch {
                            self.store.lock().add(key, value.clone());
                        }
                        return Ok(value);
                    }
                    Err(err) => {
                        warn!(group = %self.name, key, error = %err, "peer fetch failed, falling back to loader");
                    }
                }
            }
        }
        self.get_locally(key).await
    }

    async fn get_locally(&self, key: &str) -> std::result::Result<Value, Error> {
        let bytes = self.loader.load(key).await?;
        let value = Value::from(bytes);
        self.store.lock().add(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    struct MapLoader {
        data: HashMap<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Loader for MapLoader {
        async fn load(&self, key: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.data
                .get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| Error::LoaderFailure(format!("{key} not exist")))
        }
    }

    fn group_with(data: HashMap<&'static str, &'static str>) -> (Arc<Group>, Arc<MapLoader>) {
        let loader = Arc::new(MapLoader {
            data,
            calls: AtomicUsize::new(0),
        });
        let group = Group::new("scores".to_string(), loader.clone(), GroupConfig::default());
        (group, loader)
    }

    #[tokio::test]
    async fn empty_key_is_invalid_input() {
        let (group, _loader) = group_with(HashMap::from([("Tom", "630")]));
        assert!(matches!(group.get("").await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn hit_only_scenario_invokes_loader_once() {
        let (group, loader) = group_with(HashMap::from([("Tom", "630")]));
        assert_eq!(group.get("Tom").await.unwrap().to_vec(), b"630");

        let mut handles = Vec::new();
        for _ in 0..1000 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("Tom").await.unwrap().to_vec() }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), b"630");
        }
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn coalesces_concurrent_misses_on_the_same_key() {
        struct SlowLoader {
            calls: AtomicUsize,
        }
        #[async_trait]
        impl Loader for SlowLoader {
            async fn load(&self, key: &str) -> Result<Vec<u8>> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(200)).await;
                assert_eq!(key, "Jack");
                Ok(b"589".to_vec())
            }
        }
        let loader = Arc::new(SlowLoader {
            calls: AtomicUsize::new(0),
        });
        let group = Group::new("scores".to_string(), loader.clone(), GroupConfig::default());

        let mut handles = Vec::new();
        for _ in 0..100 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("Jack").await.unwrap().to_vec() }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), b"589");
        }
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_key_surfaces_loader_error_and_is_not_cached() {
        let (group, loader) = group_with(HashMap::new());
        let err = group.get("kkk").await.unwrap_err();
        assert!(matches!(err, Error::LoaderFailure(msg) if msg == "kkk not exist"));

        let err2 = group.get("kkk").await.unwrap_err();
        assert!(matches!(err2, Error::LoaderFailure(_)));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2, "loader must be retried on every miss");
    }

    #[tokio::test]
    async fn registering_peers_twice_panics() {
        struct NoPeer;
        impl PeerPicker for NoPeer {
            fn pick(&self, _key: &str) -> Option<Arc<dyn crate::peer::PeerFetcher>> {
                None
            }
        }
        let (group, _loader) = group_with(HashMap::new());
        group.register_peers(Arc::new(NoPeer));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            group.register_peers(Arc::new(NoPeer));
        }));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn peer_failure_falls_back_to_local_loader() {
        use crate::peer::PeerFetcher;

        struct FailingPeer;
        #[async_trait]
        impl PeerFetcher for FailingPeer {
            async fn fetch(&self, _group: &str, _key: &str) -> Result<Vec<u8>> {
                Err(Error::PeerFailure("connection refused".to_string()))
            }
        }
        struct AlwaysRemote;
        impl PeerPicker for AlwaysRemote {
            fn pick(&self, _key: &str) -> Option<Arc<dyn PeerFetcher>> {
                Some(Arc::new(FailingPeer))
            }
        }

        let (group, _loader) = group_with(HashMap::from([("k", "x")]));
        group.register_peers(Arc::new(AlwaysRemote));
        assert_eq!(group.get("k").await.unwrap().to_vec(), b"x");
    }
}
