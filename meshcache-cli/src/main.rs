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

//! Standalone meshcache node: registers one namespace backed by a demo
//! loader, then serves it over HTTP to both clients and peers.
//!
//! Grounded on `original_source/main.go`'s single-node demo (a "scores"
//! namespace over an in-memory map) and on `velesdb-server`'s
//! clap-args-then-axum-serve shape.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytesize::ByteSize;
use clap::Parser;
use meshcache_common::{Error, Result};
use meshcache_core::{Group, GroupConfig, Loader, Registry};
use meshcache_transport::HttpPeerPool;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// A meshcache node serving one namespace over HTTP.
#[derive(Parser, Debug)]
#[command(name = "meshcache")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// This node's own address, advertised to peers and used to bind the
    /// listener, e.g. "localhost:9999".
    #[arg(long, default_value = "localhost:9999", env = "MESHCACHE_ADDR")]
    addr: String,

    /// Base URL other nodes should use to reach this one. Defaults to
    /// `http://<addr>`.
    #[arg(long, env = "MESHCACHE_BASE_URL")]
    base_url: Option<String>,

    /// Comma-separated peer base URLs, including this node's own.
    #[arg(long, value_delimiter = ',', env = "MESHCACHE_PEERS")]
    peers: Vec<String>,

    /// Namespace to serve.
    #[arg(long, default_value = "scores", env = "MESHCACHE_GROUP")]
    group: String,

    /// Byte budget for the namespace's local store, e.g. "2KiB" or "512MB".
    /// 0 means unbounded.
    #[arg(long, default_value = "2KiB", env = "MESHCACHE_MAX_BYTES")]
    max_bytes: ByteSize,
}

/// Stands in for a slow authoritative source, matching the toy `db` map in
/// the demo this was ported from.
struct DemoLoader {
    data: HashMap<&'static str, &'static str>,
}

#[async_trait]
impl Loader for DemoLoader {
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        tracing::info!(key, "querying slow authoritative source");
        self.data
            .get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| Error::LoaderFailure(format!("{key} not exist")))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let base_url = args.base_url.clone().unwrap_or_else(|| format!("http://{}", args.addr));

    let loader = Arc::new(DemoLoader {
        data: HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]),
    });

    let group_config = GroupConfig {
        max_bytes: args.max_bytes.as_u64() as usize,
        ..GroupConfig::default()
    };
    let group: Arc<Group> = Registry::global().new_group(args.group.clone(), group_config, loader)?;

    let pool = Arc::new(HttpPeerPool::new(base_url.clone()));
    if !args.peers.is_empty() {
        pool.set_peers(&args.peers);
    }
    group.register_peers(pool.clone());

    tracing::info!(addr = %args.addr, base_url, group = %args.group, "meshcache node starting");

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    axum::serve(listener, pool.router()).await?;

    Ok(())
}
