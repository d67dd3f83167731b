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

//! Process-wide directory of namespaces (spec §3, §4.E).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use meshcache_common::{Error, Result};
use parking_lot::RwLock;

use crate::group::{Group, GroupConfig, Loader};

/// Reader/writer-locked `name -> Group` map, lazily initialized and shared
/// for the lifetime of the process. The only way to reach a `Group` from
/// outside the crate that created it.
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Global singleton, guarded by a reader/writer lock per spec §9.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::new)
    }

    /// Create and register a namespace. Rejects a name that is already
    /// registered (spec §9 tightens the source's silent-overwrite contract
    /// into an explicit rejection).
    pub fn new_group(&self, name: impl Into<String>, config: GroupConfig, loader: Arc<dyn Loader>) -> Result<Arc<Group>> {
        let name = name.into();
        let mut groups = self.groups.write();
        if groups.contains_key(&name) {
            return Err(Error::InvalidInput(format!("group {name:?} is already registered")));
        }
        let group = Group::new(name.clone(), loader, config);
        groups.insert(name, group.clone());
        Ok(group)
    }

    /// Pure lookup; `None` if `name` was never registered.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }
}
