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

//! A bounded, byte-accounted LRU store (spec §3, §4.A).
//!
//! The recency order is a doubly-linked list realized as a safe arena: slots
//! live in a `Vec` and are addressed by index rather than by pointer, so the
//! whole structure stays free of `unsafe`. A `HashMap<String, usize>` gives
//! the index → slot lookup `get` needs to promote an entry to the front in
//! O(1) without touching the map itself.

use std::collections::HashMap;

use meshcache_common::Value;

const NIL: usize = usize::MAX;

struct Slot {
    key: String,
    value: Value,
    prev: usize,
    next: usize,
}

/// Callback invoked with the key and value of an entry evicted to honor
/// `max_bytes`.
pub type EvictionCallback = Box<dyn FnMut(&str, &Value) + Send>;

/// A bounded-capacity, recency-ordered key/value store.
///
/// Every operation here assumes a single serialized caller (spec §4.A);
/// concurrent access is the [`crate::group::Group`]'s responsibility via its
/// own mutex.
pub struct Store {
    slots: Vec<Slot>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    front: usize,
    back: usize,
    used_bytes: usize,
    max_bytes: usize,
    on_evicted: Option<EvictionCallback>,
}

impl Store {
    /// `max_bytes == 0` disables eviction entirely.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            front: NIL,
            back: NIL,
            used_bytes: 0,
            max_bytes,
            on_evicted: None,
        }
    }

    /// Install an eviction callback. Replaces any previously installed one.
    pub fn set_eviction_callback(&mut self, cb: EvictionCallback) {
        self.on_evicted = Some(cb);
    }

    /// Number of entries currently present.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total bytes charged: `Σ (len(key) + value.len())` over present entries.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Insert or update `key`. Moves the entry to the front. If `key` was
    /// already present, its old charge is replaced by the new one; the byte
    /// accounting is adjusted by the difference. After the update, while
    /// `max_bytes > 0` and `used_bytes > max_bytes`, evicts the tail
    /// repeatedly -- but never below a single remaining oversized entry
    /// (spec §4.A's "keep" policy for a single entry that alone exceeds the
    /// budget).
    pub fn add(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(&idx) = self.index.get(&key) {
            let old_len = self.slots[idx].value.len();
            self.used_bytes = self.used_bytes + value.len() - old_len;
            self.slots[idx].value = value;
            self.move_to_front(idx);
        } else {
            let charge = key.len() + value.len();
            let idx = self.alloc_slot(key.clone(), value);
            self.index.insert(key, idx);
            self.push_front(idx);
            self.used_bytes += charge;
        }

        while self.max_bytes > 0 && self.used_bytes > self.max_bytes && self.len() > 1 {
            self.remove_oldest();
        }
        // If a single inserted entry alone exceeds max_bytes, the loop above
        // stops at len() == 1 and the oversized entry is kept (spec §4.A).
    }

    /// Look up `key`, promoting it to the front on a hit.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(self.slots[idx].value.clone())
    }

    /// Remove the least-recently-used entry. No-op on an empty store.
    pub fn remove_oldest(&mut self) {
        if self.back == NIL {
            return;
        }
        let idx = self.back;
        self.unlink(idx);
        let slot = self.take_slot(idx);
        self.index.remove(&slot.key);
        self.used_bytes -= slot.key.len() + slot.value.len();
        if let Some(cb) = self.on_evicted.as_mut() {
            cb(&slot.key, &slot.value);
        }
    }

    fn alloc_slot(&mut self, key: String, value: Value) -> usize {
        let slot = Slot {
            key,
            value,
            prev: NIL,
            next: NIL,
        };
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = slot;
            idx
        } else {
            self.slots.push(slot);
            self.slots.len() - 1
        }
    }

    fn take_slot(&mut self, idx: usize) -> Slot {
        self.free.push(idx);
        // Slots popped from `free` are always reinitialized by `alloc_slot`
        // before being read again, so leaving the old contents here is fine.
        std::mem::replace(
            &mut self.slots[idx],
            Slot {
                key: String::new(),
                value: Value::from(Vec::new()),
                prev: NIL,
                next: NIL,
            },
        )
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.front = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.back = prev;
        }
        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.front;
        if self.front != NIL {
            self.slots[self.front].prev = idx;
        }
        self.front = idx;
        if self.back == NIL {
            self.back = idx;
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.front == idx {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn add_then_get_round_trips() {
        let mut store = Store::new(0);
        store.add("k", v("aaa"));
        assert_eq!(store.get("k"), Some(v("aaa")));
    }

    #[test]
    fn overwrite_replaces_value_and_accounting() {
        let mut store = Store::new(0);
        store.add("k", v("aaa"));
        store.add("k", v("bb"));
        assert_eq!(store.get("k"), Some(v("bb")));
        assert_eq!(store.used_bytes(), "k".len() + "bb".len());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn zero_length_value_still_charges_key_bytes() {
        let mut store = Store::new(0);
        store.add("k", v(""));
        assert_eq!(store.used_bytes(), 1);
    }

    #[test]
    fn max_bytes_zero_disables_eviction() {
        let mut store = Store::new(0);
        for i in 0..1000 {
            store.add(format!("k{i}"), v("x"));
        }
        assert_eq!(store.len(), 1000);
    }

    #[test]
    fn eviction_drops_least_recently_used() {
        // capacity for exactly two "kN" -> "xxx" entries
        let cap = ("k1".len() + 3) + ("k2".len() + 3);
        let mut store = Store::new(cap);
        store.add("k1", v("aaa"));
        store.add("k2", v("bbb"));
        store.add("k3", v("ccc"));

        assert_eq!(store.get("k1"), None, "k1 should have been evicted");
        assert_eq!(store.get("k2"), Some(v("bbb")));
        assert_eq!(store.get("k3"), Some(v("ccc")));
    }

    #[test]
    fn get_promotes_to_front_so_it_survives_eviction() {
        let cap = ("k1".len() + 1) + ("k2".len() + 1);
        let mut store = Store::new(cap);
        store.add("k1", v("a"));
        store.add("k2", v("b"));
        // touch k1 so it becomes more recent than k2
        assert_eq!(store.get("k1"), Some(v("a")));
        store.add("k3", v("c"));

        assert_eq!(store.get("k2"), None, "k2 should be the one evicted now");
        assert_eq!(store.get("k1"), Some(v("a")));
        assert_eq!(store.get("k3"), Some(v("c")));
    }

    #[test]
    fn oversized_single_entry_is_kept() {
        let mut store = Store::new(4);
        store.add("k1", v("a"));
        store.add("huge", v("this value alone exceeds the budget"));
        assert_eq!(store.len(), 1);
        assert!(store.get("huge").is_some());
    }

    #[test]
    fn eviction_callback_observes_evicted_pairs() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let mut store = Store::new(("k1".len() + 1));
        store.set_eviction_callback(Box::new(move |k, val| {
            seen2.lock().unwrap().push((k.to_string(), val.to_vec()));
        }));
        store.add("k1", v("a"));
        store.add("k2", v("b"));
        assert_eq!(seen.lock().unwrap().as_slice(), &[("k1".to_string(), b"a".to_vec())]);
    }

    #[test]
    fn returned_bytes_are_independent_copies() {
        let mut store = Store::new(0);
        store.add("k", v("abc"));
        let mut got = store.get("k").unwrap().to_vec();
        got[0] = b'z';
        assert_eq!(store.get("k").unwrap().as_bytes(), b"abc");
    }

    #[test]
    fn index_and_sequence_stay_consistent_under_churn() {
        use rand::{rngs::SmallRng, Rng, SeedableRng};

        let mut store = Store::new(64);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..5000 {
            let key = format!("k{}", rng.gen_range(0..16));
            store.add(key, v("xx"));
            assert!(store.used_bytes() <= store.max_bytes() || store.len() == 1);
        }
    }
}
