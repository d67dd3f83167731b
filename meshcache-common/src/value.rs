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

use bytes::Bytes;

/// An immutable byte sequence held by the LRU store.
///
/// `Value` is cheap to clone (an `Arc`-backed `Bytes` under the hood), but
/// every byte slice handed back to a caller via [`Value::to_vec`] is a fresh
/// allocation: callers can never mutate the bytes a store actually holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value(Bytes);

impl Value {
    /// Number of bytes in the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the value is empty. Zero-length values are legal and still
    /// charge `len(key)` bytes against a store's budget.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An independent copy of the underlying bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Borrow the underlying bytes without copying. Callers that need an
    /// owned, mutation-safe buffer should use [`Value::to_vec`] instead.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self(Bytes::from(s.into_bytes()))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_are_independent() {
        let value = Value::from(vec![1, 2, 3]);
        let mut copy = value.to_vec();
        copy[0] = 9;
        assert_eq!(value.as_bytes(), &[1, 2, 3]);
        assert_eq!(copy, vec![9, 2, 3]);
    }

    #[test]
    fn zero_length_is_legal() {
        let value = Value::from(Vec::new());
        assert_eq!(value.len(), 0);
        assert!(value.is_empty());
    }

    #[test]
    fn cloning_shares_storage_cheaply() {
        let value = Value::from(vec![1, 2, 3]);
        let clone = value.clone();
        assert_eq!(value, clone);
    }
}
