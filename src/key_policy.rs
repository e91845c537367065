// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use rustc_hash::FxBuildHasher;
use std::{
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

/// A trait allowing to customize how stored values are keyed.
///
/// It defines how a key is extracted from a stored value, how it is hashed
/// and how two keys are compared.
///
/// `hash` and `key_eq` must agree with each other (equal keys hash equally),
/// and a stored key's hash must not change while it is in a table.
pub trait KeyPolicy<V: ?Sized> {
    /// Key type borrowed out of a value
    type Key: ?Sized;

    /// Extracts the key from a stored value
    fn extract<'a>(&self, value: &'a V) -> &'a Self::Key;

    /// Hashes a key
    fn hash(&self, key: &Self::Key) -> u64;

    /// Checks if two keys are equal
    fn key_eq(&self, a: &Self::Key, b: &Self::Key) -> bool;
}

/// Policy for tables whose values are their own keys
pub struct SetPolicy<K, S = FxBuildHasher> {
    hasher: S,
    _key: PhantomData<fn() -> K>,
}

impl<K, S: BuildHasher> SetPolicy<K, S> {
    /// Uses the given hash builder to hash keys.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            _key: PhantomData,
        }
    }
}

impl<K, S: Default> Default for SetPolicy<K, S> {
    fn default() -> Self {
        Self {
            hasher: S::default(),
            _key: PhantomData,
        }
    }
}

impl<K, S: Clone> Clone for SetPolicy<K, S> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            _key: PhantomData,
        }
    }
}

impl<K, S> std::fmt::Debug for SetPolicy<K, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SetPolicy")
    }
}

impl<K: Hash + Eq, S: BuildHasher> KeyPolicy<K> for SetPolicy<K, S> {
    type Key = K;

    fn extract<'a>(&self, value: &'a K) -> &'a K {
        value
    }

    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    fn key_eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Policy for tables storing `(key, value)` pairs, keyed by the first element
pub struct MapPolicy<K, T, S = FxBuildHasher> {
    hasher: S,
    _pair: PhantomData<fn() -> (K, T)>,
}

impl<K, T, S: BuildHasher> MapPolicy<K, T, S> {
    /// Uses the given hash builder to hash keys.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            _pair: PhantomData,
        }
    }
}

impl<K, T, S: Default> Default for MapPolicy<K, T, S> {
    fn default() -> Self {
        Self {
            hasher: S::default(),
            _pair: PhantomData,
        }
    }
}

impl<K, T, S: Clone> Clone for MapPolicy<K, T, S> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            _pair: PhantomData,
        }
    }
}

impl<K, T, S> std::fmt::Debug for MapPolicy<K, T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MapPolicy")
    }
}

impl<K: Hash + Eq, T, S: BuildHasher> KeyPolicy<(K, T)> for MapPolicy<K, T, S> {
    type Key = K;

    fn extract<'a>(&self, value: &'a (K, T)) -> &'a K {
        &value.0
    }

    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    fn key_eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Policy for fixed-size byte records, keyed by a byte window of the record
///
/// Keys are hashed with XXH3, so a persisted flat table can be attached
/// by any build of this crate.
///
/// A window reaching past the end of a record is clamped to the record.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ByteRange {
    offset: usize,
    len: usize,
}

impl ByteRange {
    /// Uses `len` bytes starting at `offset` as key.
    #[must_use]
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Uses the first `len` bytes as key.
    #[must_use]
    pub fn prefix(len: usize) -> Self {
        Self::new(0, len)
    }

    /// Uses the entire record as key.
    #[must_use]
    pub fn whole() -> Self {
        Self::new(0, usize::MAX)
    }
}

impl Default for ByteRange {
    fn default() -> Self {
        Self::whole()
    }
}

impl KeyPolicy<[u8]> for ByteRange {
    type Key = [u8];

    fn extract<'a>(&self, value: &'a [u8]) -> &'a [u8] {
        let end = self.offset.saturating_add(self.len).min(value.len());
        value.get(self.offset..end).unwrap_or_default()
    }

    fn hash(&self, key: &[u8]) -> u64 {
        crate::hash::hash64(key)
    }

    fn key_eq(&self, a: &[u8], b: &[u8]) -> bool {
        a == b
    }
}
