// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

mod slots;

pub use slots::Iter;

use crate::{
    probe::{self, Placement, SlotArray},
    Config, Insertion, KeyPolicy, MapPolicy, SetPolicy, TableMeta,
};
use slots::Slots;

/// Robin Hood set, storing keys directly
pub type RobinHoodSet<K> = TypedTable<K, SetPolicy<K>>;

/// Robin Hood map, storing `(key, value)` pairs
pub type RobinHoodMap<K, T> = TypedTable<(K, T), MapPolicy<K, T>>;

/// Fixed-capacity Robin Hood hash table over typed values
///
/// Values are moved into their slot on insert and dropped on removal
/// or when the table is dropped. Keys are derived from values through
/// the table's [`KeyPolicy`].
///
/// The table never grows: once it holds `max_key_num` keys, inserting
/// another key returns [`Insertion::Full`].
pub struct TypedTable<V, P> {
    slots: Slots<V>,
    policy: P,
}

impl<V, P: KeyPolicy<V> + Default> TypedTable<V, P> {
    /// Creates a table holding at most `max_key_num` keys, with the default
    /// load factor.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot array cannot be allocated.
    pub fn new(max_key_num: u32) -> crate::Result<Self> {
        Self::with_config(Config::new(max_key_num), P::default())
    }
}

impl<V, P: KeyPolicy<V>> TypedTable<V, P> {
    /// Creates a table from a config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, or the slot array cannot
    /// be allocated.
    pub fn with_config(config: Config, policy: P) -> crate::Result<Self> {
        let table_size = config.table_size()?;

        log::debug!(
            "Creating typed table with {table_size} slots for {} keys",
            config.max_key_num,
        );

        let slots = Slots::new(TableMeta::new(config.max_key_num, table_size))?;

        Ok(Self { slots, policy })
    }

    /// Inserts a value, unless its key is already stored or the table is full.
    ///
    /// On success, returns a reference to the stored value.
    /// If the key already exists, returns a reference to the existing value
    /// and drops `value`.
    pub fn insert(&mut self, value: V) -> Insertion<&mut V, V> {
        match probe::insert(&mut self.slots, &self.policy, value) {
            Placement::Inserted(slot) => Insertion::Inserted(self.slots.value_mut(slot)),
            Placement::Exists(slot) => Insertion::Exists(self.slots.value_mut(slot)),
            Placement::Full(value) => Insertion::Full(value),
        }
    }

    /// Retrieves the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &P::Key) -> Option<&V> {
        probe::find(&self.slots, &self.policy, key).map(|slot| self.slots.value(slot))
    }

    /// Retrieves the value stored under `key`.
    ///
    /// The value must not be changed in a way that changes its key.
    pub fn get_mut(&mut self, key: &P::Key) -> Option<&mut V> {
        probe::find(&self.slots, &self.policy, key).map(|slot| self.slots.value_mut(slot))
    }

    /// Returns `true` if `key` is stored.
    #[must_use]
    pub fn contains_key(&self, key: &P::Key) -> bool {
        probe::find(&self.slots, &self.policy, key).is_some()
    }

    /// Removes the value stored under `key`, returning it.
    ///
    /// Does nothing if the key is not stored.
    pub fn remove(&mut self, key: &P::Key) -> Option<V> {
        probe::remove(&mut self.slots, &self.policy, key)
    }

    /// Visits all values in slot order, passing `(slot, psl, value)`.
    ///
    /// Stops as soon as `f` returns `false`.
    pub fn for_each<F: FnMut(u32, u32, &V) -> bool>(&self, f: F) {
        probe::for_each(&self.slots, f);
    }

    /// Visits all values in slot order, passing `(slot, psl, value)`.
    ///
    /// Stops as soon as `f` returns `false`.
    /// Values must not be changed in a way that changes their key.
    pub fn for_each_mut<F: FnMut(u32, u32, &mut V) -> bool>(&mut self, f: F) {
        probe::for_each_mut(&mut self.slots, f);
    }

    /// Returns the key policy.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<V, P> TypedTable<V, P> {
    /// Iterates over `(slot, psl, value)` of all values, in slot order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        self.slots.iter()
    }

    /// Returns the occupancy metadata.
    #[must_use]
    pub fn meta(&self) -> TableMeta {
        self.slots.meta()
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meta().key_num as usize
    }

    /// Returns `true` if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meta().key_num == 0
    }

    /// Returns the maximum number of values.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.meta().max_key_num as usize
    }

    /// Returns the physical slot count.
    #[must_use]
    pub fn table_size(&self) -> u32 {
        self.meta().table_size
    }

    /// Returns the longest probe sequence length observed so far.
    #[must_use]
    pub fn longest_psl(&self) -> u32 {
        self.meta().lpsl
    }
}

impl<'a, V, P> IntoIterator for &'a TypedTable<V, P> {
    type Item = (u32, u32, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V, P> std::fmt::Debug for TypedTable<V, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedTable")
            .field("meta", &self.meta())
            .finish_non_exhaustive()
    }
}
