// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// PSL value marking a vacant slot
pub(crate) const EMPTY_PSL: u32 = u32::MAX;

/// Table occupancy metadata
///
/// Invariant: `key_num <= max_key_num <= table_size`, and `table_size`
/// never changes after creation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TableMeta {
    /// Number of stored keys
    pub key_num: u32,

    /// Longest probe sequence length observed so far
    ///
    /// This is a high-water mark: removals never lower it.
    pub lpsl: u32,

    /// Hard ceiling for `key_num`
    pub max_key_num: u32,

    /// Physical slot count
    pub table_size: u32,
}

impl TableMeta {
    pub(crate) fn new(max_key_num: u32, table_size: u32) -> Self {
        Self {
            key_num: 0,
            lpsl: 0,
            max_key_num,
            table_size,
        }
    }

    /// Returns `true` if no further distinct key can be inserted.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.key_num >= self.max_key_num
    }

    /// Ratio of stored keys to physical slots.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        f64::from(self.key_num) / f64::from(self.table_size.max(1))
    }
}
