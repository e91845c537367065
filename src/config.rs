// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{meta::EMPTY_PSL, Error};

/// Default ratio of maximum occupancy to physical slot count
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.9;

/// Table configuration builder
///
/// Capacity is fixed once a table is built from a config:
/// tables never grow, inserting into a full table is reported as
/// [`crate::Insertion::Full`].
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Hard ceiling for the number of stored keys
    pub max_key_num: u32,

    /// Target maximum load factor, used to derive the physical slot count
    pub max_load_factor: f64,
}

impl Config {
    /// Initializes a new config for a table holding at most `max_key_num` keys.
    #[must_use]
    pub fn new(max_key_num: u32) -> Self {
        Self {
            max_key_num,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }

    /// Sets the maximum load factor.
    ///
    /// Lower values spend more memory on empty slots,
    /// which shortens probe sequences.
    ///
    /// Must be in `(0, 1]`.
    ///
    /// Defaults to 0.9.
    #[must_use]
    pub fn max_load_factor(mut self, ratio: f64) -> Self {
        self.max_load_factor = ratio;
        self
    }

    /// Calculates the physical slot count, `ceil(max_key_num / max_load_factor)`.
    ///
    /// A quotient within float noise of an integer is treated as that integer,
    /// and the result is never below one slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the load factor is out of range, or the slot count
    /// does not fit below the empty slot sentinel.
    pub fn table_size(&self) -> crate::Result<u32> {
        let ratio = self.max_load_factor;

        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
            return Err(Error::InvalidLoadFactor(ratio));
        }

        let exact = f64::from(self.max_key_num) / ratio;
        let rounded = exact.round();

        let size = if (exact - rounded).abs() <= 1e-9 * exact.max(1.0) {
            rounded
        } else {
            exact.ceil()
        };

        // NOTE: PSLs are < table_size, and u32::MAX marks an empty slot
        if size >= f64::from(EMPTY_PSL) {
            return Err(Error::CapacityOverflow);
        }

        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "size is a non-negative integer below u32::MAX"
        )]
        let size = size as u32;

        Ok(size.max(self.max_key_num).max(1))
    }
}
