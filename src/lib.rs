// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Fixed-capacity open-addressing hash tables using Robin Hood hashing
//! with backward-shift deletion.
//!
//! ##### NOTE
//!
//! > This crate only provides table building blocks, not a key-value store.
//! > Tables never resize: capacity is fixed on creation, and inserting into a
//! > full table is reported back to the caller instead of growing the table.
//! > Tables are not synchronized; wrap them in a lock to share them.
//!
//! ##### About
//!
//! Two storage layouts share the same probing algorithm:
//!
//! - [`TypedTable`] stores typed values in a heap slot array, moving values
//!   in on insert and dropping them on removal. [`RobinHoodSet`] and
//!   [`RobinHoodMap`] cover the common cases.
//! - [`FlatTable`] stores fixed-size byte records in a single contiguous buffer
//!   (header + records), which can be persisted or shared as-is and attached to
//!   again, optionally without taking ownership of the memory.
//!
//! How values are keyed, hashed and compared is decided by a [`KeyPolicy`].
//!
//! Every entry tracks its probe sequence length (PSL), the distance from its
//! home slot. Inserts let "poorer" entries (larger PSL) take the place of
//! "richer" ones, which bounds the PSL variance and lets lookups stop early.
//! Removals shift the following chain back by one slot, so no tombstones are
//! left behind.
//!
//! ```
//! use robin_hood_table::{Insertion, RobinHoodMap};
//!
//! # fn main() -> robin_hood_table::Result<()> {
//! let mut table = RobinHoodMap::<u32, &str>::new(100)?;
//!
//! assert!(table.insert((1, "neptune")).is_inserted());
//! assert!(matches!(table.insert((1, "saturn")), Insertion::Exists(_)));
//!
//! assert_eq!(Some(&(1, "neptune")), table.get(&1));
//! assert_eq!(Some((1, "neptune")), table.remove(&1));
//! assert!(table.get(&1).is_none());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod checksum;
mod coding;

/// Configuration
pub mod config;

mod error;

/// Flat record table
pub mod flat;

mod format_version;
mod hash;
mod insertion;
mod key_policy;
mod meta;
mod probe;

/// Typed value table
pub mod typed;

pub use {
    checksum::Checksum,
    config::{Config, DEFAULT_MAX_LOAD_FACTOR},
    error::{Error, Result},
    flat::FlatTable,
    format_version::FormatVersion,
    insertion::Insertion,
    key_policy::{ByteRange, KeyPolicy, MapPolicy, SetPolicy},
    meta::TableMeta,
    typed::{RobinHoodMap, RobinHoodSet, TypedTable},
};
