// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

pub fn hash64(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(bytes)
}

pub fn hash128(bytes: &[u8]) -> u128 {
    xxhash_rust::xxh3::xxh3_128(bytes)
}

/// Calculates the home slot for the given hash.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the remainder is below table_size, which is a u32"
)]
pub fn home_slot(hash: u64, table_size: u32) -> u32 {
    debug_assert!(table_size > 0, "table should have at least one slot");
    (hash % u64::from(table_size)) as u32
}

/// Returns the slot after `slot`, wrapping around at the end of the table.
pub fn next_slot(slot: u32, table_size: u32) -> u32 {
    let next = slot + 1;

    if next == table_size {
        0
    } else {
        next
    }
}
