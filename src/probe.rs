// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Robin Hood probing shared by both table layouts
//!
//! Every entry sits `psl` slots past its home slot (`hash % table_size`).
//!
//! On insert, a record walks forward from its home slot. Whenever it is
//! "poorer" (larger PSL) than the resident entry, the two trade places and the
//! evicted entry continues the walk. This keeps PSLs evenly distributed and
//! gives lookups an early exit: once a slot's PSL is smaller than the current
//! probe distance, the key cannot be further along.
//!
//! On remove, the chain behind the removed entry is shifted one slot backward
//! (backward-shift deletion), so no tombstones are ever left behind.

use crate::{
    hash::{home_slot, next_slot},
    meta::EMPTY_PSL,
    KeyPolicy, TableMeta,
};

/// Slot storage operated on by the probing functions
///
/// The mutation primitives are the only way slots change state,
/// so a storage layout only has to get these right.
pub trait SlotArray {
    /// Borrowed view of a stored value
    type Value: ?Sized;

    /// Owned record carried through the table during displacement
    type Record;

    fn meta(&self) -> TableMeta;

    fn set_meta(&mut self, meta: TableMeta);

    /// Returns the PSL of a slot, [`EMPTY_PSL`] if it is vacant.
    fn psl(&self, slot: u32) -> u32;

    /// Returns the value of an occupied slot.
    fn value(&self, slot: u32) -> &Self::Value;

    /// Returns the value of an occupied slot.
    fn value_mut(&mut self, slot: u32) -> &mut Self::Value;

    fn record_value(record: &Self::Record) -> &Self::Value;

    /// Moves a record into a vacant slot.
    fn claim(&mut self, slot: u32, psl: u32, record: Self::Record);

    /// Exchanges the record and PSL of an occupied slot with the carried ones.
    fn swap(&mut self, slot: u32, psl: &mut u32, record: &mut Self::Record);

    /// Moves the occupant of `from` into the vacant slot `to`, one probe
    /// closer to its home, leaving `from` vacant.
    fn shift_back(&mut self, from: u32, to: u32);

    /// Moves the record out of an occupied slot, leaving it vacant.
    fn take(&mut self, slot: u32) -> Self::Record;
}

/// Where an insert ended up
#[derive(Debug, Eq, PartialEq)]
pub enum Placement<R> {
    /// The record now lives in this slot
    Inserted(u32),

    /// The key already lives in this slot, the record was not stored
    Exists(u32),

    /// The table is full, the record is handed back
    Full(R),
}

/// Finds the slot holding `key`.
pub fn find<S, P>(slots: &S, policy: &P, key: &P::Key) -> Option<u32>
where
    S: SlotArray,
    P: KeyPolicy<S::Value>,
{
    let meta = slots.meta();

    if meta.key_num == 0 {
        return None;
    }

    let mut slot = home_slot(policy.hash(key), meta.table_size);

    for distance in 0..=meta.lpsl {
        let psl = slots.psl(slot);

        // NOTE: If the key were stored further along, insertion would have
        // displaced this richer entry
        if psl == EMPTY_PSL || psl < distance {
            return None;
        }

        if policy.key_eq(policy.extract(slots.value(slot)), key) {
            return Some(slot);
        }

        slot = next_slot(slot, meta.table_size);
    }

    None
}

/// Inserts a record, unless its key is already present or the table is full.
pub fn insert<S, P>(slots: &mut S, policy: &P, record: S::Record) -> Placement<S::Record>
where
    S: SlotArray,
    P: KeyPolicy<S::Value>,
{
    let mut meta = slots.meta();

    if meta.is_full() {
        // NOTE: A full table still answers duplicates, but must not start
        // displacing entries it then has no room for
        let key = policy.extract(S::record_value(&record));

        return match find(slots, policy, key) {
            Some(slot) => Placement::Exists(slot),
            None => {
                log::trace!("insert rejected, table is full ({} keys)", meta.key_num);
                Placement::Full(record)
            }
        };
    }

    let mut slot = home_slot(
        policy.hash(policy.extract(S::record_value(&record))),
        meta.table_size,
    );
    let mut psl = 0;
    let mut carried = record;

    // Slot the inserted record was first swapped into
    let mut placed = None;

    loop {
        let occupant_psl = slots.psl(slot);

        if occupant_psl == EMPTY_PSL {
            slots.claim(slot, psl, carried);

            meta.key_num += 1;
            meta.lpsl = meta.lpsl.max(psl);
            slots.set_meta(meta);

            return Placement::Inserted(placed.unwrap_or(slot));
        }

        // NOTE: Once the inserted record is placed, the carried records are
        // all distinct from the stored keys
        if placed.is_none()
            && policy.key_eq(
                policy.extract(slots.value(slot)),
                policy.extract(S::record_value(&carried)),
            )
        {
            return Placement::Exists(slot);
        }

        if psl > occupant_psl {
            meta.lpsl = meta.lpsl.max(psl);
            slots.swap(slot, &mut psl, &mut carried);
            placed.get_or_insert(slot);
        }

        psl += 1;
        slot = next_slot(slot, meta.table_size);
    }
}

/// Removes the record stored under `key`, shifting its chain backward.
pub fn remove<S, P>(slots: &mut S, policy: &P, key: &P::Key) -> Option<S::Record>
where
    S: SlotArray,
    P: KeyPolicy<S::Value>,
{
    let mut hole = find(slots, policy, key)?;
    let mut meta = slots.meta();

    let removed = slots.take(hole);

    let mut next = next_slot(hole, meta.table_size);

    loop {
        let psl = slots.psl(next);

        // NOTE: Entries at their home slot cannot move further back
        if psl == EMPTY_PSL || psl == 0 {
            break;
        }

        slots.shift_back(next, hole);

        hole = next;
        next = next_slot(next, meta.table_size);
    }

    meta.key_num -= 1;
    slots.set_meta(meta);

    Some(removed)
}

/// Visits occupied slots in ascending slot order until `f` returns `false`.
pub fn for_each<S, F>(slots: &S, mut f: F)
where
    S: SlotArray,
    F: FnMut(u32, u32, &S::Value) -> bool,
{
    for slot in 0..slots.meta().table_size {
        let psl = slots.psl(slot);

        if psl != EMPTY_PSL && !f(slot, psl, slots.value(slot)) {
            return;
        }
    }
}

/// Visits occupied slots in ascending slot order until `f` returns `false`.
pub fn for_each_mut<S, F>(slots: &mut S, mut f: F)
where
    S: SlotArray,
    F: FnMut(u32, u32, &mut S::Value) -> bool,
{
    for slot in 0..slots.meta().table_size {
        let psl = slots.psl(slot);

        if psl != EMPTY_PSL && !f(slot, psl, slots.value_mut(slot)) {
            return;
        }
    }
}
