// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

#![allow(unsafe_code)]

use crate::{meta::EMPTY_PSL, probe::SlotArray, Error, TableMeta};
use std::mem::MaybeUninit;

struct Slot<V> {
    psl: u32,

    // Initialized iff `psl != EMPTY_PSL`
    value: MaybeUninit<V>,
}

/// Heap array of slots, constructing values only in occupied slots
pub struct Slots<V> {
    slots: Box<[Slot<V>]>,
    meta: TableMeta,
}

impl<V> Slots<V> {
    pub fn new(meta: TableMeta) -> crate::Result<Self> {
        let count = meta.table_size as usize;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(count)
            .map_err(|_| Error::AllocationFailed {
                bytes: count.saturating_mul(std::mem::size_of::<Slot<V>>()),
            })?;

        slots.extend((0..count).map(|_| Slot {
            psl: EMPTY_PSL,
            value: MaybeUninit::uninit(),
        }));

        Ok(Self {
            slots: slots.into_boxed_slice(),
            meta,
        })
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.slots.iter().enumerate(),
        }
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "slot indices are always reduced modulo the table size"
    )]
    fn slot(&self, slot: u32) -> &Slot<V> {
        &self.slots[slot as usize]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "slot indices are always reduced modulo the table size"
    )]
    fn slot_mut(&mut self, slot: u32) -> &mut Slot<V> {
        &mut self.slots[slot as usize]
    }
}

impl<V> SlotArray for Slots<V> {
    type Value = V;
    type Record = V;

    fn meta(&self) -> TableMeta {
        self.meta
    }

    fn set_meta(&mut self, meta: TableMeta) {
        self.meta = meta;
    }

    fn psl(&self, slot: u32) -> u32 {
        self.slot(slot).psl
    }

    fn value(&self, slot: u32) -> &V {
        let slot = self.slot(slot);
        debug_assert_ne!(EMPTY_PSL, slot.psl, "slot should be occupied");

        // SAFETY: Occupied slots hold an initialized value
        unsafe { slot.value.assume_init_ref() }
    }

    fn value_mut(&mut self, slot: u32) -> &mut V {
        let slot = self.slot_mut(slot);
        debug_assert_ne!(EMPTY_PSL, slot.psl, "slot should be occupied");

        // SAFETY: Occupied slots hold an initialized value
        unsafe { slot.value.assume_init_mut() }
    }

    fn record_value(record: &V) -> &V {
        record
    }

    fn claim(&mut self, slot: u32, psl: u32, record: V) {
        let slot = self.slot_mut(slot);
        debug_assert_eq!(EMPTY_PSL, slot.psl, "slot should be vacant");

        slot.value.write(record);
        slot.psl = psl;
    }

    fn swap(&mut self, slot: u32, psl: &mut u32, record: &mut V) {
        let slot = self.slot_mut(slot);
        debug_assert_ne!(EMPTY_PSL, slot.psl, "slot should be occupied");

        std::mem::swap(&mut slot.psl, psl);

        // SAFETY: Occupied slots hold an initialized value
        std::mem::swap(unsafe { slot.value.assume_init_mut() }, record);
    }

    fn shift_back(&mut self, from: u32, to: u32) {
        let source = self.slot_mut(from);
        debug_assert!(source.psl != EMPTY_PSL && source.psl > 0);

        let psl = source.psl - 1;
        source.psl = EMPTY_PSL;

        // SAFETY: The source slot was occupied and is now marked vacant,
        // so the value is moved out exactly once
        let value = unsafe { source.value.assume_init_read() };

        self.claim(to, psl, value);
    }

    fn take(&mut self, slot: u32) -> V {
        let slot = self.slot_mut(slot);
        debug_assert_ne!(EMPTY_PSL, slot.psl, "slot should be occupied");

        slot.psl = EMPTY_PSL;

        // SAFETY: The slot was occupied and is now marked vacant,
        // so the value is moved out exactly once
        unsafe { slot.value.assume_init_read() }
    }
}

impl<V> Drop for Slots<V> {
    fn drop(&mut self) {
        if !std::mem::needs_drop::<V>() {
            return;
        }

        let mut remaining = self.meta.key_num;

        for slot in &mut *self.slots {
            if remaining == 0 {
                break;
            }

            if slot.psl != EMPTY_PSL {
                slot.psl = EMPTY_PSL;
                remaining -= 1;

                // SAFETY: Occupied slots hold an initialized value,
                // which is dropped exactly once as the slot is marked vacant
                unsafe { slot.value.assume_init_drop() };
            }
        }
    }
}

/// Iterator over the occupied slots of a typed table, in slot order
///
/// Yields `(slot, psl, value)`.
pub struct Iter<'a, V> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Slot<V>>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u32, u32, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, slot) in self.inner.by_ref() {
            if slot.psl == EMPTY_PSL {
                continue;
            }

            #[expect(
                clippy::cast_possible_truncation,
                reason = "the table size is bounded by u32"
            )]
            let idx = idx as u32;

            // SAFETY: Occupied slots hold an initialized value
            let value = unsafe { slot.value.assume_init_ref() };

            return Some((idx, slot.psl, value));
        }

        None
    }
}
