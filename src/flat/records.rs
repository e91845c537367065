// Copyright (c) 2025-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::header::{Header, META_OFFSET};
use crate::{
    coding::{Decode, Encode},
    meta::EMPTY_PSL,
    probe::SlotArray,
    Error, FormatVersion, TableMeta,
};
use byteorder::{ByteOrder, LittleEndian};
use std::ops::Range;

const PSL_LEN: usize = std::mem::size_of::<u32>();

/// Backing memory of a flat table
pub enum Buffer<'a> {
    /// Allocated (or handed over) to the table, freed on drop
    Owned(Box<[u8]>),

    /// Supplied by the caller, who stays responsible for it
    Borrowed(&'a mut [u8]),
}

impl std::ops::Deref for Buffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Owned(bytes) => bytes,
            Self::Borrowed(bytes) => bytes,
        }
    }
}

impl std::ops::DerefMut for Buffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Self::Owned(bytes) => bytes,
            Self::Borrowed(bytes) => bytes,
        }
    }
}

/// Header followed by `table_size` records of `psl: u32` + `N` value bytes
///
/// Every record range is checked against the buffer length once, on creation.
pub struct Records<'a, const N: usize> {
    buffer: Buffer<'a>,

    /// Exact byte length of header + records
    size: usize,
}

impl<'a, const N: usize> Records<'a, N> {
    pub const RECORD_SIZE: usize = PSL_LEN + N;

    /// Returns the value size as stored in the header.
    pub fn value_size() -> crate::Result<u32> {
        u32::try_from(N).map_err(|_| Error::CapacityOverflow)
    }

    /// Calculates the byte length of a buffer holding `table_size` records.
    pub fn byte_size(table_size: u32) -> u64 {
        u64::from(table_size)
            .saturating_mul(Self::RECORD_SIZE as u64)
            .saturating_add(Header::serialized_len() as u64)
    }

    /// Allocates and initializes a buffer with all slots empty.
    pub fn allocate(meta: TableMeta) -> crate::Result<Self> {
        let header = Header {
            version: FormatVersion::V1,
            value_size: Self::value_size()?,
            meta,
        };

        let size = usize::try_from(Self::byte_size(meta.table_size))
            .map_err(|_| Error::CapacityOverflow)?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| Error::AllocationFailed { bytes: size })?;
        bytes.resize(size, 0);

        header.encode_into(&mut &mut bytes[..])?;

        let mut records = Self {
            buffer: Buffer::Owned(bytes.into_boxed_slice()),
            size,
        };

        for slot in 0..meta.table_size {
            records.set_psl(slot, EMPTY_PSL);
        }

        Ok(records)
    }

    /// Attaches to a buffer holding a previously built table.
    pub fn open(buffer: Buffer<'a>) -> crate::Result<Self> {
        let got = buffer.len() as u64;

        if got < Header::serialized_len() as u64 {
            return Err(Error::BufferTooSmall {
                needed: Header::serialized_len() as u64,
                got,
            });
        }

        let header = Header::decode_from(&mut &buffer[..])?;

        let expected = Self::value_size()?;
        if header.value_size != expected {
            return Err(Error::ValueSizeMismatch {
                expected,
                got: header.value_size,
            });
        }

        let meta = header.meta;

        let needed = Self::byte_size(meta.table_size);
        if got < needed {
            return Err(Error::BufferTooSmall { needed, got });
        }

        if meta.table_size == 0
            || meta.table_size == EMPTY_PSL
            || meta.key_num > meta.max_key_num
            || meta.max_key_num > meta.table_size
            || meta.lpsl >= meta.table_size
        {
            return Err(Error::InvalidHeader("table metadata"));
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "needed is at most the buffer length"
        )]
        let size = needed as usize;

        let records = Self { buffer, size };

        // NOTE: A zero-filled record area reads as all slots occupied at PSL 0,
        // which would leave inserts without a vacant slot to end on
        let mut occupied = 0u64;

        for (_, psl, _) in records.iter() {
            if psl > meta.lpsl {
                return Err(Error::InvalidHeader("records"));
            }
            occupied += 1;
        }

        if occupied != u64::from(meta.key_num) {
            return Err(Error::InvalidHeader("records"));
        }

        Ok(records)
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self.buffer, Buffer::Borrowed(_))
    }

    /// Returns the header and records, without any trailing bytes of a
    /// larger borrowed buffer.
    #[expect(
        clippy::indexing_slicing,
        reason = "size is validated against the buffer length on creation"
    )]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.size]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn iter(&self) -> Iter<'_> {
        #[expect(
            clippy::indexing_slicing,
            reason = "size is validated against the buffer length on creation"
        )]
        let records = &self.buffer[Header::serialized_len()..self.size];

        Iter {
            inner: records.chunks_exact(Self::RECORD_SIZE).enumerate(),
        }
    }

    fn record_start(slot: u32) -> usize {
        Header::serialized_len() + slot as usize * Self::RECORD_SIZE
    }

    fn psl_range(slot: u32) -> Range<usize> {
        let start = Self::record_start(slot);
        start..start + PSL_LEN
    }

    fn value_range(slot: u32) -> Range<usize> {
        let start = Self::record_start(slot) + PSL_LEN;
        start..start + N
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "slot indices are always reduced modulo the validated table size"
    )]
    fn set_psl(&mut self, slot: u32, psl: u32) {
        LittleEndian::write_u32(&mut self.buffer[Self::psl_range(slot)], psl);
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "the header length is validated on creation"
    )]
    fn meta_bytes(&self) -> &[u8] {
        &self.buffer[META_OFFSET..Header::serialized_len()]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "the header length is validated on creation"
    )]
    fn meta_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[META_OFFSET..Header::serialized_len()]
    }
}

#[expect(
    clippy::indexing_slicing,
    reason = "slot indices are always reduced modulo the validated table size"
)]
impl<const N: usize> SlotArray for Records<'_, N> {
    type Value = [u8];
    type Record = [u8; N];

    fn meta(&self) -> TableMeta {
        let bytes = self.meta_bytes();

        TableMeta {
            key_num: LittleEndian::read_u32(&bytes[0..4]),
            lpsl: LittleEndian::read_u32(&bytes[4..8]),
            max_key_num: LittleEndian::read_u32(&bytes[8..12]),
            table_size: LittleEndian::read_u32(&bytes[12..16]),
        }
    }

    fn set_meta(&mut self, meta: TableMeta) {
        let bytes = self.meta_bytes_mut();

        LittleEndian::write_u32(&mut bytes[0..4], meta.key_num);
        LittleEndian::write_u32(&mut bytes[4..8], meta.lpsl);
        LittleEndian::write_u32(&mut bytes[8..12], meta.max_key_num);
        LittleEndian::write_u32(&mut bytes[12..16], meta.table_size);
    }

    fn psl(&self, slot: u32) -> u32 {
        LittleEndian::read_u32(&self.buffer[Self::psl_range(slot)])
    }

    fn value(&self, slot: u32) -> &[u8] {
        &self.buffer[Self::value_range(slot)]
    }

    fn value_mut(&mut self, slot: u32) -> &mut [u8] {
        &mut self.buffer[Self::value_range(slot)]
    }

    fn record_value(record: &[u8; N]) -> &[u8] {
        record
    }

    fn claim(&mut self, slot: u32, psl: u32, record: [u8; N]) {
        debug_assert_eq!(EMPTY_PSL, self.psl(slot), "slot should be vacant");

        self.buffer[Self::value_range(slot)].copy_from_slice(&record);
        self.set_psl(slot, psl);
    }

    fn swap(&mut self, slot: u32, psl: &mut u32, record: &mut [u8; N]) {
        let resident_psl = self.psl(slot);
        debug_assert_ne!(EMPTY_PSL, resident_psl, "slot should be occupied");

        self.set_psl(slot, *psl);
        *psl = resident_psl;

        self.buffer[Self::value_range(slot)].swap_with_slice(record);
    }

    fn shift_back(&mut self, from: u32, to: u32) {
        let psl = self.psl(from);
        debug_assert!(psl != EMPTY_PSL && psl > 0);

        self.buffer
            .copy_within(Self::value_range(from), Self::value_range(to).start);

        self.set_psl(to, psl - 1);
        self.set_psl(from, EMPTY_PSL);
    }

    fn take(&mut self, slot: u32) -> [u8; N] {
        let mut record = [0; N];
        record.copy_from_slice(&self.buffer[Self::value_range(slot)]);

        self.set_psl(slot, EMPTY_PSL);

        record
    }
}

/// Iterator over the occupied records of a flat table, in slot order
///
/// Yields `(slot, psl, value)`.
pub struct Iter<'a> {
    inner: std::iter::Enumerate<std::slice::ChunksExact<'a, u8>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (u32, u32, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, record) in self.inner.by_ref() {
            let (psl, value) = record.split_at(PSL_LEN);
            let psl = LittleEndian::read_u32(psl);

            if psl == EMPTY_PSL {
                continue;
            }

            #[expect(
                clippy::cast_possible_truncation,
                reason = "the table size is bounded by u32"
            )]
            let idx = idx as u32;

            return Some((idx, psl, value));
        }

        None
    }
}
