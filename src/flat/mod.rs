// Copyright (c) 2025-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Flat record table
//!
//! The whole table lives in one contiguous buffer, so it can be written to
//! disk or placed in shared memory as-is, and attached to again later.
//!
//! ```text
//! [magic "RHT"] [version u8] [value_size u32]
//! [key_num u32] [lpsl u32] [max_key_num u32] [table_size u32]
//! [psl u32] [value; N]   <- slot 0
//! [psl u32] [value; N]   <- slot 1
//! ...
//! ```
//!
//! All integers are little-endian. A `psl` of `u32::MAX` marks a vacant slot.

mod header;
mod records;

pub use records::Iter;

use crate::{
    probe::{self, Placement, SlotArray},
    ByteRange, Checksum, Config, Insertion, KeyPolicy, TableMeta,
};
use records::{Buffer, Records};

/// Fixed-capacity Robin Hood hash table over `N`-byte records
///
/// Records are plain bytes, copied in and out of a single buffer that holds
/// the table metadata and all slots. The buffer is either owned by the table,
/// or borrowed from the caller (see [`FlatTable::attach`]), in which case it
/// is never freed by the table.
///
/// The table never grows: once it holds `max_key_num` keys, inserting
/// another key returns [`Insertion::Full`].
pub struct FlatTable<'a, const N: usize, P = ByteRange> {
    records: Records<'a, N>,
    policy: P,
}

impl<const N: usize, P: KeyPolicy<[u8]> + Default> FlatTable<'static, N, P> {
    /// Creates a table holding at most `max_key_num` records, with the
    /// default load factor.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot be allocated.
    pub fn new(max_key_num: u32) -> crate::Result<Self> {
        Self::with_config(Config::new(max_key_num), P::default())
    }
}

impl<const N: usize, P: KeyPolicy<[u8]>> FlatTable<'static, N, P> {
    /// Creates a table with an owned buffer from a config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, or the buffer cannot
    /// be allocated.
    pub fn with_config(config: Config, policy: P) -> crate::Result<Self> {
        let table_size = config.table_size()?;

        let records = Records::allocate(TableMeta::new(config.max_key_num, table_size))?;

        log::debug!(
            "Creating flat table with {table_size} slots of {} bytes for {} keys ({} bytes)",
            Records::<N>::RECORD_SIZE,
            config.max_key_num,
            records.size(),
        );

        Ok(Self { records, policy })
    }

    /// Takes ownership of a buffer holding a previously built table,
    /// for example one read back from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer does not hold a valid table
    /// with `N`-byte records.
    pub fn from_vec(bytes: Vec<u8>, policy: P) -> crate::Result<Self> {
        Self::open(Buffer::Owned(bytes.into_boxed_slice()), policy)
    }
}

impl<'a, const N: usize, P: KeyPolicy<[u8]>> FlatTable<'a, N, P> {
    /// Attaches to a caller-owned buffer holding a previously built table,
    /// for example a copy of [`FlatTable::as_bytes`] or shared memory.
    ///
    /// The table reads and writes the buffer in place, but never frees it.
    /// Bytes past [`FlatTable::size`] are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is smaller than its header declares,
    /// or does not hold a valid table with `N`-byte records.
    pub fn attach(buffer: &'a mut [u8], policy: P) -> crate::Result<Self> {
        Self::open(Buffer::Borrowed(buffer), policy)
    }

    /// Attaches to a caller-owned buffer, verifying it against a checksum
    /// previously taken with [`FlatTable::checksum`].
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is invalid, or its checksum does not match.
    pub fn attach_checked(
        buffer: &'a mut [u8],
        policy: P,
        expected: Checksum,
    ) -> crate::Result<Self> {
        let table = Self::attach(buffer, policy)?;
        table.checksum().check(expected)?;
        Ok(table)
    }

    fn open(buffer: Buffer<'a>, policy: P) -> crate::Result<Self> {
        let records = Records::open(buffer)
            .inspect_err(|e| log::warn!("Rejected flat table buffer: {e}"))?;

        let meta = records.meta();

        log::debug!(
            "Attached flat table with {}/{} keys in {} slots",
            meta.key_num,
            meta.max_key_num,
            meta.table_size,
        );

        Ok(Self { records, policy })
    }

    /// Inserts a record, unless its key is already stored or the table is full.
    ///
    /// On success, returns the stored record bytes.
    /// If the key already exists, returns the existing record bytes.
    pub fn insert(&mut self, value: &[u8; N]) -> Insertion<&mut [u8], [u8; N]> {
        match probe::insert(&mut self.records, &self.policy, *value) {
            Placement::Inserted(slot) => Insertion::Inserted(self.records.value_mut(slot)),
            Placement::Exists(slot) => Insertion::Exists(self.records.value_mut(slot)),
            Placement::Full(value) => Insertion::Full(value),
        }
    }

    /// Retrieves the record stored under `key`.
    #[must_use]
    pub fn get(&self, key: &P::Key) -> Option<&[u8]> {
        probe::find(&self.records, &self.policy, key).map(|slot| self.records.value(slot))
    }

    /// Retrieves the record stored under `key`.
    ///
    /// The bytes the key is extracted from must not be changed.
    pub fn get_mut(&mut self, key: &P::Key) -> Option<&mut [u8]> {
        probe::find(&self.records, &self.policy, key).map(|slot| self.records.value_mut(slot))
    }

    /// Returns `true` if `key` is stored.
    #[must_use]
    pub fn contains_key(&self, key: &P::Key) -> bool {
        probe::find(&self.records, &self.policy, key).is_some()
    }

    /// Removes the record stored under `key`, returning a copy of it.
    ///
    /// Does nothing if the key is not stored.
    pub fn remove(&mut self, key: &P::Key) -> Option<[u8; N]> {
        probe::remove(&mut self.records, &self.policy, key)
    }

    /// Visits all records in slot order, passing `(slot, psl, record)`.
    ///
    /// Stops as soon as `f` returns `false`.
    pub fn for_each<F: FnMut(u32, u32, &[u8]) -> bool>(&self, f: F) {
        probe::for_each(&self.records, f);
    }

    /// Visits all records in slot order, passing `(slot, psl, record)`.
    ///
    /// Stops as soon as `f` returns `false`.
    /// The bytes keys are extracted from must not be changed.
    pub fn for_each_mut<F: FnMut(u32, u32, &mut [u8]) -> bool>(&mut self, f: F) {
        probe::for_each_mut(&mut self.records, f);
    }

    /// Returns the key policy.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<const N: usize, P> FlatTable<'_, N, P> {
    /// Iterates over `(slot, psl, record)` of all records, in slot order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        self.records.iter()
    }

    /// Returns the raw table bytes, header included.
    ///
    /// The bytes can be persisted or shared, and attached to again with
    /// [`FlatTable::attach`] or [`FlatTable::from_vec`].
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.records.as_bytes()
    }

    /// Returns the exact byte length of [`FlatTable::as_bytes`].
    #[must_use]
    pub fn size(&self) -> usize {
        self.records.size()
    }

    /// Computes the checksum of [`FlatTable::as_bytes`].
    #[must_use]
    pub fn checksum(&self) -> Checksum {
        Checksum::of(self.as_bytes())
    }

    /// Returns `true` if the buffer is owned by the caller.
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        self.records.is_borrowed()
    }

    /// Returns the occupancy metadata.
    #[must_use]
    pub fn meta(&self) -> TableMeta {
        self.records.meta()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meta().key_num as usize
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meta().key_num == 0
    }

    /// Returns the maximum number of records.
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

impl<const N: usize, P> std::fmt::Debug for FlatTable<'_, N, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatTable")
            .field("value_size", &N)
            .field("borrowed", &self.is_borrowed())
            .field("meta", &self.meta())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use test_log::test;

    /// Keys 4-byte little-endian integers by their value, so slot positions are predictable
    #[derive(Default)]
    struct IntKey;

    impl KeyPolicy<[u8]> for IntKey {
        type Key = [u8];

        fn extract<'a>(&self, value: &'a [u8]) -> &'a [u8] {
            value
        }

        fn hash(&self, key: &[u8]) -> u64 {
            let mut buf = [0; 4];
            buf.copy_from_slice(key);
            u64::from(u32::from_le_bytes(buf))
        }

        fn key_eq(&self, a: &[u8], b: &[u8]) -> bool {
            a == b
        }
    }

    fn int(value: u32) -> [u8; 4] {
        value.to_le_bytes()
    }

    fn layout(table: &FlatTable<'_, 4, IntKey>) -> Vec<(u32, u32, u32)> {
        table
            .iter()
            .map(|(slot, psl, v)| {
                let mut buf = [0; 4];
                buf.copy_from_slice(v);
                (slot, psl, u32::from_le_bytes(buf))
            })
            .collect()
    }

    #[test]
    fn flat_scenario() -> crate::Result<()> {
        let mut table = FlatTable::<4, IntKey>::new(10)?;

        for key in [12, 24, 37, 36, 15, 27, 0] {
            let inserted = table.insert(&int(key));
            assert_eq!(Insertion::Inserted(&mut int(key)[..]), inserted);
        }

        assert_eq!(
            vec![
                (0, 0, 12),
                (1, 1, 24),
                (2, 2, 36),
                (3, 3, 0),
                (4, 3, 37),
                (5, 2, 27),
                (6, 3, 15),
            ],
            layout(&table),
        );

        for key in [24, 12, 36] {
            assert_eq!(Some(int(key)), table.remove(&int(key)));
        }

        for key in [24, 12, 36] {
            assert!(table.get(&int(key)).is_none());
        }

        assert!(table.insert(&int(48)).is_inserted());
        assert_eq!(5, table.len());
        assert_eq!(
            vec![(0, 0, 0), (1, 1, 48), (2, 1, 37), (3, 0, 27), (4, 1, 15)],
            layout(&table),
        );

        for key in [37, 15, 27, 0, 48] {
            assert_eq!(Some(&int(key)[..]), table.get(&int(key)));
        }

        Ok(())
    }

    #[test]
    fn flat_prefix_key() -> crate::Result<()> {
        let mut table = FlatTable::<8, _>::with_config(Config::new(10), ByteRange::prefix(4))?;

        assert!(table.insert(b"abcd1234").is_inserted());
        assert!(!table.insert(b"abcd5678").is_inserted());
        assert!(table.insert(b"efgh5678").is_inserted());

        assert_eq!(Some(&b"abcd1234"[..]), table.get(b"abcd"));
        assert_eq!(Some(&b"efgh5678"[..]), table.get(b"efgh"));

        if let Some(record) = table.get_mut(b"abcd") {
            record[4..].copy_from_slice(b"0000");
        }
        assert_eq!(Some(&b"abcd0000"[..]), table.get(b"abcd"));

        assert_eq!(Some(*b"abcd0000"), table.remove(b"abcd"));
        assert!(!table.contains_key(b"abcd"));

        Ok(())
    }

    #[test]
    fn flat_capacity_ceiling() -> crate::Result<()> {
        let mut table = FlatTable::<4, IntKey>::new(3)?;

        for key in 0..3 {
            assert!(table.insert(&int(key)).is_inserted());
        }

        let before = table.as_bytes().to_vec();

        assert_eq!(Insertion::Full(int(3)), table.insert(&int(3)));
        assert_eq!(Insertion::Exists(&mut int(1)[..]), table.insert(&int(1)));

        assert_eq!(before, table.as_bytes());

        Ok(())
    }

    #[test]
    fn flat_attach_borrowed() -> crate::Result<()> {
        let mut table = FlatTable::<4, IntKey>::new(10)?;

        for key in [12, 24, 37, 36] {
            table.insert(&int(key));
        }

        let mut copy = table.as_bytes().to_vec();

        {
            let mut attached = FlatTable::<4, IntKey>::attach(&mut copy, IntKey)?;
            assert!(attached.is_borrowed());
            assert_eq!(table.meta(), attached.meta());

            for key in [12, 24, 37, 36] {
                assert_eq!(table.get(&int(key)), attached.get(&int(key)));
            }

            // Writes go straight into the borrowed buffer
            attached.remove(&int(24));
        }

        let reattached = FlatTable::<4, IntKey>::attach(&mut copy, IntKey)?;
        assert_eq!(3, reattached.len());
        assert!(reattached.get(&int(24)).is_none());

        // The source table is unaffected
        assert!(table.get(&int(24)).is_some());

        Ok(())
    }

    #[test]
    fn flat_attach_checked() -> crate::Result<()> {
        let mut table = FlatTable::<4, IntKey>::new(10)?;
        table.insert(&int(7));

        let checksum = table.checksum();

        let mut copy = table.as_bytes().to_vec();
        assert!(FlatTable::<4, IntKey>::attach_checked(&mut copy, IntKey, checksum).is_ok());

        table.insert(&int(8));
        let mut copy = table.as_bytes().to_vec();

        assert!(matches!(
            FlatTable::<4, IntKey>::attach_checked(&mut copy, IntKey, checksum),
            Err(Error::ChecksumMismatch { .. }),
        ));

        Ok(())
    }

    #[test]
    fn flat_attach_rejects_short_buffer() -> crate::Result<()> {
        let table = FlatTable::<4, IntKey>::new(10)?;

        let mut copy = table.as_bytes().to_vec();
        copy.truncate(copy.len() - 1);

        assert!(matches!(
            FlatTable::<4, IntKey>::attach(&mut copy, IntKey),
            Err(Error::BufferTooSmall { .. }),
        ));

        Ok(())
    }

    #[test]
    fn flat_from_vec_is_owned() -> crate::Result<()> {
        let mut table = FlatTable::<4, IntKey>::new(10)?;
        table.insert(&int(5));

        let owned = FlatTable::<4, IntKey>::from_vec(table.as_bytes().to_vec(), IntKey)?;
        assert!(!owned.is_borrowed());
        assert_eq!(Some(&int(5)[..]), owned.get(&int(5)));
        assert_eq!(table.size(), owned.size());

        Ok(())
    }
}
