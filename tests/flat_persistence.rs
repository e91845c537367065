use robin_hood_table::{ByteRange, Config, Error, FlatTable};
use test_log::test;

const RECORD: usize = 16;

fn record(key: u64) -> [u8; RECORD] {
    let mut record = [0; RECORD];
    record[..8].copy_from_slice(&key.to_be_bytes());
    record[8..].copy_from_slice(&key.wrapping_mul(key).to_le_bytes());
    record
}

fn build() -> robin_hood_table::Result<FlatTable<'static, RECORD>> {
    let mut table = FlatTable::<RECORD>::with_config(Config::new(1_000), ByteRange::prefix(8))?;

    for key in 0..1_000u64 {
        assert!(table.insert(&record(key)).is_inserted());
    }
    for key in (0..1_000u64).step_by(7) {
        assert!(table.remove(&key.to_be_bytes()).is_some());
    }

    Ok(table)
}

#[test]
fn flat_persist_and_attach() -> robin_hood_table::Result<()> {
    let table = build()?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.rht");
    std::fs::write(&path, table.as_bytes())?;

    let snapshot = table.as_bytes().to_vec();
    let mut bytes = std::fs::read(&path)?;
    assert_eq!(table.size(), bytes.len());

    let attached = FlatTable::<RECORD>::attach(&mut bytes, ByteRange::prefix(8))?;
    assert!(attached.is_borrowed());
    assert_eq!(table.meta(), attached.meta());
    assert_eq!(table.checksum(), attached.checksum());

    for key in 0..1_100u64 {
        let lookup = key.to_be_bytes();
        assert_eq!(table.get(&lookup), attached.get(&lookup));
    }

    drop(attached);

    // Lookups never write to the buffer
    assert_eq!(snapshot, bytes);
    assert_eq!(snapshot, table.as_bytes());

    Ok(())
}

#[test]
fn flat_persist_and_take_ownership() -> robin_hood_table::Result<()> {
    let table = build()?;
    let checksum = table.checksum();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.rht");
    std::fs::write(&path, table.as_bytes())?;

    let mut reopened =
        FlatTable::<RECORD>::from_vec(std::fs::read(&path)?, ByteRange::prefix(8))?;
    assert!(!reopened.is_borrowed());
    assert_eq!(checksum, reopened.checksum());

    // The reopened table keeps working as a regular table
    for key in (0..1_000u64).step_by(7) {
        assert!(reopened.insert(&record(key)).is_inserted());
    }
    assert_eq!(1_000, reopened.len());
    assert!(reopened.insert(&record(5_000)).is_full());

    for key in 0..1_000u64 {
        assert_eq!(Some(&record(key)[..]), reopened.get(&key.to_be_bytes()));
    }

    Ok(())
}

#[test]
fn flat_attach_checked_detects_corruption() -> robin_hood_table::Result<()> {
    let table = build()?;
    let checksum = table.checksum();

    let mut bytes = table.as_bytes().to_vec();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(matches!(
        FlatTable::<RECORD>::attach_checked(&mut bytes, ByteRange::prefix(8), checksum),
        Err(Error::ChecksumMismatch { .. }),
    ));

    Ok(())
}

#[test]
fn flat_attach_rejects_other_record_size() -> robin_hood_table::Result<()> {
    let table = build()?;
    let mut bytes = table.as_bytes().to_vec();

    assert!(matches!(
        FlatTable::<8>::attach(&mut bytes, ByteRange::whole()),
        Err(Error::ValueSizeMismatch {
            expected: 8,
            got: 16
        }),
    ));

    Ok(())
}

#[test]
fn flat_attach_rejects_garbage() {
    let mut bytes = vec![0xAB; 256];

    assert!(matches!(
        FlatTable::<RECORD>::attach(&mut bytes, ByteRange::whole()),
        Err(Error::InvalidHeader(_)),
    ));

    let mut bytes = vec![0; 3];

    assert!(matches!(
        FlatTable::<RECORD>::attach(&mut bytes, ByteRange::whole()),
        Err(Error::BufferTooSmall { needed: 24, got: 3 }),
    ));
}

#[test]
fn flat_attach_rejects_uninitialized_records() -> robin_hood_table::Result<()> {
    let table = FlatTable::<8>::new(4)?;

    // Header written, record area never initialized
    let mut bytes = table.as_bytes().to_vec();
    bytes[24..].fill(0);

    assert!(matches!(
        FlatTable::<8>::attach(&mut bytes, ByteRange::whole()),
        Err(Error::InvalidHeader("records")),
    ));

    // An intact copy still attaches and accepts inserts
    let mut bytes = table.as_bytes().to_vec();
    let mut attached = FlatTable::<8>::attach(&mut bytes, ByteRange::whole())?;
    assert!(attached.insert(&[1; 8]).is_inserted());
    assert_eq!(Some(&[1; 8][..]), attached.get(&[1; 8]));

    Ok(())
}
