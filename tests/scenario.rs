use robin_hood_table::{FlatTable, RobinHoodSet};
use test_log::test;

const INSERTED: [u32; 7] = [12, 24, 37, 36, 15, 27, 0];
const REMOVED: [u32; 3] = [24, 12, 36];
const REMAINING: [u32; 5] = [37, 15, 27, 0, 48];

#[test]
fn scenario_typed() -> robin_hood_table::Result<()> {
    let mut table = RobinHoodSet::<u32>::new(10)?;

    for key in INSERTED {
        assert!(table.insert(key).is_inserted());
    }

    for key in INSERTED {
        assert_eq!(Some(&key), table.get(&key));
    }

    for key in REMOVED {
        table.remove(&key);
    }

    for key in REMOVED {
        assert!(table.get(&key).is_none());
    }

    for key in [37, 15, 27, 0] {
        assert_eq!(Some(&key), table.get(&key));
    }

    assert!(table.insert(48).is_inserted());
    assert_eq!(5, table.len());

    for key in REMAINING {
        assert_eq!(Some(&key), table.get(&key));
    }

    Ok(())
}

#[test]
fn scenario_flat() -> robin_hood_table::Result<()> {
    let mut table = FlatTable::<4>::new(10)?;

    for key in INSERTED {
        assert!(table.insert(&key.to_le_bytes()).is_inserted());
    }

    for key in INSERTED {
        assert_eq!(Some(&key.to_le_bytes()[..]), table.get(&key.to_le_bytes()));
    }

    for key in REMOVED {
        table.remove(&key.to_le_bytes());
    }

    for key in REMOVED {
        assert!(table.get(&key.to_le_bytes()).is_none());
    }

    assert!(table.insert(&48u32.to_le_bytes()).is_inserted());
    assert_eq!(5, table.len());

    for key in REMAINING {
        assert_eq!(Some(&key.to_le_bytes()[..]), table.get(&key.to_le_bytes()));
    }

    Ok(())
}

#[test]
fn scenario_remove_absent_is_noop() -> robin_hood_table::Result<()> {
    let mut table = RobinHoodSet::<u32>::new(10)?;

    for key in INSERTED {
        table.insert(key);
    }

    let before = table.iter().map(|(slot, psl, v)| (slot, psl, *v)).collect::<Vec<_>>();

    assert!(table.remove(&1_000).is_none());

    let after = table.iter().map(|(slot, psl, v)| (slot, psl, *v)).collect::<Vec<_>>();
    assert_eq!(before, after);
    assert_eq!(7, table.len());

    Ok(())
}
