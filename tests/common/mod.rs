use robin_hood_table::{KeyPolicy, TypedTable};

/// Checks the structural Robin Hood invariants of a typed table:
///
/// - every entry sits exactly `psl` slots past its home slot
/// - no entry's PSL exceeds the recorded longest PSL
/// - an entry with PSL `p > 0` follows an entry with PSL `>= p - 1`
/// - traversal visits exactly `len()` entries
pub fn check_invariants<V, P: KeyPolicy<V>>(table: &TypedTable<V, P>) {
    let meta = table.meta();
    let table_size = u64::from(meta.table_size);

    let entries = table
        .iter()
        .map(|(slot, psl, value)| {
            let hash = table.policy().hash(table.policy().extract(value));
            (slot, psl, hash % table_size)
        })
        .collect::<Vec<_>>();

    assert_eq!(meta.key_num as usize, entries.len());
    assert_eq!(table.len(), entries.len());

    let mut psls = vec![None; meta.table_size as usize];

    for &(slot, psl, home) in &entries {
        let distance = (u64::from(slot) + table_size - home) % table_size;
        assert_eq!(distance, u64::from(psl), "slot {slot} is not {psl} past its home");
        assert!(psl <= meta.lpsl, "slot {slot} exceeds longest PSL");

        psls[slot as usize] = Some(psl);
    }

    for &(slot, psl, _) in &entries {
        if psl == 0 {
            continue;
        }

        let prev = (u64::from(slot) + table_size - 1) % table_size;
        let prev_psl = psls[prev as usize].expect("predecessor of a displaced entry should be occupied");

        assert!(prev_psl + 1 >= psl, "slot {slot} is poorer than its predecessor allows");
    }
}
