mod common;

use rand::{rngs::StdRng, Rng, SeedableRng};
use robin_hood_table::RobinHoodSet;
use std::collections::HashSet;
use test_log::test;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";

fn random_strings(rng: &mut StdRng, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let len = rng.random_range(1..=32);

            (0..len)
                .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
                .collect()
        })
        .collect()
}

#[test]
fn typed_strings_match_std() -> robin_hood_table::Result<()> {
    const COUNT: usize = 20_000;

    let mut rng = StdRng::seed_from_u64(1_234);

    // NOTE: Short strings repeat, so duplicates are exercised too
    let data = random_strings(&mut rng, COUNT);

    let mut table = RobinHoodSet::<String>::new(COUNT as u32)?;
    let mut std_set = HashSet::new();

    for s in &data {
        assert_eq!(std_set.insert(s.clone()), table.insert(s.clone()).is_inserted());
    }

    assert_eq!(std_set.len(), table.len());
    common::check_invariants(&table);

    for s in &data {
        assert_eq!(Some(s), table.get(s));
    }

    for s in random_strings(&mut rng, 1_000) {
        assert_eq!(std_set.contains(&s), table.contains_key(&s));
    }

    Ok(())
}
