#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can run the
// internal `validate()` check after every operation.

use crate::hash_table::{Handle, HashTable};
use crate::iterable::Iterable;
use crate::strategy::{FnHash, KeyEq, KeyHash, NativeEq, StringHash};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so failing cases shrink toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize, i32),
    Remove(usize),
    Get(usize),
    Locate(usize),
    Mutate(usize, i32),
    Lookup(String),
    Clear,
    Iterate,
}

#[derive(Clone, Debug)]
struct Scenario {
    pool: Vec<String>,
    capacity: usize,
    load_factor: f64,
    ops: Vec<OpI>,
}

fn arb_scenario() -> impl Strategy<Value = Scenario> {
    let sizing = (1usize..=8, proptest::sample::select(vec![0.25, 0.5, 0.75, 1.0]));
    (proptest::collection::vec("[a-z]{0,5}", 1..=10), sizing).prop_flat_map(|(pool, (capacity, load_factor))| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let lookup_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Add(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => idx.clone().prop_map(OpI::Locate),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => prop_oneof![lookup_pool, "[a-z]{0,5}"].prop_map(OpI::Lookup),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| Scenario {
            pool: pool.clone(),
            capacity,
            load_factor,
            ops,
        })
    })
}

// Drives `sut` through the scenario next to a std HashMap model.
// Invariants checked after every op:
// - chain placement, key uniqueness and size parity (`validate`)
// - `len`/`is_empty` parity with the model
// - capacity never shrinks and never falls below `len`
// - tracked handles resolve to their entry; handles of removed entries
//   never resolve again
fn run<E, H>(mut sut: HashTable<String, i32, E, H>, s: Scenario) -> Result<(), TestCaseError>
where
    E: KeyEq<String>,
    H: KeyHash<String>,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut live: HashMap<String, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();
    let mut last_capacity = sut.capacity();

    for op in s.ops {
        match op {
            OpI::Add(i, v) => {
                let k = s.pool[i].clone();
                let prev = sut.add(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k.clone(), v));
                let h = sut.locate(&k).expect("added key is locatable");
                match live.get(&k) {
                    // Replacing a value keeps the entry.
                    Some(&tracked) => {
                        prop_assert_eq!(h, tracked);
                    }
                    None => {
                        live.insert(k, h);
                    }
                }
            }
            OpI::Remove(i) => {
                let k = &s.pool[i];
                let removed = sut.remove(k);
                prop_assert_eq!(removed.map(|(_, v)| v), model.remove(k));
                if let Some(h) = live.remove(k) {
                    stale.push(h);
                }
                prop_assert!(sut.get(k).is_none());
            }
            OpI::Get(i) => {
                let k = &s.pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
            }
            OpI::Locate(i) => {
                let k = &s.pool[i];
                let h = sut.locate(k);
                prop_assert_eq!(h, live.get(k).copied());
                if let Some(h) = h {
                    prop_assert_eq!(h.key(&sut), Some(k));
                    prop_assert_eq!(h.value(&sut), model.get(k));
                }
            }
            OpI::Mutate(i, d) => {
                let k = &s.pool[i];
                if let Some(&h) = live.get(k) {
                    let vr = h.value_mut(&mut sut).expect("live handle resolves");
                    *vr = vr.wrapping_add(d);
                    let mv = model.get_mut(k).expect("live key in model");
                    *mv = mv.wrapping_add(d);
                } else {
                    prop_assert!(sut.get_mut(k).is_none());
                }
            }
            OpI::Lookup(p) => {
                prop_assert_eq!(sut.contains_key(&p), model.contains_key(&p));
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                stale.extend(live.drain().map(|(_, h)| h));
                prop_assert_eq!(sut.capacity(), last_capacity);
            }
            OpI::Iterate => {
                let pairs: Vec<(String, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let unique: BTreeSet<&String> = pairs.iter().map(|(k, _)| k).collect();
                prop_assert_eq!(unique.len(), pairs.len());
                let as_map: HashMap<String, i32> = pairs.into_iter().collect();
                prop_assert_eq!(&as_map, &model);
                prop_assert_eq!(sut.entries().count(), model.len());
            }
        }

        sut.validate();
        for h in &stale {
            prop_assert!(h.value(&sut).is_none());
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() >= last_capacity);
        prop_assert!(sut.capacity() >= sut.len());
        last_capacity = sut.capacity();
    }
    Ok(())
}

fn zero_hash(_: &String) -> i32 {
    0
}

fn negative_hash(k: &String) -> i32 {
    -(StringHash::hash_str(k) & 0x7fff) - 1
}

// Property: state-machine equivalence against std::collections::HashMap
// under the default strategies.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(s in arb_scenario()) {
        let sut = HashTable::new(NativeEq, crate::strategy::DefaultHash::default(), s.capacity, s.load_factor).unwrap();
        run(sut, s)?;
    }
}

// Property: same invariants with every key in one chain, which stresses
// unlinking at the head, middle and tail of a chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions(s in arb_scenario()) {
        let sut = HashTable::new(NativeEq, FnHash(zero_hash as fn(&String) -> i32), s.capacity, s.load_factor).unwrap();
        run(sut, s)?;
    }
}

// Property: same invariants when every hash code is negative.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_negative_hashes(s in arb_scenario()) {
        let sut = HashTable::new(NativeEq, FnHash(negative_hash as fn(&String) -> i32), s.capacity, s.load_factor).unwrap();
        run(sut, s)?;
    }
}

// Property: growth keeps every (key, value) pair reachable through `get`.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_content(keys in proptest::collection::btree_set(any::<u16>(), 0..200)) {
        let mut t = HashTable::new(NativeEq, StringHash, 1, 0.75).unwrap();
        for k in &keys {
            t.add(k.to_string(), u32::from(*k));
        }
        t.validate();
        prop_assert!(t.capacity().is_power_of_two());
        for k in &keys {
            prop_assert_eq!(t.get(&k.to_string()), Some(&u32::from(*k)));
        }
        prop_assert_eq!(t.len(), keys.len());
    }
}
