#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can reach
// the internal diagnostics (capacity/threshold and the invariant walker).

use crate::chained_hash_map::ChainedHashMap;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, the pool shrinks, and op lists shrink in length. The pool is large
// enough that long sequences push the table through at least one doubling.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Mutate(usize, i32),
    Contains(String),
    Clear,
    Reset,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            8 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            3 => idx.clone().prop_map(Op::Remove),
            4 => idx.clone().prop_map(Op::Get),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,6}".prop_map(|s| s)
            ]
            .prop_map(Op::Contains),
            1 => Just(Op::Clear),
            1 => Just(Op::Reset),
        ];
        proptest::collection::vec(op, 1..100).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `insert` returns the displaced value exactly when the model says the key
//   was present; `remove`/`get`/`get_mut`/`contains_key` agree with the model.
// - `len`/`is_empty` match the model after every operation.
// - `clear` keeps the current capacity, `reset` restores the default 16/12.
// - The structural walk (power-of-two capacity, node-in-correct-bucket,
//   reachable count == len) holds after every operation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashMap<String, i32> = ChainedHashMap::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let k = pool[i].clone();
                    let displaced = sut.insert(k.clone(), v);
                    let expected = model.insert(k, v);
                    prop_assert_eq!(displaced, expected);
                }
                Op::Remove(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.remove(k), model.remove(k));
                }
                Op::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k));
                }
                Op::Mutate(i, delta) => {
                    let k = &pool[i];
                    let mutated = sut.get_mut(k).map(|v| {
                        *v = v.wrapping_add(delta);
                        *v
                    });
                    let expected = model.get_mut(k).map(|v| {
                        *v = v.wrapping_add(delta);
                        *v
                    });
                    prop_assert_eq!(mutated, expected);
                }
                Op::Contains(k) => {
                    prop_assert_eq!(sut.contains_key(k.as_str()), model.contains_key(&k));
                }
                Op::Clear => {
                    let capacity_before = sut.capacity();
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), capacity_before);
                }
                Op::Reset => {
                    sut.reset();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), 16);
                    prop_assert_eq!(sut.threshold(), 12);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            sut.assert_invariants();
        }

        // Final sweep: every pool key agrees between map and model.
        for k in &pool {
            prop_assert_eq!(sut.get(k), model.get(k));
        }
    }

    // Property: sequential dense inserts reach the capacities the growth
    // policy dictates, and every key stays retrievable afterwards.
    #[test]
    fn prop_dense_inserts_grow_in_lockstep(count in 0usize..200) {
        let mut sut: ChainedHashMap<usize, usize> = ChainedHashMap::new();
        for i in 0..count {
            sut.insert(i, i);
            // Doubling happens exactly when the count first exceeds the
            // threshold, so the count can never be left above it.
            prop_assert!(sut.len() <= sut.threshold());
        }
        let mut expected_capacity = 16usize;
        while count > expected_capacity * 3 / 4 {
            expected_capacity *= 2;
        }
        prop_assert_eq!(sut.capacity(), expected_capacity);
        for i in 0..count {
            prop_assert_eq!(sut.get(&i), Some(&i));
        }
        sut.assert_invariants();
    }
}
