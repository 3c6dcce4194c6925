// Combinator laws checked against std iterators.
//
// Each property builds the same pipeline twice: once with Iterable
// combinators over a borrowed Vec, once with the equivalent std adapters,
// and compares the produced sequences.
use chained_collections::{source, Cursor, HashSet, Iterable, Set};
use proptest::prelude::*;

fn small_vec() -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(-50i32..50, 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn map_fusion(xs in small_vec(), a in -5i32..5, b in -5i32..5) {
        let f = move |x: &i32| x * a;
        let g = move |x: &i32| x + b;
        let stepwise = (&xs).map(f).map(g).to_vec();
        let fused = (&xs).map(move |x| g(&f(x))).to_vec();
        prop_assert_eq!(stepwise, fused);
    }

    #[test]
    fn filter_fusion(xs in small_vec(), m in 1i32..5, t in -50i32..50) {
        let p = move |x: &i32| x % m == 0;
        let q = move |x: &i32| *x > t;
        let stepwise = (&xs).filter(p).filter(q).to_vec();
        let fused = (&xs).filter(move |x| p(x) && q(x)).to_vec();
        prop_assert_eq!(&stepwise, &fused);
        let expected: Vec<i32> = xs.iter().copied().filter(|x| p(x) && q(x)).collect();
        prop_assert_eq!(stepwise, expected);
    }

    #[test]
    fn concat_is_append(xs in small_vec(), ys in small_vec()) {
        let joined = (&xs).concat(&ys).to_vec();
        let expected: Vec<i32> = xs.iter().chain(ys.iter()).copied().collect();
        prop_assert_eq!(joined, expected);
    }

    #[test]
    fn zip_length_is_the_minimum(xs in small_vec(), ys in small_vec()) {
        let zipped = (&xs).zip(&ys);
        prop_assert_eq!(zipped.count(), xs.len().min(ys.len()));
        let expected: Vec<(i32, i32)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        prop_assert_eq!(zipped.to_vec(), expected);
    }

    #[test]
    fn flat_map_matches_std(xss in proptest::collection::vec(small_vec(), 0..8)) {
        let flat = (&xss).flat_map(|xs| source(xs.clone())).to_vec();
        let expected: Vec<i32> = xss.iter().flatten().copied().collect();
        prop_assert_eq!(flat, expected);
    }

    #[test]
    fn reversed_twice_is_identity(xs in small_vec()) {
        let once = (&xs).reversed().to_vec();
        let mut expected = xs.clone();
        expected.reverse();
        prop_assert_eq!(&once, &expected);
        prop_assert_eq!((&xs).reversed().reversed().to_vec(), xs);
    }

    #[test]
    fn folds_agree_with_std(xs in small_vec()) {
        let left = (&xs).fold_left(Vec::new(), |mut acc, x| { acc.push(*x); acc });
        prop_assert_eq!(&left, &xs);
        let right = (&xs).fold_right(Vec::new(), |x, mut acc| { acc.push(*x); acc });
        let mut rev = xs.clone();
        rev.reverse();
        prop_assert_eq!(right, rev);
        prop_assert_eq!((&xs).reduce(|a, b| a.wrapping_add(b)).ok(), xs.iter().copied().reduce(i32::wrapping_add));
    }

    // Single-pass law: once `advance` reports exhaustion it keeps doing so.
    #[test]
    fn exhausted_cursors_stay_exhausted(xs in small_vec(), ys in small_vec(), extra in 1usize..5) {
        let pipeline = (&xs)
            .filter(|x| x % 2 == 0)
            .concat(&ys)
            .zip_with(&xs, |a, b| a - b)
            .flat_map(|d| source(0..d.rem_euclid(3)));
        let mut cursor = pipeline.new_cursor();
        let mut n = 0;
        while cursor.advance() {
            n += 1;
        }
        for _ in 0..extra {
            prop_assert!(!cursor.advance());
        }
        prop_assert_eq!(n, pipeline.count());
    }

    #[test]
    fn union_matches_std_set_union(xs in small_vec(), ys in small_vec()) {
        let a: HashSet<i32> = xs.iter().copied().collect();
        let b: HashSet<i32> = ys.iter().copied().collect();
        let mut keys = a.union(&b).keys().to_vec();
        let n = keys.len();
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys.len(), n, "union emitted a key twice");

        let mut expected: Vec<i32> = xs.iter().chain(ys.iter()).copied().collect();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn intersect_matches_std(xs in small_vec(), ys in small_vec()) {
        let a: HashSet<i32> = xs.iter().copied().collect();
        let b: HashSet<i32> = ys.iter().copied().collect();
        let mut keys = a.intersect(&b).keys().to_vec();
        keys.sort_unstable();
        let sa: std::collections::BTreeSet<i32> = xs.iter().copied().collect();
        let sb: std::collections::BTreeSet<i32> = ys.iter().copied().collect();
        let expected: Vec<i32> = sa.intersection(&sb).copied().collect();
        prop_assert_eq!(keys, expected);
    }
}
