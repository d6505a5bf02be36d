use fnv::FnvHashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dominance::DominanceIndex;

/// A brute-force multiset of pairs to check the index against.
#[derive(Default)]
struct Oracle {
    pairs: FnvHashMap<(u64, u64), usize>,
}

impl Oracle {
    fn insert(&mut self, a: u64, b: u64) {
        *self.pairs.entry((a, b)).or_insert(0) += 1;
    }
    fn remove(&mut self, a: u64, b: u64) -> bool {
        match self.pairs.get(&(a, b)).cloned() {
            Some(count) if count > 1 => {
                self.pairs.insert((a, b), count - 1);
                true
            }
            Some(_) => self.pairs.remove(&(a, b)).is_some(),
            None => false,
        }
    }
    fn len(&self) -> usize {
        self.pairs.values().sum()
    }
    fn exists_dominating(&self, a: u64, b: u64) -> bool {
        self.pairs.keys().any(|&(x, y)| x >= a && y >= b)
    }
    fn min_volume_dominating(&self, a: u64, b: u64) -> Option<(u64, u64)> {
        self.pairs.keys()
            .filter(|&&(x, y)| x >= a && y >= b)
            .min_by_key(|&&(x, y)| (u128::from(x) * u128::from(y), x, y))
            .cloned()
    }
}

fn answers(index: &DominanceIndex, range: u64) -> Vec<(bool, Option<(u64, u64)>)> {
    let mut result = Vec::new();
    for a in 0 .. range {
        for b in 0 .. range {
            result.push((index.exists_dominating(a, b), index.min_volume_dominating(a, b)));
        }
    }
    result
}

#[test]
fn equal_volumes_resolve_to_smaller_a() {
    let mut index = DominanceIndex::new();
    index.insert(2, 3).unwrap();
    index.insert(3, 2).unwrap();
    assert!(index.exists_dominating(2, 2));
    assert_eq!(index.min_volume_dominating(2, 2), Some((2, 3)));
}

#[test]
fn removed_pair_no_longer_dominates() {
    let mut index = DominanceIndex::new();
    index.insert(5, 5).unwrap();
    assert!(index.remove(5, 5));
    assert!(!index.exists_dominating(1, 1));
    assert_eq!(index.min_volume_dominating(1, 1), None);
    assert!(index.is_empty());
}

#[test]
fn each_coordinate_must_dominate() {
    let mut index = DominanceIndex::new();
    index.insert(4, 10).unwrap();
    index.insert(10, 4).unwrap();
    index.insert(6, 6).unwrap();
    assert_eq!(index.min_volume_dominating(5, 5), Some((6, 6)));
    assert_eq!(index.min_volume_dominating(4, 4), Some((6, 6)));
    assert_eq!(index.min_volume_dominating(4, 7), Some((4, 10)));
    assert_eq!(index.min_volume_dominating(7, 0), Some((10, 4)));
    assert!(!index.exists_dominating(7, 7));
}

#[test]
fn empty_index_finds_nothing() {
    let index = DominanceIndex::new();
    assert!(!index.exists_dominating(0, 0));
    assert_eq!(index.min_volume_dominating(0, 0), None);
    assert_eq!(index.len(), 0);
    index.check_invariants().unwrap();
}

#[test]
fn absent_remove_leaves_answers_alone() {
    let mut index = DominanceIndex::new();
    for &(a, b) in &[(1, 7), (3, 3), (7, 1), (3, 3)] {
        index.insert(a, b).unwrap();
    }
    let before = answers(&index, 9);
    assert!(!index.remove(3, 4));
    assert!(!index.remove(8, 8));
    assert_eq!(index.len(), 4);
    assert_eq!(answers(&index, 9), before);
    index.check_invariants().unwrap();
}

#[test]
fn repeated_insert_then_remove_restores_answers() {
    let mut index = DominanceIndex::new();
    for &(a, b) in &[(2, 9), (5, 5), (9, 2)] {
        index.insert(a, b).unwrap();
    }
    let before = answers(&index, 11);

    for _ in 0 .. 5 {
        index.insert(4, 4).unwrap();
    }
    assert_eq!(index.count(4, 4), 5);
    assert_eq!(index.min_volume_dominating(3, 3), Some((4, 4)));
    for _ in 0 .. 5 {
        assert!(index.remove(4, 4));
    }
    assert!(!index.remove(4, 4));

    assert_eq!(index.len(), 3);
    assert_eq!(answers(&index, 11), before);
    index.check_invariants().unwrap();
}

#[test]
fn large_values_do_not_overflow_volumes() {
    let mut index = DominanceIndex::new();
    index.insert(u64::MAX, u64::MAX).unwrap();
    index.insert(u64::MAX, 2).unwrap();
    index.insert(3, u64::MAX).unwrap();
    assert_eq!(index.min_volume_dominating(1, 1), Some((u64::MAX, 2)));
    assert_eq!(index.min_volume_dominating(4, 3), Some((u64::MAX, u64::MAX)));
    assert!(index.exists_dominating(u64::MAX, u64::MAX));
}

#[test]
fn iterates_pairs_in_order() {
    let mut index = DominanceIndex::new();
    for &(a, b) in &[(3, 1), (1, 2), (3, 1), (1, 1)] {
        index.insert(a, b).unwrap();
    }
    let pairs = index.iter().collect::<Vec<_>>();
    assert_eq!(pairs, vec![(1, 1, 1), (1, 2, 1), (3, 1, 2)]);
}

#[test]
fn random_workload_matches_brute_force() {
    for &(seed, range) in &[(1u64, 8u64), (2, 30), (3, 200)] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut index = DominanceIndex::new();
        let mut oracle = Oracle::default();

        for step in 0 .. 2500 {
            let (a, b) = (rng.gen_range(0..range), rng.gen_range(0..range));
            if rng.gen_bool(0.55) {
                index.insert(a, b).unwrap();
                oracle.insert(a, b);
            }
            else {
                assert_eq!(index.remove(a, b), oracle.remove(a, b), "remove ({}, {})", a, b);
            }
            assert_eq!(index.len(), oracle.len());

            for _ in 0 .. 4 {
                let (a, b) = (rng.gen_range(0..range + 2), rng.gen_range(0..range + 2));
                assert_eq!(index.exists_dominating(a, b), oracle.exists_dominating(a, b), "exists ({}, {})", a, b);
                assert_eq!(index.min_volume_dominating(a, b), oracle.min_volume_dominating(a, b), "min volume ({}, {})", a, b);
            }

            if step % 250 == 0 {
                index.check_invariants().unwrap();
            }
        }
        index.check_invariants().unwrap();
    }
}
