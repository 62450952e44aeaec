use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use ranked_tree::{Error, Rank, RankedBag};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 10_000;

/// Values narrow enough that most of them occur several times.
fn value_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum BagOp {
    Insert(i64),
    RemoveOne(i64),
    RemoveAll(i64),
    Contains(i64),
    Count(i64),
    RankOf(i64),
    GetIndex(usize),
    First,
    Last,
    PopFirst,
    PopLast,
}

fn bag_op_strategy() -> impl Strategy<Value = BagOp> {
    prop_oneof![
        5 => value_strategy().prop_map(BagOp::Insert),
        3 => value_strategy().prop_map(BagOp::RemoveOne),
        1 => value_strategy().prop_map(BagOp::RemoveAll),
        2 => value_strategy().prop_map(BagOp::Contains),
        2 => value_strategy().prop_map(BagOp::Count),
        1 => value_strategy().prop_map(BagOp::RankOf),
        1 => (0..2_000usize).prop_map(BagOp::GetIndex),
        1 => Just(BagOp::First),
        1 => Just(BagOp::Last),
        1 => Just(BagOp::PopFirst),
        1 => Just(BagOp::PopLast),
    ]
}

/// Replays `ops` against the bag and a sorted Vec and asserts identical
/// results each step. The oracle keeps duplicates, so every multiplicity
/// query has an exact expected answer.
fn replay_against_sorted_vec(bag: &mut RankedBag<i64>, ops: &[BagOp]) -> Result<(), TestCaseError> {
    let mut oracle: Vec<i64> = Vec::new();

    for op in ops {
        match op {
            BagOp::Insert(v) => {
                let at = oracle.partition_point(|x| x <= v);
                oracle.insert(at, *v);
                bag.insert(*v);
            }
            BagOp::RemoveOne(v) => {
                let at = oracle.partition_point(|x| x < v);
                let expected =
                    (at < oracle.len() && oracle[at] == *v).then(|| oracle.remove(at));
                prop_assert_eq!(bag.remove_one(v), expected, "remove_one({})", v);
            }
            BagOp::RemoveAll(v) => {
                let lo = oracle.partition_point(|x| x < v);
                let hi = oracle.partition_point(|x| x <= v);
                oracle.drain(lo..hi);
                prop_assert_eq!(bag.remove_all(v), hi - lo, "remove_all({})", v);
            }
            BagOp::Contains(v) => {
                prop_assert_eq!(bag.contains(v), oracle.binary_search(v).is_ok(), "contains({})", v);
            }
            BagOp::Count(v) => {
                let expected =
                    oracle.partition_point(|x| x <= v) - oracle.partition_point(|x| x < v);
                prop_assert_eq!(bag.count(v), expected, "count({})", v);
            }
            BagOp::RankOf(v) => {
                let lo = oracle.partition_point(|x| x < v);
                let expected = (lo < oracle.len() && oracle[lo] == *v).then_some(lo);
                prop_assert_eq!(bag.rank_of(v), expected, "rank_of({})", v);
            }
            BagOp::GetIndex(i) => {
                prop_assert_eq!(bag.get_index(*i), oracle.get(*i), "get_index({})", i);
            }
            BagOp::First => {
                prop_assert_eq!(bag.first(), oracle.first());
            }
            BagOp::Last => {
                prop_assert_eq!(bag.last(), oracle.last());
            }
            BagOp::PopFirst => {
                let expected = if oracle.is_empty() { None } else { Some(oracle.remove(0)) };
                prop_assert_eq!(bag.pop_first(), expected);
            }
            BagOp::PopLast => {
                prop_assert_eq!(bag.pop_last(), oracle.pop());
            }
        }
        prop_assert_eq!(bag.len(), oracle.len());
    }

    let got: Vec<_> = bag.iter().copied().collect();
    prop_assert_eq!(got, oracle);
    prop_assert_eq!(bag.check_invariants(), Vec::<String>::new());
    Ok(())
}

// ─── Core multiset operations ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both RankedBag and a
    /// sorted Vec and asserts identical results at every step.
    #[test]
    fn bag_ops_match_sorted_vec(ops in proptest::collection::vec(bag_op_strategy(), TEST_SIZE)) {
        let mut bag: RankedBag<i64> = RankedBag::new();
        replay_against_sorted_vec(&mut bag, &ops)?;
    }

    /// The same replay at the minimum branching order.
    #[test]
    fn bag_ops_match_sorted_vec_at_min_order(ops in proptest::collection::vec(bag_op_strategy(), 2_000)) {
        let mut bag: RankedBag<i64> = RankedBag::with_order(4).unwrap();
        replay_against_sorted_vec(&mut bag, &ops)?;
    }
}

// ─── Duplicate handling ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// count agrees with a straight scan for every distinct value.
    #[test]
    fn count_tracks_multiplicity(values in proptest::collection::vec(-50i64..50, TEST_SIZE)) {
        let bag: RankedBag<i64> = values.iter().cloned().collect();

        for v in -50..50 {
            let expected = values.iter().filter(|x| **x == v).count();
            prop_assert_eq!(bag.count(&v), expected, "count({})", v);
            prop_assert_eq!(bag.contains(&v), expected > 0, "contains({})", v);
        }
    }

    /// Every duplicate of a value sits in the contiguous rank window
    /// starting at rank_of.
    #[test]
    fn duplicates_occupy_contiguous_ranks(values in proptest::collection::vec(-50i64..50, 2_000)) {
        let bag: RankedBag<i64> = values.iter().cloned().collect();

        for v in -50..50 {
            let Some(rank) = bag.rank_of(&v) else {
                prop_assert_eq!(bag.count(&v), 0);
                continue;
            };
            for offset in 0..bag.count(&v) {
                prop_assert_eq!(bag.get_index(rank + offset), Some(&v), "rank {} + {}", rank, offset);
            }
            if rank > 0 {
                prop_assert!(bag.get_index(rank - 1) < Some(&v), "rank {} not leftmost", rank);
            }
        }
    }
}

#[test]
fn rank_window_of_a_small_bag() {
    let bag = RankedBag::from([3, 5, 5, 7]);

    assert_eq!(bag.len(), 4);
    assert_eq!(bag.get_index(0), Some(&3));
    assert_eq!(bag.get_index(1), Some(&5));
    assert_eq!(bag.get_index(2), Some(&5));
    assert_eq!(bag.get_index(3), Some(&7));

    assert_eq!(bag.rank_of(&5), Some(1));
    assert_eq!(bag.count(&5), 2);
    assert_eq!(bag.rank_of(&7), Some(3));
    assert_eq!(bag.rank_of(&6), None);

    assert_eq!(bag[Rank(1)], 5);
    assert_eq!(bag[Rank(2)], 5);
}

/// Elements that compare equal come back out in arrival order, and
/// remove_one takes the oldest.
#[test]
fn equal_elements_keep_arrival_order() {
    let mut bag = RankedBag::with_comparator(|a: &(i32, u32), b: &(i32, u32)| a.0.cmp(&b.0));
    bag.insert((5, 1));
    bag.insert((3, 0));
    bag.insert((5, 2));
    bag.insert((5, 3));

    let items: Vec<_> = bag.iter().copied().collect();
    assert_eq!(items, [(3, 0), (5, 1), (5, 2), (5, 3)]);

    // the probe's second field is invisible to the comparator
    assert_eq!(bag.remove_one(&(5, 999)), Some((5, 1)));
    assert_eq!(bag.remove_one(&(5, 999)), Some((5, 2)));
    assert_eq!(bag.count(&(5, 0)), 1);
}

// ─── Order-statistic operations (compared against Vec) ───────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Tests get_index against the fully sorted input.
    #[test]
    fn get_index_matches_vec(values in proptest::collection::vec(value_strategy(), TEST_SIZE)) {
        let bag: RankedBag<i64> = values.iter().cloned().collect();
        let mut sorted = values;
        sorted.sort_unstable();

        prop_assert_eq!(bag.len(), sorted.len());

        for (rank, expected) in sorted.iter().enumerate() {
            prop_assert_eq!(bag.get_index(rank), Some(expected), "get_index({})", rank);
        }
        prop_assert_eq!(bag.get_index(sorted.len()), None);
    }

    /// rank_of reports the first occurrence in the sorted input.
    #[test]
    fn rank_of_is_the_first_occurrence(values in proptest::collection::vec(value_strategy(), TEST_SIZE)) {
        let bag: RankedBag<i64> = values.iter().cloned().collect();
        let mut sorted = values;
        sorted.sort_unstable();

        for v in sorted.iter().step_by(97) {
            let expected = sorted.partition_point(|x| x < v);
            prop_assert_eq!(bag.rank_of(v), Some(expected), "rank_of({})", v);
        }
    }
}

// ─── Out-of-bounds indexing panic tests ───────────────────────────────────────

/// Index<Rank> panics for an out-of-bounds rank on a non-empty bag.
#[test]
#[should_panic(expected = "index out of bounds")]
fn index_rank_out_of_bounds_panics() {
    let bag = RankedBag::from([1, 2, 2]);
    let _ = bag[Rank(3)];
}

/// Index<Rank> panics on an empty bag.
#[test]
#[should_panic(expected = "index out of bounds")]
fn index_rank_empty_bag_panics() {
    let bag: RankedBag<i32> = RankedBag::new();
    let _ = bag[Rank(0)];
}

// ─── Detached cursors ─────────────────────────────────────────────────────────

#[test]
fn cursor_walks_duplicates_individually() {
    let bag = RankedBag::from([2, 1, 2]);

    let mut cursor = bag.cursor();
    assert_eq!(bag.cursor_next(&mut cursor), Ok(Some(&1)));
    assert_eq!(bag.cursor_next(&mut cursor), Ok(Some(&2)));
    assert_eq!(bag.cursor_next(&mut cursor), Ok(Some(&2)));
    assert_eq!(bag.cursor_next(&mut cursor), Ok(None));
}

#[test]
fn cursor_goes_stale_on_mutation() {
    let mut bag = RankedBag::from([1, 2, 3]);

    let mut cursor = bag.cursor();
    bag.insert(2);
    assert_eq!(bag.cursor_next(&mut cursor), Err(Error::StaleCursor));

    let mut cursor = bag.cursor_back();
    bag.remove_one(&2);
    assert_eq!(bag.cursor_prev(&mut cursor), Err(Error::StaleCursor));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// A full cursor walk visits exactly what iter() visits, duplicates
    /// included.
    #[test]
    fn cursor_walk_matches_iter(values in proptest::collection::vec(value_strategy(), 0..2_000)) {
        let bag: RankedBag<i64> = values.iter().cloned().collect();
        let expected: Vec<_> = bag.iter().copied().collect();

        let mut cursor = bag.cursor();
        let mut walked = Vec::new();
        while let Some(v) = bag.cursor_next(&mut cursor).unwrap() {
            walked.push(*v);
        }
        prop_assert_eq!(walked, expected);
    }
}

// ─── Trait surface ────────────────────────────────────────────────────────────

#[test]
fn from_array_keeps_duplicates() {
    let bag = RankedBag::from([3, 1, 3, 5, 1]);
    assert_eq!(bag.len(), 5);
    let items: Vec<_> = bag.iter().copied().collect();
    assert_eq!(items, [1, 1, 3, 3, 5]);
}

#[test]
fn debug_shows_every_occurrence() {
    let bag = RankedBag::from([2, 1, 2]);
    assert_eq!(format!("{bag:?}"), "{1, 2, 2}");
}

#[test]
fn equality_compares_multiplicities() {
    let a = RankedBag::from([1, 2, 2, 3]);
    let b = RankedBag::from([2, 3, 1, 2]);
    let c = RankedBag::from([1, 2, 3]);

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn clone_is_independent() {
    let original = RankedBag::from([1, 1, 2]);
    let mut copied = original.clone();

    copied.remove_all(&1);
    assert_eq!(original.count(&1), 2);
    assert_eq!(copied.count(&1), 0);
}

#[test]
fn default_and_extend_from_refs() {
    let source = RankedBag::from([1, 2, 2]);

    let mut copied = RankedBag::default();
    copied.extend(source.iter());
    assert_eq!(copied, source);
}

#[test]
fn into_iter_yields_sorted_owned_values() {
    let bag = RankedBag::from([3, 1, 2, 1]);
    let values: Vec<i32> = bag.into_iter().collect();
    assert_eq!(values, [1, 1, 2, 3]);
}

// ─── Deterministic insertion patterns ─────────────────────────────────────────

/// Deterministic pseudo-random values from a fixed-seed LCG, folded into a
/// narrow band so duplicates are common.
fn random_values_deterministic(n: usize) -> Vec<i64> {
    let mut values = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        values.push(((x >> 33) as i64) % 200);
    }
    values
}

mod insertion_patterns {
    use super::*;

    const N: usize = 10_000;

    #[test]
    fn random_inserts_match_sorted_vec() {
        let values = random_values_deterministic(N);
        let mut bag: RankedBag<i64> = RankedBag::new();
        for &v in &values {
            bag.insert(v);
        }

        let mut sorted = values;
        sorted.sort_unstable();

        assert_eq!(bag.len(), sorted.len());
        assert!(bag.iter().eq(sorted.iter()));
        assert_eq!(bag.check_invariants(), Vec::<String>::new());
    }

    /// Drains a heavily duplicated bag value by value, checking the
    /// structure stays healthy all the way down to empty.
    #[test]
    fn remove_all_round_trip_to_empty() {
        let values = random_values_deterministic(N);
        let mut bag: RankedBag<i64> = values.iter().cloned().collect();

        let mut removed = 0;
        for v in -200..200 {
            let expected = values.iter().filter(|x| **x == v).count();
            assert_eq!(bag.remove_all(&v), expected, "remove_all({v})");
            removed += expected;
            if v % 50 == 0 {
                assert_eq!(bag.check_invariants(), Vec::<String>::new(), "after removing {v}");
            }
        }

        assert_eq!(removed, N);
        assert!(bag.is_empty());
        assert_eq!(bag.check_invariants(), Vec::<String>::new());
    }

    /// pop_first drains duplicates in nondecreasing order.
    #[test]
    fn pop_first_drains_in_order() {
        let values = random_values_deterministic(2_000);
        let mut bag: RankedBag<i64> = values.iter().cloned().collect();

        let mut drained = Vec::with_capacity(bag.len());
        while let Some(v) = bag.pop_first() {
            drained.push(v);
        }

        let mut sorted = values;
        sorted.sort_unstable();
        assert_eq!(drained, sorted);
        assert_eq!(bag.check_invariants(), Vec::<String>::new());
    }
}
