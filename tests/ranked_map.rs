use std::collections::BTreeMap;
use std::ops::Bound;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use ranked_tree::{Error, Rank, RankedMap};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 10_000;

/// Keys narrow enough that inserts, lookups, and removals collide often.
fn key_strategy() -> impl Strategy<Value = i64> {
    -20_000i64..20_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    RemoveIndex(usize),
    Get(i64),
    ContainsKey(i64),
    GetKeyValue(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        1 => (0..TEST_SIZE).prop_map(MapOp::RemoveIndex),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => key_strategy().prop_map(MapOp::GetKeyValue),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

/// Replays `ops` against both maps and asserts identical results each step.
fn replay_against_btreemap(map: &mut RankedMap<i64, i64>, ops: &[MapOp]) -> Result<(), TestCaseError> {
    let mut oracle: BTreeMap<i64, i64> = BTreeMap::new();

    for op in ops {
        match op {
            MapOp::Insert(k, v) => {
                prop_assert_eq!(map.insert(*k, *v), oracle.insert(*k, *v), "insert({}, {})", k, v);
            }
            MapOp::Remove(k) => {
                prop_assert_eq!(map.remove(k), oracle.remove(k), "remove({})", k);
            }
            MapOp::RemoveIndex(index) => {
                let expected = oracle.iter().nth(*index).map(|(k, v)| (*k, *v));
                if let Some((k, _)) = expected {
                    oracle.remove(&k);
                }
                prop_assert_eq!(map.remove_index(*index), expected, "remove_index({})", index);
            }
            MapOp::Get(k) => {
                prop_assert_eq!(map.get(k), oracle.get(k), "get({})", k);
            }
            MapOp::ContainsKey(k) => {
                prop_assert_eq!(map.contains_key(k), oracle.contains_key(k), "contains_key({})", k);
            }
            MapOp::GetKeyValue(k) => {
                prop_assert_eq!(map.get_key_value(k), oracle.get_key_value(k), "get_key_value({})", k);
            }
            MapOp::FirstKeyValue => {
                prop_assert_eq!(map.first_key_value(), oracle.first_key_value());
            }
            MapOp::LastKeyValue => {
                prop_assert_eq!(map.last_key_value(), oracle.last_key_value());
            }
            MapOp::PopFirst => {
                prop_assert_eq!(map.pop_first(), oracle.pop_first());
            }
            MapOp::PopLast => {
                prop_assert_eq!(map.pop_last(), oracle.pop_last());
            }
        }
        prop_assert_eq!(map.len(), oracle.len());
    }

    let got: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<_> = oracle.iter().map(|(k, v)| (*k, *v)).collect();
    prop_assert_eq!(got, expected);
    prop_assert_eq!(map.check_invariants(), Vec::<String>::new());
    Ok(())
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both RankedMap and
    /// BTreeMap and asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut map: RankedMap<i64, i64> = RankedMap::new();
        replay_against_btreemap(&mut map, &ops)?;
    }

    /// The same replay at the minimum branching order, where every few
    /// inserts split a node and every few removals coalesce one.
    #[test]
    fn map_ops_match_btreemap_at_min_order(ops in proptest::collection::vec(map_op_strategy(), 2_000)) {
        let mut map: RankedMap<i64, i64> = RankedMap::with_order(4).unwrap();
        replay_against_btreemap(&mut map, &ops)?;
    }
}

// ─── Order-statistic operations (compared against Vec) ───────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Tests get_index against a sorted Vec oracle.
    #[test]
    fn get_index_matches_vec(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let map: RankedMap<i64, i64> = entries.iter().cloned().collect();
        let sorted: Vec<(i64, i64)> = BTreeMap::from_iter(entries.iter().cloned())
            .into_iter()
            .collect();

        prop_assert_eq!(map.len(), sorted.len());

        for (rank, (ek, ev)) in sorted.iter().enumerate() {
            prop_assert_eq!(map.get_index(rank), Some((ek, ev)), "get_index({})", rank);
        }

        prop_assert_eq!(map.get_index(sorted.len()), None);
        prop_assert_eq!(map.get_index(sorted.len() + 100), None);
    }

    /// Mutates every value through get_index_mut and checks the writes land.
    #[test]
    fn get_index_mut_matches_vec(entries in proptest::collection::vec((key_strategy(), value_strategy()), 2_000)) {
        let mut map: RankedMap<i64, i64> = entries.iter().cloned().collect();
        let sorted: Vec<(i64, i64)> = BTreeMap::from_iter(entries.iter().cloned())
            .into_iter()
            .collect();

        for (rank, (expected_key, _)) in sorted.iter().enumerate() {
            let (key, value) = map.get_index_mut(rank).unwrap();
            prop_assert_eq!(*key, *expected_key, "get_index_mut({}) key mismatch", rank);
            *value = rank as i64;
        }

        for (rank, (key, _)) in sorted.iter().enumerate() {
            prop_assert_eq!(map.get(key), Some(&(rank as i64)), "mutation at rank {} lost", rank);
        }
    }

    /// Tests rank_of against a sorted Vec oracle.
    #[test]
    fn rank_of_matches_vec(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let map: RankedMap<i64, i64> = entries.iter().cloned().collect();
        let sorted: Vec<(i64, i64)> = BTreeMap::from_iter(entries.iter().cloned())
            .into_iter()
            .collect();

        for (expected_rank, (k, _)) in sorted.iter().enumerate() {
            prop_assert_eq!(map.rank_of(k), Some(expected_rank), "rank_of({})", k);
        }

        for probe in [i64::MIN, i64::MAX, 99_999, -99_999] {
            prop_assert_eq!(map.rank_of(&probe), None, "rank_of({}) on absent key", probe);
        }
    }

    /// get_index and rank_of are inverses over every occupied rank.
    #[test]
    fn rank_of_inverts_get_index(entries in proptest::collection::vec((key_strategy(), value_strategy()), 2_000)) {
        let map: RankedMap<i64, i64> = entries.iter().cloned().collect();

        for rank in 0..map.len() {
            let (key, _) = map.get_index(rank).unwrap();
            prop_assert_eq!(map.rank_of(key), Some(rank));
            prop_assert_eq!(&map[Rank(rank)], map.get(key).unwrap());
        }
    }

    /// Removing by rank matches Vec::remove on a sorted oracle.
    #[test]
    fn remove_index_matches_vec(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..1_000)) {
        let mut map: RankedMap<i64, i64> = entries.iter().cloned().collect();
        let mut sorted: Vec<(i64, i64)> = BTreeMap::from_iter(entries.iter().cloned())
            .into_iter()
            .collect();

        // Alternate front, middle, back removals until nothing is left.
        let mut turn = 0usize;
        while !sorted.is_empty() {
            let index = match turn % 3 {
                0 => 0,
                1 => sorted.len() / 2,
                _ => sorted.len() - 1,
            };
            turn += 1;
            let expected = sorted.remove(index);
            prop_assert_eq!(map.remove_index(index), Some(expected));
        }

        prop_assert!(map.is_empty());
        prop_assert_eq!(map.remove_index(0), None);
        prop_assert_eq!(map.check_invariants(), Vec::<String>::new());
    }
}

// ─── Range queries (compared against BTreeMap) ────────────────────────────────

fn bound_pair_strategy() -> impl Strategy<Value = (Bound<i64>, Bound<i64>)> {
    (key_strategy(), key_strategy(), 0u8..3, 0u8..3).prop_map(|(a, b, s, e)| {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let start = match s {
            0 => Bound::Included(lo),
            1 => Bound::Excluded(lo),
            _ => Bound::Unbounded,
        };
        let end = match e {
            0 => Bound::Included(hi),
            1 => Bound::Excluded(hi),
            _ => Bound::Unbounded,
        };
        // Both maps reject an (Excluded(x), Excluded(x)) pair.
        if lo == hi && matches!(start, Bound::Excluded(_)) && matches!(end, Bound::Excluded(_)) {
            (Bound::Included(lo), Bound::Included(hi))
        } else {
            (start, end)
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Compares range() output against BTreeMap::range for random bounds.
    #[test]
    fn range_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 2_000),
        bounds in proptest::collection::vec(bound_pair_strategy(), 50),
    ) {
        let map: RankedMap<i64, i64> = entries.iter().cloned().collect();
        let oracle: BTreeMap<i64, i64> = entries.iter().cloned().collect();

        for (start, end) in bounds {
            let got: Vec<_> = map.range((start, end)).map(|(k, v)| (*k, *v)).collect();
            let expected: Vec<_> = oracle.range((start, end)).map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(got, expected, "range({:?}, {:?})", start, end);

            // and the same window walked from the back
            let mut got_rev: Vec<_> = map.range((start, end)).rev().map(|(k, v)| (*k, *v)).collect();
            got_rev.reverse();
            let expected: Vec<_> = oracle.range((start, end)).map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(got_rev, expected, "range({:?}, {:?}).rev()", start, end);
        }
    }

    /// A fully unbounded range yields exactly what iter() yields.
    #[test]
    fn unbounded_range_equals_iter(entries in proptest::collection::vec((key_strategy(), value_strategy()), 2_000)) {
        let map: RankedMap<i64, i64> = entries.iter().cloned().collect();
        let via_range: Vec<_> = map.range(..).collect();
        let via_iter: Vec<_> = map.iter().collect();
        prop_assert_eq!(via_range, via_iter);
    }
}

// ─── Invalid range bounds panic tests ─────────────────────────────────────────

/// range with start > end panics just like BTreeMap.
#[test]
#[should_panic(expected = "range start is greater than range end")]
fn range_start_greater_than_end_panics() {
    let map: RankedMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    // Tuple bounds sidestep the clippy::reversed_empty_ranges lint.
    let _: Vec<_> = map.range((Bound::Included(5), Bound::Included(3))).collect();
}

/// range with (Excluded(x), Excluded(x)) panics.
#[test]
#[should_panic(expected = "range start and end are equal and excluded")]
fn range_excluded_excluded_same_bound_panics() {
    let map: RankedMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    let _: Vec<_> = map.range((Bound::Excluded(2), Bound::Excluded(2))).collect();
}

/// range with (Excluded(x), Included(y)) where x > y panics.
#[test]
#[should_panic(expected = "range start is greater than range end")]
fn range_excluded_included_inverted_panics() {
    let map: RankedMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    let _: Vec<_> = map.range((Bound::Excluded(5), Bound::Included(3))).collect();
}

// ─── Out-of-bounds indexing panic tests ───────────────────────────────────────

/// Index<Rank> panics for an out-of-bounds rank on a non-empty map.
#[test]
#[should_panic(expected = "index out of bounds")]
fn index_rank_out_of_bounds_panics() {
    let map: RankedMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    let _ = map[Rank(3)];
}

/// IndexMut<Rank> panics for an out-of-bounds rank.
#[test]
#[should_panic(expected = "index out of bounds")]
fn index_mut_rank_out_of_bounds_panics() {
    let mut map: RankedMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    map[Rank(3)] = 999;
}

/// Index<Rank> panics on an empty map.
#[test]
#[should_panic(expected = "index out of bounds")]
fn index_rank_empty_map_panics() {
    let map: RankedMap<i32, i32> = RankedMap::new();
    let _ = map[Rank(0)];
}

/// Index<&K> panics when the key is missing.
#[test]
#[should_panic(expected = "no entry found for key")]
fn index_missing_key_panics() {
    let map: RankedMap<i32, i32> = [(1, 1)].into_iter().collect();
    let _ = map[&2];
}

// ─── Detached cursors ─────────────────────────────────────────────────────────

#[test]
fn cursor_walks_forward_and_back() {
    let map: RankedMap<i32, &str> = [(1, "a"), (2, "b"), (3, "c")].into_iter().collect();

    let mut cursor = map.cursor();
    assert_eq!(map.cursor_next(&mut cursor), Ok(Some((&1, &"a"))));
    assert_eq!(map.cursor_next(&mut cursor), Ok(Some((&2, &"b"))));

    // turn around mid-walk
    assert_eq!(map.cursor_prev(&mut cursor), Ok(Some((&2, &"b"))));
    assert_eq!(map.cursor_prev(&mut cursor), Ok(Some((&1, &"a"))));
    assert_eq!(map.cursor_prev(&mut cursor), Ok(None));

    // walking off the front parks the cursor there; forward still works
    assert_eq!(map.cursor_next(&mut cursor), Ok(Some((&1, &"a"))));
}

#[test]
fn cursor_survives_value_replacement() {
    let mut map: RankedMap<i32, &str> = [(1, "a"), (2, "b")].into_iter().collect();

    let mut cursor = map.cursor();
    assert_eq!(map.cursor_next(&mut cursor), Ok(Some((&1, &"a"))));

    // replacing an existing key's value keeps the shape
    assert_eq!(map.insert(2, "B"), Some("b"));
    assert_eq!(map.cursor_next(&mut cursor), Ok(Some((&2, &"B"))));
    assert_eq!(map.cursor_next(&mut cursor), Ok(None));
}

#[test]
fn cursor_goes_stale_on_structural_mutation() {
    let mut map: RankedMap<i32, i32> = (0..100).map(|k| (k, k)).collect();

    let mut cursor = map.cursor();
    map.insert(100, 100);
    assert_eq!(map.cursor_next(&mut cursor), Err(Error::StaleCursor));

    let mut cursor = map.cursor();
    map.remove(&50);
    assert_eq!(map.cursor_next(&mut cursor), Err(Error::StaleCursor));

    let mut cursor = map.cursor_back();
    map.clear();
    assert_eq!(map.cursor_prev(&mut cursor), Err(Error::StaleCursor));

    // set_order on the now-empty map is structural too
    let mut cursor = map.cursor();
    map.set_order(8).unwrap();
    assert_eq!(map.cursor_next(&mut cursor), Err(Error::StaleCursor));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// A full cursor walk visits exactly what iter() visits, both ways.
    #[test]
    fn cursor_walk_matches_iter(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..2_000)) {
        let map: RankedMap<i64, i64> = entries.iter().cloned().collect();
        let expected: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();

        let mut cursor = map.cursor();
        let mut walked = Vec::new();
        while let Some((k, v)) = map.cursor_next(&mut cursor).unwrap() {
            walked.push((*k, *v));
        }
        prop_assert_eq!(&walked, &expected);

        let mut cursor = map.cursor_back();
        let mut walked_back = Vec::new();
        while let Some((k, v)) = map.cursor_prev(&mut cursor).unwrap() {
            walked_back.push((*k, *v));
        }
        walked_back.reverse();
        prop_assert_eq!(&walked_back, &expected);
    }
}

// ─── Branching order configuration ────────────────────────────────────────────

#[test]
fn with_order_validates_bounds() {
    assert!(RankedMap::<i32, i32>::with_order(4).is_ok());
    assert!(RankedMap::<i32, i32>::with_order(256).is_ok());

    assert_eq!(RankedMap::<i32, i32>::with_order(0).unwrap_err(), Error::OrderOutOfRange(0));
    assert_eq!(RankedMap::<i32, i32>::with_order(3).unwrap_err(), Error::OrderOutOfRange(3));
    assert_eq!(RankedMap::<i32, i32>::with_order(257).unwrap_err(), Error::OrderOutOfRange(257));
}

#[test]
fn set_order_requires_an_empty_map() {
    let mut map = RankedMap::new();
    assert_eq!(map.set_order(16), Ok(()));
    assert_eq!(map.order(), 16);

    map.insert(1, "a");
    assert_eq!(map.set_order(32), Err(Error::OrderLocked));
    assert_eq!(map.order(), 16);

    map.clear();
    assert_eq!(map.set_order(32), Ok(()));
    assert_eq!(map.order(), 32);
}

#[test]
fn every_order_sorts_the_same() {
    let keys = random_keys_deterministic(2_000);
    let expected: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k * 2)).collect();

    for order in [4, 5, 8, 33, 64, 256] {
        let mut map = RankedMap::with_order(order).unwrap();
        for &k in &keys {
            map.insert(k, k * 2);
        }
        assert_eq!(map.len(), expected.len(), "order {order}");
        assert!(map.iter().eq(expected.iter()), "order {order}");
        assert_eq!(map.check_invariants(), Vec::<String>::new(), "order {order}");
    }
}

// ─── Structural scenarios ─────────────────────────────────────────────────────

mod structural_scenarios {
    use pretty_assertions::assert_eq;

    use super::*;

    /// A known insert sequence at order 4 that forces leaf splits and a root
    /// split while duplicating no keys.
    #[test]
    fn small_order_insert_sequence_stays_sorted() {
        let mut map = RankedMap::with_order(4).unwrap();
        for key in [12, 28, 15, 18, 14, 19, 25] {
            map.insert(key, key * 10);
        }

        let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(
            entries,
            vec![(12, 120), (14, 140), (15, 150), (18, 180), (19, 190), (25, 250), (28, 280)]
        );
        assert_eq!(map.check_invariants(), Vec::<String>::new());

        // every rank agrees with the sorted order
        for (rank, (key, _)) in entries.iter().enumerate() {
            assert_eq!(map.rank_of(key), Some(rank));
        }
    }

    /// Ascending fill at a small order lands in the adaptive append path;
    /// spot removals then force redistributes without wrecking order.
    #[test]
    fn ascending_fill_then_spot_removals() {
        let mut map = RankedMap::with_order(5).unwrap();
        for key in 0..500 {
            map.insert(key, key);
        }
        assert_eq!(map.len(), 500);
        assert_eq!(map.check_invariants(), Vec::<String>::new());

        for key in (0..500).step_by(100) {
            assert_eq!(map.remove(&key), Some(key));
        }

        assert_eq!(map.len(), 495);
        for key in 0..500 {
            assert_eq!(map.contains_key(&key), key % 100 != 0, "key {key}");
        }
        assert_eq!(map.check_invariants(), Vec::<String>::new());
    }

    /// Removing the only entry must leave an empty but fully usable map.
    #[test]
    fn removing_the_sole_entry_leaves_a_usable_map() {
        let mut map = RankedMap::new();
        map.insert(7, "seven");
        assert_eq!(map.remove(&7), Some("seven"));

        assert!(map.is_empty());
        assert_eq!(map.first_key_value(), None);
        assert_eq!(map.get_index(0), None);
        assert_eq!(map.check_invariants(), Vec::<String>::new());

        map.insert(8, "eight");
        assert_eq!(map.get(&8), Some(&"eight"));
    }
}

// ─── Deterministic insertion patterns ─────────────────────────────────────────

/// Deterministic pseudo-random keys from a fixed-seed LCG.
fn random_keys_deterministic(n: usize) -> Vec<i64> {
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

mod insertion_patterns {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::seq::SliceRandom;

    use super::*;

    const N: usize = 10_000;

    #[test]
    fn ascending_inserts_match_btreemap() {
        let mut map = RankedMap::new();
        let mut oracle = BTreeMap::new();
        for key in 0..N as i64 {
            map.insert(key, key);
            oracle.insert(key, key);
        }
        assert_eq!(map.len(), oracle.len());
        assert!(map.iter().eq(oracle.iter()));
        assert_eq!(map.check_invariants(), Vec::<String>::new());
    }

    #[test]
    fn descending_inserts_match_btreemap() {
        let mut map = RankedMap::new();
        let mut oracle = BTreeMap::new();
        for key in (0..N as i64).rev() {
            map.insert(key, key);
            oracle.insert(key, key);
        }
        assert!(map.iter().eq(oracle.iter()));
        assert_eq!(map.check_invariants(), Vec::<String>::new());
    }

    #[test]
    fn random_inserts_match_btreemap() {
        let keys = random_keys_deterministic(N);
        let mut map = RankedMap::new();
        let mut oracle = BTreeMap::new();
        for &key in &keys {
            assert_eq!(map.insert(key, key), oracle.insert(key, key));
        }
        assert!(map.iter().eq(oracle.iter()));
        assert_eq!(map.check_invariants(), Vec::<String>::new());
    }

    /// Fills the map, then removes every key in a shuffled order, checking
    /// the structure stays healthy all the way down to empty.
    #[test]
    fn shuffled_round_trip_to_empty() {
        let keys = random_keys_deterministic(N);
        let mut map = RankedMap::new();
        for &key in &keys {
            map.insert(key, key);
        }

        let mut removal_order: Vec<i64> = map.keys().copied().collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        removal_order.shuffle(&mut rng);

        for (i, key) in removal_order.iter().enumerate() {
            assert_eq!(map.remove(key), Some(*key));
            if i % 1_000 == 0 {
                assert_eq!(map.check_invariants(), Vec::<String>::new(), "after {i} removals");
            }
        }

        assert!(map.is_empty());
        assert_eq!(map.check_invariants(), Vec::<String>::new());
    }
}

// ─── Trait surface ────────────────────────────────────────────────────────────

#[test]
fn equality_ignores_insertion_history() {
    let forwards: RankedMap<i32, i32> = (0..100).map(|k| (k, k)).collect();
    let backwards: RankedMap<i32, i32> = (0..100).rev().map(|k| (k, k)).collect();
    assert_eq!(forwards, backwards);

    let mut shifted = backwards;
    shifted.insert(100, 100);
    assert_ne!(forwards, shifted);
}

#[test]
fn debug_formats_like_a_map() {
    let map: RankedMap<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
    assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
}

#[test]
fn clone_is_independent() {
    let mut original: RankedMap<i32, i32> = (0..500).map(|k| (k, k)).collect();
    let snapshot = original.clone();

    original.remove(&250);
    original.insert(999, 999);

    assert_eq!(snapshot.len(), 500);
    assert_eq!(snapshot.get(&250), Some(&250));
    assert!(!snapshot.contains_key(&999));
    assert_eq!(snapshot.check_invariants(), Vec::<String>::new());
}

#[test]
fn default_and_extend_from_refs() {
    let source: RankedMap<i32, i32> = [(1, 10), (2, 20)].into_iter().collect();

    let mut copied = RankedMap::default();
    copied.extend(source.iter());
    assert_eq!(copied, source);
}

#[test]
fn into_iter_yields_sorted_owned_entries() {
    let map: RankedMap<i32, String> = [(3, "c"), (1, "a"), (2, "b")]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

    let owned: Vec<(i32, String)> = map.into_iter().collect();
    assert_eq!(owned, vec![(1, "a".to_string()), (2, "b".to_string()), (3, "c".to_string())]);
}

#[test]
fn into_iter_is_double_ended() {
    let map: RankedMap<i32, i32> = (0..10).map(|k| (k, k)).collect();
    let mut iter = map.into_iter();
    assert_eq!(iter.next(), Some((0, 0)));
    assert_eq!(iter.next_back(), Some((9, 9)));
    assert_eq!(iter.len(), 8);
}

#[test]
fn get_mut_and_remove_entry() {
    let mut map: RankedMap<i32, i32> = [(1, 10), (2, 20)].into_iter().collect();

    if let Some(value) = map.get_mut(&1) {
        *value += 5;
    }
    assert_eq!(map.get(&1), Some(&15));

    assert_eq!(map.remove_entry(&2), Some((2, 20)));
    assert_eq!(map.remove_entry(&2), None);
    assert_eq!(map.len(), 1);
}

#[test]
fn keys_and_values_stay_aligned() {
    let map: RankedMap<i32, i32> = (0..100).map(|k| (k, k * 3)).collect();
    let keys: Vec<_> = map.keys().copied().collect();
    let values: Vec<_> = map.values().copied().collect();

    assert_eq!(keys.len(), values.len());
    for (k, v) in keys.iter().zip(&values) {
        assert_eq!(*v, k * 3);
    }
}

// ─── Custom comparators ───────────────────────────────────────────────────────

#[test]
fn comparator_reverses_the_ordering() {
    let mut map = RankedMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    for key in [3, 1, 4, 1, 5, 9, 2, 6] {
        map.insert(key, key * 10);
    }

    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, [9, 6, 5, 4, 3, 2, 1]);

    assert_eq!(map.get_index(0), Some((&9, &90)));
    assert_eq!(map.rank_of(&9), Some(0));
    assert_eq!(map.first_key_value(), Some((&9, &90)));
    assert_eq!(map.check_invariants(), Vec::<String>::new());
}

#[test]
fn comparator_combines_with_a_custom_order() {
    let mut map =
        RankedMap::with_order_and_comparator(4, |a: &u32, b: &u32| b.cmp(a)).unwrap();
    for key in 0..200 {
        map.insert(key, ());
    }

    assert_eq!(map.first_key_value(), Some((&199, &())));
    assert_eq!(map.last_key_value(), Some((&0, &())));
    assert_eq!(map.rank_of(&199), Some(0));
    assert_eq!(map.check_invariants(), Vec::<String>::new());
}

#[test]
fn comparator_defines_key_identity() {
    // case-insensitive keys: "Apple" and "apple" are the same entry
    let mut map = RankedMap::with_comparator(|a: &String, b: &String| {
        a.to_lowercase().cmp(&b.to_lowercase())
    });

    assert_eq!(map.insert("Apple".to_string(), 1), None);
    assert_eq!(map.insert("apple".to_string(), 2), Some(1));

    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&"APPLE".to_string()), Some(&2));
    // the first spelling won; replacement swaps only the value
    assert_eq!(map.get_key_value(&"apple".to_string()).unwrap().0, "Apple");
}
