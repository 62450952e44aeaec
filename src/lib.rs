//! Rank-indexed B+ tree collections for Rust.
//!
//! This crate provides four ordered containers built on one B+ tree engine that
//! tracks subtree entry counts, so every container supports O(log n)
//! positional ("rank") queries alongside the usual ordered operations:
//!
//! - [`RankedMap`] - unique keys with values, like `BTreeMap`
//! - [`RankedSet`] - unique keys, like `BTreeSet`
//! - [`RankedBag`] - duplicate keys with multiplicity (a multiset)
//! - [`RankedMultimap`] - duplicate keys, each with its own value
//!
//! The rank surface is shared by all four:
//!
//! - `get_index(i)` - the element at sorted position `i`
//! - `rank_of(&key)` - the sorted position of a key
//! - Indexing by [`Rank`] - e.g. `map[Rank(0)]` for the first value
//!
//! # Example
//!
//! ```
//! use ranked_tree::{Rank, RankedMap};
//!
//! let mut scores = RankedMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Ordinary ordered-map operations.
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Positional operations, O(log n).
//! let (name, score) = scores.get_index(1).unwrap();
//! assert_eq!((*name, *score), ("Bob", 85));
//! assert_eq!(scores.rank_of(&"Carol"), Some(2));
//! assert_eq!(scores[Rank(0)], 100);
//! ```
//!
//! # Duplicate keys
//!
//! ```
//! use ranked_tree::RankedBag;
//!
//! let mut bag: RankedBag<i32> = [3, 5, 5, 7].into_iter().collect();
//! assert_eq!(bag.count(&5), 2);
//! assert_eq!(bag.get_index(1), Some(&5));
//! assert_eq!(bag.get_index(2), Some(&5));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - only requires `alloc`
//! - **No unsafe code** - `#![forbid(unsafe_code)]`
//! - **Runtime branching order** - tune node width per tree via
//!   [`RankedMap::with_order`] and friends, between [`MIN_ORDER`] and
//!   [`MAX_ORDER`]
//! - **Custom orderings** - every container takes an optional [`Comparator`]
//!
//! # Implementation
//!
//! The containers share one B+ tree (all entries in leaves, leaves doubly
//! linked in key order) whose branch nodes cache the entry count of every
//! child subtree. Structural surgery runs over an explicit root-to-leaf path
//! of (node, child index) frames, so splits and merges ripple upward without
//! re-descending, and positional queries descend by subtracting cached
//! weights instead of comparing keys.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

extern crate alloc;

mod comparator;
mod error;
mod order_statistic;
mod raw;

pub mod ranked_bag;
pub mod ranked_map;
pub mod ranked_multimap;
pub mod ranked_set;

pub use comparator::{Comparator, NaturalOrder};
pub use error::{Error, Result};
pub use order_statistic::Rank;
pub use raw::{Cursor, DEFAULT_ORDER, MAX_ORDER, MIN_ORDER};
pub use ranked_bag::RankedBag;
pub use ranked_map::RankedMap;
pub use ranked_multimap::RankedMultimap;
pub use ranked_set::RankedSet;
