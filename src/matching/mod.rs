// src/matching/mod.rs

//! Free-text matching of user-submitted class and teacher names
//! against a school roster.

pub mod matcher;
pub mod normalize;

pub use matcher::{DEFAULT_CUTOFF, MatchOutcome, match_entries};
pub use normalize::{
    compact, dedup_preserving_order, lookup_keys, normalize, split_raw_entries,
};
