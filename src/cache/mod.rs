//! Cache module for memoizing API responses in memory
//!
//! This module provides a generic TTL cache used for season collections, the
//! navigation rosters, the API health probe and news headlines. An entry older
//! than its cache's TTL is treated as absent; it is replaced wholesale by the
//! next successful load and never partially mutated.

mod ttl;

pub use ttl::{CacheKey, TtlCache};
