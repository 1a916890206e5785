//! This module provides deterministic `HashMap` and `HashSet` variants. The hashing data structures
//! in the standard library are not deterministic:
//!
//! > By default, HashMap uses a hashing algorithm selected to provide
//! > resistance against HashDoS attacks. The algorithm is randomly seeded, and a
//! > reasonable best-effort is made to generate this seed from a high quality,
//! > secure source of randomness provided by the host without blocking the program.
//!
//! A seeded simulation must behave identically from run to run, so the crate uses the `rustc-hash`
//! hasher everywhere instead. Use `HashMap::default()` to create a new map.
//!
//! The `hash_str` free function is used in `crate::random` to derive one seed per named stream.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// A convenience method to compute the hash of a `&str`.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
