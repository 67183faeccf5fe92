//! Open-addressing hash map from `i64` keys to copyable values.
//!
//! This crate provides the table that backs sparse matrices in
//! `matrixkit-core`: keys are linear cell offsets, values are cell contents.
//!
//! # Design
//!
//! - Entries live directly in three parallel arrays (keys, values, slot state).
//! - Collisions are resolved by double hashing: the hash picks both the start
//!   slot and the probe step.
//! - Deleted entries leave a tombstone so that probe chains passing through
//!   them stay intact.
//! - Capacity is always prime and the table grows or shrinks when the number
//!   of live entries crosses load-factor derived water marks.
//!
//! # Example
//!
//! ```
//! use matrixkit_hashmap::OpenIntDoubleMap;
//!
//! let mut map = OpenIntDoubleMap::new();
//! assert!(map.put(42, 1.5));
//! assert!(!map.put(42, 2.5)); // overwrite
//! assert_eq!(map.get(42), 2.5);
//! assert_eq!(map.get(7), 0.0); // absent keys read as zero
//!
//! assert!(map.remove_key(42));
//! assert!(map.is_empty());
//! ```

mod error;
mod map;
pub mod primes;

pub use error::{HashMapError, Result};
pub use map::{HashMapConfig, OpenIntDoubleMap, OpenIntMap};
