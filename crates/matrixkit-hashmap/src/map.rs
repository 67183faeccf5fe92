//! Open addressing with double hashing and tombstones.

use num_traits::Zero;
use tracing::trace;

use crate::error::{HashMapError, Result};
use crate::primes::next_prime;

/// Smallest table length that keeps one free slot and a positive probe step.
const MIN_CAPACITY: usize = 3;

/// Slot state of the open-addressing table.
///
/// `Free -> Full` on insertion, `Full -> Removed` on removal. A removed slot
/// may become `Full` again, but only through the insertion probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Full,
    Removed,
}

/// Outcome of an insertion probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The key is already stored at this slot.
    Occupied(usize),
    /// The key is absent; this slot is where it should be written.
    Vacant(usize),
}

/// Sizing policy for [`OpenIntMap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashMapConfig {
    /// Requested initial table length (rounded up to a prime).
    /// Default: 277
    pub initial_capacity: usize,

    /// Live-entry fraction below which the table shrinks.
    /// Default: 0.2
    pub min_load_factor: f64,

    /// Live-entry fraction above which the table grows.
    /// Default: 0.5
    pub max_load_factor: f64,
}

impl Default for HashMapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 277,
            min_load_factor: 0.2,
            max_load_factor: 0.5,
        }
    }
}

impl HashMapConfig {
    /// Check that `0 <= min_load_factor < max_load_factor <= 1`.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = (self.min_load_factor, self.max_load_factor);
        let ok = (0.0..1.0).contains(&min) && max > 0.0 && max <= 1.0 && min < max;
        if ok {
            Ok(())
        } else {
            Err(HashMapError::InvalidLoadFactors { min, max })
        }
    }
}

/// Hash map from `i64` keys to `V` values using open addressing.
///
/// Absent keys read as `V::zero()`, which is what sparse matrix storage
/// expects: a cell without an entry holds zero.
///
/// Not safe for concurrent mutation; wrap in external synchronization if
/// shared between threads.
#[derive(Debug, Clone)]
pub struct OpenIntMap<V> {
    keys: Vec<i64>,
    values: Vec<V>,
    states: Vec<SlotState>,
    /// Number of `Full` slots.
    distinct: usize,
    /// Number of `Free` slots (`Removed` slots are not free).
    free_entries: usize,
    low_water_mark: usize,
    high_water_mark: usize,
    min_load_factor: f64,
    max_load_factor: f64,
}

/// The map used by sparse double matrices.
pub type OpenIntDoubleMap = OpenIntMap<f64>;

impl<V: Copy + Zero> Default for OpenIntMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy + Zero> OpenIntMap<V> {
    /// Create an empty map with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(HashMapConfig::default())
    }

    /// Create an empty map able to hold roughly `capacity` slots before
    /// the first rehash, with default load factors.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_valid_config(HashMapConfig {
            initial_capacity: capacity,
            ..HashMapConfig::default()
        })
    }

    /// Create an empty map with a custom sizing policy.
    pub fn with_config(config: HashMapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: HashMapConfig) -> Self {
        let capacity = next_prime(config.initial_capacity.max(MIN_CAPACITY));
        Self {
            keys: vec![0; capacity],
            values: vec![V::zero(); capacity],
            states: vec![SlotState::Free; capacity],
            distinct: 0,
            free_entries: capacity,
            // A fresh table never shrinks before it has grown.
            low_water_mark: 0,
            high_water_mark: high_water_mark(capacity, config.max_load_factor),
            min_load_factor: config.min_load_factor,
            max_load_factor: config.max_load_factor,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.distinct
    }

    /// Whether the map has no live entries.
    pub fn is_empty(&self) -> bool {
        self.distinct == 0
    }

    /// Current table length (always prime).
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Value associated with `key`, or `V::zero()` if absent.
    pub fn get(&self, key: i64) -> V {
        match self.index_of_key(key) {
            Some(i) => self.values[i],
            None => V::zero(),
        }
    }

    /// Whether `key` is currently stored.
    pub fn contains_key(&self, key: i64) -> bool {
        self.index_of_key(key).is_some()
    }

    /// Whether any live entry holds `value`.
    pub fn contains_value(&self, value: V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    /// Associate `value` with `key`.
    ///
    /// Returns `true` if the key was newly inserted, `false` if an existing
    /// value was overwritten.
    pub fn put(&mut self, key: i64, value: V) -> bool {
        let slot = match self.index_of_insertion(key) {
            Probe::Occupied(i) => {
                self.values[i] = value;
                return false;
            }
            Probe::Vacant(i) => i,
        };

        if self.distinct > self.high_water_mark {
            let capacity = self.grow_capacity(self.distinct + 1);
            self.rehash(capacity);
            return self.put(key, value);
        }

        self.keys[slot] = key;
        self.values[slot] = value;
        if self.states[slot] == SlotState::Free {
            self.free_entries -= 1;
        }
        self.states[slot] = SlotState::Full;
        self.distinct += 1;

        if self.free_entries < 1 {
            let capacity = self.grow_capacity(self.distinct + 1);
            self.rehash(capacity);
        }
        true
    }

    /// Remove `key`, leaving a tombstone in its slot.
    ///
    /// Returns `true` if the key was present.
    pub fn remove_key(&mut self, key: i64) -> bool {
        let Some(i) = self.index_of_key(key) else {
            return false;
        };
        self.states[i] = SlotState::Removed;
        self.values[i] = V::zero();
        self.distinct -= 1;

        if self.distinct < self.low_water_mark {
            let capacity = self.shrink_capacity(self.distinct);
            self.rehash(capacity);
        }
        true
    }

    /// Remove every entry and shrink the table.
    pub fn clear(&mut self) {
        self.states.fill(SlotState::Free);
        self.values.fill(V::zero());
        self.distinct = 0;
        self.free_entries = self.keys.len();
        self.shrink();
    }

    /// Grow the table so that it has at least `min_capacity` slots.
    ///
    /// Never shrinks.
    pub fn reserve(&mut self, min_capacity: usize) {
        if self.capacity() < min_capacity {
            self.rehash(next_prime(min_capacity));
        }
    }

    /// Shrink the table to about 1.2 times the live-entry count.
    pub fn shrink(&mut self) {
        let target = (1.0 + 1.2 * self.distinct as f64) as usize;
        let capacity = next_prime(target.max(MIN_CAPACITY));
        if self.capacity() > capacity {
            self.rehash(capacity);
        }
    }

    /// Live keys in table order.
    pub fn keys(&self) -> Vec<i64> {
        self.iter().map(|(k, _)| k).collect()
    }

    /// Live values in table order.
    pub fn values(&self) -> Vec<V> {
        self.iter().map(|(_, v)| v).collect()
    }

    /// Iterate over live `(key, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, V)> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == SlotState::Full)
            .map(move |(i, _)| (self.keys[i], self.values[i]))
    }

    /// Visit live pairs until `visit` returns `false`.
    ///
    /// Returns `false` if the visit was cut short.
    pub fn for_each_pair<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(i64, V) -> bool,
    {
        for (k, v) in self.iter() {
            if !visit(k, v) {
                return false;
            }
        }
        true
    }

    /// Start slot and probe step for `key` in the current table.
    fn probe_start(&self, key: i64) -> (usize, usize) {
        let len = self.keys.len();
        let h = hash(key);
        let decrement = h % (len - 2);
        (h % len, if decrement == 0 { 1 } else { decrement })
    }

    #[inline]
    fn step(&self, i: usize, decrement: usize) -> usize {
        if i >= decrement {
            i - decrement
        } else {
            i + self.keys.len() - decrement
        }
    }

    /// Slot where `key` lives or should be inserted.
    fn index_of_insertion(&self, key: i64) -> Probe {
        let (mut i, decrement) = self.probe_start(key);

        // Stop on a non-full slot or on the key itself.
        while self.states[i] == SlotState::Full && self.keys[i] != key {
            i = self.step(i, decrement);
        }

        if self.states[i] == SlotState::Removed {
            // The key may still sit further along the chain; look past
            // tombstones before settling on the first one.
            let first_removed = i;
            while self.states[i] != SlotState::Free
                && (self.states[i] == SlotState::Removed || self.keys[i] != key)
            {
                i = self.step(i, decrement);
            }
            if self.states[i] == SlotState::Free {
                i = first_removed;
            }
        }

        if self.states[i] == SlotState::Full {
            Probe::Occupied(i)
        } else {
            Probe::Vacant(i)
        }
    }

    /// Slot holding `key`, skipping tombstones.
    fn index_of_key(&self, key: i64) -> Option<usize> {
        let (mut i, decrement) = self.probe_start(key);
        while self.states[i] != SlotState::Free
            && (self.states[i] == SlotState::Removed || self.keys[i] != key)
        {
            i = self.step(i, decrement);
        }
        if self.states[i] == SlotState::Free {
            None
        } else {
            Some(i)
        }
    }

    fn grow_capacity(&self, size: usize) -> usize {
        capacity_for(size, self.min_load_factor, self.max_load_factor)
    }

    fn shrink_capacity(&self, size: usize) -> usize {
        capacity_for(size, self.min_load_factor, self.max_load_factor)
    }

    /// Rebuild the table at `new_capacity`, reinserting every live entry.
    fn rehash(&mut self, new_capacity: usize) {
        assert!(
            new_capacity > self.distinct,
            "rehash capacity {new_capacity} must exceed live entry count {}",
            self.distinct
        );
        trace!(
            old_capacity = self.keys.len(),
            new_capacity,
            live = self.distinct,
            "rehashing open-addressing table"
        );

        let old_keys = std::mem::replace(&mut self.keys, vec![0; new_capacity]);
        let old_values = std::mem::replace(&mut self.values, vec![V::zero(); new_capacity]);
        let old_states = std::mem::replace(&mut self.states, vec![SlotState::Free; new_capacity]);

        self.low_water_mark = low_water_mark(new_capacity, self.min_load_factor);
        self.high_water_mark = high_water_mark(new_capacity, self.max_load_factor);
        self.free_entries = new_capacity - self.distinct;

        for i in (0..old_keys.len()).rev() {
            if old_states[i] != SlotState::Full {
                continue;
            }
            let key = old_keys[i];
            let (Probe::Occupied(slot) | Probe::Vacant(slot)) = self.index_of_insertion(key);
            self.keys[slot] = key;
            self.values[slot] = old_values[i];
            self.states[slot] = SlotState::Full;
        }
    }
}

/// Non-negative hash of a key.
#[inline]
fn hash(key: i64) -> usize {
    let bits = key as u64;
    ((bits ^ (bits >> 32)) & 0x7FFF_FFFF) as usize
}

/// Prime capacity that puts `size` entries between the water marks.
fn capacity_for(size: usize, min_load: f64, max_load: f64) -> usize {
    let balanced = (4.0 * size as f64 / (3.0 * min_load + max_load)) as usize;
    next_prime((size + 1).max(balanced).max(MIN_CAPACITY))
}

fn high_water_mark(capacity: usize, max_load: f64) -> usize {
    let n = (capacity as f64 * max_load) as usize;
    n.min(capacity - 2)
}

fn low_water_mark(capacity: usize, min_load: f64) -> usize {
    (capacity as f64 * min_load) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::is_prime;

    #[test]
    fn test_put_get_overwrite() {
        let mut map = OpenIntDoubleMap::new();
        assert!(map.put(3, 1.0));
        assert!(map.put(-3, 2.0));
        assert!(!map.put(3, 5.0));
        assert_eq!(map.get(3), 5.0);
        assert_eq!(map.get(-3), 2.0);
        assert_eq!(map.get(4), 0.0);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remove_leaves_tombstone() {
        let mut map = OpenIntDoubleMap::new();
        map.put(10, 1.0);
        assert!(map.remove_key(10));
        assert!(!map.remove_key(10));
        assert!(!map.contains_key(10));
        assert_eq!(map.len(), 0);

        let slot = map.probe_start(10).0;
        assert_eq!(map.states[slot], SlotState::Removed);
        // Removed slots are not free.
        assert_eq!(map.free_entries, map.capacity() - 1);
    }

    #[test]
    fn test_probe_continues_past_tombstone() {
        let mut map = OpenIntDoubleMap::with_capacity(11);
        let cap = map.capacity() as i64;
        // All three keys hash to the same start slot.
        let (a, b, c) = (1, 1 + cap, 1 + 2 * cap);
        assert_eq!(map.probe_start(a).0, map.probe_start(b).0);
        map.put(a, 1.0);
        map.put(b, 2.0);
        map.put(c, 3.0);

        map.remove_key(a);
        // `b` and `c` are still reachable through the tombstone.
        assert_eq!(map.get(b), 2.0);
        assert_eq!(map.get(c), 3.0);

        // Re-putting `c` must overwrite, not duplicate into the tombstone.
        assert!(!map.put(c, 30.0));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(c), 30.0);

        // A new key reuses the tombstone slot.
        let tombstone = map.probe_start(a).0;
        assert!(map.put(a, 4.0));
        assert_eq!(map.states[tombstone], SlotState::Full);
        assert_eq!(map.keys[tombstone], a);
    }

    #[test]
    fn test_growth_keeps_entries_and_prime_capacity() {
        let mut map = OpenIntDoubleMap::with_capacity(5);
        let initial = map.capacity();
        for k in 0..1000 {
            map.put(k * 7, k as f64);
        }
        assert!(map.capacity() > initial);
        assert!(is_prime(map.capacity()));
        assert_eq!(map.len(), 1000);
        for k in 0..1000 {
            assert_eq!(map.get(k * 7), k as f64);
        }
    }

    #[test]
    fn test_shrink_on_low_water_mark() {
        let mut map = OpenIntDoubleMap::new();
        for k in 0..2000 {
            map.put(k, 1.0);
        }
        let grown = map.capacity();
        for k in 0..1990 {
            map.remove_key(k);
        }
        assert!(map.capacity() < grown);
        assert!(is_prime(map.capacity()));
        for k in 1990..2000 {
            assert_eq!(map.get(k), 1.0);
        }
    }

    #[test]
    fn test_reserve_and_shrink() {
        let mut map = OpenIntDoubleMap::new();
        map.reserve(5000);
        assert!(map.capacity() >= 5000);
        assert!(is_prime(map.capacity()));
        map.put(1, 1.0);
        map.shrink();
        assert!(map.capacity() < 10);
        assert_eq!(map.get(1), 1.0);
    }

    #[test]
    fn test_clear() {
        let mut map = OpenIntDoubleMap::new();
        for k in 0..100 {
            map.put(k, 2.0);
        }
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(5), 0.0);
        assert!(map.put(5, 1.0));
    }

    #[test]
    fn test_free_slot_always_remains() {
        let mut map = OpenIntDoubleMap::with_config(HashMapConfig {
            initial_capacity: 3,
            min_load_factor: 0.0,
            max_load_factor: 1.0,
        })
        .unwrap();
        for k in 0..50 {
            map.put(k, 1.0);
            assert!(map.free_entries >= 1);
        }
    }

    #[test]
    fn test_invalid_config() {
        let err = OpenIntDoubleMap::with_config(HashMapConfig {
            min_load_factor: 0.6,
            max_load_factor: 0.5,
            ..HashMapConfig::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            HashMapError::InvalidLoadFactors {
                min: 0.6,
                max: 0.5
            }
        );
    }

    #[test]
    fn test_for_each_pair_early_exit() {
        let mut map = OpenIntMap::<i32>::new();
        for k in 0..10 {
            map.put(k, 1);
        }
        let mut seen = 0;
        let completed = map.for_each_pair(|_, _| {
            seen += 1;
            seen < 3
        });
        assert!(!completed);
        assert_eq!(seen, 3);
        assert!(map.contains_value(1));
        assert!(!map.contains_value(2));
    }

    #[test]
    #[should_panic(expected = "must exceed live entry count")]
    fn test_rehash_below_live_count_panics() {
        let mut map = OpenIntDoubleMap::new();
        for k in 0..10 {
            map.put(k, 1.0);
        }
        map.rehash(7);
    }
}
