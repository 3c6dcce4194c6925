//! HashTable: chained storage engine with handle-linked collision chains.
//!
//! Layout
//! - Entries live in a `SlotMap` arena and are addressed by generational
//!   handles. `heads[i]` holds the handle of the first entry of chain `i`;
//!   each entry holds the handle of its successor.
//! - An entry for key `k` always sits in chain
//!   `slot_index(hash_code(k), capacity)` for the *current* capacity.
//!   Growing therefore relinks every entry; entries are never moved or
//!   copied, only their `next` links and the heads change.
//! - New keys are prepended to their chain. Traversal is slot-ascending,
//!   chain-head-first, and is not stable across mutations.
//!
//! Growth happens before an insertion once `len >= floor(capacity *
//! load_factor)`, so the new entry is placed against the final capacity.
//! Capacity only grows; removals never shrink the slot array.
//!
//! Strategies are user code. Every entry point that runs them holds the
//! debug reentrancy check, so a strategy that calls back into the same
//! table panics in debug builds instead of seeing half-linked chains.

use crate::cursor::{no_current, Cursor};
use crate::iterable::Iterable;
use crate::reentrancy::{ReentrancyCheck, TableOp};
use crate::strategy::{DefaultEq, DefaultHash, KeyEq, KeyHash};
use core::fmt;
use core::hash::Hash;
use core::iter::FusedIterator;
use slotmap::{DefaultKey, SlotMap};

pub const DEFAULT_INITIAL_CAPACITY: usize = 16;
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Largest slot count the table can reach. Growth goes through the 32-bit
/// [`next_power_of_two`], which cannot step past `2^31`.
pub const MAX_CAPACITY: usize = 1 << 31;

/// Smallest power of two strictly greater than `x`.
///
/// `next_power_of_two(0) == 1`. Returns `None` for `x >= 2^31`, where the
/// answer does not fit in 32 bits.
pub fn next_power_of_two(x: u32) -> Option<u32> {
    let mut y = x;
    y |= y >> 1;
    y |= y >> 2;
    y |= y >> 4;
    y |= y >> 8;
    y |= y >> 16;
    y.checked_add(1)
}

/// Chain index for `hash` in a table of `capacity` slots, in `[0, capacity)`.
#[inline]
pub fn slot_index(hash: i32, capacity: usize) -> usize {
    debug_assert!(capacity > 0 && capacity <= MAX_CAPACITY);
    let capacity = capacity as i64;
    let rem = i64::from(hash) % capacity;
    (if rem < 0 { rem + capacity } else { rem }) as usize
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    ZeroCapacity,
    CapacityTooLarge(usize),
    LoadFactorOutOfRange(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => f.write_str("initial capacity must be at least 1"),
            ConfigError::CapacityTooLarge(c) => {
                write!(f, "initial capacity {c} exceeds the maximum of {MAX_CAPACITY}")
            }
            ConfigError::LoadFactorOutOfRange(lf) => {
                write!(f, "load factor {lf} is outside (0, 1]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Sizing knobs for a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOptions {
    pub initial_capacity: usize,
    pub load_factor: f64,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl TableOptions {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Rejects a zero or oversized capacity and load factors outside
    /// `(0, 1]`, NaN included. Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.initial_capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge(self.initial_capacity));
        }
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(ConfigError::LoadFactorOutOfRange(self.load_factor));
        }
        Ok(())
    }
}

/// A located entry. Resolves while that entry is live; once it is removed
/// (or the table cleared) the handle resolves to `None`, even if a later
/// entry reuses the arena slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub fn key<'a, K, V, E, H>(&self, table: &'a HashTable<K, V, E, H>) -> Option<&'a K> {
        table.arena.get(self.0).map(|e| &e.key)
    }

    pub fn value<'a, K, V, E, H>(&self, table: &'a HashTable<K, V, E, H>) -> Option<&'a V> {
        table.arena.get(self.0).map(|e| &e.value)
    }

    pub fn value_mut<'a, K, V, E, H>(
        &self,
        table: &'a mut HashTable<K, V, E, H>,
    ) -> Option<&'a mut V> {
        table.arena.get_mut(self.0).map(|e| &mut e.value)
    }
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    next: Option<DefaultKey>,
}

type Arena<K, V> = SlotMap<DefaultKey, Entry<K, V>>;

pub struct HashTable<K, V, E = DefaultEq, H = DefaultHash> {
    key_eq: E,
    key_hash: H,
    heads: Vec<Option<DefaultKey>>,
    arena: Arena<K, V>,
    load_factor: f64,
    reentrancy: ReentrancyCheck,
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    /// Empty table under the default strategies and sizing.
    pub fn empty() -> Self {
        Self::empty_under(DefaultEq::default(), DefaultHash::default())
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_pairs_under(DefaultEq::default(), DefaultHash::default(), pairs)
    }
}

impl<K, V> Default for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V> FromIterator<(K, V)> for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<K, V, E, H> HashTable<K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    /// Table with `initial_capacity` slots (used as given, not rounded) that
    /// grows once `len >= floor(capacity * load_factor)`.
    pub fn new(
        key_eq: E,
        key_hash: H,
        initial_capacity: usize,
        load_factor: f64,
    ) -> Result<Self, ConfigError> {
        Self::with_options(
            key_eq,
            key_hash,
            TableOptions {
                initial_capacity,
                load_factor,
            },
        )
    }

    pub fn with_options(key_eq: E, key_hash: H, options: TableOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self::from_parts(key_eq, key_hash, options))
    }

    /// Empty table under the given strategies, default sizing.
    pub fn empty_under(key_eq: E, key_hash: H) -> Self {
        Self::from_parts(key_eq, key_hash, TableOptions::default())
    }

    pub fn from_pairs_under<I>(key_eq: E, key_hash: H, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut table = Self::empty_under(key_eq, key_hash);
        table.extend(pairs);
        table
    }

    fn from_parts(key_eq: E, key_hash: H, options: TableOptions) -> Self {
        Self {
            key_eq,
            key_hash,
            heads: vec![None; options.initial_capacity],
            arena: SlotMap::with_key(),
            load_factor: options.load_factor,
            reentrancy: ReentrancyCheck::new(),
        }
    }

    #[inline]
    fn index_of(&self, key: &K) -> usize {
        slot_index(self.key_hash.hash_code(key), self.heads.len())
    }

    fn find_in_chain(&self, index: usize, key: &K) -> Option<DefaultKey> {
        let mut cursor = self.heads[index];
        while let Some(handle) = cursor {
            let entry = &self.arena[handle];
            if self.key_eq.eq(&entry.key, key) {
                return Some(handle);
            }
            cursor = entry.next;
        }
        None
    }

    fn should_grow(&self) -> bool {
        let threshold = (self.heads.len() as f64 * self.load_factor).floor() as usize;
        self.arena.len() >= threshold
    }

    /// Inserts `key -> value`, or replaces the value in place when an
    /// equivalent key is present. Returns the replaced value.
    ///
    /// # Panics
    ///
    /// When growth would take the table past [`MAX_CAPACITY`] slots.
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter(TableOp::Add);
        if self.should_grow() {
            grow(&mut self.heads, &mut self.arena, &self.key_hash);
        }
        let index = self.index_of(&key);
        if let Some(handle) = self.find_in_chain(index, &key) {
            return Some(core::mem::replace(&mut self.arena[handle].value, value));
        }
        let next = self.heads[index];
        let handle = self.arena.insert(Entry { key, value, next });
        self.heads[index] = Some(handle);
        None
    }

    /// Unlinks the entry for `key`, leaving the rest of its chain in order.
    /// No-op returning `None` when the key is absent.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let _g = self.reentrancy.enter(TableOp::Remove);
        let index = self.index_of(key);
        let mut prev: Option<DefaultKey> = None;
        let mut cursor = self.heads[index];
        while let Some(handle) = cursor {
            let entry = &self.arena[handle];
            let next = entry.next;
            if self.key_eq.eq(&entry.key, key) {
                match prev {
                    Some(p) => self.arena[p].next = next,
                    None => self.heads[index] = next,
                }
                let removed = self.arena.remove(handle)?;
                return Some((removed.key, removed.value));
            }
            prev = cursor;
            cursor = next;
        }
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let _g = self.reentrancy.enter(TableOp::Get);
        let handle = self.find_in_chain(self.index_of(key), key)?;
        self.arena.get(handle).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.reentrancy.enter(TableOp::GetMut);
        let handle = self.find_in_chain(self.index_of(key), key)?;
        self.arena.get_mut(handle).map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let _g = self.reentrancy.enter(TableOp::ContainsKey);
        self.find_in_chain(self.index_of(key), key).is_some()
    }

    /// Finds the entry for `key` and returns a handle to it.
    pub fn locate(&self, key: &K) -> Option<Handle> {
        let _g = self.reentrancy.enter(TableOp::Locate);
        self.find_in_chain(self.index_of(key), key).map(Handle)
    }

    /// Checks every structural invariant; panics on the first violation.
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        let capacity = self.heads.len();
        let mut reachable = 0;
        for (index, head) in self.heads.iter().enumerate() {
            let mut chain = Vec::new();
            let mut cursor = *head;
            while let Some(handle) = cursor {
                let entry = self.arena.get(handle).expect("chain link to a live entry");
                assert_eq!(
                    slot_index(self.key_hash.hash_code(&entry.key), capacity),
                    index,
                    "entry linked into the wrong chain"
                );
                assert!(
                    chain.iter().all(|k| !self.key_eq.eq(*k, &entry.key)),
                    "equivalent keys in one chain"
                );
                chain.push(&entry.key);
                cursor = entry.next;
            }
            reachable += chain.len();
        }
        assert_eq!(reachable, self.arena.len(), "len disagrees with chain lengths");
    }
}

impl<K, V, E, H> Extend<(K, V)> for HashTable<K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.add(k, v);
        }
    }
}

/// Doubles (at least) the slot array and relinks every entry against the
/// new capacity. Takes the fields apart so the caller can keep its
/// reentrancy guard alive.
fn grow<K, V, H: KeyHash<K>>(heads: &mut Vec<Option<DefaultKey>>, arena: &mut Arena<K, V>, key_hash: &H) {
    let old_capacity = heads.len();
    let new_capacity = u32::try_from(old_capacity)
        .ok()
        .and_then(next_power_of_two)
        .map(|c| c as usize)
        .unwrap_or_else(|| panic!("hash table capacity overflow: cannot grow past {old_capacity} slots"));
    log::debug!(
        "growing hash table from {old_capacity} to {new_capacity} slots ({} entries)",
        arena.len()
    );

    let old_heads = core::mem::replace(heads, vec![None; new_capacity]);
    for head in old_heads {
        let mut cursor = head;
        while let Some(handle) = cursor {
            let entry = &mut arena[handle];
            cursor = entry.next;
            let index = slot_index(key_hash.hash_code(&entry.key), new_capacity);
            entry.next = heads[index];
            heads[index] = Some(handle);
        }
    }
}

impl<K, V, E, H> HashTable<K, V, E, H> {
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of slots (chains).
    pub fn capacity(&self) -> usize {
        self.heads.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn key_eq(&self) -> &E {
        &self.key_eq
    }

    pub fn key_hash(&self) -> &H {
        &self.key_hash
    }

    /// Drops every entry and empties every chain. Capacity is kept.
    pub fn clear(&mut self) {
        self.heads.iter_mut().for_each(|h| *h = None);
        self.arena.clear();
    }

    fn snapshot(&self) -> Snapshot<'_, K, V> {
        Snapshot {
            heads: &self.heads,
            arena: &self.arena,
        }
    }

    /// Live `(key, value)` pairs as an [`Iterable`].
    pub fn entries(&self) -> Entries<'_, K, V> {
        Entries(self.snapshot())
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.snapshot())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.snapshot())
    }

    /// Std iterator over live pairs, in the same order as [`entries`](Self::entries).
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            chains: self.snapshot().chains(),
            remaining: self.arena.len(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, E, H> fmt::Debug for HashTable<K, V, E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, E, H> IntoIterator for &'a HashTable<K, V, E, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowed view of the chain structure.
struct Snapshot<'a, K, V> {
    heads: &'a [Option<DefaultKey>],
    arena: &'a Arena<K, V>,
}

impl<K, V> Clone for Snapshot<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Snapshot<'_, K, V> {}

impl<'a, K, V> Snapshot<'a, K, V> {
    fn chains(self) -> Chains<'a, K, V> {
        Chains {
            heads: self.heads.iter(),
            arena: self.arena,
            next: None,
        }
    }
}

/// Walks chains slot by slot, head first.
struct Chains<'a, K, V> {
    heads: core::slice::Iter<'a, Option<DefaultKey>>,
    arena: &'a Arena<K, V>,
    next: Option<DefaultKey>,
}

impl<'a, K, V> Iterator for Chains<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(handle) = self.next {
                let entry = &self.arena[handle];
                self.next = entry.next;
                return Some(entry);
            }
            self.next = *self.heads.next()?;
        }
    }
}

/// [`Iterable`] over live `(key, value)` pairs.
pub struct Entries<'a, K, V>(Snapshot<'a, K, V>);

/// [`Iterable`] over live keys.
pub struct Keys<'a, K, V>(Snapshot<'a, K, V>);

/// [`Iterable`] over live values.
pub struct Values<'a, K, V>(Snapshot<'a, K, V>);

impl<K, V> Clone for Entries<'_, K, V> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<'a, K, V> Iterable for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);
    type Cursor = EntriesCursor<'a, K, V>;

    fn new_cursor(&self) -> Self::Cursor {
        EntriesCursor {
            chains: self.0.chains(),
            current: None,
        }
    }
}

impl<'a, K, V> Iterable for Keys<'a, K, V> {
    type Item = K;
    type Cursor = KeysCursor<'a, K, V>;

    fn new_cursor(&self) -> Self::Cursor {
        KeysCursor {
            chains: self.0.chains(),
            current: None,
        }
    }
}

impl<'a, K, V> Iterable for Values<'a, K, V> {
    type Item = V;
    type Cursor = ValuesCursor<'a, K, V>;

    fn new_cursor(&self) -> Self::Cursor {
        ValuesCursor {
            chains: self.0.chains(),
            current: None,
        }
    }
}

pub struct EntriesCursor<'a, K, V> {
    chains: Chains<'a, K, V>,
    current: Option<(&'a K, &'a V)>,
}

impl<'a, K, V> Cursor for EntriesCursor<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn advance(&mut self) -> bool {
        self.current = self.chains.next().map(|e| (&e.key, &e.value));
        self.current.is_some()
    }

    fn current(&self) -> &Self::Item {
        self.current.as_ref().unwrap_or_else(|| no_current())
    }
}

pub struct KeysCursor<'a, K, V> {
    chains: Chains<'a, K, V>,
    current: Option<&'a K>,
}

impl<K, V> Cursor for KeysCursor<'_, K, V> {
    type Item = K;

    fn advance(&mut self) -> bool {
        self.current = self.chains.next().map(|e| &e.key);
        self.current.is_some()
    }

    fn current(&self) -> &K {
        self.current.unwrap_or_else(|| no_current())
    }
}

pub struct ValuesCursor<'a, K, V> {
    chains: Chains<'a, K, V>,
    current: Option<&'a V>,
}

impl<K, V> Cursor for ValuesCursor<'_, K, V> {
    type Item = V;

    fn advance(&mut self) -> bool {
        self.current = self.chains.next().map(|e| &e.value);
        self.current.is_some()
    }

    fn current(&self) -> &V {
        self.current.unwrap_or_else(|| no_current())
    }
}

/// Std iterator over live `(key, value)` pairs.
pub struct Iter<'a, K, V> {
    chains: Chains<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.chains.next()?;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
