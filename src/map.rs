//! Map: lookup plus a key set, and lazy views over maps.
//!
//! A type becomes a map by providing [`Map::get`] and [`Map::key_set`].
//! Values are produced by `get`, so a map over a table typically yields
//! borrowed values (`&V`) while a derived view yields whatever its function
//! returns. Views hold their operands and compute every answer on demand.

use crate::hash_table::{self, HashTable, TableOptions};
use crate::iterable::{FilterMap, Transform};
use crate::set::{CartesianProduct, FilteredSet, Intersection, Set};
use crate::strategy::{DefaultEq, DefaultHash, KeyEq, KeyHash};
use crate::ConfigError;
use core::fmt;
use core::hash::Hash;
use std::rc::Rc;

type KeysOf<M> = <<M as Map>::KeySet as Set>::Keys;

pub type ValuePairFn<X, Y> = fn(X, Y) -> (X, Y);

fn value_pair<X, Y>(x: X, y: Y) -> (X, Y) {
    (x, y)
}

pub trait Map {
    type Key;
    type Value;
    type KeySet: Set<Key = Self::Key>;

    /// The value for `key`, or `None` when `key` is not in the key set.
    fn get(&self, key: &Self::Key) -> Option<Self::Value>;

    fn key_set(&self) -> Self::KeySet;

    fn has_key(&self, key: &Self::Key) -> bool {
        self.key_set().has(key)
    }

    fn keys(&self) -> KeysOf<Self> {
        self.key_set().keys()
    }

    /// Values in key order.
    fn values(&self) -> FilterMap<KeysOf<Self>, Lookup<Self>>
    where
        Self: Clone,
    {
        FilterMap {
            source: self.keys(),
            f: Rc::new(Lookup(self.clone())),
        }
    }

    /// `(key, value)` pairs in key order.
    fn pairs(&self) -> FilterMap<KeysOf<Self>, LookupPair<Self>>
    where
        Self: Clone,
        Self::Key: Clone,
    {
        FilterMap {
            source: self.keys(),
            f: Rc::new(LookupPair(self.clone())),
        }
    }

    fn get_or_else<F>(&self, key: &Self::Key, default: F) -> Self::Value
    where
        F: FnOnce() -> Self::Value,
    {
        self.get(key).unwrap_or_else(default)
    }

    fn size(&self) -> usize {
        self.key_set().size()
    }

    fn is_empty(&self) -> bool {
        Set::is_empty(&self.key_set())
    }

    fn not_empty(&self) -> bool {
        !Map::is_empty(self)
    }

    /// Same keys, values passed through `f` on every lookup.
    fn map_values<Y, F>(self, f: F) -> MappedValues<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Value) -> Y,
    {
        MappedValues {
            map: self,
            f: Rc::new(f),
        }
    }

    /// Only the keys accepted by `pred`.
    fn filter_keys<P>(self, pred: P) -> FilteredMap<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Key) -> bool,
    {
        FilteredMap {
            map: self,
            pred: Rc::new(pred),
        }
    }

    /// Keys present in both maps, with values combined by `f`.
    fn zip_with<M, F, Z>(self, that: M, f: F) -> ZippedMap<Self, M, F>
    where
        Self: Sized,
        M: Map<Key = Self::Key>,
        M::KeySet: Clone,
        F: Fn(Self::Value, M::Value) -> Z,
    {
        ZippedMap {
            a: self,
            b: that,
            f: Rc::new(f),
        }
    }

    /// Every key pair `(x, y)`, valued `f(self[x], that[y])`.
    fn cartesian_product_with<M, F, Z>(self, that: M, f: F) -> ProductMap<Self, M, F>
    where
        Self: Sized,
        Self::Key: Clone,
        M: Map,
        M::Key: Clone,
        F: Fn(Self::Value, M::Value) -> Z,
    {
        ProductMap {
            a: self,
            b: that,
            f: Rc::new(f),
        }
    }

    fn cartesian_product<M>(self, that: M) -> ProductMap<Self, M, ValuePairFn<Self::Value, M::Value>>
    where
        Self: Sized,
        Self::Key: Clone,
        M: Map,
        M::Key: Clone,
    {
        self.cartesian_product_with(that, value_pair::<Self::Value, M::Value> as ValuePairFn<_, _>)
    }
}

/// Key to value through the wrapped map.
#[derive(Clone)]
pub struct Lookup<M>(M);

impl<M: Map> Transform<M::Key> for Lookup<M> {
    type Output = Option<M::Value>;

    #[inline]
    fn apply(&self, key: &M::Key) -> Self::Output {
        self.0.get(key)
    }
}

/// Key to `(key, value)` through the wrapped map.
#[derive(Clone)]
pub struct LookupPair<M>(M);

impl<M: Map> Transform<M::Key> for LookupPair<M>
where
    M::Key: Clone,
{
    type Output = Option<(M::Key, M::Value)>;

    fn apply(&self, key: &M::Key) -> Self::Output {
        self.0.get(key).map(|v| (key.clone(), v))
    }
}

pub struct MappedValues<M, F> {
    map: M,
    f: Rc<F>,
}

impl<M: Clone, F> Clone for MappedValues<M, F> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<M, F, Y> Map for MappedValues<M, F>
where
    M: Map,
    F: Fn(M::Value) -> Y,
{
    type Key = M::Key;
    type Value = Y;
    type KeySet = M::KeySet;

    fn get(&self, key: &M::Key) -> Option<Y> {
        self.map.get(key).map(|v| (self.f)(v))
    }

    fn key_set(&self) -> M::KeySet {
        self.map.key_set()
    }
}

pub struct FilteredMap<M, P> {
    map: M,
    pred: Rc<P>,
}

impl<M: Clone, P> Clone for FilteredMap<M, P> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            pred: Rc::clone(&self.pred),
        }
    }
}

impl<M, P> Map for FilteredMap<M, P>
where
    M: Map,
    P: Fn(&M::Key) -> bool,
{
    type Key = M::Key;
    type Value = M::Value;
    type KeySet = FilteredSet<M::KeySet, P>;

    fn get(&self, key: &M::Key) -> Option<M::Value> {
        if (self.pred)(key) {
            self.map.get(key)
        } else {
            None
        }
    }

    fn key_set(&self) -> Self::KeySet {
        FilteredSet {
            set: self.map.key_set(),
            pred: Rc::clone(&self.pred),
        }
    }
}

pub struct ZippedMap<A, B, F> {
    a: A,
    b: B,
    f: Rc<F>,
}

impl<A: Clone, B: Clone, F> Clone for ZippedMap<A, B, F> {
    fn clone(&self) -> Self {
        Self {
            a: self.a.clone(),
            b: self.b.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<A, B, F, Z> Map for ZippedMap<A, B, F>
where
    A: Map,
    B: Map<Key = A::Key>,
    B::KeySet: Clone,
    F: Fn(A::Value, B::Value) -> Z,
{
    type Key = A::Key;
    type Value = Z;
    type KeySet = Intersection<A::KeySet, B::KeySet>;

    fn get(&self, key: &A::Key) -> Option<Z> {
        let x = self.a.get(key)?;
        let y = self.b.get(key)?;
        Some((self.f)(x, y))
    }

    fn key_set(&self) -> Self::KeySet {
        self.a.key_set().intersect(self.b.key_set())
    }
}

pub struct ProductMap<A, B, F> {
    a: A,
    b: B,
    f: Rc<F>,
}

impl<A: Clone, B: Clone, F> Clone for ProductMap<A, B, F> {
    fn clone(&self) -> Self {
        Self {
            a: self.a.clone(),
            b: self.b.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<A, B, F, Z> Map for ProductMap<A, B, F>
where
    A: Map,
    A::Key: Clone,
    B: Map,
    B::Key: Clone,
    F: Fn(A::Value, B::Value) -> Z,
{
    type Key = (A::Key, B::Key);
    type Value = Z;
    type KeySet = CartesianProduct<A::KeySet, B::KeySet>;

    fn get(&self, (x, y): &(A::Key, B::Key)) -> Option<Z> {
        let x = self.a.get(x)?;
        let y = self.b.get(y)?;
        Some((self.f)(x, y))
    }

    fn key_set(&self) -> Self::KeySet {
        self.a.key_set().cartesian_product(self.b.key_set())
    }
}

/// Hash map over a [`HashTable`].
///
/// `&HashMap` implements [`Map`] with borrowed values.
pub struct HashMap<K, V, E = DefaultEq, H = DefaultHash> {
    table: HashTable<K, V, E, H>,
}

impl<K: Eq + Hash, V> HashMap<K, V> {
    pub fn empty() -> Self {
        Self {
            table: HashTable::empty(),
        }
    }

    pub fn from_pairs<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        Self {
            table: HashTable::from_pairs(pairs),
        }
    }
}

impl<K: Eq + Hash, V> Default for HashMap<K, V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for HashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<K, V, E, H> HashMap<K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    pub fn with_options(key_eq: E, key_hash: H, options: TableOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            table: HashTable::with_options(key_eq, key_hash, options)?,
        })
    }

    pub fn empty_under(key_eq: E, key_hash: H) -> Self {
        Self {
            table: HashTable::empty_under(key_eq, key_hash),
        }
    }

    pub fn from_pairs_under<I: IntoIterator<Item = (K, V)>>(key_eq: E, key_hash: H, pairs: I) -> Self {
        Self {
            table: HashTable::from_pairs_under(key_eq, key_hash, pairs),
        }
    }

    /// Associates `value` with `key`; returns the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.table.add(key, value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.table.remove(key).map(|(_, v)| v)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.table.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    pub fn has_key(&self, key: &K) -> bool {
        self.contains_key(key)
    }
}

impl<K, V, E, H> HashMap<K, V, E, H> {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Same as [`Map::size`] on `&self`, callable on an owned map.
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn iter(&self) -> hash_table::Iter<'_, K, V> {
        self.table.iter()
    }

    pub fn table(&self) -> &HashTable<K, V, E, H> {
        &self.table
    }
}

impl<K, V, E, H> Extend<(K, V)> for HashMap<K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.table.extend(iter);
    }
}

impl<K: fmt::Debug, V: fmt::Debug, E, H> fmt::Debug for HashMap<K, V, E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.table, f)
    }
}

/// The keys of a [`HashMap`] as a [`Set`].
pub struct KeySet<'a, K, V, E, H> {
    table: &'a HashTable<K, V, E, H>,
}

impl<K, V, E, H> Clone for KeySet<'_, K, V, E, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, E, H> Copy for KeySet<'_, K, V, E, H> {}

impl<'a, K, V, E, H> Set for KeySet<'a, K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    type Key = K;
    type Keys = hash_table::Keys<'a, K, V>;

    fn has(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    fn keys(&self) -> Self::Keys {
        self.table.keys()
    }

    fn size(&self) -> usize {
        self.table.len()
    }
}

impl<'a, K, V, E, H> Map for &'a HashMap<K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    type Key = K;
    type Value = &'a V;
    type KeySet = KeySet<'a, K, V, E, H>;

    fn get(&self, key: &K) -> Option<&'a V> {
        let map: &'a HashMap<K, V, E, H> = *self;
        map.table.get(key)
    }

    fn key_set(&self) -> Self::KeySet {
        let map: &'a HashMap<K, V, E, H> = *self;
        KeySet { table: &map.table }
    }

    fn size(&self) -> usize {
        self.table.len()
    }
}
