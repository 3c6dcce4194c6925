//! Set: membership plus a key traversal, and lazy set algebra on top.
//!
//! A type becomes a set by providing [`Set::has`] and [`Set::keys`]. The
//! derived operations build views that hold their operands and answer
//! `has` / `keys` on demand; nothing is copied into a new table.
//!
//! Views are evaluated against their operands every time they are asked,
//! so operands are usually cheap handles such as `&HashSet`.

use crate::hash_table::{self, HashTable, TableOptions};
use crate::iterable::{Concat, Filter, Iterable, Product, Transform};
use crate::strategy::{DefaultEq, DefaultHash, KeyEq, KeyHash};
use crate::ConfigError;
use core::fmt;
use core::hash::Hash;
use std::rc::Rc;

pub trait Set {
    type Key;
    type Keys: Iterable<Item = Self::Key> + Clone;

    fn has(&self, key: &Self::Key) -> bool;

    /// Every member exactly once.
    fn keys(&self) -> Self::Keys;

    fn has_not(&self, key: &Self::Key) -> bool {
        !self.has(key)
    }

    fn size(&self) -> usize {
        self.keys().count()
    }

    fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    fn not_empty(&self) -> bool {
        !Set::is_empty(self)
    }

    /// Members of either set. Traverses `self`'s keys first, then the keys
    /// of `that` which `self` does not have.
    fn union<S>(self, that: S) -> Union<Self, S>
    where
        Self: Sized + Clone,
        S: Set<Key = Self::Key>,
    {
        Union { a: self, b: that }
    }

    /// Members of both sets, in `self`'s order.
    fn intersect<S>(self, that: S) -> Intersection<Self, S>
    where
        Self: Sized,
        S: Set<Key = Self::Key> + Clone,
    {
        Intersection { a: self, b: that }
    }

    /// All `(x, y)` pairs with `x` in `self` and `y` in `that`.
    fn cartesian_product<S>(self, that: S) -> CartesianProduct<Self, S>
    where
        Self: Sized,
        Self::Key: Clone,
        S: Set,
        S::Key: Clone,
    {
        CartesianProduct { a: self, b: that }
    }

    fn filter<P>(self, pred: P) -> FilteredSet<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Key) -> bool,
    {
        FilteredSet {
            set: self,
            pred: Rc::new(pred),
        }
    }
}

/// `true` for keys the wrapped set does not have.
#[derive(Clone)]
pub struct Absent<S>(S);

impl<S: Set> Transform<S::Key> for Absent<S> {
    type Output = bool;

    #[inline]
    fn apply(&self, key: &S::Key) -> bool {
        self.0.has_not(key)
    }
}

/// `true` for keys the wrapped set has.
#[derive(Clone)]
pub struct Present<S>(S);

impl<S: Set> Transform<S::Key> for Present<S> {
    type Output = bool;

    #[inline]
    fn apply(&self, key: &S::Key) -> bool {
        self.0.has(key)
    }
}

#[derive(Clone)]
pub struct Union<A, B> {
    a: A,
    b: B,
}

impl<A, B> Set for Union<A, B>
where
    A: Set + Clone,
    B: Set<Key = A::Key>,
{
    type Key = A::Key;
    type Keys = Concat<A::Keys, Filter<B::Keys, Absent<A>>>;

    fn has(&self, key: &A::Key) -> bool {
        self.a.has(key) || self.b.has(key)
    }

    fn keys(&self) -> Self::Keys {
        let rest = Filter {
            source: self.b.keys(),
            pred: Rc::new(Absent(self.a.clone())),
        };
        self.a.keys().concat(rest)
    }
}

#[derive(Clone)]
pub struct Intersection<A, B> {
    a: A,
    b: B,
}

impl<A, B> Set for Intersection<A, B>
where
    A: Set,
    B: Set<Key = A::Key> + Clone,
{
    type Key = A::Key;
    type Keys = Filter<A::Keys, Present<B>>;

    fn has(&self, key: &A::Key) -> bool {
        self.a.has(key) && self.b.has(key)
    }

    fn keys(&self) -> Self::Keys {
        Filter {
            source: self.a.keys(),
            pred: Rc::new(Present(self.b.clone())),
        }
    }
}

#[derive(Clone)]
pub struct CartesianProduct<A, B> {
    a: A,
    b: B,
}

impl<A, B> Set for CartesianProduct<A, B>
where
    A: Set,
    A::Key: Clone,
    B: Set,
    B::Key: Clone,
{
    type Key = (A::Key, B::Key);
    type Keys = Product<A::Keys, B::Keys>;

    fn has(&self, (x, y): &(A::Key, B::Key)) -> bool {
        self.a.has(x) && self.b.has(y)
    }

    fn keys(&self) -> Self::Keys {
        self.a.keys().cartesian_product(self.b.keys())
    }
}

pub struct FilteredSet<S, P> {
    pub(crate) set: S,
    pub(crate) pred: Rc<P>,
}

impl<S: Clone, P> Clone for FilteredSet<S, P> {
    fn clone(&self) -> Self {
        Self {
            set: self.set.clone(),
            pred: Rc::clone(&self.pred),
        }
    }
}

impl<S, P> Set for FilteredSet<S, P>
where
    S: Set,
    P: Fn(&S::Key) -> bool,
{
    type Key = S::Key;
    type Keys = Filter<S::Keys, P>;

    fn has(&self, key: &S::Key) -> bool {
        (self.pred)(key) && self.set.has(key)
    }

    fn keys(&self) -> Self::Keys {
        Filter {
            source: self.set.keys(),
            pred: Rc::clone(&self.pred),
        }
    }
}

/// Hash set over a [`HashTable`] of `K -> ()`.
///
/// `&HashSet` implements [`Set`], so set algebra borrows the set.
pub struct HashSet<K, E = DefaultEq, H = DefaultHash> {
    table: HashTable<K, (), E, H>,
}

impl<K: Eq + Hash> HashSet<K> {
    pub fn empty() -> Self {
        Self {
            table: HashTable::empty(),
        }
    }

    pub fn from_keys<I: IntoIterator<Item = K>>(keys: I) -> Self {
        keys.into_iter().collect()
    }
}

impl<K: Eq + Hash> Default for HashSet<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Eq + Hash> FromIterator<K> for HashSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::empty();
        set.extend(iter);
        set
    }
}

impl<K, E, H> HashSet<K, E, H>
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

    pub fn from_keys_under<I: IntoIterator<Item = K>>(key_eq: E, key_hash: H, keys: I) -> Self {
        let mut set = Self::empty_under(key_eq, key_hash);
        set.extend(keys);
        set
    }

    /// Returns `true` if `key` was not yet a member. An existing member is
    /// kept as is.
    pub fn insert(&mut self, key: K) -> bool {
        self.table.add(key, ()).is_none()
    }

    /// Removes and returns the stored member equivalent to `key`.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        self.table.remove(key).map(|(k, ())| k)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    /// Same as [`Set::has`] on `&self`, callable on an owned set.
    pub fn has(&self, key: &K) -> bool {
        self.contains(key)
    }
}

impl<K, E, H> HashSet<K, E, H> {
    pub fn len(&self) -> usize {
        self.table.len()
    }

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

    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.table.iter().map(|(k, _)| k)
    }

    pub fn table(&self) -> &HashTable<K, (), E, H> {
        &self.table
    }
}

impl<K, E, H> Extend<K> for HashSet<K, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K: fmt::Debug, E, H> fmt::Debug for HashSet<K, E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, E, H> Set for &'a HashSet<K, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    type Key = K;
    type Keys = hash_table::Keys<'a, K, ()>;

    fn has(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    fn keys(&self) -> Self::Keys {
        let set: &'a HashSet<K, E, H> = *self;
        set.table.keys()
    }
}
