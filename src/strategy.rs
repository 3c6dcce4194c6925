//! Key strategies: how a table decides that two keys are the same key, and
//! which integer a key hashes to.
//!
//! Strategies are plain values held by the table. To share one instance
//! between several tables, hand out `&S` or `Rc<S>`; both forward to `S`.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use std::rc::Rc;

/// Equivalence over keys.
///
/// Implementations must be reflexive, symmetric and transitive.
pub trait KeyEq<K: ?Sized> {
    fn eq(&self, a: &K, b: &K) -> bool;
}

/// Hashing over keys.
///
/// Must be consistent with the [`KeyEq`] it is paired with:
/// `eq(a, b)` implies `hash_code(a) == hash_code(b)`. Negative codes are
/// fine; the table normalizes them into a slot index.
pub trait KeyHash<K: ?Sized> {
    fn hash_code(&self, key: &K) -> i32;
}

/// Equivalence given by the key type's own `Eq`.
#[derive(Copy, Clone, Debug, Default)]
pub struct NativeEq;

impl<K: ?Sized + Eq> KeyEq<K> for NativeEq {
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Hashing through any `BuildHasher`, folded down to 32 bits.
#[derive(Clone, Debug, Default)]
pub struct BuildHasherHash<S = DefaultHashBuilder> {
    hasher: S,
}

impl<S> BuildHasherHash<S> {
    pub const fn new(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<K: ?Sized + Hash, S: BuildHasher> KeyHash<K> for BuildHasherHash<S> {
    #[inline]
    fn hash_code(&self, key: &K) -> i32 {
        let h = self.hasher.hash_one(key);
        (h ^ (h >> 32)) as i32
    }
}

/// Polynomial string hash: `h = 31 * h + unit` over UTF-16 code units, with
/// wrapping 32-bit arithmetic. Deterministic across runs and platforms.
#[derive(Copy, Clone, Debug, Default)]
pub struct StringHash;

impl StringHash {
    pub fn hash_str(s: &str) -> i32 {
        s.encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
    }
}

impl<K: ?Sized + AsRef<str>> KeyHash<K> for StringHash {
    #[inline]
    fn hash_code(&self, key: &K) -> i32 {
        Self::hash_str(key.as_ref())
    }
}

/// Equivalence from a closure.
#[derive(Copy, Clone, Debug)]
pub struct FnEq<F>(pub F);

impl<K: ?Sized, F: Fn(&K, &K) -> bool> KeyEq<K> for FnEq<F> {
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b)
    }
}

/// Hashing from a closure.
#[derive(Copy, Clone, Debug)]
pub struct FnHash<F>(pub F);

impl<K: ?Sized, F: Fn(&K) -> i32> KeyHash<K> for FnHash<F> {
    #[inline]
    fn hash_code(&self, key: &K) -> i32 {
        (self.0)(key)
    }
}

impl<K: ?Sized, E: ?Sized + KeyEq<K>> KeyEq<K> for &E {
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        KeyEq::eq(&**self, a, b)
    }
}

impl<K: ?Sized, E: ?Sized + KeyEq<K>> KeyEq<K> for Rc<E> {
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        KeyEq::eq(&**self, a, b)
    }
}

impl<K: ?Sized, H: ?Sized + KeyHash<K>> KeyHash<K> for &H {
    #[inline]
    fn hash_code(&self, key: &K) -> i32 {
        (**self).hash_code(key)
    }
}

impl<K: ?Sized, H: ?Sized + KeyHash<K>> KeyHash<K> for Rc<H> {
    #[inline]
    fn hash_code(&self, key: &K) -> i32 {
        (**self).hash_code(key)
    }
}

/// Equivalence used by `empty()` and friends.
pub type DefaultEq = NativeEq;

/// Hashing used by `empty()` and friends.
pub type DefaultHash = BuildHasherHash<DefaultHashBuilder>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_hash_matches_polynomial() {
        assert_eq!(StringHash::hash_str(""), 0);
        assert_eq!(StringHash::hash_str("a"), 97);
        assert_eq!(StringHash::hash_str("ab"), 97 * 31 + 98);
        assert_eq!(StringHash.hash_code("ab"), StringHash.hash_code(&"ab".to_string()));
    }

    #[test]
    fn string_hash_wraps_instead_of_overflowing() {
        let long = "z".repeat(64);
        // Only checks that the wrapping arithmetic does not panic.
        let _ = StringHash::hash_str(&long);
    }

    #[test]
    fn default_hash_is_consistent_with_native_eq() {
        let h = DefaultHash::default();
        let a = String::from("alice");
        let b = String::from("alice");
        assert!(KeyEq::eq(&NativeEq, &a, &b));
        assert_eq!(h.hash_code(&a), h.hash_code(&b));
    }

    #[test]
    fn closure_strategies() {
        let eq = FnEq(|a: &String, b: &String| a.eq_ignore_ascii_case(b));
        let hash = FnHash(|s: &String| s.len() as i32);
        assert!(KeyEq::eq(&eq, &"Bob".to_string(), &"bob".to_string()));
        assert_eq!(hash.hash_code(&"bob".to_string()), 3);
    }

    #[test]
    fn shared_strategies_forward() {
        let hash = Rc::new(FnHash(|k: &i32| k * 2));
        let by_ref = &*hash;
        assert_eq!(hash.hash_code(&4), 8);
        assert_eq!(by_ref.hash_code(&4), 8);
        assert!(KeyEq::eq(&&NativeEq, &1, &1));
        assert!(KeyEq::eq(&Rc::new(NativeEq), &"x", &"x"));
    }
}
