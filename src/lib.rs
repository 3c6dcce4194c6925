//! chained-collections: a chained hash table with pluggable key strategies,
//! a pull-based cursor protocol, and lazy combinators that let sets and
//! maps be composed without copying.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small collections core in layers, each with its own contract.
//! - Layers:
//!   - `strategy`: `KeyEq<K>` / `KeyHash<K>`. Tables are generic over a
//!     strategy pair instead of requiring `K: Eq + Hash`; the defaults
//!     use exactly those traits.
//!   - `HashTable<K, V, E, H>`: chained storage. Entries live in a
//!     `SlotMap` arena; chain heads and `next` links are arena handles.
//!     Includes a debug-only reentrancy guard while strategies run.
//!   - `Cursor` / `Iterable`: single-use traversals and the factories that
//!     make them. Every combinator is a factory that captures its inputs.
//!   - `Set` / `Map`: capability traits with two required methods each;
//!     union, intersection, products, filters and value mapping are
//!     provided once as views over those two methods.
//!   - `HashSet` / `HashMap`: thin wrappers over `HashTable`; their shared
//!     references implement `Set` / `Map`.
//!
//! Constraints
//! - Single-threaded: tables are `!Send`/`!Sync` (marker on the guard).
//! - Capacity only grows. It starts at the configured slot count and jumps
//!   to the next power of two once `len >= floor(capacity * load_factor)`,
//!   checked before every insertion.
//! - Growth relinks entries into the new chains; keys and values never
//!   move, so a `Handle` stays valid across growth.
//! - Hash codes are `i32`; negative codes are normalized into a slot.
//!
//! Traversal order
//! - Tables traverse slot by slot, each chain from its head; new keys are
//!   prepended. The order is deterministic for a given history but changes
//!   on growth and removal.
//! - Views traverse in the order of their left operand; `union` appends
//!   the right operand's keys that the left one lacks.
//!
//! Cursors and borrowing
//! - `Cursor::current` hands out a reference into the cursor. Combinators
//!   that must own elements (`reversed`, products, the std bridge) require
//!   `Item: Clone`; the rest only borrow.
//! - Cursors never borrow the iterable that created them. Table cursors
//!   borrow the table itself, so a live cursor rules out mutation at
//!   compile time.
//!
//! Failure model
//! - Absent keys are `None`.
//! - Invalid sizing is a `ConfigError` at construction; nothing is clamped.
//! - Reading `current` without an element, growing past `2^31` slots, and
//!   reentering a table from its own strategy (debug builds) panic.
//! - Seedless reductions of an empty iterable return `ReduceError::Empty`.
//!
//! Logging
//! - Emits through the `log` facade only: `debug!` on table growth,
//!   `trace!` when a reversed cursor buffers its source.

pub mod cursor;
pub mod hash_table;
#[cfg(test)]
mod hash_table_proptest;
pub mod iterable;
pub mod map;
mod reentrancy;
pub mod set;
pub mod strategy;

// Public surface
pub use cursor::Cursor;
pub use hash_table::{next_power_of_two, ConfigError, Handle, HashTable, TableOptions};
pub use iterable::{empty, source, Iterable, ReduceError, Rendered, Transform};
pub use map::{HashMap, Map};
pub use set::{HashSet, Set};
pub use strategy::{BuildHasherHash, FnEq, FnHash, KeyEq, KeyHash, NativeEq, StringHash};
