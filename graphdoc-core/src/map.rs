//! Persistent associative container
//!
//! [`PersistentMap`] is the copy-on-write map underneath [`JsonLdNode`] and
//! [`JsonLdValue`](crate::JsonLdValue). Every mutating operation returns a new
//! map; the backing store is shared behind an `Arc`, so maps derived from one
//! another share everything they have not changed and published versions stay
//! valid forever.
//!
//! # Design
//!
//! - **Insertion order**: entries iterate in insertion order (`IndexMap`
//!   backing); equality and hashing ignore order.
//! - **Lazy hashing**: the structural hash is computed at most once per
//!   backing store and memoized; any derived map starts with an empty memo.
//! - **Batched mutation**: [`PersistentMap::with_mutations`] clones the
//!   backing store a single time and applies every call in the closure to
//!   that one copy through a [`MapTransaction`]. The transaction borrow ends
//!   with the closure, so no mutable view can escape the scope.
//!
//! [`JsonLdNode`]: crate::JsonLdNode

use crate::error::{Error, Result};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use rustc_hash::{FxBuildHasher, FxHasher};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

type Backing<V> = IndexMap<String, V, FxBuildHasher>;

/// A persistent string-keyed map with structural equality.
///
/// Cloning is cheap (an `Arc` bump plus the hash memo). `set`, `remove` and
/// `clear` never mutate in place; they return a new map, or a map sharing the
/// same backing store when the call is a no-op.
pub struct PersistentMap<V> {
    entries: Arc<Backing<V>>,
    memo: OnceCell<u64>,
}

impl<V: Clone + Eq + Hash> PersistentMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::from_backing(Backing::default())
    }

    /// Build a map from `(key, value)` entries.
    ///
    /// Fails with [`Error::Size`] when the source cannot bound its entry
    /// count (no upper `size_hint`): an unbounded source can never finish
    /// loading.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let iter = entries.into_iter();
        if iter.size_hint().1.is_none() {
            return Err(Error::size(
                "cannot construct a container from a source of unknown size",
            ));
        }
        Ok(Self::from_iter_trusted(iter))
    }

    /// Internal construction path that trusts the source to be finite.
    pub(crate) fn from_iter_trusted<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut backing = Backing::default();
        for (key, value) in entries {
            backing.insert(key, value);
        }
        Self::from_backing(backing)
    }

    fn from_backing(entries: Backing<V>) -> Self {
        Self {
            entries: Arc::new(entries),
            memo: OnceCell::new(),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// True when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Return a new map with `key` bound to `value`.
    pub fn set(&self, key: impl Into<String>, value: V) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(key.into(), value);
        Self::from_backing(entries)
    }

    /// Return a new map without `key`.
    ///
    /// When `key` is absent the call is a no-op and the result shares this
    /// map's backing store.
    pub fn remove(&self, key: &str) -> Self {
        if !self.entries.contains_key(key) {
            return self.clone();
        }
        let mut entries = (*self.entries).clone();
        entries.shift_remove(key);
        Self::from_backing(entries)
    }

    /// Return an empty map, or this map when it is already empty.
    pub fn clear(&self) -> Self {
        if self.entries.is_empty() {
            return self.clone();
        }
        Self::new()
    }

    /// Run a batch of mutations against a single backing store.
    ///
    /// The backing store is cloned once up front; every `set`/`remove` inside
    /// the closure mutates that copy in place instead of allocating a map per
    /// call. The closure's `&mut` borrow is the only mutable view and cannot
    /// outlive the scope; on exit the copy freezes into the returned
    /// immutable map. The source map is unchanged.
    pub fn with_mutations(&self, f: impl FnOnce(&mut MapTransaction<V>)) -> Self {
        let mut txn = MapTransaction {
            entries: (*self.entries).clone(),
        };
        f(&mut txn);
        Self::from_backing(txn.entries)
    }

    /// The memoized structural hash.
    ///
    /// Computed on first use and cached for the lifetime of this backing
    /// store. Order-insensitive: maps that are equal hash equal regardless of
    /// insertion order.
    pub fn hash_code(&self) -> u64 {
        *self.memo.get_or_init(|| {
            let mut acc: u64 = 0;
            for (key, value) in self.entries.iter() {
                let mut hasher = FxHasher::default();
                key.hash(&mut hasher);
                value.hash(&mut hasher);
                acc = acc.wrapping_add(hasher.finish());
            }
            acc ^ self.entries.len() as u64
        })
    }
}

impl<V: Clone + Eq + Hash> Default for PersistentMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for PersistentMap<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            memo: self.memo.clone(),
        }
    }
}

impl<V: Eq> PartialEq for PersistentMap<V> {
    fn eq(&self, other: &Self) -> bool {
        // Same backing store is trivially equal; otherwise compare
        // structurally (IndexMap equality ignores insertion order).
        Arc::ptr_eq(&self.entries, &other.entries) || self.entries == other.entries
    }
}

impl<V: Eq> Eq for PersistentMap<V> {}

impl<V: Clone + Eq + Hash> Hash for PersistentMap<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<V: fmt::Debug> fmt::Debug for PersistentMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Scoped mutable view over a map being batch-edited.
///
/// Only obtainable through [`PersistentMap::with_mutations`]; not `Clone`, so
/// the opening caller holds the only handle.
pub struct MapTransaction<V> {
    entries: Backing<V>,
}

impl<V> MapTransaction<V> {
    /// Look up a value in the transaction's current state.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// True when `key` is present in the transaction's current state.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries in the transaction's current state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the transaction's current state has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bind `key` to `value` in place.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value);
    }

    /// Remove `key` in place, returning the previous value if any.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(key)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
