//! Value objects
//!
//! A [`JsonLdValue`] is the literal wrapper of the expanded form: a small map
//! restricted to `@value`, `@type`, `@language` and `@index`, with `@value`
//! always present. Removing or clearing `@value` resets it to the empty
//! string instead of deleting it, so `get("@value")` never comes back empty-
//! handed on a published value.

use crate::error::{Error, Result};
use crate::keypath::{value_path_problem, PathSegment};
use crate::map::{MapTransaction, PersistentMap};
use crate::term::{Scalar, Term};
use graphdoc_vocab::keyword as kw;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

static EMPTY_VALUE: Lazy<JsonLdValue> = Lazy::new(|| JsonLdValue {
    map: PersistentMap::new().set(kw::VALUE, empty_string()),
});

fn empty_string() -> Term {
    Term::Scalar(Scalar::String(String::new()))
}

/// A JSON-LD value object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JsonLdValue {
    map: PersistentMap<Term>,
}

impl JsonLdValue {
    /// The default empty value object, `{"@value": ""}`.
    ///
    /// Shares the process-wide singleton's backing store.
    pub fn new() -> Self {
        EMPTY_VALUE.clone()
    }

    /// Wrap a scalar: `{"@value": scalar}`. `Null` yields the empty value.
    pub fn from_scalar(scalar: impl Into<Scalar>) -> Self {
        match scalar.into() {
            Scalar::Null => Self::new(),
            scalar => Self {
                map: PersistentMap::new().set(kw::VALUE, Term::Scalar(scalar)),
            },
        }
    }

    /// Build a value object from `(key, term)` entries.
    ///
    /// Fails with [`Error::Structure`] when the source carries no `@value`
    /// entry, and with [`Error::Size`] when the source cannot bound its
    /// entry count.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Term)>,
    {
        let map = PersistentMap::from_entries(entries)?;
        if !map.contains_key(kw::VALUE) {
            return Err(Error::structure(
                "value object literal is missing an @value entry",
            ));
        }
        Ok(Self { map })
    }

    /// Internal construction from a source already classified as a value
    /// object (`@value` present, finite).
    pub(crate) fn from_revived<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Term)>,
    {
        Self {
            map: PersistentMap::from_iter_trusted(entries),
        }
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.map.get(key)
    }

    /// True when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Number of entries (at least one: `@value`).
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Iterate entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.map.iter()
    }

    /// The `@value` term. Always present on a published value object.
    pub fn value(&self) -> &Term {
        static FALLBACK: Lazy<Term> = Lazy::new(empty_string);
        self.map.get(kw::VALUE).unwrap_or(&FALLBACK)
    }

    /// The `@language` tag, when present.
    pub fn language(&self) -> Option<&str> {
        self.map.get(kw::LANGUAGE)?.as_str()
    }

    /// The `@type` datatype IRI, when present.
    pub fn datatype(&self) -> Option<&str> {
        self.map.get(kw::TYPE)?.as_str()
    }

    /// Return a new value object with `key` bound to `term`.
    ///
    /// The single-segment path `[key]` is validated against the value
    /// grammar first: unknown keys are rejected, as is `@language` on a
    /// typed value or `@type` on a language-tagged string. A failed call
    /// leaves no change behind.
    pub fn set(&self, key: impl Into<String>, term: Term) -> Result<Self> {
        let key = key.into();
        let path = [PathSegment::Key(key.clone())];
        if let Some(problem) = crate::keypath::find_value_problem(self, &path) {
            return Err(Error::Validation(problem));
        }
        Ok(Self {
            map: self.map.set(key, term),
        })
    }

    /// Trusted write path used for validator-approved nested updates.
    pub(crate) fn set_unchecked(&self, key: impl Into<String>, term: Term) -> Self {
        Self {
            map: self.map.set(key, term),
        }
    }

    /// Return a new value object without `key`.
    ///
    /// Removing `@value` resets it to the empty string; the entry itself is
    /// never deleted.
    pub fn remove(&self, key: &str) -> Self {
        if key == kw::VALUE {
            return Self {
                map: self.map.set(kw::VALUE, empty_string()),
            };
        }
        Self {
            map: self.map.remove(key),
        }
    }

    /// Reset to the default empty value object.
    ///
    /// Already-empty values are returned as-is.
    pub fn clear(&self) -> Self {
        if self == &*EMPTY_VALUE {
            return self.clone();
        }
        Self::new()
    }

    /// Run a batch of mutations against a single backing store.
    ///
    /// See [`PersistentMap::with_mutations`]. The finalizer restores
    /// `"@value": ""` if the batch removed it, so the invariant holds on
    /// every published value.
    pub fn with_mutations(&self, f: impl FnOnce(&mut ValueTransaction<'_>)) -> Self {
        let map = self.map.with_mutations(|txn| {
            f(&mut ValueTransaction { txn: &mut *txn });
            restore_value_key(txn);
        });
        Self { map }
    }

    /// Fallible batch: per-call validation with eager semantics.
    ///
    /// An `Err` from the closure aborts the batch; calls applied before the
    /// failure are not rolled back inside the transaction view, but no
    /// partially-mutated value object is published.
    pub fn try_with_mutations(
        &self,
        f: impl FnOnce(&mut ValueTransaction<'_>) -> Result<()>,
    ) -> Result<Self> {
        let mut outcome = Ok(());
        let map = self.map.with_mutations(|txn| {
            outcome = f(&mut ValueTransaction { txn: &mut *txn });
            restore_value_key(txn);
        });
        outcome.map(|()| Self { map })
    }

    /// Convert to a plain JSON value.
    pub fn to_plain(&self) -> JsonValue {
        JsonValue::Object(
            self.map
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_plain()))
                .collect(),
        )
    }
}

fn restore_value_key(txn: &mut MapTransaction<Term>) {
    if !txn.contains_key(kw::VALUE) {
        txn.set(kw::VALUE, empty_string());
    }
}

impl Default for JsonLdValue {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for JsonLdValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries())
    }
}

impl fmt::Display for JsonLdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain())
    }
}

/// Scoped mutable view over a value object being batch-edited.
pub struct ValueTransaction<'a> {
    txn: &'a mut MapTransaction<Term>,
}

impl ValueTransaction<'_> {
    /// Look up an entry in the transaction's current state.
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.txn.get(key)
    }

    /// True when `key` is present in the transaction's current state.
    pub fn contains_key(&self, key: &str) -> bool {
        self.txn.contains_key(key)
    }

    /// Validated write against the transaction's current state.
    pub fn try_set(&mut self, key: impl Into<String>, term: Term) -> Result<()> {
        let key = key.into();
        let path = [PathSegment::Key(key.clone())];
        if let Some(problem) = value_path_problem(
            &path,
            self.txn.contains_key(kw::TYPE),
            self.txn.contains_key(kw::LANGUAGE),
        ) {
            return Err(Error::Validation(problem));
        }
        self.txn.set(key, term);
        Ok(())
    }

    /// Unvalidated write, for callers that have already checked the path.
    pub fn set_unchecked(&mut self, key: impl Into<String>, term: Term) {
        self.txn.set(key, term);
    }

    /// Remove `key`; removing `@value` resets it to the empty string.
    pub fn remove(&mut self, key: &str) {
        if key == kw::VALUE {
            self.txn.set(kw::VALUE, empty_string());
        } else {
            self.txn.remove(key);
        }
    }

    /// Reset the state to the default empty value object.
    pub fn clear(&mut self) {
        self.txn.clear();
        self.txn.set(kw::VALUE, empty_string());
    }
}
