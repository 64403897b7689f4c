//! Node objects
//!
//! A [`JsonLdNode`] is the entity container of the expanded form: predicates
//! and keywords mapped to sequences of values and nested nodes. On top of the
//! persistent map it layers the graph operations — property iteration,
//! fan-out lookup, child and descendant enumeration and preferred-label
//! selection — and validated, path-addressed writes.

use crate::error::{Error, Result};
use crate::keypath::{find_node_problem, PathSegment};
use crate::map::{MapTransaction, PersistentMap};
use crate::term::Term;
use crate::value::JsonLdValue;
use graphdoc_vocab::{keyword as kw, rdfs, skos};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

/// Keywords excluded from property iteration.
pub const RESERVED_KEYWORDS: [&str; 6] = [
    kw::CONTEXT,
    kw::ID,
    kw::GRAPH,
    kw::TYPE,
    kw::REVERSE,
    kw::INDEX,
];

/// Label predicates consulted by [`JsonLdNode::preferred_label`], most
/// preferred first.
pub const DEFAULT_LABEL_PREDICATES: [&str; 2] = [skos::PREF_LABEL, rdfs::LABEL];

static EMPTY_NODE: Lazy<JsonLdNode> = Lazy::new(|| JsonLdNode {
    map: PersistentMap::new(),
});

/// A JSON-LD node object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JsonLdNode {
    map: PersistentMap<Term>,
}

impl JsonLdNode {
    /// The empty node object.
    ///
    /// Shares the process-wide singleton's backing store.
    pub fn new() -> Self {
        EMPTY_NODE.clone()
    }

    /// Build a node object from `(key, term)` entries.
    ///
    /// Fails with [`Error::Size`] when the source cannot bound its entry
    /// count.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Term)>,
    {
        Ok(Self {
            map: PersistentMap::from_entries(entries)?,
        })
    }

    /// Internal construction from an already-classified, finite source.
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

    /// Walk a keypath from this node. The empty path yields `None`; use the
    /// node itself for that.
    pub fn get_in(&self, path: &[PathSegment]) -> Option<&Term> {
        let (first, rest) = path.split_first()?;
        let key = first.as_key()?;
        self.get(key)?.get_in(rest)
    }

    /// True when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when the node has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate all entries, keywords included, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.map.iter()
    }

    /// The node's `@id`, when present and a string.
    pub fn id(&self) -> Option<&str> {
        self.map.get(kw::ID)?.as_str()
    }

    /// Set view of the node's `@type` IRIs; empty when absent.
    pub fn types(&self) -> FxHashSet<&str> {
        match self.map.get(kw::TYPE) {
            Some(Term::Sequence(items)) => items.iter().filter_map(Term::as_str).collect(),
            Some(Term::Scalar(scalar)) => scalar.as_str().into_iter().collect(),
            _ => FxHashSet::default(),
        }
    }

    /// Lazy, order-preserving `(predicate, value)` pairs, excluding the
    /// reserved keywords.
    pub fn property_seq(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.map
            .iter()
            .filter(|(key, _)| !RESERVED_KEYWORDS.contains(key))
    }

    /// The predicates of [`property_seq`](Self::property_seq), in order.
    pub fn property_keys(&self) -> impl Iterator<Item = &str> {
        self.property_seq().map(|(key, _)| key)
    }

    /// Breadth-wise fan-out lookup.
    ///
    /// Starting from `{self}`, each predicate in `path` replaces the working
    /// set with the union of every member's values at that predicate,
    /// flattened into one set; duplicates collapse by structural equality.
    /// A missing predicate contributes nothing. The empty path is `{self}`.
    /// Never errors.
    pub fn get_at(&self, path: &[&str]) -> FxHashSet<Term> {
        self.get_at_or(path, None)
    }

    /// [`get_at`](Self::get_at) with a default contributed by members
    /// missing a predicate.
    pub fn get_at_or(&self, path: &[&str], not_set: Option<&Term>) -> FxHashSet<Term> {
        let mut current = FxHashSet::default();
        current.insert(Term::Node(self.clone()));
        for predicate in path {
            let mut next = FxHashSet::default();
            for member in &current {
                let found = member
                    .as_node()
                    .and_then(|node| node.get(predicate))
                    .or(not_set);
                match found {
                    Some(Term::Sequence(items)) => next.extend(items.iter().cloned()),
                    Some(term) => {
                        next.insert(term.clone());
                    }
                    None => {}
                }
            }
            current = next;
        }
        current
    }

    /// `(predicate, child)` pairs for every property entry that is itself a
    /// node object.
    ///
    /// Predicate order and within-predicate order are preserved; duplicate
    /// children are kept; non-node entries are skipped.
    pub fn child_nodes(&self) -> impl Iterator<Item = (&str, &JsonLdNode)> {
        self.property_seq().flat_map(|(predicate, term)| {
            let children: Box<dyn Iterator<Item = &JsonLdNode> + '_> = match term {
                Term::Sequence(items) => Box::new(items.iter().filter_map(Term::as_node)),
                Term::Node(node) => Box::new(std::iter::once(node)),
                _ => Box::new(std::iter::empty()),
            };
            children.map(move |child| (predicate, child))
        })
    }

    /// Pre-order descendant enumeration.
    ///
    /// Emits `(predicate path, node)` for this node (empty path) and every
    /// node reachable through [`child_nodes`](Self::child_nodes), depth
    /// first. Assumes the graph is acyclic; there is no cycle detection.
    pub fn descendant_nodes(&self) -> Vec<(Vec<&str>, &JsonLdNode)> {
        let mut out = Vec::new();
        collect_descendants(self, &[], &mut out);
        out
    }

    /// Deterministic single-label selection.
    ///
    /// Uses [`DEFAULT_LABEL_PREDICATES`]; see
    /// [`preferred_label_with`](Self::preferred_label_with).
    pub fn preferred_label(&self, language: Option<&str>) -> Option<&JsonLdValue> {
        self.preferred_label_with(language, &DEFAULT_LABEL_PREDICATES)
    }

    /// Deterministic single-label selection over a ranked predicate list.
    ///
    /// Collects label value objects under each predicate. When `language` is
    /// given, predicate groups without a single matching label drop out, but
    /// every label of a surviving group stays in the running. One comparator
    /// orders the candidates: predicate rank first, then exact language
    /// match before non-match; the first candidate wins.
    pub fn preferred_label_with<'a>(
        &'a self,
        language: Option<&str>,
        predicates: &[&str],
    ) -> Option<&'a JsonLdValue> {
        let mut candidates: Vec<(usize, bool, &JsonLdValue)> = Vec::new();
        for (rank, predicate) in predicates.iter().enumerate() {
            let labels: Vec<&JsonLdValue> = match self.get(predicate) {
                Some(Term::Sequence(items)) => items.iter().filter_map(Term::as_value).collect(),
                Some(Term::Value(value)) => vec![value],
                _ => continue,
            };
            if labels.is_empty() {
                continue;
            }
            if let Some(lang) = language {
                if !labels.iter().any(|label| label.language() == Some(lang)) {
                    continue;
                }
            }
            for label in labels {
                let exact = language.is_some_and(|lang| label.language() == Some(lang));
                candidates.push((rank, exact, label));
            }
        }
        candidates.sort_by_key(|&(rank, exact, _)| (rank, !exact));
        candidates.first().map(|&(_, _, label)| label)
    }

    /// Return a new node with `key` bound to `term`.
    ///
    /// The single-segment path `[key]` is validated against the node grammar
    /// first; a failed call leaves no change behind.
    pub fn set(&self, key: impl Into<String>, term: Term) -> Result<Self> {
        let key = key.into();
        let path = [PathSegment::Key(key.clone())];
        if let Some(problem) = find_node_problem(self, &path) {
            return Err(Error::Validation(problem));
        }
        Ok(self.set_unchecked(key, term))
    }

    /// Return a new node with `term` at `path`, validating the path first.
    ///
    /// Every non-final segment of a validated path resolves to an existing
    /// container, except under `@reverse`, where a missing nested node is
    /// created. A final out-of-range sequence index appends. The empty path
    /// addresses nothing and returns the node unchanged.
    pub fn set_in(&self, path: &[PathSegment], term: Term) -> Result<Self> {
        if let Some(problem) = find_node_problem(self, path) {
            return Err(Error::Validation(problem));
        }
        let Some((first, rest)) = path.split_first() else {
            return Ok(self.clone());
        };
        // the validator rejected numeric first segments
        let Some(key) = first.as_key() else {
            return Ok(self.clone());
        };
        if rest.is_empty() {
            return Ok(self.set_unchecked(key, term));
        }
        let child = self
            .get(key)
            .cloned()
            .unwrap_or_else(|| Term::Node(JsonLdNode::new()));
        Ok(self.set_unchecked(key, child.with_in(rest, term)))
    }

    /// Trusted write path used for validator-approved nested updates.
    pub(crate) fn set_unchecked(&self, key: impl Into<String>, term: Term) -> Self {
        Self {
            map: self.map.set(key, term),
        }
    }

    /// Append `term` to the sequence at `predicate`, creating the sequence
    /// when absent. A non-sequence value at `predicate` is replaced by a
    /// fresh one-element sequence.
    pub fn push(&self, predicate: impl Into<String>, term: impl Into<Term>) -> Result<Self> {
        let predicate = predicate.into();
        let path = [PathSegment::Key(predicate.clone())];
        if let Some(problem) = find_node_problem(self, &path) {
            return Err(Error::Validation(problem));
        }
        let mut items = match self.get(&predicate) {
            Some(Term::Sequence(items)) => items.clone(),
            _ => Vec::new(),
        };
        items.push(term.into());
        Ok(self.set_unchecked(predicate, Term::Sequence(items)))
    }

    /// Return a new node without `key`.
    ///
    /// When `key` is absent the call is a no-op and the result shares this
    /// node's backing store.
    pub fn remove(&self, key: &str) -> Self {
        Self {
            map: self.map.remove(key),
        }
    }

    /// Return the empty node, or this node when it is already empty.
    pub fn clear(&self) -> Self {
        if self.map.is_empty() {
            return self.clone();
        }
        Self::new()
    }

    /// Run a batch of mutations against a single backing store.
    ///
    /// See [`PersistentMap::with_mutations`].
    pub fn with_mutations(&self, f: impl FnOnce(&mut NodeTransaction<'_>)) -> Self {
        let map = self.map.with_mutations(|txn| {
            f(&mut NodeTransaction { txn });
        });
        Self { map }
    }

    /// Fallible batch: per-call validation with eager semantics.
    ///
    /// An `Err` from the closure aborts the batch; no partially-mutated node
    /// is published.
    pub fn try_with_mutations(
        &self,
        f: impl FnOnce(&mut NodeTransaction<'_>) -> Result<()>,
    ) -> Result<Self> {
        let mut outcome = Ok(());
        let map = self.map.with_mutations(|txn| {
            outcome = f(&mut NodeTransaction { txn });
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

fn collect_descendants<'a>(
    node: &'a JsonLdNode,
    path: &[&'a str],
    out: &mut Vec<(Vec<&'a str>, &'a JsonLdNode)>,
) {
    out.push((path.to_vec(), node));
    for (predicate, child) in node.child_nodes() {
        let mut next = path.to_vec();
        next.push(predicate);
        collect_descendants(child, &next, out);
    }
}

impl Default for JsonLdNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for JsonLdNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries())
    }
}

impl fmt::Display for JsonLdNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain())
    }
}

/// Scoped mutable view over a node object being batch-edited.
pub struct NodeTransaction<'a> {
    txn: &'a mut MapTransaction<Term>,
}

impl NodeTransaction<'_> {
    /// Look up an entry in the transaction's current state.
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.txn.get(key)
    }

    /// True when `key` is present in the transaction's current state.
    pub fn contains_key(&self, key: &str) -> bool {
        self.txn.contains_key(key)
    }

    /// Validated write: rejects keywords that never carry a direct value on
    /// a node object.
    pub fn try_set(&mut self, key: impl Into<String>, term: Term) -> Result<()> {
        let key = key.into();
        if let Some(problem) = crate::keypath::node_key_problem(&key) {
            return Err(Error::Validation(problem));
        }
        self.txn.set(key, term);
        Ok(())
    }

    /// Unvalidated write, for callers that have already checked the path.
    pub fn set_unchecked(&mut self, key: impl Into<String>, term: Term) {
        self.txn.set(key, term);
    }

    /// Remove `key` in place.
    pub fn remove(&mut self, key: &str) {
        self.txn.remove(key);
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.txn.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Scalar;
    use serde_json::json;

    const DCT_TITLE: &str = "http://purl.org/dc/terms/title";

    fn title_value(text: &str) -> JsonLdValue {
        JsonLdValue::from_scalar(text)
    }

    #[test]
    fn test_empty_node_shares_singleton() {
        let a = JsonLdNode::new();
        let b = JsonLdNode::new();
        assert_eq!(a, b);
        assert!(a.is_empty());
        assert_eq!(a.id(), None);
    }

    #[test]
    fn test_id_and_types() {
        let node = JsonLdNode::new()
            .set(kw::ID, "http://example.org/thing".into())
            .unwrap()
            .push(kw::TYPE, "http://schema.org/Person")
            .unwrap();
        assert_eq!(node.id(), Some("http://example.org/thing"));
        assert_eq!(
            node.types(),
            ["http://schema.org/Person"].into_iter().collect()
        );
        assert!(JsonLdNode::new().types().is_empty());
    }

    #[test]
    fn test_property_seq_skips_keywords() {
        let node = JsonLdNode::new()
            .set(kw::ID, "http://example.org/thing".into())
            .unwrap()
            .set(kw::INDEX, "i0".into())
            .unwrap()
            .push(DCT_TITLE, title_value("Moby Dick"))
            .unwrap()
            .push("http://example.org/other", title_value("x"))
            .unwrap();
        let keys: Vec<&str> = node.property_keys().collect();
        assert_eq!(keys, vec![DCT_TITLE, "http://example.org/other"]);
    }

    #[test]
    fn test_push_creates_and_appends() {
        let node = JsonLdNode::new()
            .push(DCT_TITLE, title_value("first"))
            .unwrap()
            .push(DCT_TITLE, title_value("second"))
            .unwrap();
        let items = node.get(DCT_TITLE).and_then(Term::as_sequence).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Term::Value(title_value("first")));
    }

    #[test]
    fn test_push_rejects_disallowed_keywords() {
        let err = JsonLdNode::new().push(kw::VALUE, "x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid node object keypath: [ @value ]"
        );
    }

    #[test]
    fn test_get_at_fans_out_across_children() {
        let wheel = |color: &str| {
            JsonLdNode::new()
                .push(
                    "http://stupid.com/hubcap",
                    JsonLdNode::new()
                        .push("http://stupid.com/color", title_value(color))
                        .unwrap(),
                )
                .unwrap()
        };
        let car = JsonLdNode::new()
            .push("http://stupid.com/wheels", wheel("red"))
            .unwrap()
            .push("http://stupid.com/wheels", wheel("blue"))
            .unwrap();

        let empty_path = car.get_at(&[]);
        assert_eq!(empty_path.len(), 1);
        assert!(empty_path.contains(&Term::Node(car.clone())));

        let hubcaps = car.get_at(&["http://stupid.com/wheels", "http://stupid.com/hubcap"]);
        assert_eq!(hubcaps.len(), 2);

        let colors = car.get_at(&[
            "http://stupid.com/wheels",
            "http://stupid.com/hubcap",
            "http://stupid.com/color",
        ]);
        assert_eq!(colors.len(), 2);
        assert!(colors.contains(&Term::Value(title_value("red"))));
        assert!(colors.contains(&Term::Value(title_value("blue"))));

        // missing predicates never error
        assert!(car.get_at(&["http://stupid.com/missing"]).is_empty());
    }

    #[test]
    fn test_get_at_collapses_duplicates() {
        let shared = title_value("same");
        let child = || {
            JsonLdNode::new()
                .push("http://example.org/q", shared.clone())
                .unwrap()
        };
        let node = JsonLdNode::new()
            .push("http://example.org/p", child())
            .unwrap()
            .push("http://example.org/p", child())
            .unwrap();
        let values = node.get_at(&["http://example.org/p", "http://example.org/q"]);
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_child_nodes_preserves_order_and_duplicates() {
        let child = JsonLdNode::new()
            .set(kw::ID, "http://example.org/c".into())
            .unwrap();
        let node = JsonLdNode::new()
            .push("http://example.org/a", child.clone())
            .unwrap()
            .push("http://example.org/a", child.clone())
            .unwrap()
            .push("http://example.org/b", title_value("not a node"))
            .unwrap()
            .push("http://example.org/z", child.clone())
            .unwrap();
        let children: Vec<(&str, &JsonLdNode)> = node.child_nodes().collect();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].0, "http://example.org/a");
        assert_eq!(children[1].0, "http://example.org/a");
        assert_eq!(children[2].0, "http://example.org/z");
    }

    #[test]
    fn test_descendant_nodes_childless() {
        let node = JsonLdNode::new()
            .push(DCT_TITLE, title_value("leaf"))
            .unwrap();
        let descendants = node.descendant_nodes();
        assert_eq!(descendants.len(), 1);
        assert_eq!(descendants[0].0, Vec::<&str>::new());
        assert_eq!(descendants[0].1, &node);
    }

    #[test]
    fn test_descendant_nodes_preorder_paths() {
        let grandchild = JsonLdNode::new()
            .set(kw::ID, "http://example.org/gc".into())
            .unwrap();
        let child = JsonLdNode::new()
            .push("http://example.org/inner", grandchild.clone())
            .unwrap();
        let root = JsonLdNode::new()
            .push("http://example.org/outer", child.clone())
            .unwrap();

        let descendants = root.descendant_nodes();
        assert_eq!(descendants.len(), 3);
        assert_eq!(descendants[0].0, Vec::<&str>::new());
        assert_eq!(descendants[1].0, vec!["http://example.org/outer"]);
        assert_eq!(
            descendants[2].0,
            vec!["http://example.org/outer", "http://example.org/inner"]
        );
        assert_eq!(descendants[2].1, &grandchild);
    }

    #[test]
    fn test_preferred_label_ranks_skos_first() {
        // insertion order must not matter: rdfs:label arrives first
        let node = JsonLdNode::new()
            .push(rdfs::LABEL, title_value("plain label"))
            .unwrap()
            .push(skos::PREF_LABEL, title_value("preferred"))
            .unwrap();
        assert_eq!(
            node.preferred_label(None),
            Some(&title_value("preferred"))
        );
    }

    #[test]
    fn test_preferred_label_language_groups() {
        let en = title_value("color").set(kw::LANGUAGE, "en".into()).unwrap();
        let de = title_value("Farbe").set(kw::LANGUAGE, "de".into()).unwrap();
        let node = JsonLdNode::new()
            .push(skos::PREF_LABEL, de.clone())
            .unwrap()
            .push(skos::PREF_LABEL, en.clone())
            .unwrap();

        // exact match wins within the group
        assert_eq!(node.preferred_label(Some("en")), Some(&en));
        assert_eq!(node.preferred_label(Some("de")), Some(&de));
        // no group contains "fr": nothing qualifies
        assert_eq!(node.preferred_label(Some("fr")), None);
        // without a language the first label of the best rank wins
        assert_eq!(node.preferred_label(None), Some(&de));
    }

    #[test]
    fn test_preferred_label_group_filter_keeps_whole_group() {
        // rdfs:label has the exact-language match, skos:prefLabel does not:
        // the skos group drops out entirely and rdfs wins
        let en = title_value("water").set(kw::LANGUAGE, "en".into()).unwrap();
        let node = JsonLdNode::new()
            .push(skos::PREF_LABEL, title_value("agua").set(kw::LANGUAGE, "es".into()).unwrap())
            .unwrap()
            .push(rdfs::LABEL, en.clone())
            .unwrap();
        assert_eq!(node.preferred_label(Some("en")), Some(&en));
    }

    #[test]
    fn test_set_rejects_bad_keywords() {
        for key in [kw::VALUE, kw::LIST, kw::SET] {
            assert!(JsonLdNode::new().set(key, Term::from("x")).is_err());
        }
        let err = JsonLdNode::new()
            .set(kw::GRAPH, Term::from("x"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid expanded node object keypath: [ @graph ]"
        );
    }

    #[test]
    fn test_set_in_rewrites_nested_value() {
        let node = JsonLdNode::new()
            .push(DCT_TITLE, title_value("Moby Dick"))
            .unwrap();
        let path = [
            PathSegment::key(DCT_TITLE),
            PathSegment::index(0),
            PathSegment::key(kw::LANGUAGE),
        ];
        let updated = node.set_in(&path, Term::from("en")).unwrap();
        assert_eq!(
            updated.get_in(&path),
            Some(&Term::Scalar(Scalar::from("en")))
        );
        // persistence: the original is untouched
        assert_eq!(node.get_in(&path), None);
    }

    #[test]
    fn test_set_in_replaces_sequence_element() {
        let node = JsonLdNode::new()
            .push(DCT_TITLE, title_value("old"))
            .unwrap();
        let path = [PathSegment::key(DCT_TITLE), PathSegment::index(0)];
        let updated = node
            .set_in(&path, title_value("new").into())
            .unwrap();
        assert_eq!(updated.get_in(&path), Some(&title_value("new").into()));
        assert_eq!(node.get_in(&path), Some(&title_value("old").into()));
    }

    #[test]
    fn test_set_in_rejects_at_value_segment() {
        let node = JsonLdNode::new()
            .push(DCT_TITLE, title_value("x"))
            .unwrap();
        let path = [
            PathSegment::key(DCT_TITLE),
            PathSegment::index(0),
            PathSegment::key(kw::VALUE),
        ];
        let err = node.set_in(&path, Term::from("y")).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("invalid node object keypath: [ {DCT_TITLE}, 0, @value ]")
        );
    }

    #[test]
    fn test_set_in_validates_first() {
        let node = JsonLdNode::new();
        let path = [PathSegment::key(DCT_TITLE), PathSegment::index(0)];
        let err = node.set_in(&path, Term::from("x")).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("no sequence exists at keypath: [ {DCT_TITLE} ]")
        );
    }

    #[test]
    fn test_remove_and_clear_identity() {
        let node = JsonLdNode::new()
            .push(DCT_TITLE, title_value("x"))
            .unwrap();
        assert_eq!(node.remove("absent"), node);
        assert!(node.clear().is_empty());
        let empty = JsonLdNode::new();
        assert_eq!(empty.clear(), empty);
    }

    #[test]
    fn test_batch_matches_persistent_chain() {
        let base = JsonLdNode::new();
        let batched = base.with_mutations(|txn| {
            txn.set_unchecked(kw::ID, Term::from("http://example.org/n"));
            txn.set_unchecked(DCT_TITLE, Term::Sequence(vec![title_value("t").into()]));
        });
        let chained = base
            .set(kw::ID, Term::from("http://example.org/n"))
            .unwrap()
            .push(DCT_TITLE, title_value("t"))
            .unwrap();
        assert_eq!(batched, chained);
        assert!(base.is_empty());
    }

    #[test]
    fn test_try_batch_aborts_on_keyword() {
        let base = JsonLdNode::new();
        let result = base.try_with_mutations(|txn| {
            txn.try_set(kw::ID, Term::from("http://example.org/n"))?;
            txn.try_set(kw::VALUE, Term::from("boom"))?;
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_display_renders_plain_json() {
        let node = JsonLdNode::new()
            .push(DCT_TITLE, title_value("Moby Dick"))
            .unwrap();
        assert_eq!(
            node.to_string(),
            r#"{"http://purl.org/dc/terms/title":[{"@value":"Moby Dick"}]}"#
        );
        assert_eq!(serde_json::to_value(&node).unwrap(), node.to_plain());
        assert_eq!(
            node.to_plain(),
            json!({(DCT_TITLE): [{"@value": "Moby Dick"}]})
        );
    }
}
