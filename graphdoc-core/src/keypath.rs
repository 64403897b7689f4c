//! Keypath grammar for expanded-document containers
//!
//! An access path is a sequence of [`PathSegment`]s: predicate/keyword keys
//! and sequence indexes. Before a container applies a path-addressed write,
//! the path is checked against the access grammar of the expanded form:
//! which keywords may appear where, what must follow a predicate, and which
//! containers must already exist along the way.
//!
//! [`find_problem`] is a pure decision function returning the first
//! [`KeypathProblem`] or `None`; [`validate`] converts a problem into an
//! [`Error::Validation`] carrying the problem text verbatim.

use crate::error::{Error, Result};
use crate::node::JsonLdNode;
use crate::term::Term;
use crate::value::JsonLdValue;
use graphdoc_vocab::keyword as kw;
use std::fmt;
use tracing::debug;

/// One step of an access path: a string key or a sequence index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Key access into a node or value object
    Key(String),
    /// Index access into a sequence
    Index(usize),
}

impl PathSegment {
    /// Create a key segment.
    pub fn key(key: impl Into<String>) -> Self {
        PathSegment::Key(key.into())
    }

    /// Create an index segment.
    pub fn index(index: usize) -> Self {
        PathSegment::Index(index)
    }

    /// The key, when this segment is one.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    /// True when this segment is a key.
    pub fn is_key(&self) -> bool {
        matches!(self, PathSegment::Key(_))
    }

    /// True when this segment is an index.
    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::key(key)
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Render a path the way problem texts quote it: `[ @type, 3 ]`.
fn show_path(path: &[PathSegment]) -> String {
    let joined = path
        .iter()
        .map(PathSegment::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[ {joined} ]")
}

/// A violation of the access grammar.
///
/// `Display` is the problem text carried verbatim by [`Error::Validation`].
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum KeypathProblem {
    /// Path breaks the node-object grammar
    #[error("invalid node object keypath: {}", show_path(.0))]
    InvalidNodePath(Vec<PathSegment>),

    /// Path breaks the value-object grammar
    #[error("invalid value object keypath: {}", show_path(.0))]
    InvalidValuePath(Vec<PathSegment>),

    /// Path uses a keyword that never appears in expanded node objects
    #[error("invalid expanded node object keypath: {}", show_path(.0))]
    InvalidExpandedNodePath(Vec<PathSegment>),

    /// An indexed position requires a sequence that is not there
    #[error("no sequence exists at keypath: {}", show_path(.0))]
    MissingSequence(Vec<PathSegment>),

    /// A keyed position requires a node or value object that is not there
    #[error("no node or value object exists at keypath: {}", show_path(.0))]
    MissingNode(Vec<PathSegment>),

    /// `@language` proposed on a value object that carries `@type`
    #[error("typed values cannot have an @language key")]
    TypedLanguageConflict,

    /// `@type` proposed on a value object that carries `@language`
    #[error("language tagged strings cannot have an @type key")]
    LanguageTypeConflict,
}

const VALUE_KEYS: [&str; 4] = [kw::VALUE, kw::TYPE, kw::LANGUAGE, kw::INDEX];

/// Check a path against whichever grammar fits the container kind.
///
/// Sequences and scalars have no access grammar of their own; paths into
/// them are judged from their enclosing node, so `None` here.
pub fn find_problem(term: &Term, path: &[PathSegment]) -> Option<KeypathProblem> {
    match term {
        Term::Node(node) => find_node_problem(node, path),
        Term::Value(value) => find_value_problem(value, path),
        _ => None,
    }
}

/// Check a path against the value-object grammar.
pub fn find_value_problem(value: &JsonLdValue, path: &[PathSegment]) -> Option<KeypathProblem> {
    value_path_problem(
        path,
        value.contains_key(kw::TYPE),
        value.contains_key(kw::LANGUAGE),
    )
}

/// Value grammar over the containing object's current key set.
///
/// Split out so batch transactions can validate against their in-progress
/// state without materializing a container.
pub(crate) fn value_path_problem(
    path: &[PathSegment],
    has_type: bool,
    has_language: bool,
) -> Option<KeypathProblem> {
    if path.is_empty() {
        return None;
    }
    if path.len() > 1 {
        return Some(KeypathProblem::InvalidValuePath(path.to_vec()));
    }
    let key = match path[0].as_key() {
        Some(key) if VALUE_KEYS.contains(&key) => key,
        _ => return Some(KeypathProblem::InvalidValuePath(path.to_vec())),
    };
    if has_type && key == kw::LANGUAGE {
        return Some(KeypathProblem::TypedLanguageConflict);
    }
    if has_language && key == kw::TYPE {
        return Some(KeypathProblem::LanguageTypeConflict);
    }
    None
}

/// Check a path against the node-object grammar.
///
/// The scan runs backward from the path end: when a grammar violation near
/// the tail coexists with a missing container nearer the root, the tail
/// problem wins.
pub fn find_node_problem(node: &JsonLdNode, path: &[PathSegment]) -> Option<KeypathProblem> {
    if path.is_empty() {
        return None;
    }
    if path[0].is_index() {
        return Some(KeypathProblem::InvalidNodePath(path.to_vec()));
    }
    (0..path.len())
        .rev()
        .find_map(|i| node_segment_problem(node, path, i))
}

/// Single-key node grammar, for validating `set(key, ...)`-shaped writes
/// against transaction state where no container value is at hand.
pub(crate) fn node_key_problem(key: &str) -> Option<KeypathProblem> {
    match key {
        kw::VALUE | kw::LIST | kw::SET => Some(KeypathProblem::InvalidNodePath(vec![
            PathSegment::key(key),
        ])),
        kw::CONTEXT | kw::GRAPH => Some(KeypathProblem::InvalidExpandedNodePath(vec![
            PathSegment::key(key),
        ])),
        _ => None,
    }
}

// Positional rules for one segment. `i` is the segment's position, checked
// against the path end and its neighbors; the two structural rules at the
// bottom consult the container at the segment's path prefix.
fn node_segment_problem(
    node: &JsonLdNode,
    path: &[PathSegment],
    i: usize,
) -> Option<KeypathProblem> {
    let last = path.len() - 1;
    let invalid = || Some(KeypathProblem::InvalidNodePath(path.to_vec()));

    match &path[i] {
        PathSegment::Key(key) => {
            match key.as_str() {
                kw::VALUE | kw::LIST | kw::SET => return invalid(),
                kw::CONTEXT | kw::GRAPH => {
                    return Some(KeypathProblem::InvalidExpandedNodePath(path.to_vec()))
                }
                // @id and @index address raw strings: final position only
                kw::ID | kw::INDEX => {
                    if i != last {
                        return invalid();
                    }
                }
                // @type holds a sequence of IRIs: final, or followed by one
                // final index
                kw::TYPE => {
                    if i + 2 < path.len() {
                        return invalid();
                    }
                    if i != last && !path[i + 1].is_index() {
                        return invalid();
                    }
                }
                // @reverse holds a nested node object keyed by predicate
                kw::REVERSE => {
                    if i != last && !path[i + 1].is_key() {
                        return invalid();
                    }
                }
                // an ordinary predicate holds a sequence: stepping past it
                // goes through an index
                _ => {
                    if i != last && !path[i + 1].is_index() {
                        return invalid();
                    }
                }
            }
            // a non-final key outside {@id, @index, @reverse} needs an
            // actual sequence at its prefix
            if i != last && !matches!(key.as_str(), kw::ID | kw::INDEX | kw::REVERSE) {
                let prefix = &path[..=i];
                if !matches!(node.get_in(prefix), Some(Term::Sequence(_))) {
                    return Some(KeypathProblem::MissingSequence(prefix.to_vec()));
                }
            }
            None
        }
        PathSegment::Index(_) => {
            if i != last && !path[i + 1].is_key() {
                return invalid();
            }
            // an index directly after @type lands on an IRI string, which is
            // not further indexable
            if i != 0 && i != last && path[i - 1].as_key() == Some(kw::TYPE) {
                return invalid();
            }
            // a non-final index needs a node or value object at its prefix
            if i != last {
                let prefix = &path[..=i];
                if !matches!(
                    node.get_in(prefix),
                    Some(Term::Node(_)) | Some(Term::Value(_))
                ) {
                    return Some(KeypathProblem::MissingNode(prefix.to_vec()));
                }
            }
            None
        }
    }
}

/// Validate a path, converting the first problem into [`Error::Validation`].
pub fn validate(term: &Term, path: &[PathSegment]) -> Result<()> {
    match find_problem(term, path) {
        Some(problem) => {
            debug!(%problem, "keypath validation failed");
            Err(Error::Validation(problem))
        }
        None => Ok(()),
    }
}
