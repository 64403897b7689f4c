//! Closed term variant for expanded-document graphs
//!
//! Every position in a container graph holds a [`Term`], whose variant is
//! decided once at construction: a nested node object, a value object, an
//! ordered sequence, or a scalar literal. Consumers dispatch by exhaustive
//! match on the variant; there are no runtime tag probes.

use crate::keypath::PathSegment;
use crate::node::JsonLdNode;
use crate::value::JsonLdValue;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};
use std::fmt;

/// A scalar literal: a JSON leaf with no container structure.
///
/// Numbers are [`serde_json::Number`], which excludes NaN, so `Scalar` is
/// fully `Eq` and `Hash`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// A string (an IRI at `@id`/`@type` positions, otherwise free text)
    String(String),
    /// A JSON number
    Number(Number),
    /// A boolean
    Bool(bool),
    /// JSON null
    Null,
}

impl Scalar {
    /// The string content, when this scalar is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a plain JSON value.
    pub fn to_plain(&self) -> JsonValue {
        match self {
            Scalar::String(s) => JsonValue::String(s.clone()),
            Scalar::Number(n) => JsonValue::Number(n.clone()),
            Scalar::Bool(b) => JsonValue::Bool(*b),
            Scalar::Null => JsonValue::Null,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(Number::from(n))
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(Number::from(n))
    }
}

/// A position in a container graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// A nested node object
    Node(JsonLdNode),
    /// A value object
    Value(JsonLdValue),
    /// An ordered sequence of terms
    Sequence(Vec<Term>),
    /// A scalar literal
    Scalar(Scalar),
}

impl Term {
    /// True when this term is a node object.
    pub fn is_node(&self) -> bool {
        matches!(self, Term::Node(_))
    }

    /// True when this term is a value object.
    pub fn is_value(&self) -> bool {
        matches!(self, Term::Value(_))
    }

    /// True when this term is a sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Term::Sequence(_))
    }

    /// The node object, when this term is one.
    pub fn as_node(&self) -> Option<&JsonLdNode> {
        match self {
            Term::Node(n) => Some(n),
            _ => None,
        }
    }

    /// The value object, when this term is one.
    pub fn as_value(&self) -> Option<&JsonLdValue> {
        match self {
            Term::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The sequence items, when this term is a sequence.
    pub fn as_sequence(&self) -> Option<&[Term]> {
        match self {
            Term::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The scalar, when this term is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Term::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The string content, when this term is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Walk a keypath from this term.
    ///
    /// `Key` segments descend into node and value objects, `Index` segments
    /// into sequences; any mismatch or missing entry yields `None`. The empty
    /// path is this term.
    pub fn get_in(&self, path: &[PathSegment]) -> Option<&Term> {
        let Some((segment, rest)) = path.split_first() else {
            return Some(self);
        };
        match (self, segment) {
            (Term::Node(node), PathSegment::Key(key)) => node.get(key)?.get_in(rest),
            (Term::Value(value), PathSegment::Key(key)) => value.get(key)?.get_in(rest),
            (Term::Sequence(items), PathSegment::Index(i)) => items.get(*i)?.get_in(rest),
            _ => None,
        }
    }

    /// Persistent update at a keypath, returning the rewritten term.
    ///
    /// Precondition: the path was approved by the keypath validator, so every
    /// non-final segment resolves to the right container kind. A final
    /// out-of-range sequence index appends. A `Key` segment addressing a
    /// missing child with path remaining (only reachable through `@reverse`)
    /// creates an empty node object on the way down.
    pub(crate) fn with_in(&self, path: &[PathSegment], new: Term) -> Term {
        let Some((segment, rest)) = path.split_first() else {
            return new;
        };
        match (self, segment) {
            (Term::Node(node), PathSegment::Key(key)) => {
                if rest.is_empty() {
                    Term::Node(node.set_unchecked(key.clone(), new))
                } else {
                    let child = node
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| Term::Node(JsonLdNode::new()));
                    Term::Node(node.set_unchecked(key.clone(), child.with_in(rest, new)))
                }
            }
            (Term::Value(value), PathSegment::Key(key)) => {
                if rest.is_empty() {
                    Term::Value(value.set_unchecked(key.clone(), new))
                } else {
                    let child = value
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| Term::Node(JsonLdNode::new()));
                    Term::Value(value.set_unchecked(key.clone(), child.with_in(rest, new)))
                }
            }
            (Term::Sequence(items), PathSegment::Index(i)) => {
                let mut items = items.clone();
                if rest.is_empty() {
                    if *i < items.len() {
                        items[*i] = new;
                    } else {
                        items.push(new);
                    }
                } else if let Some(child) = items.get(*i) {
                    items[*i] = child.with_in(rest, new);
                }
                Term::Sequence(items)
            }
            // Mismatched segment kind; validated paths never reach here.
            _ => self.clone(),
        }
    }

    /// Convert to a plain JSON value (lossless structural round-trip).
    pub fn to_plain(&self) -> JsonValue {
        match self {
            Term::Node(node) => node.to_plain(),
            Term::Value(value) => value.to_plain(),
            Term::Sequence(items) => JsonValue::Array(items.iter().map(Term::to_plain).collect()),
            Term::Scalar(scalar) => scalar.to_plain(),
        }
    }
}

impl From<JsonLdNode> for Term {
    fn from(node: JsonLdNode) -> Self {
        Term::Node(node)
    }
}

impl From<JsonLdValue> for Term {
    fn from(value: JsonLdValue) -> Self {
        Term::Value(value)
    }
}

impl From<Scalar> for Term {
    fn from(scalar: Scalar) -> Self {
        Term::Scalar(scalar)
    }
}

impl From<Vec<Term>> for Term {
    fn from(items: Vec<Term>) -> Self {
        Term::Sequence(items)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Scalar(Scalar::from(s))
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Scalar(Scalar::from(s))
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Scalar(Scalar::from(b))
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Scalar(Scalar::from(n))
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Null => serializer.serialize_unit(),
        }
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Term::Node(node) => node.serialize(serializer),
            Term::Value(value) => value.serialize(serializer),
            Term::Sequence(items) => serializer.collect_seq(items),
            Term::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypath::PathSegment;

    fn seg(k: &str) -> PathSegment {
        PathSegment::key(k)
    }

    #[test]
    fn test_get_in_walks_nested_structure() {
        let inner = JsonLdValue::from_scalar("deep");
        let node = JsonLdNode::new()
            .push("http://example.org/p", inner.clone())
            .unwrap();
        let term = Term::Node(node);

        let path = [seg("http://example.org/p"), PathSegment::index(0)];
        assert_eq!(term.get_in(&path), Some(&Term::Value(inner)));
        assert_eq!(term.get_in(&[]), Some(&term));
        assert_eq!(term.get_in(&[seg("missing")]), None);
        assert_eq!(term.get_in(&[PathSegment::index(0)]), None);
    }

    #[test]
    fn test_scalar_round_trip() {
        let cases = [
            Scalar::from("text"),
            Scalar::from(42i64),
            Scalar::from(true),
            Scalar::Null,
        ];
        for scalar in cases {
            let json = scalar.to_plain();
            assert_eq!(serde_json::to_value(&scalar).unwrap(), json);
        }
    }
}
