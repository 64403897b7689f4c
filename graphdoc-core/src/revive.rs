//! Plain-data boundary
//!
//! Conversion between plain expanded JSON-LD (as `serde_json::Value`, the
//! output of an external expansion processor) and the container graph.
//! Classification is structural and recursive: a mapping carrying `@value`
//! becomes a [`JsonLdValue`], any other mapping a [`JsonLdNode`], arrays
//! become sequences and leaves become scalars. The round trip through
//! [`document_to_plain`] is lossless.

use crate::error::{Error, Result};
use crate::node::JsonLdNode;
use crate::term::{Scalar, Term};
use crate::value::JsonLdValue;
use graphdoc_vocab::keyword as kw;
use serde_json::Value as JsonValue;
use tracing::trace;

/// Revive a plain expanded document into a sequence of node objects.
///
/// `None` and JSON `null` yield an empty sequence; a single top-level
/// mapping is wrapped in a one-element sequence. Every document element
/// must classify as a node object — expanded documents are sequences of
/// node objects, so a top-level value object or bare scalar is an
/// [`Error::Structure`].
pub fn from_expanded(json: Option<&JsonValue>) -> Result<Vec<JsonLdNode>> {
    let nodes = match json {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(node_from_plain)
            .collect::<Result<Vec<_>>>()?,
        Some(other) => vec![node_from_plain(other)?],
    };
    trace!(nodes = nodes.len(), "revived expanded document");
    Ok(nodes)
}

fn node_from_plain(json: &JsonValue) -> Result<JsonLdNode> {
    match revive_term(json) {
        Term::Node(node) => Ok(node),
        _ => Err(Error::structure(
            "expanded document elements must be node objects",
        )),
    }
}

/// Classify and revive a single plain value.
pub fn revive_term(json: &JsonValue) -> Term {
    match json {
        JsonValue::Null => Term::Scalar(Scalar::Null),
        JsonValue::Bool(b) => Term::Scalar(Scalar::Bool(*b)),
        JsonValue::Number(n) => Term::Scalar(Scalar::Number(n.clone())),
        JsonValue::String(s) => Term::Scalar(Scalar::String(s.clone())),
        JsonValue::Array(items) => Term::Sequence(items.iter().map(revive_term).collect()),
        JsonValue::Object(map) => {
            let entries = map.iter().map(|(k, v)| (k.clone(), revive_term(v)));
            if map.contains_key(kw::VALUE) {
                Term::Value(JsonLdValue::from_revived(entries))
            } else {
                Term::Node(JsonLdNode::from_revived(entries))
            }
        }
    }
}

/// Convert a container graph back to a plain expanded document.
pub fn document_to_plain(nodes: &[JsonLdNode]) -> JsonValue {
    JsonValue::Array(nodes.iter().map(JsonLdNode::to_plain).collect())
}
