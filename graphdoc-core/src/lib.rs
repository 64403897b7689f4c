//! Persistent, immutable document model for JSON-LD expanded form
//!
//! This library models expanded JSON-LD documents as graphs of two
//! persistent containers:
//! - [`JsonLdNode`] — a node object: predicates and keywords mapped to
//!   sequences of values and nested nodes
//! - [`JsonLdValue`] — a value object: a literal wrapper that always carries
//!   `@value`
//!
//! Both are copy-on-write views over a shared [`PersistentMap`]: mutating
//! operations return new containers, published versions never change, and
//! [`PersistentMap::with_mutations`] batches edits against a single backing
//! store. Path-addressed writes are checked by the [`keypath`] grammar
//! validator before anything is applied.
//!
//! # Example
//!
//! ```
//! use graphdoc_core::from_expanded;
//! use serde_json::json;
//!
//! let doc = json!([{
//!     "@id": "http://example.org/book/moby-dick",
//!     "http://purl.org/dc/terms/title": [{"@value": "Moby Dick"}]
//! }]);
//!
//! let nodes = from_expanded(Some(&doc)).unwrap();
//! assert_eq!(nodes[0].id(), Some("http://example.org/book/moby-dick"));
//! assert_eq!(graphdoc_core::document_to_plain(&nodes), doc);
//! ```

pub mod error;
pub mod keypath;
pub mod map;
pub mod node;
pub mod revive;
pub mod term;
pub mod value;

pub use error::{Error, Result};
pub use keypath::{find_problem, validate, KeypathProblem, PathSegment};
pub use map::{MapTransaction, PersistentMap};
pub use node::{JsonLdNode, NodeTransaction, DEFAULT_LABEL_PREDICATES, RESERVED_KEYWORDS};
pub use revive::{document_to_plain, from_expanded, revive_term};
pub use term::{Scalar, Term};
pub use value::{JsonLdValue, ValueTransaction};
