//! # mdxmath-ast
//!
//! The document tree that math transforms operate on.
//!
//! ## Overview
//!
//! [`Node`] mirrors the subset of [mdast] needed around math content: the
//! usual block and inline containers, the two math node kinds produced by a
//! math-aware markdown reader, and the MDX JSX/expression nodes that replace
//! them. Trees round-trip through JSON in mdast's shape (`"type"` tags,
//! camelCase fields), so a tree produced by another tool can be fed in
//! directly.
//!
//! ## Modules
//!
//! - [`tree`] - node types and JSON helpers
//! - [`visit`] - pre-order traversal where visitors return edit intents
//!   ([`Visit::Splice`]) instead of mutating child lists
//! - [`mdx`] - prints a tree back to MDX text
//!
//! ## Examples
//!
//! ```
//! use mdxmath_ast::{from_json, mdx::to_mdx};
//!
//! let tree = from_json(r#"{
//!     "type": "root",
//!     "children": [
//!         { "type": "paragraph", "children": [
//!             { "type": "text", "value": "Euler: " },
//!             { "type": "inlineMath", "value": "e^{i\\pi}" }
//!         ]}
//!     ]
//! }"#)?;
//!
//! assert_eq!(to_mdx(&tree), "Euler: $e^{i\\pi}$\n");
//! # Ok::<(), mdxmath_ast::TreeError>(())
//! ```
//!
//! [mdast]: https://github.com/syntax-tree/mdast

/// Document node types.
pub mod tree;
/// Traversal with splice/continue control signals.
pub mod visit;
/// MDX text output.
pub mod mdx;


pub use tree::{
    Attribute, Expression, ExpressionData, JsxAttribute, JsxElement, Literal, Node, Parent,
    TreeError, from_json, to_json,
};
pub use visit::{Visit, Visitor, walk};
