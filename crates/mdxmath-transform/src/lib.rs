//! Math-to-MDX transform.
//!
//! Every `math` and `inlineMath` node of a document tree is replaced by a JSX
//! element (`<Math>` by default) whose single child is an expression holding
//! the node's text as a raw template literal. Embedded expressions marked in
//! the math text (`\js{...}` by default) become `${...}` substitutions, so
//! they are evaluated at render time while backslashes in the surrounding
//! text are kept verbatim.
//!
//! ```
//! use mdxmath_ast::{from_json, mdx::to_mdx};
//! use mdxmath_transform::{transform_with_default_parser, Options};
//!
//! let tree = from_json(
//!     r#"{"type": "root", "children": [{"type": "paragraph", "children": [
//!         {"type": "text", "value": "Tau is "},
//!         {"type": "inlineMath", "value": "\\js{2 * Math.PI}"}
//!     ]}]}"#,
//! )
//! .unwrap();
//!
//! let tree = transform_with_default_parser(tree, &Options::new()).unwrap();
//! assert_eq!(to_mdx(&tree), "Tau is <Math>{${2 * Math.PI}}</Math>\n");
//! ```

pub mod error;
pub mod options;
pub mod tokenizer;
pub mod transcode;

pub use error::TransformError;
pub use options::{ConfigError, ExpressionSyntax, Options};
pub use tokenizer::{Token, TokenTag, Tokenizer, tokenize, tokenize_marker};
pub use transcode::{ReplacementNode, Transcoder, wrap_raw};

use log::info;
use mdxmath_ast::{Node, walk};
use mdxmath_syntax::{ExpressionParser, TemplateParser};

/// Replaces every math node under `root` and returns the edited tree.
///
/// `options` are validated before the tree is touched. The tree is consumed:
/// on error nothing is returned, so a half-transformed document never
/// escapes.
pub fn transform(
    mut root: Node,
    options: &Options,
    parser: &dyn ExpressionParser,
) -> Result<Node, TransformError> {
    let mut transcoder = Transcoder::new(options, parser)?;
    walk(&mut root, &mut transcoder)?;
    info!(
        "replaced {} math node(s) with <{}>",
        transcoder.replaced(),
        options.element_name
    );
    Ok(root)
}

/// [`transform`] with the built-in template parser.
pub fn transform_with_default_parser(root: Node, options: &Options) -> Result<Node, TransformError> {
    transform(root, options, &TemplateParser)
}
