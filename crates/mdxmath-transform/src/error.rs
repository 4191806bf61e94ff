use crate::options::ConfigError;
use mdxmath_syntax::ExpressionSyntaxError;
use thiserror::Error;

/// Why a document could not be transformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The normalized template was rejected by the expression parser.
    /// `offset` is relative to `template`.
    #[error(
        "invalid expression in {kind} node at offset {offset} of `{template}`: {}",
        .source.message
    )]
    ExpressionSyntax {
        kind: &'static str,
        template: String,
        offset: usize,
        source: ExpressionSyntaxError,
    },

    /// Only math nodes can be transcoded.
    #[error("cannot transcode a `{kind}` node, expected `math` or `inlineMath`")]
    UnsupportedNode { kind: &'static str },
}
