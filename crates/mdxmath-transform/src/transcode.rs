use crate::error::TransformError;
use crate::options::Options;
use crate::tokenizer::Tokenizer;
use log::debug;
use mdxmath_ast::{Attribute, Expression, ExpressionData, JsxElement, Node, Visit, Visitor};
use mdxmath_syntax::{ExpressionParser, ExpressionTree};

/// Tag that keeps backslashes in literal runs verbatim.
const RAW_TAG: &str = "String.raw";

/// Wraps a normalized template into the program handed to the parser, e.g.
/// ``String.raw`\pi = ${Math.PI}` ``.
pub fn wrap_raw(template: &str) -> String {
    format!("{RAW_TAG}`{template}`")
}

/// Maps an offset in [`wrap_raw`] output back into the template.
fn template_offset(offset: usize, template: &str) -> usize {
    offset.saturating_sub(RAW_TAG.len() + 1).min(template.len())
}

/// The element that takes a math node's place.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementNode {
    pub element_name: String,
    /// Block (`math`) or inline (`inlineMath`) origin.
    pub is_block: bool,
    /// The normalized template.
    pub expression_source: String,
    pub parsed_expression: ExpressionTree,
}

impl ReplacementNode {
    /// Builds the document node.
    ///
    /// Block math becomes an `mdxJsxFlowElement` with a `display` flag and an
    /// `mdxFlowExpression` child; inline math becomes an `mdxJsxTextElement`
    /// without attributes and an `mdxTextExpression` child.
    pub fn into_node(self) -> Node {
        let expression = Expression {
            value: self.expression_source,
            data: Some(ExpressionData {
                estree: self.parsed_expression,
            }),
        };
        if self.is_block {
            Node::MdxJsxFlowElement(JsxElement {
                name: self.element_name,
                attributes: vec![Attribute::flag("display")],
                children: vec![Node::MdxFlowExpression(expression)],
            })
        } else {
            Node::MdxJsxTextElement(JsxElement {
                name: self.element_name,
                attributes: Vec::new(),
                children: vec![Node::MdxTextExpression(expression)],
            })
        }
    }
}

/// Converts math nodes into [`ReplacementNode`]s.
///
/// As a [`Visitor`] it asks the traversal to swap each math node for its
/// replacement in place and to resume at the same index.
pub struct Transcoder<'a> {
    element_name: &'a str,
    tokenizer: Tokenizer,
    parser: &'a dyn ExpressionParser,
    replaced: usize,
}

impl<'a> Transcoder<'a> {
    /// Fails if `options` are invalid.
    pub fn new(options: &'a Options, parser: &'a dyn ExpressionParser) -> Result<Self, TransformError> {
        Ok(Self {
            element_name: &options.element_name,
            tokenizer: Tokenizer::from_options(options)?,
            parser,
            replaced: 0,
        })
    }

    /// Normalizes raw math text with the configured tokenizer.
    pub fn normalize(&self, raw: &str) -> String {
        self.tokenizer.normalize(raw)
    }

    /// Number of nodes replaced so far while walking.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    /// Builds the replacement for one math node.
    pub fn transcode(&self, node: &Node) -> Result<ReplacementNode, TransformError> {
        let (raw, is_block) = match node {
            Node::Math(math) => (&math.value, true),
            Node::InlineMath(math) => (&math.value, false),
            other => return Err(TransformError::UnsupportedNode { kind: other.kind() }),
        };

        let template = self.normalize(raw);
        let parsed = self
            .parser
            .parse_expression(&wrap_raw(&template))
            .map_err(|source| TransformError::ExpressionSyntax {
                kind: node.kind(),
                offset: template_offset(source.offset, &template),
                template: template.clone(),
                source,
            })?;

        Ok(ReplacementNode {
            element_name: self.element_name.to_string(),
            is_block,
            expression_source: template,
            parsed_expression: parsed,
        })
    }
}

impl Visitor for Transcoder<'_> {
    type Error = TransformError;

    fn visit(&mut self, node: &Node, index: usize, parent: &Node) -> Result<Visit, TransformError> {
        if !node.is_math() {
            return Ok(Visit::Continue);
        }
        debug!("transcoding {} at {}[{}]", node.kind(), parent.kind(), index);
        let replacement = self.transcode(node)?;
        self.replaced += 1;
        Ok(Visit::replace(index, replacement.into_node()))
    }
}
