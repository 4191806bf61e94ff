use crate::{SyntaxElement, SyntaxKind, SyntaxNode, parser};
use rowan::GreenNode;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// A rejected expression program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct ExpressionSyntaxError {
    /// Human-readable description of the problem.
    pub message: String,
    /// Byte offset into the parsed source.
    pub offset: usize,
}

/// Capability boundary for turning an expression program into a tree.
///
/// The transform never looks inside the returned [`ExpressionTree`]; any
/// implementation that accepts exactly the valid programs is interchangeable.
pub trait ExpressionParser: Send + Sync {
    fn parse_expression(&self, source: &str) -> Result<ExpressionTree, ExpressionSyntaxError>;
}

/// The bundled [`ExpressionParser`], backed by [`parser::parse`].
///
/// Only the first recorded error is reported; later ones are usually
/// consequences of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateParser;

impl ExpressionParser for TemplateParser {
    fn parse_expression(&self, source: &str) -> Result<ExpressionTree, ExpressionSyntaxError> {
        let result = parser::parse(source);
        match result.errors.into_iter().next() {
            Some(error) => Err(ExpressionSyntaxError {
                message: error.message,
                offset: u32::from(error.range.start()) as usize,
            }),
            None => Ok(ExpressionTree {
                green: result.green_node,
            }),
        }
    }
}

/// A successfully parsed expression program.
///
/// Cheap to clone (the green tree is reference counted) and compared
/// structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionTree {
    green: GreenNode,
}

impl ExpressionTree {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The exact source text the tree was parsed from.
    pub fn source(&self) -> String {
        self.syntax().text().to_string()
    }

    /// Source text of each top-level `${...}` body, in order.
    pub fn substitutions(&self) -> Vec<String> {
        let root = self.syntax();
        let Some(template) = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::TemplateLiteral)
        else {
            return Vec::new();
        };
        template
            .children()
            .filter(|n| n.kind() == SyntaxKind::Substitution)
            .filter_map(|s| s.children().find(|n| n.kind() == SyntaxKind::Expression))
            .map(|e| e.text().to_string().trim().to_string())
            .collect()
    }

    /// Indented `Kind@start..end` dump, one element per line. Tokens carry
    /// their text.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        for event in self.syntax().preorder_with_tokens() {
            match event {
                rowan::WalkEvent::Enter(element) => {
                    let range = element.text_range();
                    out.push_str(&"  ".repeat(depth));
                    out.push_str(&format!(
                        "{:?}@{}..{}",
                        element.kind(),
                        u32::from(range.start()),
                        u32::from(range.end())
                    ));
                    if let SyntaxElement::Token(token) = &element {
                        out.push_str(&format!(" {:?}", token.text()));
                    }
                    out.push('\n');
                    depth += 1;
                }
                rowan::WalkEvent::Leave(_) => depth -= 1,
            }
        }
        out
    }
}

#[derive(Serialize)]
struct ElementDump {
    kind: String,
    start: u32,
    end: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ElementDump>,
}

impl ElementDump {
    fn from_element(element: SyntaxElement) -> Self {
        let kind = format!("{:?}", element.kind());
        let range = element.text_range();
        let (text, children) = match element {
            SyntaxElement::Node(node) => (
                None,
                node.children_with_tokens()
                    .map(ElementDump::from_element)
                    .collect(),
            ),
            SyntaxElement::Token(token) => (Some(token.text().to_string()), Vec::new()),
        };
        Self {
            kind,
            start: u32::from(range.start()),
            end: u32::from(range.end()),
            text,
            children,
        }
    }
}

impl Serialize for ExpressionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ElementDump::from_element(SyntaxElement::Node(self.syntax())).serialize(serializer)
    }
}
