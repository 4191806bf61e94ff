use mdxmath_syntax::ExpressionTree;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A document tree node, serialized the way mdast does (`"type"` tag,
/// camelCase names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Root(Parent),
    Paragraph(Parent),
    Heading(Heading),
    Blockquote(Parent),
    List(List),
    ListItem(Parent),
    Emphasis(Parent),
    Strong(Parent),
    Link(Link),
    Text(Literal),
    InlineCode(Literal),
    Code(Code),
    Html(Literal),
    Break,
    ThematicBreak,
    /// Block math (`$$ ... $$`).
    Math(Literal),
    /// Inline math (`$ ... $`).
    InlineMath(Literal),
    MdxJsxFlowElement(JsxElement),
    MdxJsxTextElement(JsxElement),
    MdxFlowExpression(Expression),
    MdxTextExpression(Expression),
    Delete(Parent),
    Image(Image),
    Table(Table),
    TableRow(Parent),
    TableCell(Parent),
    Yaml(Literal),
    /// Any other mdast node, kept as parsed and written back unchanged.
    /// Its children, if any, are not visited.
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub depth: u8,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub ordered: bool,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Per-column alignment: `left`, `right`, `center` or `null`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub align: Vec<Option<String>>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    pub value: String,
}

/// A JSX element invocation such as `<Math display>{...}</Math>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxElement {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Attribute {
    /// `name` or `name="value"`.
    MdxJsxAttribute(JsxAttribute),
    /// `{...spread}`.
    MdxJsxExpressionAttribute(Literal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxAttribute {
    pub name: String,
    /// `None` for boolean attributes written without a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Attribute {
    /// A value-less boolean attribute, e.g. `display`.
    pub fn flag(name: impl Into<String>) -> Self {
        Attribute::MdxJsxAttribute(JsxAttribute {
            name: name.into(),
            value: None,
        })
    }
}

/// An embedded expression. `data.estree` holds the parsed program once a
/// transform has attached one; it is never read back from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub value: String,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExpressionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionData {
    pub estree: ExpressionTree,
}

impl Node {
    /// The mdast `type` name of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Root(_) => "root",
            Node::Paragraph(_) => "paragraph",
            Node::Heading(_) => "heading",
            Node::Blockquote(_) => "blockquote",
            Node::List(_) => "list",
            Node::ListItem(_) => "listItem",
            Node::Emphasis(_) => "emphasis",
            Node::Strong(_) => "strong",
            Node::Link(_) => "link",
            Node::Text(_) => "text",
            Node::InlineCode(_) => "inlineCode",
            Node::Code(_) => "code",
            Node::Html(_) => "html",
            Node::Break => "break",
            Node::ThematicBreak => "thematicBreak",
            Node::Math(_) => "math",
            Node::InlineMath(_) => "inlineMath",
            Node::MdxJsxFlowElement(_) => "mdxJsxFlowElement",
            Node::MdxJsxTextElement(_) => "mdxJsxTextElement",
            Node::MdxFlowExpression(_) => "mdxFlowExpression",
            Node::MdxTextExpression(_) => "mdxTextExpression",
            Node::Delete(_) => "delete",
            Node::Image(_) => "image",
            Node::Table(_) => "table",
            Node::TableRow(_) => "tableRow",
            Node::TableCell(_) => "tableCell",
            Node::Yaml(_) => "yaml",
            Node::Other(_) => "unknown",
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root(p)
            | Node::Paragraph(p)
            | Node::Blockquote(p)
            | Node::ListItem(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p)
            | Node::TableRow(p)
            | Node::TableCell(p) => Some(&p.children),
            Node::Heading(h) => Some(&h.children),
            Node::Table(t) => Some(&t.children),
            Node::List(l) => Some(&l.children),
            Node::Link(l) => Some(&l.children),
            Node::MdxJsxFlowElement(e) | Node::MdxJsxTextElement(e) => Some(&e.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(p)
            | Node::Paragraph(p)
            | Node::Blockquote(p)
            | Node::ListItem(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p)
            | Node::TableRow(p)
            | Node::TableCell(p) => Some(&mut p.children),
            Node::Heading(h) => Some(&mut h.children),
            Node::Table(t) => Some(&mut t.children),
            Node::List(l) => Some(&mut l.children),
            Node::Link(l) => Some(&mut l.children),
            Node::MdxJsxFlowElement(e) | Node::MdxJsxTextElement(e) => Some(&mut e.children),
            _ => None,
        }
    }

    /// Whether this is a block or inline math node.
    pub fn is_math(&self) -> bool {
        matches!(self, Node::Math(_) | Node::InlineMath(_))
    }
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document must have a `root` node at the top, found `{0}`")]
    NotRoot(&'static str),
}

/// Reads a document tree from mdast-style JSON. The top node must be a root.
pub fn from_json(json: &str) -> Result<Node, TreeError> {
    let node: Node = serde_json::from_str(json)?;
    match node {
        Node::Root(_) => Ok(node),
        other => Err(TreeError::NotRoot(other.kind())),
    }
}

/// Writes a document tree as pretty-printed JSON.
pub fn to_json(node: &Node) -> Result<String, TreeError> {
    Ok(serde_json::to_string_pretty(node)?)
}
