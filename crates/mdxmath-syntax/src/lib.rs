//! # mdxmath-syntax
//!
//! Parser for the template-literal programs produced when math content is
//! normalized into `${...}` placeholders.
//!
//! The transform crate hands this crate a complete program such as
//! ``String.raw`\pi = ${Math.PI}` `` and gets back either an
//! [`ExpressionTree`] or an [`ExpressionSyntaxError`]. Callers only depend on
//! the [`ExpressionParser`] capability; [`TemplateParser`] is the bundled
//! implementation.
//!
//! The tree is lossless: every byte of the source, whitespace included, is
//! present in exactly one token, so `tree.source()` always returns the input.

pub mod lexer;
pub mod parser;
mod service;


pub use parser::{ParseResult, SyntaxError, parse};
pub use rowan::{TextRange, TextSize};
pub use service::{ExpressionParser, ExpressionSyntaxError, ExpressionTree, TemplateParser};

use rowan::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Tokens
    Backtick = 0,
    TemplateChunk, // raw text between backticks
    DollarBrace,   // ${
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Ident,
    Number,
    String,
    Punct, // any other single operator character
    Whitespace,
    Error, // unterminated string literal

    // Composite Nodes
    Root,
    TaggedTemplate,  // tag`...`
    Tag,             // String.raw
    TemplateLiteral, // `...`
    Substitution,    // ${ ... }
    Expression,      // body of a substitution
    Group,           // ( ... ), [ ... ], { ... }
    ErrorNode,

    // Technical
    Eof,
}

impl SyntaxKind {
    /// Returns true for tokens the parser skips between meaningful tokens.
    pub fn is_trivia(self) -> bool {
        self == SyntaxKind::Whitespace
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateLanguage {}

impl Language for TemplateLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::Eof as u16);
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<TemplateLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<TemplateLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<TemplateLanguage>;
