use crate::{SyntaxKind, SyntaxNode, lexer::Lexer};
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};
use std::iter::Peekable;

/// Deepest nesting of groups and template literals the parser descends into.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

/// Recursive-descent parser producing a lossless rowan tree.
///
/// Grammar, informally:
///
/// ```text
/// Root            = (TaggedTemplate | TemplateLiteral) trailing?
/// TaggedTemplate  = Tag TemplateLiteral
/// Tag             = Ident ('.' Ident)*
/// TemplateLiteral = '`' (TemplateChunk | Substitution)* '`'
/// Substitution    = '${' Expression '}'
/// Expression      = (Group | TemplateLiteral | token)+
/// Group           = '(' ... ')' | '[' ... ']' | '{' ... '}'
/// ```
///
/// Like the rest of the tree builders in this workspace the parser never
/// stops at the first problem: it records a [`SyntaxError`] and keeps going,
/// so the tree always covers the whole input. Past [`MAX_NESTING`] levels the
/// rest of the input is kept as one error node instead of being descended
/// into.
pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    current_offset: TextSize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input).peekable(),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            current_offset: TextSize::from(0),
            depth: 0,
        }
    }

    pub fn parse(mut self) -> ParseResult {
        self.builder.start_node(SyntaxKind::Root.into());
        self.skip_trivia();

        match self.peek() {
            SyntaxKind::Ident => self.parse_tagged_template(),
            SyntaxKind::Backtick => self.parse_template_literal(),
            SyntaxKind::Eof => self.error("Expected template expression, found end of input".into()),
            _ => self.error("Expected template expression".into()),
        }

        self.skip_trivia();
        if self.peek() != SyntaxKind::Eof {
            self.error("Unexpected input after template expression".into());
            self.builder.start_node(SyntaxKind::ErrorNode.into());
            while self.peek() != SyntaxKind::Eof {
                self.bump();
            }
            self.builder.finish_node();
        }

        self.builder.finish_node();
        ParseResult {
            green_node: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn peek(&mut self) -> SyntaxKind {
        self.lexer
            .peek()
            .map(|(k, _)| *k)
            .unwrap_or(SyntaxKind::Eof)
    }

    fn peek_text(&mut self) -> &str {
        self.lexer.peek().map(|(_, t)| *t).unwrap_or("")
    }

    fn bump(&mut self) {
        if let Some((kind, text)) = self.lexer.next() {
            self.builder.token(kind.into(), text);
            let len = TextSize::of(text);
            self.current_offset += len;
        }
    }

    fn skip_trivia(&mut self) {
        while self.peek().is_trivia() {
            self.bump();
        }
    }

    fn error(&mut self, message: String) {
        let start = self.current_offset;
        let text = self.peek_text();
        let len = TextSize::of(text);
        let range = TextRange::at(start, len);
        self.errors.push(SyntaxError { message, range });
    }

    /// Records an error and wraps the offending token in an error node.
    fn bump_error(&mut self, message: String) {
        self.error(message);
        self.builder.start_node(SyntaxKind::ErrorNode.into());
        self.bump();
        self.builder.finish_node();
    }

    fn parse_tagged_template(&mut self) {
        self.builder.start_node(SyntaxKind::TaggedTemplate.into());

        self.builder.start_node(SyntaxKind::Tag.into());
        self.bump(); // Consume the first identifier
        while self.peek() == SyntaxKind::Dot {
            self.bump();
            if self.peek() == SyntaxKind::Ident {
                self.bump();
            } else {
                self.error("Expected property name after '.'".into());
                break;
            }
        }
        self.builder.finish_node();

        self.skip_trivia();
        if self.peek() == SyntaxKind::Backtick {
            self.parse_template_literal();
        } else {
            self.error("Expected template literal after tag".into());
        }

        self.builder.finish_node();
    }

    fn parse_template_literal(&mut self) {
        self.depth += 1;
        self.builder.start_node(SyntaxKind::TemplateLiteral.into());
        self.bump(); // Consume opening '`'

        loop {
            match self.peek() {
                SyntaxKind::TemplateChunk => self.bump(),
                SyntaxKind::DollarBrace => self.parse_substitution(),
                SyntaxKind::Backtick => {
                    self.bump();
                    break;
                }
                SyntaxKind::Eof => {
                    self.error("Unterminated template literal".into());
                    break;
                }
                // The lexer only yields the kinds above in template mode.
                _ => self.bump_error("Unexpected token in template literal".into()),
            }
        }

        self.builder.finish_node();
        self.depth -= 1;
    }

    fn parse_substitution(&mut self) {
        self.builder.start_node(SyntaxKind::Substitution.into());
        self.bump(); // Consume '${'

        self.builder.start_node(SyntaxKind::Expression.into());
        let mut empty = true;
        loop {
            match self.peek() {
                SyntaxKind::RBrace | SyntaxKind::Eof => break,
                kind if kind.is_trivia() => self.bump(),
                _ => {
                    empty = false;
                    self.parse_expression_element();
                }
            }
        }
        self.builder.finish_node();

        match self.peek() {
            SyntaxKind::RBrace => {
                if empty {
                    self.error("Empty template substitution".into());
                }
                self.bump(); // Consume '}'
            }
            _ => self.error("Expected '}' to close template substitution".into()),
        }

        self.builder.finish_node();
    }

    fn parse_expression_element(&mut self) {
        match self.peek() {
            SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace | SyntaxKind::Backtick
                if self.depth >= MAX_NESTING =>
            {
                self.skip_too_deep()
            }
            SyntaxKind::LParen => self.parse_group(SyntaxKind::RParen),
            SyntaxKind::LBracket => self.parse_group(SyntaxKind::RBracket),
            SyntaxKind::LBrace => self.parse_group(SyntaxKind::RBrace),
            SyntaxKind::Backtick => self.parse_template_literal(),
            SyntaxKind::RParen => self.bump_error("Unmatched ')'".into()),
            SyntaxKind::RBracket => self.bump_error("Unmatched ']'".into()),
            SyntaxKind::Error => self.bump_error("Unterminated string literal".into()),
            SyntaxKind::Eof => {}
            _ => self.bump(),
        }
    }

    fn parse_group(&mut self, close: SyntaxKind) {
        self.depth += 1;
        self.builder.start_node(SyntaxKind::Group.into());
        self.bump(); // Consume the opening bracket

        loop {
            match self.peek() {
                kind if kind == close => {
                    self.bump();
                    break;
                }
                SyntaxKind::Eof => {
                    self.error(format!("Expected '{}'", closing_text(close)));
                    break;
                }
                found @ (SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace) => {
                    // Leave the stray closer to the enclosing construct.
                    self.error(format!(
                        "Mismatched delimiter: expected '{}', found '{}'",
                        closing_text(close),
                        closing_text(found)
                    ));
                    break;
                }
                _ => self.parse_expression_element(),
            }
        }

        self.builder.finish_node();
        self.depth -= 1;
    }

    /// Keeps everything up to the end of input in one error node.
    fn skip_too_deep(&mut self) {
        self.error("Expression nested too deeply".into());
        self.builder.start_node(SyntaxKind::ErrorNode.into());
        while self.peek() != SyntaxKind::Eof {
            self.bump();
        }
        self.builder.finish_node();
    }
}

fn closing_text(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::RParen => ")",
        SyntaxKind::RBracket => "]",
        _ => "}",
    }
}

pub struct ParseResult {
    pub green_node: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl ParseResult {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green_node.clone())
    }
}

pub fn parse(input: &str) -> ParseResult {
    Parser::new(input).parse()
}
