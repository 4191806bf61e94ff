use crate::SyntaxKind;

/// Lexing context. Template literals and code nest inside each other, so the
/// lexer keeps a stack of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Ordinary expression tokens.
    Code,
    /// Inside a template literal, between its backticks.
    Template,
}

/// A lexer for tagged template programs.
///
/// ## Overview
///
/// The lexer performs **character-level scanning** and produces a stream of
/// ([`SyntaxKind`], `&str`) tuples. Its behaviour depends on the current mode:
///
/// - **Template mode** (inside backticks): raw text is collected into
///   [`SyntaxKind::TemplateChunk`] tokens until a closing backtick or a `${`.
///   A backslash always takes the following character with it, so `` \` ``
///   and `\${` stay part of the chunk.
/// - **Code mode**: identifiers, numbers, string literals, brackets, and single
///   punctuation characters. An opening backtick enters template mode, `{`
///   enters a nested code scope, and `}` leaves the innermost scope.
///
/// `${` pushes a code scope that the matching `}` pops, which is how the lexer
/// returns to template mode after a substitution.
///
/// ## Examples
///
/// ```
/// use mdxmath_syntax::lexer::Lexer;
/// use mdxmath_syntax::SyntaxKind;
///
/// let tokens: Vec<_> = Lexer::new("String.raw`a${b}`").collect();
///
/// assert_eq!(tokens[0], (SyntaxKind::Ident, "String"));
/// assert_eq!(tokens[3], (SyntaxKind::Backtick, "`"));
/// assert_eq!(tokens[4], (SyntaxKind::TemplateChunk, "a"));
/// assert_eq!(tokens[5], (SyntaxKind::DollarBrace, "${"));
/// ```
pub struct Lexer<'a> {
    /// The input source text being lexed.
    input: &'a str,
    /// Current byte position in the input.
    position: usize,
    /// Open scopes, innermost last. Never empty.
    modes: Vec<Mode>,
}

impl<'a> Lexer<'a> {
    /// Creates a new `Lexer` for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            modes: vec![Mode::Code],
        }
    }

    /// Returns the next token (kind, text).
    /// If EOF, returns (SyntaxKind::Eof, "").
    pub fn next_token(&mut self) -> (SyntaxKind, &'a str) {
        if self.position >= self.input.len() {
            return (SyntaxKind::Eof, "");
        }

        let start = self.position;
        let kind = match self.mode() {
            Mode::Template => self.template_token(),
            Mode::Code => self.code_token(),
        };

        (kind, &self.input[start..self.position])
    }

    fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Code)
    }

    fn pop_mode(&mut self) {
        if self.modes.len() > 1 {
            self.modes.pop();
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn template_token(&mut self) -> SyntaxKind {
        let rest = self.rest();
        if rest.starts_with('`') {
            self.position += 1;
            self.pop_mode();
            return SyntaxKind::Backtick;
        }
        if rest.starts_with("${") {
            self.position += 2;
            self.modes.push(Mode::Code);
            return SyntaxKind::DollarBrace;
        }

        while let Some(c) = self.peek_char() {
            match c {
                '`' => break,
                '$' if self.rest().starts_with("${") => break,
                '\\' => {
                    self.position += 1;
                    if let Some(escaped) = self.peek_char() {
                        self.position += escaped.len_utf8();
                    }
                }
                _ => self.position += c.len_utf8(),
            }
        }
        SyntaxKind::TemplateChunk
    }

    fn code_token(&mut self) -> SyntaxKind {
        let Some(c) = self.peek_char() else {
            return SyntaxKind::Eof;
        };
        self.position += c.len_utf8();

        match c {
            '`' => {
                self.modes.push(Mode::Template);
                SyntaxKind::Backtick
            }
            '{' => {
                self.modes.push(Mode::Code);
                SyntaxKind::LBrace
            }
            '}' => {
                self.pop_mode();
                SyntaxKind::RBrace
            }
            '(' => SyntaxKind::LParen,
            ')' => SyntaxKind::RParen,
            '[' => SyntaxKind::LBracket,
            ']' => SyntaxKind::RBracket,
            '.' if !self.peek_char().is_some_and(|n| n.is_ascii_digit()) => SyntaxKind::Dot,
            '\'' | '"' => self.string_literal(c),
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                SyntaxKind::Whitespace
            }
            c if is_ident_start(c) => {
                self.eat_while(is_ident_continue);
                SyntaxKind::Ident
            }
            c if c.is_ascii_digit() || c == '.' => {
                self.eat_while(|n| n.is_ascii_alphanumeric() || n == '.' || n == '_');
                SyntaxKind::Number
            }
            _ => SyntaxKind::Punct,
        }
    }

    /// Consumes a quoted string whose opening quote was already read.
    /// Returns [`SyntaxKind::Error`] when the line or input ends first.
    fn string_literal(&mut self, quote: char) -> SyntaxKind {
        while let Some(c) = self.peek_char() {
            match c {
                '\\' => {
                    self.position += 1;
                    if let Some(escaped) = self.peek_char() {
                        self.position += escaped.len_utf8();
                    }
                }
                '\n' | '\r' => return SyntaxKind::Error,
                c if c == quote => {
                    self.position += c.len_utf8();
                    return SyntaxKind::String;
                }
                _ => self.position += c.len_utf8(),
            }
        }
        SyntaxKind::Error
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if predicate(c) {
                self.position += c.len_utf8();
            } else {
                break;
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (SyntaxKind, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (kind, text) = self.next_token();
        if kind == SyntaxKind::Eof {
            None
        } else {
            Some((kind, text))
        }
    }
}
