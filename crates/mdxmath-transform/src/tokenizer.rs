//! Rewrites embedded expressions in math text into template placeholders.
//!
//! Two modes are supported:
//!
//! - **Delimited**: `start ... end` becomes `${...}`. Regions do not nest: a
//!   start delimiter inside an open region is copied verbatim and the first
//!   end delimiter closes the region.
//! - **Marker**: `marker{...}` becomes `${...}`. The closing brace is found by
//!   counting `{`/`}`, so object literals and other braces inside the
//!   expression are kept.
//!
//! Both are total: malformed input (an unterminated region) is emitted as is
//! and left for the expression parser to reject.

use crate::options::{ConfigError, ExpressionSyntax, Options};
use log::{trace, warn};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTag {
    /// Copied to the output unchanged.
    Literal,
    /// Opens an expression region; rendered as `${`.
    EnterExpression,
    /// Closes an expression region; rendered as `}`.
    ExitExpression,
}

/// A slice of the input and its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub tag: TokenTag,
    /// The exact matched input text.
    pub text: &'a str,
}

impl<'a> Token<'a> {
    fn literal(text: &'a str) -> Self {
        Self {
            tag: TokenTag::Literal,
            text,
        }
    }

    fn enter(text: &'a str) -> Self {
        Self {
            tag: TokenTag::EnterExpression,
            text,
        }
    }

    fn exit(text: &'a str) -> Self {
        Self {
            tag: TokenTag::ExitExpression,
            text,
        }
    }

    /// Output text for this token.
    pub fn rendered(&self) -> &'a str {
        match self.tag {
            TokenTag::Literal => self.text,
            TokenTag::EnterExpression => "${",
            TokenTag::ExitExpression => "}",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    InLiteral,
    InExpression,
}

/// Character-delimiter scanner.
///
/// At each position it tries, in order: the start delimiter, the end
/// delimiter, then any single character. The tag of a delimiter match
/// depends on the current state:
///
/// | State | Match | Tag | Next state |
/// |---|---|---|---|
/// | InLiteral | start | EnterExpression | InExpression |
/// | InExpression | start | Literal | InExpression |
/// | InExpression | end | ExitExpression | InLiteral |
/// | InLiteral | end | Literal | InLiteral |
/// | any | other | Literal | unchanged |
struct DelimitedScanner<'a, 'd> {
    input: &'a str,
    start: &'d str,
    end: &'d str,
    position: usize,
    state: ScanState,
}

impl<'a, 'd> DelimitedScanner<'a, 'd> {
    fn new(input: &'a str, start: &'d str, end: &'d str) -> Self {
        Self {
            input,
            start,
            end,
            position: 0,
            state: ScanState::InLiteral,
        }
    }

    fn take(&mut self, len: usize) -> &'a str {
        let text = &self.input[self.position..self.position + len];
        self.position += len;
        text
    }
}

impl<'a> Iterator for DelimitedScanner<'a, '_> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.input[self.position..];
        let c = rest.chars().next()?;

        if rest.starts_with(self.start) {
            let text = self.take(self.start.len());
            return Some(match self.state {
                ScanState::InLiteral => {
                    self.state = ScanState::InExpression;
                    Token::enter(text)
                }
                ScanState::InExpression => Token::literal(text),
            });
        }

        if rest.starts_with(self.end) {
            let text = self.take(self.end.len());
            return Some(match self.state {
                ScanState::InExpression => {
                    self.state = ScanState::InLiteral;
                    Token::exit(text)
                }
                ScanState::InLiteral => Token::literal(text),
            });
        }

        Some(Token::literal(self.take(c.len_utf8())))
    }
}

/// How a marker occurrence is located.
#[derive(Debug, Clone)]
enum MarkerMatcher {
    Literal(String),
    Pattern(Regex),
}

impl MarkerMatcher {
    /// Byte range of the next marker at or after `from`.
    fn find_at(&self, input: &str, from: usize) -> Option<(usize, usize)> {
        match self {
            MarkerMatcher::Literal(marker) => input[from..]
                .find(marker.as_str())
                .map(|i| (from + i, from + i + marker.len())),
            MarkerMatcher::Pattern(regex) => regex.find_at(input, from).map(|m| (m.start(), m.end())),
        }
    }
}

/// Index of the `}` balancing the `{` at `open`, if the input has one.
fn matching_brace(input: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in input[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn scan_marker<'a>(input: &'a str, matcher: &MarkerMatcher) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    let mut position = 0;

    while position < input.len() {
        let Some((start, end)) = matcher.find_at(input, position) else {
            tokens.push(Token::literal(&input[position..]));
            break;
        };
        if start > position {
            tokens.push(Token::literal(&input[position..start]));
        }

        if end == start {
            // Zero-width pattern match: never a region start.
            let Some(c) = input[start..].chars().next() else {
                break;
            };
            let width = c.len_utf8();
            tokens.push(Token::literal(&input[start..start + width]));
            position = start + width;
            continue;
        }

        if !input[end..].starts_with('{') {
            tokens.push(Token::literal(&input[start..end]));
            position = end;
            continue;
        }

        tokens.push(Token::enter(&input[start..=end]));
        match matching_brace(input, end) {
            Some(close) => {
                if close > end + 1 {
                    tokens.push(Token::literal(&input[end + 1..close]));
                }
                tokens.push(Token::exit(&input[close..=close]));
                position = close + 1;
            }
            None => {
                if end + 1 < input.len() {
                    tokens.push(Token::literal(&input[end + 1..]));
                }
                position = input.len();
            }
        }
    }

    tokens
}

#[derive(Debug, Clone)]
enum Mode {
    Delimited { start: String, end: String },
    Marker(MarkerMatcher),
}

/// A configured tokenizer. Cheap to reuse across nodes; it holds no state
/// between calls.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    mode: Mode,
}

impl Tokenizer {
    /// Validates `options` and builds the matching tokenizer.
    pub fn from_options(options: &Options) -> Result<Self, ConfigError> {
        options.validate()?;
        let mode = match &options.syntax {
            ExpressionSyntax::Delimited { start, end } => Mode::Delimited {
                start: start.clone(),
                end: end.clone(),
            },
            ExpressionSyntax::Marker { marker } => Mode::Marker(MarkerMatcher::Literal(marker.clone())),
            ExpressionSyntax::Pattern { pattern } => {
                let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
                if regex.is_match("") {
                    return Err(ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: "pattern matches the empty string".to_string(),
                    });
                }
                Mode::Marker(MarkerMatcher::Pattern(regex))
            }
        };
        Ok(Self { mode })
    }

    /// Character-delimiter tokenizer.
    pub fn delimited(start: &str, end: &str) -> Result<Self, ConfigError> {
        Self::from_options(&Options::new().with_delimiters(start, end))
    }

    /// Brace-counting tokenizer with a literal marker.
    pub fn marker(marker: &str) -> Result<Self, ConfigError> {
        Self::from_options(&Options::new().with_marker(marker))
    }

    /// Splits `input` into tagged tokens.
    pub fn tokens<'a>(&self, input: &'a str) -> Vec<Token<'a>> {
        match &self.mode {
            Mode::Delimited { start, end } => DelimitedScanner::new(input, start, end).collect(),
            Mode::Marker(matcher) => scan_marker(input, matcher),
        }
    }

    /// Produces the normalized template for `input`.
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len() + 8);
        let mut regions = 0usize;
        let mut open_at = None;

        let mut offset = 0;
        for token in self.tokens(input) {
            match token.tag {
                TokenTag::EnterExpression => {
                    regions += 1;
                    open_at = Some(offset);
                }
                TokenTag::ExitExpression => open_at = None,
                TokenTag::Literal => {}
            }
            offset += token.text.len();
            out.push_str(token.rendered());
        }

        if let Some(offset) = open_at {
            warn!("expression region opened at byte {offset} is never closed");
        }
        trace!("normalized {regions} expression region(s) in {} bytes", input.len());
        out
    }
}

/// Normalizes `input` in character-delimiter mode.
///
/// Fails only when the delimiters themselves are invalid (empty or equal).
pub fn tokenize(input: &str, start: &str, end: &str) -> Result<String, ConfigError> {
    Ok(Tokenizer::delimited(start, end)?.normalize(input))
}

/// Normalizes `input` in brace-counting mode.
///
/// Fails only when `marker` is empty.
pub fn tokenize_marker(input: &str, marker: &str) -> Result<String, ConfigError> {
    Ok(Tokenizer::marker(marker)?.normalize(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(tokens: &[Token<'_>]) -> Vec<TokenTag> {
        tokens.iter().map(|t| t.tag).collect()
    }

    #[test]
    fn test_literal_only_input_is_unchanged() {
        for input in ["", r"\frac{a}{b}", "x } y", "∑ é ∫"] {
            assert_eq!(tokenize(input, "\\js{", "}").unwrap(), input);
            assert_eq!(tokenize_marker(input, "\\js").unwrap(), input);
        }
    }

    #[test]
    fn test_delimited_region() {
        assert_eq!(
            tokenize(r"\pi = \js{Math.PI}", "\\js{", "}").unwrap(),
            r"\pi = ${Math.PI}"
        );
    }

    #[test]
    fn test_delimited_does_not_nest() {
        assert_eq!(tokenize("A{B{C}D}E", "{", "}").unwrap(), "A${B{C}D}E");
        let tokenizer = Tokenizer::delimited("{", "}").unwrap();
        let tokens = tokenizer.tokens("A{B{C}D}E");
        assert_eq!(
            tags(&tokens),
            vec![
                TokenTag::Literal,         // A
                TokenTag::EnterExpression, // {
                TokenTag::Literal,         // B
                TokenTag::Literal,         // { inside the region
                TokenTag::Literal,         // C
                TokenTag::ExitExpression,  // }
                TokenTag::Literal,         // D
                TokenTag::Literal,         // } outside any region
                TokenTag::Literal,         // E
            ]
        );
    }

    #[test]
    fn test_delimited_end_in_literal_is_text() {
        assert_eq!(tokenize("a]]b[[c]]", "[[", "]]").unwrap(), "a]]b${c}");
    }

    #[test]
    fn test_delimited_unterminated_is_emitted() {
        assert_eq!(
            tokenize(r"\pi = \js{Math.PI", "\\js{", "}").unwrap(),
            r"\pi = ${Math.PI"
        );
    }

    #[test]
    fn test_delimited_multi_char_delimiters() {
        assert_eq!(
            tokenize("<%a%> and <%b%>", "<%", "%>").unwrap(),
            "${a} and ${b}"
        );
    }

    #[test]
    fn test_start_has_priority_over_end() {
        // With start `ab` and end `a`, `ab` always matches as start first.
        assert_eq!(tokenize("abxa", "ab", "a").unwrap(), "${x}");
    }

    #[test]
    fn test_marker_brace_counting() {
        assert_eq!(
            tokenize_marker(r"\pi = \js{myFunc({ a: 10 })}", "\\js").unwrap(),
            r"\pi = ${myFunc({ a: 10 })}"
        );
    }

    #[test]
    fn test_marker_without_brace_is_text() {
        assert_eq!(tokenize_marker(r"\pi = \js", "\\js").unwrap(), r"\pi = \js");
        assert_eq!(tokenize_marker(r"\jsx{1}", "\\js").unwrap(), r"\jsx{1}");
    }

    #[test]
    fn test_marker_unterminated() {
        assert_eq!(
            tokenize_marker(r"\pi = \js{Math.PI", "\\js").unwrap(),
            r"\pi = ${Math.PI"
        );
        assert_eq!(tokenize_marker(r"\js{", "\\js").unwrap(), "${");
    }

    #[test]
    fn test_modes_diverge_on_nested_braces() {
        assert_eq!(tokenize("A{B{C}D}E", "{", "}").unwrap(), "A${B{C}D}E");
        assert_eq!(tokenize_marker("A{B{C}D}E", "A").unwrap(), "${B{C}D}E");

        let delimited = Tokenizer::delimited("{", "}").unwrap().tokens("A{B{C}D}E");
        let marker = Tokenizer::marker("A").unwrap().tokens("A{B{C}D}E");
        assert_eq!(
            marker,
            vec![
                Token::enter("A{"),
                Token::literal("B{C}D"),
                Token::exit("}"),
                Token::literal("E"),
            ]
        );
        assert_ne!(tags(&delimited), tags(&marker));
    }

    #[test]
    fn test_marker_inside_expression_is_body_text() {
        assert_eq!(
            tokenize_marker(r"\js{f(\js{1})} + \js{2}", "\\js").unwrap(),
            r"${f(\js{1})} + ${2}"
        );
    }

    #[test]
    fn test_multiple_regions_in_order() {
        let out = tokenize_marker(r"\js{a} + \js{b} = \js{a + b}", "\\js").unwrap();
        assert_eq!(out, "${a} + ${b} = ${a + b}");
    }

    #[test]
    fn test_pattern_marker() {
        let options = Options::new().with_pattern(r"\\(js|expr)");
        let tokenizer = Tokenizer::from_options(&options).unwrap();
        assert_eq!(
            tokenizer.normalize(r"\js{a} \expr{b} \ex{c}"),
            r"${a} ${b} \ex{c}"
        );
    }

    #[test]
    fn test_invalid_patterns() {
        let err = Tokenizer::from_options(&Options::new().with_pattern("(")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));

        let err = Tokenizer::from_options(&Options::new().with_pattern("x*")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidPattern {
                pattern: "x*".into(),
                reason: "pattern matches the empty string".into()
            }
        );
    }

    #[test]
    fn test_zero_width_pattern_match_is_skipped() {
        let tokenizer = Tokenizer::from_options(&Options::new().with_pattern(r"\b")).unwrap();
        assert_eq!(tokenizer.normalize("ab{c}"), "ab{c}");
    }

    #[test]
    fn test_invalid_delimiters_rejected_at_construction() {
        assert_eq!(
            tokenize("x", "{", "{"),
            Err(ConfigError::EqualDelimiters("{".into()))
        );
        assert_eq!(tokenize("x", "", "}"), Err(ConfigError::EmptyDelimiter("start")));
        assert_eq!(tokenize_marker("x", ""), Err(ConfigError::EmptyMarker));
    }

    #[test]
    fn test_token_texts_reconstruct_input() {
        let input = r"\sum_{i} \js{xs.map((x) => { return x; })} \js{";
        let tokenizer = Tokenizer::marker("\\js").unwrap();
        let joined: String = tokenizer.tokens(input).iter().map(|t| t.text).collect();
        assert_eq!(joined, input);

        let tokenizer = Tokenizer::delimited("\\js{", "}").unwrap();
        let joined: String = tokenizer.tokens(input).iter().map(|t| t.text).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_multi_byte_delimiters_and_text() {
        assert_eq!(tokenize("α⟦β⟧γ", "⟦", "⟧").unwrap(), "α${β}γ");
    }
}
