use serde::Deserialize;
use thiserror::Error;

/// Element name written onto replacement nodes unless configured otherwise.
pub const DEFAULT_ELEMENT_NAME: &str = "Math";
/// Marker that introduces an expression when followed by `{`.
pub const DEFAULT_EXPRESSION_MARKER: &str = "\\js";
/// Start delimiter used when only an end delimiter is configured.
pub const DEFAULT_START_DELIMITER: &str = "\\js{";
/// End delimiter used when only a start delimiter is configured.
pub const DEFAULT_END_DELIMITER: &str = "}";

/// Invalid transform configuration, reported before any node is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("start and end delimiters must differ (both are {0:?})")]
    EqualDelimiters(String),
    #[error("{0} delimiter must not be empty")]
    EmptyDelimiter(&'static str),
    #[error("expression marker must not be empty")]
    EmptyMarker,
    #[error("invalid expression pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("{0:?} is not a valid element name")]
    InvalidElementName(String),
    #[error("start/end delimiters cannot be combined with an expression marker or pattern")]
    ConflictingSyntax,
}

/// How embedded expressions are recognized inside math text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionSyntax {
    /// Everything between `start` and the next `end` is an expression.
    /// A `start` seen inside an open region is plain text.
    Delimited { start: String, end: String },
    /// `marker` immediately followed by a balanced `{...}` span.
    Marker { marker: String },
    /// Like [`ExpressionSyntax::Marker`], but the marker is a regular
    /// expression. The balanced brace span is still found by counting.
    Pattern { pattern: String },
}

/// Transform configuration.
///
/// Built once per pipeline and shared by reference with every transcoder.
///
/// # Examples
///
/// ```
/// use mdxmath_transform::Options;
///
/// let options = Options::new()
///     .with_element_name("Katex")
///     .with_delimiters("{{", "}}");
/// assert!(options.validate().is_ok());
///
/// let invalid = Options::new().with_delimiters("|", "|");
/// assert!(invalid.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "OptionsFile")]
pub struct Options {
    /// Name of the element replacing each math node.
    pub element_name: String,
    /// Tokenizer mode and its markers.
    pub syntax: ExpressionSyntax,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            element_name: DEFAULT_ELEMENT_NAME.to_string(),
            syntax: ExpressionSyntax::Marker {
                marker: DEFAULT_EXPRESSION_MARKER.to_string(),
            },
        }
    }
}

impl Options {
    /// Create options with the defaults: element `Math`, marker `\js`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the replacement element.
    #[inline]
    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = name.into();
        self
    }

    /// Switch to character-delimiter mode.
    #[inline]
    pub fn with_delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.syntax = ExpressionSyntax::Delimited {
            start: start.into(),
            end: end.into(),
        };
        self
    }

    /// Switch to brace-counting mode with a literal marker.
    #[inline]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.syntax = ExpressionSyntax::Marker {
            marker: marker.into(),
        };
        self
    }

    /// Switch to brace-counting mode with a regular-expression marker.
    #[inline]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.syntax = ExpressionSyntax::Pattern {
            pattern: pattern.into(),
        };
        self
    }

    /// Checks the configuration without compiling anything.
    ///
    /// Pattern syntax is checked when the tokenizer is built, see
    /// [`Tokenizer::from_options`](crate::Tokenizer::from_options).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_element_name(&self.element_name) {
            return Err(ConfigError::InvalidElementName(self.element_name.clone()));
        }
        match &self.syntax {
            ExpressionSyntax::Delimited { start, end } => {
                if start.is_empty() {
                    return Err(ConfigError::EmptyDelimiter("start"));
                }
                if end.is_empty() {
                    return Err(ConfigError::EmptyDelimiter("end"));
                }
                if start == end {
                    return Err(ConfigError::EqualDelimiters(start.clone()));
                }
            }
            ExpressionSyntax::Marker { marker } => {
                if marker.is_empty() {
                    return Err(ConfigError::EmptyMarker);
                }
            }
            ExpressionSyntax::Pattern { pattern } => {
                if pattern.is_empty() {
                    return Err(ConfigError::EmptyMarker);
                }
            }
        }
        Ok(())
    }
}

/// JSX element names: identifiers joined by `.`, `:` or `-`.
fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | ':' | '-'))
}

/// On-disk form of [`Options`], matching the plugin option names.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct OptionsFile {
    #[serde(alias = "component")]
    element_name: Option<String>,
    start_delimiter: Option<String>,
    end_delimiter: Option<String>,
    expression_marker: Option<String>,
    expression_pattern: Option<String>,
}

impl TryFrom<OptionsFile> for Options {
    type Error = ConfigError;

    fn try_from(file: OptionsFile) -> Result<Self, Self::Error> {
        let mut options = Options::new();
        if let Some(name) = file.element_name {
            options = options.with_element_name(name);
        }

        let delimited = file.start_delimiter.is_some() || file.end_delimiter.is_some();
        let marked = file.expression_marker.is_some() || file.expression_pattern.is_some();
        if delimited && marked {
            return Err(ConfigError::ConflictingSyntax);
        }

        if delimited {
            options = options.with_delimiters(
                file.start_delimiter
                    .unwrap_or_else(|| DEFAULT_START_DELIMITER.to_string()),
                file.end_delimiter
                    .unwrap_or_else(|| DEFAULT_END_DELIMITER.to_string()),
            );
        } else if let Some(pattern) = file.expression_pattern {
            if file.expression_marker.is_some() {
                return Err(ConfigError::ConflictingSyntax);
            }
            options = options.with_pattern(pattern);
        } else if let Some(marker) = file.expression_marker {
            options = options.with_marker(marker);
        }

        options.validate()?;
        Ok(options)
    }
}
