use std::{
    num::{ParseFloatError, ParseIntError},
    sync::Arc,
};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::TomlValueType;

#[cfg(doc)]
use crate::{TomlArray, TomlDocument};

/// The toplevel parse error for tomlet: this is returned when a document (or
/// a standalone value) failed strict parsing.
///
/// This diagnostic implements [`miette::Diagnostic`] and can be used to
/// display detailed, pretty-printed diagnostic messages when using
/// [`miette::Result`] and the `"fancy"` feature flag for `miette`:
///
/// ```no_run
/// fn main() -> miette::Result<()> {
///     "[server]\nport = 80x".parse::<tomlet::TomlDocument>()?;
///     Ok(())
/// }
/// ```
///
/// This will display a message like:
/// ```text
/// Error:
///   × Failed to parse TOML document
///
/// Error:
///   × `80x` is not a valid value.
///    ╭─[2:8]
///  1 │ [server]
///  2 │ port = 80x
///    ·        ─┬─
///    ·         ╰── invalid value
///    ╰────
///   help: Values are quoted strings, integers, floats with a `.`, `true`/`false`, or `[...]` arrays.
/// ```
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
#[error("Failed to parse TOML document")]
pub struct TomlParseFailure {
    /// Original input that this failure came from.
    #[source_code]
    pub input: Arc<String>,

    /// Sub-diagnostics for this failure.
    #[related]
    pub diagnostics: Vec<TomlDiagnostic>,
}

/// An individual diagnostic message for a parsing issue.
///
/// While generally signifying errors, they can also be treated as warnings.
/// Lenient parsing ([`TomlDocument::parse_lenient`]) hands these back next to
/// a best-effort document instead of failing.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
#[error("{kind}")]
pub struct TomlDiagnostic {
    /// Shared source for the diagnostic.
    #[source_code]
    pub input: Arc<String>,

    /// Offset in bytes of the problem.
    #[label("{}", label.clone().unwrap_or_else(|| "here".into()))]
    pub span: SourceSpan,

    /// Label text for this span. Defaults to `"here"`.
    pub label: Option<String>,

    /// Suggestion for fixing the problem.
    #[help]
    pub help: Option<String>,

    /// Severity level for the Diagnostic.
    #[diagnostic(severity)]
    pub severity: miette::Severity,

    /// Specific error kind for this diagnostic.
    #[diagnostic_source]
    pub kind: TomlErrorKind,
}

impl TomlDiagnostic {
    /// Line number (1-based) that this diagnostic points at.
    pub fn line(&self) -> usize {
        let end = self.span.offset().min(self.input.len());
        self.input[..end].matches('\n').count() + 1
    }

    /// Whether this diagnostic is an error, as opposed to a warning or advice.
    pub fn is_error(&self) -> bool {
        self.severity == miette::Severity::Error
    }
}

/// A type representing additional information specific to the type of error
/// being returned.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum TomlErrorKind {
    /// An error occurred while parsing an integer.
    #[error(transparent)]
    #[diagnostic(code(tomlet::parse_int))]
    ParseIntError(ParseIntError),

    /// An error occurred while parsing a floating point number.
    #[error(transparent)]
    #[diagnostic(code(tomlet::parse_float))]
    ParseFloatError(ParseFloatError),

    /// A literal that is none of the supported value kinds.
    #[error("`{0}` is not a valid value.")]
    #[diagnostic(code(tomlet::malformed_literal))]
    MalformedLiteral(String),

    /// A string escape sequence that isn't supported.
    #[error("Unsupported escape sequence `\\{0}`.")]
    #[diagnostic(code(tomlet::bad_escape))]
    BadEscape(char),

    /// A quoted string without its closing quote.
    #[error("Unterminated string.")]
    #[diagnostic(code(tomlet::unterminated_string))]
    UnterminatedString,

    /// An array literal whose brackets never balance before the input ends.
    #[error("Unterminated array.")]
    #[diagnostic(code(tomlet::unterminated_array))]
    UnterminatedArray,

    /// Text left over after a complete value or header.
    #[error("Unexpected trailing characters `{0}`.")]
    #[diagnostic(code(tomlet::trailing_characters))]
    TrailingCharacters(String),

    /// A table path with an empty or invalid segment.
    #[error("`{0}` is not a valid table path.")]
    #[diagnostic(code(tomlet::malformed_path))]
    MalformedPath(String),

    /// A line that is neither a header nor a `key = value` pair.
    #[error("Expected a table header or a `key = value` pair.")]
    #[diagnostic(code(tomlet::unrecognized_line))]
    UnrecognizedLine,

    /// A key/value pair with an empty key.
    #[error("Missing key before `=`.")]
    #[diagnostic(code(tomlet::missing_key))]
    MissingKey,

    /// A plain `[table]` header naming an existing array of tables.
    #[error("`{0}` is already an array of tables.")]
    #[diagnostic(code(tomlet::table_is_array))]
    TableIsArray(String),

    /// A pair that was dropped because its table header was rejected.
    #[error("Pair `{0}` has no valid table to belong to.")]
    #[diagnostic(code(tomlet::orphaned_pair))]
    OrphanedPair(String),

    /// Generic parsing error. The given context string denotes the component
    /// that failed to parse.
    #[error("Expected {0}.")]
    #[diagnostic(code(tomlet::parse_component))]
    Context(&'static str),
}

/// Errors returned by the document accessor API and by file I/O.
#[derive(Debug, Error, Diagnostic)]
pub enum TomlError {
    /// Reading or writing a file failed.
    #[error(transparent)]
    #[diagnostic(code(tomlet::io))]
    Io(#[from] std::io::Error),

    /// The input could not be parsed strictly.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] TomlParseFailure),

    /// A table path argument is not a valid dotted path.
    #[error("`{0}` is not a valid table path")]
    #[diagnostic(
        code(tomlet::malformed_path),
        help("Table paths are dot-separated names such as `server.tls`, with no empty segments.")
    )]
    MalformedPath(String),

    /// No table exists at the given path.
    #[error("no table at path `{0}`")]
    #[diagnostic(code(tomlet::table_not_found))]
    TableNotFound(String),

    /// The table exists but has no pair with the given key.
    #[error("no key `{key}` in table `{path}`")]
    #[diagnostic(code(tomlet::key_not_found))]
    KeyNotFound {
        /// Table path that was searched.
        path: String,
        /// Key that was looked up.
        key: String,
    },

    /// A value exists but holds a different type than the operation needs.
    #[error("expected {expected} value, found {found}")]
    #[diagnostic(code(tomlet::type_mismatch))]
    TypeMismatch {
        /// Type the operation required.
        expected: TomlValueType,
        /// Type actually stored.
        found: TomlValueType,
    },

    /// A pair was given an empty key.
    #[error("keys must not be empty")]
    #[diagnostic(code(tomlet::empty_key))]
    EmptyKey,

    /// The table exists but was never used as an array of tables.
    #[error("table `{0}` is not an array of tables")]
    #[diagnostic(
        code(tomlet::not_array_of_tables),
        help("Arrays of tables are introduced with `[[name]]` headers.")
    )]
    NotArrayOfTables(String),

    /// An array index at or past the end of a [`TomlArray`].
    #[error("index {index} is out of range for an array of length {len}")]
    #[diagnostic(code(tomlet::index_out_of_range))]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the array at the time of the call.
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn parse_failure() {
        let failure = TomlParseFailure {
            input: Default::default(),
            diagnostics: Default::default(),
        };

        assert_eq!(failure.to_string(), "Failed to parse TOML document");
        assert!(failure.source().is_none());
    }

    #[test]
    fn diagnostic() {
        let diagnostic = TomlDiagnostic {
            input: Arc::new("[a]\nx = ?\n".into()),
            span: SourceSpan::new(8.into(), 1),
            label: None,
            help: None,
            severity: miette::Severity::Error,
            kind: TomlErrorKind::MalformedLiteral("?".into()),
        };

        assert_eq!(diagnostic.to_string(), "`?` is not a valid value.");
        assert_eq!(diagnostic.line(), 2);
        assert!(diagnostic.is_error());
    }

    #[test]
    fn accessor_errors() {
        let err = TomlError::TypeMismatch {
            expected: TomlValueType::Int,
            found: TomlValueType::String,
        };
        assert_eq!(err.to_string(), "expected integer value, found string");

        let err = TomlError::IndexOutOfRange { index: 3, len: 3 };
        assert_eq!(
            err.to_string(),
            "index 3 is out of range for an array of length 3"
        );
    }
}
