//! Value literals: the right-hand side of `key = value` pairs, and keys.

use std::{ops::Range, sync::Arc};

use miette::Severity;
use winnow::{
    ascii::{multispace1, space0},
    combinator::{alt, cut_err, opt, peek, repeat},
    error::{AddContext, ErrMode, ErrorKind, FromExternalError, ParserError},
    prelude::*,
    stream::{Location, Stream},
    token::{any, none_of, take_till, take_while},
    Located,
};

use crate::{TomlArray, TomlDiagnostic, TomlErrorKind, TomlParseFailure, TomlValue};

pub(crate) type Input<'a> = Located<&'a str>;
pub(crate) type PResult<T> = winnow::PResult<T, TomlParseError>;

pub(crate) fn new_input(s: &str) -> Input<'_> {
    Located::new(s)
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct TomlParseError {
    pub(crate) context: Option<&'static str>,
    pub(crate) kind: Option<TomlErrorKind>,
}

impl TomlParseError {
    fn from_kind(kind: TomlErrorKind) -> Self {
        TomlParseError {
            context: None,
            kind: Some(kind),
        }
    }

    /// Picks the most specific kind available, falling back to reporting the
    /// offending text as a malformed literal.
    pub(crate) fn into_kind(self, text: &str) -> TomlErrorKind {
        self.kind
            .or_else(|| self.context.map(TomlErrorKind::Context))
            .unwrap_or_else(|| TomlErrorKind::MalformedLiteral(text.to_string()))
    }
}

impl<I: Stream> ParserError<I> for TomlParseError {
    fn from_error_kind(_input: &I, _kind: ErrorKind) -> Self {
        Self {
            context: None,
            kind: None,
        }
    }

    fn append(
        self,
        _input: &I,
        _token_start: &<I as Stream>::Checkpoint,
        _kind: ErrorKind,
    ) -> Self {
        self
    }
}

impl<I: Stream> AddContext<I> for TomlParseError {
    fn add_context(
        mut self,
        _input: &I,
        _token_start: &<I as Stream>::Checkpoint,
        ctx: &'static str,
    ) -> Self {
        self.context = self.context.or(Some(ctx));
        self
    }
}

impl<I> FromExternalError<I, TomlErrorKind> for TomlParseError {
    fn from_external_error(_input: &I, _kind: ErrorKind, e: TomlErrorKind) -> Self {
        TomlParseError::from_kind(e)
    }
}

/// A problem found while parsing a literal, with a span relative to the
/// start of the literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LiteralError {
    pub(crate) span: Range<usize>,
    pub(crate) kind: TomlErrorKind,
}

impl LiteralError {
    pub(crate) fn into_diagnostic(self, input: &Arc<String>, base: usize) -> TomlDiagnostic {
        diagnostic(
            input,
            (base + self.span.start)..(base + self.span.end),
            self.kind,
            Severity::Error,
        )
    }
}

pub(crate) fn diagnostic(
    input: &Arc<String>,
    span: Range<usize>,
    kind: TomlErrorKind,
    severity: Severity,
) -> TomlDiagnostic {
    let (label, help) = describe(&kind);
    TomlDiagnostic {
        input: input.clone(),
        span: span.into(),
        label: Some(label.into()),
        help: help.map(Into::into),
        severity,
        kind,
    }
}

fn describe(kind: &TomlErrorKind) -> (&'static str, Option<&'static str>) {
    use TomlErrorKind::*;
    match kind {
        ParseIntError(_) => (
            "invalid integer",
            Some("Integers are decimal and must fit in 32 bits."),
        ),
        ParseFloatError(_) => (
            "invalid float",
            Some("Floats are decimal numbers with a single `.`, such as `3.25`."),
        ),
        MalformedLiteral(_) => (
            "invalid value",
            Some("Values are quoted strings, integers, floats with a `.`, `true`/`false`, or `[...]` arrays."),
        ),
        BadEscape(_) => (
            "unsupported escape",
            Some("Supported escapes are `\\\\`, `\\\"`, `\\n`, `\\t` and `\\r`. Use a 'single-quoted' string to avoid escaping."),
        ),
        UnterminatedString => (
            "string starts here",
            Some("Strings must be closed on the line they start on."),
        ),
        UnterminatedArray => (
            "array starts here",
            Some("Every `[` in an array value needs a matching `]`."),
        ),
        TrailingCharacters(_) => (
            "unexpected text",
            Some("Only a `# comment` may follow a value or header on the same line."),
        ),
        MalformedPath(_) => (
            "invalid table path",
            Some("Table paths are dot-separated names made of letters, digits, `_` and `-`."),
        ),
        UnrecognizedLine => ("not a header or pair", None),
        MissingKey => ("key expected", None),
        TableIsArray(_) => (
            "redefined here",
            Some("Use `[[name]]` to add another table to the array."),
        ),
        OrphanedPair(_) => ("dropped", None),
        Context(_) => ("here", None),
    }
}

/// Result of parsing one value: the best-effort value, if any, and every
/// problem found along the way.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedValue {
    pub(crate) value: Option<TomlValue>,
    pub(crate) errors: Vec<LiteralError>,
}

/// Parses the value text of a pair. `text` starts at the first character of
/// the value and, for arrays, extends over every continuation line.
pub(crate) fn value(text: &str) -> ParsedValue {
    let mut errors = Vec::new();
    let trimmed_len = text.trim_end().len();
    if trimmed_len == 0 || text.starts_with('#') {
        errors.push(LiteralError {
            span: 0..trimmed_len,
            kind: TomlErrorKind::Context("a value"),
        });
        return ParsedValue {
            value: None,
            errors,
        };
    }

    let mut input = new_input(text);
    let mut value = match element(&mut input, &mut errors) {
        Ok(value) => Some(value),
        Err(err) => {
            let e = match err {
                ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
                ErrMode::Incomplete(_) => TomlParseError::from_kind(TomlErrorKind::Context("a value")),
            };
            let bad = &text[..trimmed_len];
            errors.push(LiteralError {
                span: 0..trimmed_len,
                kind: e.into_kind(bad),
            });
            None
        }
    };

    if value.is_some() {
        if let Some((span, rest)) = trailing(&mut input) {
            errors.push(LiteralError {
                span,
                kind: TomlErrorKind::TrailingCharacters(rest.to_string()),
            });
            value = None;
        }
    }
    ParsedValue { value, errors }
}

/// Parses a standalone literal, as used by `TomlValue::from_str`.
pub(crate) fn parse_standalone(input: &str) -> Result<TomlValue, TomlParseFailure> {
    let source = Arc::new(String::from(input));
    let leading = input.len() - input.trim_start().len();
    let parsed = value(&input[leading..]);
    match parsed.value {
        Some(value) if parsed.errors.is_empty() => Ok(value),
        _ => Err(TomlParseFailure {
            input: source.clone(),
            diagnostics: parsed
                .errors
                .into_iter()
                .map(|e| e.into_diagnostic(&source, leading))
                .collect(),
        }),
    }
}

/// Consumes whitespace and an optional `# comment`. Returns the span and text
/// of anything left over after that.
pub(crate) fn trailing<'s>(input: &mut Input<'s>) -> Option<(Range<usize>, &'s str)> {
    let _: PResult<()> = (multispace0_lines, opt(comment)).void().parse_next(input);
    let start = input.location();
    let rest: PResult<&str> = take_while(0.., |_: char| true).parse_next(input);
    let rest = rest.unwrap_or_default().trim_end();
    if rest.is_empty() {
        None
    } else {
        Some((start..start + rest.len(), rest))
    }
}

fn multispace0_lines(input: &mut Input<'_>) -> PResult<()> {
    repeat(0.., multispace1.void()).parse_next(input)
}

/// `comment := '#' ^newline*`
fn comment(input: &mut Input<'_>) -> PResult<()> {
    ("#", take_till(0.., ['\n', '\r'])).void().parse_next(input)
}

/// Skips everything allowed between array elements: whitespace, newlines,
/// comments and commas.
fn separator(input: &mut Input<'_>) -> PResult<()> {
    repeat(0.., alt((multispace1.void(), comment, ",".void()))).parse_next(input)
}

/// `element := array | basic-string | literal-string | bare-value`
fn element(input: &mut Input<'_>, errors: &mut Vec<LiteralError>) -> PResult<TomlValue> {
    match opt(peek(any)).parse_next(input)? {
        Some('[') => array(input, errors).map(TomlValue::Array),
        Some('"') => basic_string.map(TomlValue::String).parse_next(input),
        Some('\'') => literal_string.map(TomlValue::String).parse_next(input),
        _ => bare_value.parse_next(input),
    }
}

/// `array := '[' (separator element)* separator ']'`
///
/// A malformed element is recorded in `errors` and skipped up to the next
/// `,` or `]` at the same nesting level; the rest of the array still parses.
fn array(input: &mut Input<'_>, errors: &mut Vec<LiteralError>) -> PResult<TomlArray> {
    "[".parse_next(input)?;
    let mut values = Vec::new();
    loop {
        separator(input)?;
        match opt(peek(any)).parse_next(input)? {
            None => {
                return Err(ErrMode::Cut(TomlParseError::from_kind(
                    TomlErrorKind::UnterminatedArray,
                )))
            }
            Some(']') => {
                "]".parse_next(input)?;
                break;
            }
            Some(_) => {}
        }
        let start = input.location();
        let checkpoint = input.checkpoint();
        match element(input, errors) {
            Ok(value) => values.push(value),
            Err(ErrMode::Backtrack(e)) | Err(ErrMode::Cut(e)) => {
                input.reset(&checkpoint);
                let skipped = skip_element(input);
                let kind = e.into_kind(skipped);
                tracing::debug!(%kind, element = skipped, "skipping malformed array element");
                errors.push(LiteralError {
                    span: start..input.location(),
                    kind,
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(TomlArray { values })
}

/// Consumes one element's worth of text without interpreting it: everything
/// up to the next `,` or `]` that is not nested in brackets or quotes.
fn skip_element<'s>(input: &mut Input<'s>) -> &'s str {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut end = input.eof_offset();
    for (offset, c) in input.iter_offsets() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && q == '"' {
                escaped = true;
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' => depth += 1,
            ']' | ',' if depth == 0 => {
                end = offset;
                break;
            }
            ']' => depth -= 1,
            _ => {}
        }
    }
    input.next_slice(end)
}

/// `basic-string := '"' (escape | [^"\\\n])* '"'`
pub(crate) fn basic_string(input: &mut Input<'_>) -> PResult<String> {
    "\"".parse_next(input)?;
    let body: String = repeat(0.., string_char).parse_next(input)?;
    if opt("\"").parse_next(input)?.is_none() {
        return Err(ErrMode::Cut(TomlParseError::from_kind(
            TomlErrorKind::UnterminatedString,
        )));
    }
    Ok(body)
}

fn string_char(input: &mut Input<'_>) -> PResult<char> {
    alt((escaped_char, none_of(['"', '\\', '\n', '\r']))).parse_next(input)
}

/// `escape := '\' ["\\nrt]`
fn escaped_char(input: &mut Input<'_>) -> PResult<char> {
    "\\".parse_next(input)?;
    cut_err(alt((
        "\\".value('\\'),
        "\"".value('"'),
        "n".value('\n'),
        "t".value('\t'),
        "r".value('\r'),
        any.try_map(|c: char| Err::<char, _>(TomlErrorKind::BadEscape(c))),
    )))
    .parse_next(input)
}

/// `literal-string := "'" [^'\n]* "'"`
pub(crate) fn literal_string(input: &mut Input<'_>) -> PResult<String> {
    "'".parse_next(input)?;
    let body = take_till(0.., ['\'', '\n', '\r']).parse_next(input)?;
    if opt("'").parse_next(input)?.is_none() {
        return Err(ErrMode::Cut(TomlParseError::from_kind(
            TomlErrorKind::UnterminatedString,
        )));
    }
    Ok(body.to_string())
}

fn is_bare_value_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '#' | '"' | '\'')
}

/// `bare-value := float | integer | boolean`, decided on the single token.
fn bare_value(input: &mut Input<'_>) -> PResult<TomlValue> {
    take_while(1.., is_bare_value_char)
        .try_map(classify_bare)
        .parse_next(input)
}

/// Classifies one unquoted token. A `.` anywhere in the token makes it a
/// float; a leading digit (after an optional `-`) makes it an integer.
pub(crate) fn classify_bare(token: &str) -> Result<TomlValue, TomlErrorKind> {
    if let Some((_, fraction)) = token.split_once('.') {
        let value = token
            .parse::<f64>()
            .map_err(TomlErrorKind::ParseFloatError)?;
        // Out-of-range literals parse as infinity, which has no literal form.
        if !value.is_finite() {
            return Err(TomlErrorKind::MalformedLiteral(token.to_string()));
        }
        return Ok(TomlValue::Float {
            value,
            precision: Some(fraction.chars().count()),
        });
    }
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.starts_with(|c: char| c.is_ascii_digit()) {
        return token
            .parse::<i32>()
            .map(TomlValue::Int)
            .map_err(TomlErrorKind::ParseIntError);
    }
    match token {
        "true" => Ok(TomlValue::Bool(true)),
        "false" => Ok(TomlValue::Bool(false)),
        _ => Err(TomlErrorKind::MalformedLiteral(token.to_string())),
    }
}

/// `key := basic-string | literal-string | [^=#]+` followed by `=`. Keys are
/// never empty.
pub(crate) fn key(input: &mut Input<'_>) -> PResult<String> {
    let key = alt((
        basic_string,
        literal_string,
        take_till(1.., ['=', '#']).map(|k: &str| k.trim_end().to_string()),
    ))
    .parse_next(input)?;
    (space0, "=", space0).void().parse_next(input)?;
    if key.is_empty() {
        return Err(ErrMode::Cut(TomlParseError::from_kind(
            TomlErrorKind::MissingKey,
        )));
    }
    Ok(key)
}

/// Tracks bracket nesting across the physical lines of an array literal.
/// Brackets inside strings and comments don't count. Strings never span
/// lines, so a quote left open at the end of a line is counted as plain text.
pub(crate) fn bracket_depth(line: &str, depth: isize) -> isize {
    match scan_brackets(line, depth, true) {
        (depth, false) => depth,
        (_, true) => scan_brackets(line, depth, false).0,
    }
}

/// Returns the new depth and whether a quote was still open at the end.
fn scan_brackets(line: &str, mut depth: isize, honor_quotes: bool) -> (isize, bool) {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in line.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && q == '"' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if honor_quotes => quote = Some(c),
            '#' => break,
            '[' => depth += 1,
            ']' => depth -= 1,
            _ => {}
        }
    }
    (depth, quote.is_some())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ParsedValue {
        value(text)
    }

    fn float(value: f64, precision: usize) -> TomlValue {
        TomlValue::float_with_precision(value, precision)
    }

    #[test]
    fn scalars() {
        assert_eq!(parse("\"hello\"").value, Some("hello".into()));
        assert_eq!(parse("'C:\\path'").value, Some("C:\\path".into()));
        assert_eq!(parse("42").value, Some(42.into()));
        assert_eq!(parse("-7").value, Some((-7).into()));
        assert_eq!(parse("3.125").value, Some(float(3.125, 3)));
        assert_eq!(parse("-0.50").value, Some(float(-0.5, 2)));
        assert_eq!(parse("true").value, Some(true.into()));
        assert_eq!(parse("false  # trailing comment").value, Some(false.into()));
    }

    #[test]
    fn escapes() {
        assert_eq!(
            parse(r#""say \"hi\"\n\tbye\\""#).value,
            Some("say \"hi\"\n\tbye\\".into())
        );
        let parsed = parse(r#""bad \q""#);
        assert_eq!(parsed.value, None);
        assert_eq!(parsed.errors[0].kind, TomlErrorKind::BadEscape('q'));
    }

    #[test]
    fn malformed_scalars() {
        let parsed = parse("hello");
        assert_eq!(parsed.value, None);
        assert_eq!(
            parsed.errors,
            vec![LiteralError {
                span: 0..5,
                kind: TomlErrorKind::MalformedLiteral("hello".into())
            }]
        );

        assert!(matches!(
            parse("99999999999").errors[0].kind,
            TomlErrorKind::ParseIntError(_)
        ));
        assert!(matches!(
            parse("1.2.3").errors[0].kind,
            TomlErrorKind::ParseFloatError(_)
        ));
        assert_eq!(
            parse("1.5e999").errors[0].kind,
            TomlErrorKind::MalformedLiteral("1.5e999".into())
        );
        assert_eq!(
            parse("\"open").errors[0].kind,
            TomlErrorKind::UnterminatedString
        );
        assert_eq!(parse("").errors[0].kind, TomlErrorKind::Context("a value"));
    }

    #[test]
    fn trailing_text() {
        let parsed = parse("1 2");
        assert_eq!(parsed.value, None);
        assert_eq!(
            parsed.errors,
            vec![LiteralError {
                span: 2..3,
                kind: TomlErrorKind::TrailingCharacters("2".into())
            }]
        );
    }

    #[test]
    fn mixed_array() {
        let parsed = parse(r#"[1, "two", 3.123, false]"#);
        assert_eq!(parsed.errors, vec![]);
        assert_eq!(
            parsed.value,
            Some(TomlValue::from(vec![
                TomlValue::Int(1),
                TomlValue::from("two"),
                float(3.123, 3),
                TomlValue::Bool(false),
            ]))
        );
    }

    #[test]
    fn decimal_point_is_scoped_to_its_token() {
        let parsed = parse("[1, 2.5]");
        assert_eq!(
            parsed.value,
            Some(TomlValue::from(vec![TomlValue::Int(1), float(2.5, 1)]))
        );
    }

    #[test]
    fn nested_and_multiline_arrays() {
        let parsed = parse("[\n  [1, 2], # first\n  [\"a\", ['b']],\n  [],\n]");
        assert_eq!(parsed.errors, vec![]);
        assert_eq!(
            parsed.value,
            Some(TomlValue::from(vec![
                TomlValue::from(vec![1, 2]),
                TomlValue::from(vec![TomlValue::from("a"), TomlValue::from(vec!["b"])]),
                TomlValue::from(TomlArray::new()),
            ]))
        );
    }

    #[test]
    fn malformed_elements_are_skipped() {
        let parsed = parse("[1, oops, \"x, y\", [2, nope], 3]");
        assert_eq!(
            parsed.value,
            Some(TomlValue::from(vec![
                TomlValue::Int(1),
                TomlValue::from("x, y"),
                TomlValue::from(vec![2]),
                TomlValue::Int(3),
            ]))
        );
        assert_eq!(
            parsed.errors,
            vec![
                LiteralError {
                    span: 4..8,
                    kind: TomlErrorKind::MalformedLiteral("oops".into())
                },
                LiteralError {
                    span: 22..26,
                    kind: TomlErrorKind::MalformedLiteral("nope".into())
                },
            ]
        );
    }

    #[test]
    fn keys() {
        let mut input = new_input("log_level = 4");
        assert_eq!(key(&mut input).unwrap(), "log_level");
        assert_eq!(input.location(), 12);

        let mut input = new_input("\"a = b\"=1");
        assert_eq!(key(&mut input).unwrap(), "a = b");

        assert!(key(&mut new_input("no equals here")).is_err());

        for empty in ["\"\" = 1", "'' = 1"] {
            assert_eq!(
                key(&mut new_input(empty)),
                Err(ErrMode::Cut(TomlParseError::from_kind(TomlErrorKind::MissingKey)))
            );
        }
    }

    #[test]
    fn bracket_depths() {
        assert_eq!(bracket_depth("[1, [2, 3]]", 0), 0);
        assert_eq!(bracket_depth("[1,", 0), 1);
        assert_eq!(bracket_depth("\"]\", 2,  # ]", 1), 1);
        assert_eq!(bracket_depth("]", 1), 0);
        // An unclosed quote doesn't hide the brackets after it.
        assert_eq!(bracket_depth("[\"abc, 1]", 0), 0);
        assert_eq!(bracket_depth("[it's, 1]", 0), 0);
        assert_eq!(bracket_depth("  'x, [2,", 1), 2);
    }

    #[test]
    fn standalone() {
        assert_eq!("  [1,\n 2]".parse::<TomlValue>().unwrap(), TomlValue::from(vec![1, 2]));
        let failure = "[1, ?]".parse::<TomlValue>().unwrap_err();
        assert_eq!(failure.diagnostics.len(), 1);
        assert_eq!(failure.diagnostics[0].span, (4..5).into());
    }
}
