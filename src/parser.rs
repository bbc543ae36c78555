//! Line-oriented document parser.
//!
//! Each physical line is a blank line, a `# comment`, a `[table]` or
//! `[[array]]` header, or a `key = value` pair. The only construct that spans
//! lines is an array value whose brackets don't balance on its first line.
//! Anything malformed becomes a diagnostic and parsing resumes on the next
//! line.

use std::{ops::Range, sync::Arc};

use miette::Severity;
use winnow::{
    combinator::{alt, cut_err},
    error::ErrMode,
    prelude::*,
    stream::Location,
    token::take_till,
};

use crate::{
    document::Step,
    literal::{self, new_input, Input, PResult, TomlParseError},
    PartialParse, TomlDiagnostic, TomlDocument, TomlErrorKind, TomlPair, TomlPath,
};

pub(crate) fn parse_document(input: &str) -> PartialParse {
    DocumentParser::new(input).run()
}

/// A physical line, without its line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line<'a> {
    offset: usize,
    text: &'a str,
}

impl Line<'_> {
    fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Splits input on `\n`, dropping a trailing `\r` from each line.
struct SourceLines<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Iterator for SourceLines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.input.get(self.offset..).filter(|rest| !rest.is_empty())?;
        let (raw, consumed) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        let line = Line {
            offset: self.offset,
            text: raw.strip_suffix('\r').unwrap_or(raw),
        };
        self.offset += consumed;
        Some(line)
    }
}

/// Where pairs go as they are read.
enum Target {
    /// Before the first header.
    Root,
    Table(Vec<Step>),
    /// After a rejected header: pairs are dropped until the next header.
    Rejected,
}

struct DocumentParser<'a> {
    input: &'a str,
    source: Arc<String>,
    lines: SourceLines<'a>,
    document: TomlDocument,
    target: Target,
    diagnostics: Vec<TomlDiagnostic>,
}

impl<'a> DocumentParser<'a> {
    fn new(input: &'a str) -> Self {
        DocumentParser {
            input,
            source: Arc::new(input.to_string()),
            lines: SourceLines { input, offset: 0 },
            document: TomlDocument::new(),
            target: Target::Root,
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> PartialParse {
        while let Some(line) = self.lines.next() {
            let text = line.text.trim_start();
            let start = line.offset + (line.text.len() - text.len());
            let text = text.trim_end();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            if text.starts_with('[') {
                self.header(start, text);
            } else {
                self.pair(line, start, text);
            }
        }
        PartialParse {
            document: self.document,
            diagnostics: self.diagnostics,
            input: self.source,
        }
    }

    fn report(&mut self, span: Range<usize>, kind: TomlErrorKind, severity: Severity) {
        let diagnostic = literal::diagnostic(&self.source, span, kind, severity);
        tracing::debug!(
            line = diagnostic.line(),
            kind = %diagnostic.kind,
            "recovered from malformed input"
        );
        self.diagnostics.push(diagnostic);
    }

    fn header(&mut self, start: usize, text: &str) {
        let mut input = new_input(text);
        let (is_array, raw_path, path_span) = match header.parse_next(&mut input) {
            Ok(parsed) => parsed,
            Err(_) => {
                let at = start + input.location();
                self.report(
                    at..start + text.len(),
                    TomlErrorKind::Context("a closing `]`"),
                    Severity::Error,
                );
                self.target = Target::Rejected;
                return;
            }
        };
        if let Some((span, rest)) = literal::trailing(&mut input) {
            self.report(
                (start + span.start)..(start + span.end),
                TomlErrorKind::TrailingCharacters(rest.to_string()),
                Severity::Error,
            );
            self.target = Target::Rejected;
            return;
        }
        let path_span = (start + path_span.start)..(start + path_span.end);
        let path: TomlPath = match raw_path.parse() {
            Ok(path) => path,
            Err(_) => {
                self.report(
                    path_span,
                    TomlErrorKind::MalformedPath(raw_path.trim().to_string()),
                    Severity::Error,
                );
                self.target = Target::Rejected;
                return;
            }
        };
        tracing::trace!(%path, is_array, "entering table");

        let header_span = start..start + text.len();
        let (steps, table) = if is_array {
            self.document.locate_new_instance(&path)
        } else {
            self.document.locate_or_create(&path)
        };
        if !is_array && table.is_array_container {
            self.report(
                path_span,
                TomlErrorKind::TableIsArray(path.to_string()),
                Severity::Error,
            );
            self.target = Target::Rejected;
            return;
        }
        #[cfg(feature = "span")]
        table.set_span(header_span);
        #[cfg(not(feature = "span"))]
        let _ = (table, header_span);
        self.target = Target::Table(steps);
    }

    fn pair(&mut self, line: Line<'a>, start: usize, text: &str) {
        let mut input = new_input(text);
        let key = match literal::key.parse_next(&mut input) {
            Ok(key) => key,
            Err(err) => {
                let kind = match err {
                    ErrMode::Cut(TomlParseError {
                        kind: Some(kind), ..
                    }) => kind,
                    _ if text.starts_with('=') => TomlErrorKind::MissingKey,
                    _ => TomlErrorKind::UnrecognizedLine,
                };
                self.report(start..start + text.len(), kind, Severity::Error);
                return;
            }
        };

        // Array values keep going until their brackets balance.
        let value_start = start + input.location();
        let source = self.input;
        let mut end = line.end();
        let first = &source[value_start..end];
        if first.starts_with('[') {
            let mut depth = literal::bracket_depth(first, 0);
            while depth > 0 {
                match self.lines.next() {
                    Some(next) => {
                        depth = literal::bracket_depth(next.text, depth);
                        end = next.end();
                    }
                    None => {
                        self.report(
                            value_start..end,
                            TomlErrorKind::UnterminatedArray,
                            Severity::Error,
                        );
                        return;
                    }
                }
            }
        }

        let parsed = literal::value(&source[value_start..end]);
        for error in parsed.errors {
            let diagnostic = error.into_diagnostic(&self.source, value_start);
            tracing::debug!(line = diagnostic.line(), kind = %diagnostic.kind, "bad value");
            self.diagnostics.push(diagnostic);
        }
        let Some(value) = parsed.value else {
            return;
        };

        #[allow(unused_mut)]
        let mut pair = TomlPair::new(key, value);
        #[cfg(feature = "span")]
        pair.set_span(start..end);

        let orphaned = match &self.target {
            Target::Root => {
                self.document.pairs.push(pair);
                None
            }
            Target::Table(steps) => {
                if let Some(table) = self.document.table_at_mut(steps) {
                    table.pairs.push(pair);
                }
                None
            }
            Target::Rejected => Some(pair.key),
        };
        if let Some(key) = orphaned {
            self.report(
                start..end,
                TomlErrorKind::OrphanedPair(key),
                Severity::Warning,
            );
        }
    }
}

/// `header := '[[' path ']]' | '[' path ']'`
///
/// Returns whether this is an array-of-tables header, the raw path text, and
/// the path's span within the header.
fn header<'s>(input: &mut Input<'s>) -> PResult<(bool, &'s str, Range<usize>)> {
    let is_array = alt(("[[".value(true), "[".value(false))).parse_next(input)?;
    let (path, span) = take_till(0.., [']', '#']).with_span().parse_next(input)?;
    let close = if is_array { "]]" } else { "]" };
    cut_err(close).context("a closing `]`").parse_next(input)?;
    Ok((is_array, path, span))
}
