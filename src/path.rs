use std::{fmt::Display, str::FromStr};

use crate::TomlError;

/// A dotted table path such as `server.tls`, split into its segments.
///
/// Every segment is a non-empty bare name made of ASCII letters, digits, `_`
/// and `-`. Whitespace around segments is ignored when parsing, so
/// `[ server . tls ]` names the same table as `[server.tls]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TomlPath {
    pub(crate) segments: Vec<String>,
}

impl TomlPath {
    /// Builds a path from already-split segments, validating each one.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, TomlError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || !segments.iter().all(|s| is_bare_key(s)) {
            return Err(TomlError::MalformedPath(segments.join(".")));
        }
        Ok(TomlPath { segments })
    }

    /// The path's segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, which is the name of the table the path points at.
    pub fn name(&self) -> &str {
        // A path always has at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Returns the path with `name` appended as a new last segment.
    pub fn join(&self, name: &str) -> Result<Self, TomlError> {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self::from_segments(segments)
    }

    /// Splits the path into its first segment and the remaining ones.
    pub(crate) fn split_first(&self) -> (&str, &[String]) {
        match self.segments.split_first() {
            Some((first, rest)) => (first.as_str(), rest),
            None => ("", &[]),
        }
    }
}

/// Returns `true` if `key` can be written without quotes, either as a table
/// path segment or as the key of a pair.
pub(crate) fn is_bare_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_bare_key_char)
}

pub(crate) fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl Display for TomlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for TomlPath {
    type Err = TomlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('.').map(str::trim).collect();
        if segments.iter().any(|segment| !is_bare_key(segment)) {
            return Err(TomlError::MalformedPath(s.to_string()));
        }
        Ok(TomlPath {
            segments: segments.into_iter().map(String::from).collect(),
        })
    }
}

impl TryFrom<&str> for TomlPath {
    type Error = TomlError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
