#[cfg(feature = "span")]
use miette::SourceSpan;
use std::fmt::Display;

use crate::{path::is_bare_key, TomlValue};

/// A `key = value` line inside a table.
#[derive(Debug, Clone)]
pub struct TomlPair {
    pub(crate) key: String,
    pub(crate) value: TomlValue,
    #[cfg(feature = "span")]
    pub(crate) span: SourceSpan,
}

impl PartialEq for TomlPair {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
        // intentionally omitted: self.span == other.span
    }
}

impl TomlPair {
    /// Creates a new pair.
    pub fn new(key: impl Into<String>, value: impl Into<TomlValue>) -> Self {
        TomlPair {
            key: key.into(),
            value: value.into(),
            #[cfg(feature = "span")]
            span: SourceSpan::from(0..0),
        }
    }

    /// Gets this pair's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gets the pair's value.
    pub fn value(&self) -> &TomlValue {
        &self.value
    }

    /// Gets a mutable reference to this pair's value.
    pub fn value_mut(&mut self) -> &mut TomlValue {
        &mut self.value
    }

    /// Sets the pair's value.
    pub fn set_value(&mut self, value: impl Into<TomlValue>) {
        self.value = value.into();
    }

    /// Gets this pair's span.
    ///
    /// This value will be properly initialized when created via
    /// [`crate::TomlDocument::parse`] but may become invalidated if the
    /// document is mutated. We do not currently guarantee this to yield any
    /// particularly consistent results at that point.
    #[cfg(feature = "span")]
    pub fn span(&self) -> SourceSpan {
        self.span
    }

    /// Sets this pair's span.
    #[cfg(feature = "span")]
    pub fn set_span(&mut self, span: impl Into<SourceSpan>) {
        self.span = span.into();
    }

    pub(crate) fn write_to(
        &self,
        f: &mut impl std::fmt::Write,
        default_precision: usize,
    ) -> std::fmt::Result {
        if is_bare_key(&self.key) {
            write!(f, "{} = ", self.key)?;
        } else {
            TomlValue::String(self.key.clone()).write_to(f, default_precision)?;
            write!(f, " = ")?;
        }
        self.value.write_to(f, default_precision)
    }
}

impl Display for TomlPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_to(f, crate::DEFAULT_FLOAT_PRECISION)
    }
}

impl<K, V> From<(K, V)> for TomlPair
where
    K: Into<String>,
    V: Into<TomlValue>,
{
    fn from((key, value): (K, V)) -> Self {
        TomlPair::new(key, value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        let pair = TomlPair::new("log_level", 4);
        assert_eq!(format!("{}", pair), "log_level = 4");

        let pair = TomlPair::new("host name", "example.org");
        assert_eq!(format!("{}", pair), r#""host name" = "example.org""#);

        let pair: TomlPair = ("ratio", TomlValue::float_with_precision(0.25, 2)).into();
        assert_eq!(format!("{}", pair), "ratio = 0.25");
    }

    #[test]
    fn equality_ignores_span() {
        let left = TomlPair::new("a", true);
        #[allow(unused_mut)]
        let mut right = TomlPair::new("a", true);
        #[cfg(feature = "span")]
        right.set_span(4..9);
        assert_eq!(left, right);
    }
}
