use std::{fmt::Display, str::FromStr};

use crate::{literal, TomlError, TomlParseFailure};

/// Number of fractional digits written for floats that carry no precision of
/// their own, such as values created from an `f64`.
pub const DEFAULT_FLOAT_PRECISION: usize = 3;

/// A value on the right-hand side of a `key = value` pair.
///
/// Arrays may hold any mix of scalars and further arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum TomlValue {
    /// A quoted string. Quotes are not part of the value.
    String(String),

    /// A decimal integer, e.g. `42` or `-7`.
    Int(i32),

    /// A number with a decimal point, e.g. `3.125`.
    Float {
        /// The parsed value.
        value: f64,
        /// Count of digits after the `.` in the source literal, if the value
        /// was parsed. Used by the writer to reproduce the same text.
        precision: Option<usize>,
    },

    /// `true` or `false`.
    Bool(bool),

    /// A bracketed, comma-separated list of values.
    Array(TomlArray),
}

/// The type tag of a [`TomlValue`], used for typed access and in
/// [`TomlError::TypeMismatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TomlValueType {
    /// [`TomlValue::String`]
    String,
    /// [`TomlValue::Int`]
    Int,
    /// [`TomlValue::Float`]
    Float,
    /// [`TomlValue::Bool`]
    Bool,
    /// [`TomlValue::Array`]
    Array,
}

impl Display for TomlValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TomlValueType::String => "string",
            TomlValueType::Int => "integer",
            TomlValueType::Float => "float",
            TomlValueType::Bool => "boolean",
            TomlValueType::Array => "array",
        };
        write!(f, "{name}")
    }
}

impl TomlValue {
    /// Creates a float that will be written with exactly `precision`
    /// fractional digits.
    pub fn float_with_precision(value: f64, precision: usize) -> Self {
        TomlValue::Float {
            value,
            precision: Some(precision),
        }
    }

    /// Returns the type tag of this value.
    pub fn ty(&self) -> TomlValueType {
        match self {
            TomlValue::String(_) => TomlValueType::String,
            TomlValue::Int(_) => TomlValueType::Int,
            TomlValue::Float { .. } => TomlValueType::Float,
            TomlValue::Bool(_) => TomlValueType::Bool,
            TomlValue::Array(_) => TomlValueType::Array,
        }
    }

    /// Returns `true` if the value is a [`TomlValue::String`].
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is a [`TomlValue::Int`].
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(..))
    }

    /// Returns `true` if the value is a [`TomlValue::Float`].
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float { .. })
    }

    /// Returns `true` if the value is a [`TomlValue::Bool`].
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(..))
    }

    /// Returns `true` if the value is a [`TomlValue::Array`].
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `Some(&str)` if the value is a [`TomlValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Returns `Some(i32)` if the value is a [`TomlValue::Int`].
    pub fn as_int(&self) -> Option<i32> {
        if let Self::Int(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Returns `Some(f64)` if the value is a [`TomlValue::Float`].
    pub fn as_f64(&self) -> Option<f64> {
        if let Self::Float { value, .. } = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Returns the recorded precision of a [`TomlValue::Float`], if any.
    pub fn precision(&self) -> Option<usize> {
        if let Self::Float { precision, .. } = self {
            *precision
        } else {
            None
        }
    }

    /// Returns `Some(bool)` if the value is a [`TomlValue::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Returns the array if the value is a [`TomlValue::Array`].
    pub fn as_array(&self) -> Option<&TomlArray> {
        if let Self::Array(a) = self {
            Some(a)
        } else {
            None
        }
    }

    /// Returns a mutable reference to the array if the value is a
    /// [`TomlValue::Array`].
    pub fn as_array_mut(&mut self) -> Option<&mut TomlArray> {
        if let Self::Array(a) = self {
            Some(a)
        } else {
            None
        }
    }

    pub(crate) fn write_to(
        &self,
        f: &mut impl std::fmt::Write,
        default_precision: usize,
    ) -> std::fmt::Result {
        match self {
            TomlValue::String(s) => write_string(f, s),
            TomlValue::Int(i) => write!(f, "{i}"),
            TomlValue::Float { value, precision } => {
                match precision.unwrap_or(default_precision) {
                    // `1.` keeps the decimal point so the value reads back as a float.
                    0 => write!(f, "{value:.0}."),
                    digits => write!(f, "{value:.digits$}"),
                }
            }
            TomlValue::Bool(b) => write!(f, "{b}"),
            TomlValue::Array(array) => {
                write!(f, "[")?;
                for (i, value) in array.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    value.write_to(f, default_precision)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn write_string(f: &mut impl std::fmt::Write, string: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for char in string.chars() {
        match char {
            '\\' | '"' => write!(f, "\\{}", char)?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            _ => write!(f, "{}", char)?,
        }
    }
    write!(f, "\"")
}

impl Display for TomlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_to(f, DEFAULT_FLOAT_PRECISION)
    }
}

impl FromStr for TomlValue {
    type Err = TomlParseFailure;

    /// Parses a single value literal, such as the right-hand side of a pair.
    /// Array literals may span several lines.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        literal::parse_standalone(input)
    }
}

impl From<i32> for TomlValue {
    fn from(value: i32) -> Self {
        TomlValue::Int(value)
    }
}

impl From<f64> for TomlValue {
    fn from(value: f64) -> Self {
        TomlValue::Float {
            value,
            precision: None,
        }
    }
}

impl From<&str> for TomlValue {
    fn from(value: &str) -> Self {
        TomlValue::String(value.to_string())
    }
}

impl From<String> for TomlValue {
    fn from(value: String) -> Self {
        TomlValue::String(value)
    }
}

impl From<bool> for TomlValue {
    fn from(value: bool) -> Self {
        TomlValue::Bool(value)
    }
}

impl From<TomlArray> for TomlValue {
    fn from(value: TomlArray) -> Self {
        TomlValue::Array(value)
    }
}

impl<T> From<Vec<T>> for TomlValue
where
    T: Into<TomlValue>,
{
    fn from(values: Vec<T>) -> Self {
        TomlValue::Array(values.into_iter().collect())
    }
}

/// An ordered array value. Elements need not share a type.
///
/// All indexed access is bounds-checked and reports
/// [`TomlError::IndexOutOfRange`] instead of panicking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TomlArray {
    pub(crate) values: Vec<TomlValue>,
}

impl TomlArray {
    /// Creates an empty array.
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TomlValue> {
        self.values.iter()
    }

    /// Returns the elements as a slice.
    pub fn values(&self) -> &[TomlValue] {
        &self.values
    }

    /// Gets the element at `index`.
    pub fn get(&self, index: usize) -> Result<&TomlValue, TomlError> {
        self.values.get(index).ok_or(TomlError::IndexOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    /// Gets the element at `index`, requiring it to be of type `expected`.
    pub fn get_typed(
        &self,
        index: usize,
        expected: TomlValueType,
    ) -> Result<&TomlValue, TomlError> {
        let value = self.get(index)?;
        if value.ty() == expected {
            Ok(value)
        } else {
            Err(TomlError::TypeMismatch {
                expected,
                found: value.ty(),
            })
        }
    }

    /// Replaces the element at `index`, returning the previous one. The new
    /// element may have a different type than the old one.
    pub fn set(
        &mut self,
        index: usize,
        value: impl Into<TomlValue>,
    ) -> Result<TomlValue, TomlError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(TomlError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, value.into()))
    }

    /// Appends an element.
    pub fn push(&mut self, value: impl Into<TomlValue>) {
        self.values.push(value.into());
    }
}

impl<T> FromIterator<T> for TomlArray
where
    T: Into<TomlValue>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        TomlArray {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for TomlArray {
    type Item = TomlValue;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a TomlArray {
    type Item = &'a TomlValue;
    type IntoIter = std::slice::Iter<'a, TomlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
