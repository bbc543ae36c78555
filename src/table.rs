#[cfg(feature = "span")]
use miette::SourceSpan;
use std::fmt::Display;

use crate::{fmt::Writer, FormatConfig, TomlPair, TomlValue};

#[cfg(doc)]
use crate::TomlDocument;

/// A named table: its own `key = value` pairs, nested subtables, and, when it
/// has been used as an array of tables (`[[name]]`), its instances.
///
/// A table that is an array container keeps its instances in
/// [`TomlTable::instances`]. Each instance is itself a `TomlTable` with the
/// same name as the container and [`TomlTable::is_array_element`] set.
#[derive(Debug, Clone)]
pub struct TomlTable {
    pub(crate) name: String,
    pub(crate) pairs: Vec<TomlPair>,
    pub(crate) subtables: Vec<TomlTable>,
    pub(crate) instances: Vec<TomlTable>,
    pub(crate) is_array_element: bool,
    pub(crate) is_array_container: bool,
    #[cfg(feature = "span")]
    pub(crate) span: SourceSpan,
}

impl PartialEq for TomlTable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.pairs == other.pairs
            && self.subtables == other.subtables
            && self.instances == other.instances
            && self.is_array_element == other.is_array_element
            && self.is_array_container == other.is_array_container
        // intentionally omitted: self.span == other.span
    }
}

impl TomlTable {
    /// Creates a new, empty table with a given name.
    pub fn new(name: impl Into<String>) -> Self {
        TomlTable {
            name: name.into(),
            pairs: Vec::new(),
            subtables: Vec::new(),
            instances: Vec::new(),
            is_array_element: false,
            is_array_container: false,
            #[cfg(feature = "span")]
            span: SourceSpan::from(0..0),
        }
    }

    pub(crate) fn new_instance(name: impl Into<String>) -> Self {
        TomlTable {
            is_array_element: true,
            ..TomlTable::new(name)
        }
    }

    /// Gets this table's name, which is the last segment of its path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns this table's pairs, in source order.
    pub fn pairs(&self) -> &[TomlPair] {
        &self.pairs
    }

    /// Returns a mutable reference to this table's pairs.
    pub fn pairs_mut(&mut self) -> &mut Vec<TomlPair> {
        &mut self.pairs
    }

    /// Returns the tables nested directly under this one.
    pub fn subtables(&self) -> &[TomlTable] {
        &self.subtables
    }

    /// Returns a mutable reference to the tables nested under this one.
    ///
    /// Names are not validated here; see [`TomlDocument::tables_mut`].
    pub fn subtables_mut(&mut self) -> &mut Vec<TomlTable> {
        &mut self.subtables
    }

    /// Returns the instances of this array of tables, in source order. Empty
    /// unless [`TomlTable::is_array_container`] is true.
    pub fn instances(&self) -> &[TomlTable] {
        &self.instances
    }

    /// Returns a mutable reference to this table's instances.
    pub fn instances_mut(&mut self) -> &mut [TomlTable] {
        &mut self.instances
    }

    /// Whether this table was introduced by a `[[name]]` header, i.e. it is
    /// one instance of an array of tables.
    pub fn is_array_element(&self) -> bool {
        self.is_array_element
    }

    /// Whether this table holds instances of an array of tables.
    pub fn is_array_container(&self) -> bool {
        self.is_array_container
    }

    /// Gets the value of the first pair with the given key.
    ///
    /// Keys are not deduplicated while parsing, so a repeated key keeps its
    /// first value here.
    pub fn get(&self, key: &str) -> Option<&TomlValue> {
        self.pairs
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| &pair.value)
    }

    /// Gets a mutable reference to the value of the first pair with the
    /// given key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut TomlValue> {
        self.pairs
            .iter_mut()
            .find(|pair| pair.key == key)
            .map(|pair| &mut pair.value)
    }

    /// Sets the value for `key`, replacing the first existing pair with that
    /// key or appending a new one. Returns the previous value, if any.
    ///
    /// The key is not checked here. An empty key writes a line that doesn't
    /// parse back; [`TomlDocument::insert`] rejects it.
    pub fn insert(&mut self, key: &str, value: impl Into<TomlValue>) -> Option<TomlValue> {
        let value = value.into();
        match self.get_mut(key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.pairs.push(TomlPair::new(key, value));
                None
            }
        }
    }

    /// Removes the first pair with the given key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<TomlValue> {
        let index = self.pairs.iter().position(|pair| pair.key == key)?;
        Some(self.pairs.remove(index).value)
    }

    /// Gets the direct subtable with the given name.
    pub fn subtable(&self, name: &str) -> Option<&TomlTable> {
        self.subtables.iter().find(|table| table.name == name)
    }

    /// Gets a mutable reference to the direct subtable with the given name.
    pub fn subtable_mut(&mut self, name: &str) -> Option<&mut TomlTable> {
        self.subtables.iter_mut().find(|table| table.name == name)
    }

    /// Gets this table's span.
    ///
    /// For tables introduced by a header this points at the header. Tables
    /// that only exist because a longer path named them have an empty span.
    #[cfg(feature = "span")]
    pub fn span(&self) -> SourceSpan {
        self.span
    }

    /// Sets this table's span.
    #[cfg(feature = "span")]
    pub fn set_span(&mut self, span: impl Into<SourceSpan>) {
        self.span = span.into();
    }

    /// A container with nothing but instances gets no `[name]` header of
    /// its own when written.
    pub(crate) fn is_pure_container(&self) -> bool {
        self.is_array_container && self.pairs.is_empty() && self.subtables.is_empty()
    }

    /// The tables a longer path continues into: the last instance's
    /// subtables for an array container, otherwise this table's own.
    pub(crate) fn descent_children(&self) -> &[TomlTable] {
        if self.is_array_container {
            if let Some(last) = self.instances.last() {
                return &last.subtables;
            }
        }
        &self.subtables
    }

    pub(crate) fn descent_children_mut(&mut self) -> &mut Vec<TomlTable> {
        if self.is_array_container {
            if let Some(last) = self.instances.last_mut() {
                return &mut last.subtables;
            }
        }
        &mut self.subtables
    }

    pub(crate) fn find_deep(&self, name: &str) -> Option<&TomlTable> {
        self.subtables
            .iter()
            .chain(self.instances.iter())
            .find_map(|table| {
                if table.name == name {
                    Some(table)
                } else {
                    table.find_deep(name)
                }
            })
    }
}

impl Display for TomlTable {
    /// Writes the table as if it were at the top level of a document, with
    /// [`FormatConfig::default`].
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = FormatConfig::default();
        Writer::new(f, &config).table(self, None, 0)
    }
}
