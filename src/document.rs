use std::{fmt::Display, path::Path, str::FromStr, sync::Arc};

use crate::{
    fmt::Writer, parser, FormatConfig, TomlArray, TomlDiagnostic, TomlError, TomlPair,
    TomlParseFailure, TomlPath, TomlTable, TomlValue, TomlValueType,
};

/// Represents a parsed configuration document: pairs that appear before any
/// header, followed by a forest of tables.
///
/// Tables are addressed by dotted paths such as `"server.tls"`. Paths that
/// pass through an array of tables continue into its *last* instance, the
/// same way a `[servers.tls]` header following `[[servers]]` attaches to the
/// most recent server.
///
/// ```rust
/// # use tomlet::TomlDocument;
/// let mut doc: TomlDocument = r#"
/// [general]
/// log_level = 4
/// name = "edge-01"
/// "#.parse()?;
///
/// assert_eq!(doc.get_int("general", "log_level")?, 4);
/// doc.set("general", "log_level", 5)?;
/// assert_eq!(doc.to_string(), "[general]\nlog_level = 5\nname = \"edge-01\"\n");
/// # Ok::<(), miette::Report>(())
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TomlDocument {
    pub(crate) pairs: Vec<TomlPair>,
    pub(crate) tables: Vec<TomlTable>,
}

/// The outcome of lenient parsing: a best-effort document together with
/// every diagnostic produced while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialParse {
    /// Everything that could be parsed.
    pub document: TomlDocument,
    /// Errors and warnings, in source order.
    pub diagnostics: Vec<TomlDiagnostic>,
    pub(crate) input: Arc<String>,
}

impl PartialParse {
    /// Whether any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(TomlDiagnostic::is_error)
    }

    /// Converts into a strict result: the document if no errors were found,
    /// or a failure carrying every diagnostic otherwise.
    pub fn into_result(self) -> Result<TomlDocument, TomlParseFailure> {
        if self.has_errors() {
            Err(TomlParseFailure {
                input: self.input,
                diagnostics: self.diagnostics,
            })
        } else {
            Ok(self.document)
        }
    }
}

/// One step of a path through the tree: an index into a list of subtables,
/// or into a container's instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Table(usize),
    Instance(usize),
}

impl TomlDocument {
    /// Creates a new, empty document.
    pub fn new() -> Self {
        Default::default()
    }

    /// Parses a document, failing if any error was found.
    pub fn parse(input: &str) -> Result<Self, TomlParseFailure> {
        Self::parse_lenient(input).into_result()
    }

    /// Parses a document, skipping anything malformed. Lines that can't be
    /// understood are reported in [`PartialParse::diagnostics`] and parsing
    /// continues with the next line.
    pub fn parse_lenient(input: &str) -> PartialParse {
        parser::parse_document(input)
    }

    /// Reads and strictly parses the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TomlError> {
        Ok(Self::open_lenient(path)?.into_result()?)
    }

    /// Reads and leniently parses the file at `path`. Only I/O problems are
    /// returned as errors.
    pub fn open_lenient(path: impl AsRef<Path>) -> Result<PartialParse, TomlError> {
        let path = path.as_ref();
        tracing::trace!(path = %path.display(), "opening document");
        let input = std::fs::read_to_string(path)?;
        Ok(Self::parse_lenient(&input))
    }

    /// Writes this document to `path` with the default [`FormatConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TomlError> {
        self.save_with(path, &FormatConfig::default())
    }

    /// Writes this document to `path` using the given [`FormatConfig`].
    pub fn save_with(&self, path: impl AsRef<Path>, config: &FormatConfig) -> Result<(), TomlError> {
        let path = path.as_ref();
        tracing::trace!(path = %path.display(), "saving document");
        std::fs::write(path, self.to_string_with(config))?;
        Ok(())
    }

    /// Renders this document using the given [`FormatConfig`].
    pub fn to_string_with(&self, config: &FormatConfig) -> String {
        let mut out = String::new();
        // Writing into a String can't fail.
        let _ = Writer::new(&mut out, config).document(self);
        out
    }

    /// Returns the pairs that appear before the first header.
    pub fn pairs(&self) -> &[TomlPair] {
        &self.pairs
    }

    /// Returns a mutable reference to the pairs before the first header.
    pub fn pairs_mut(&mut self) -> &mut Vec<TomlPair> {
        &mut self.pairs
    }

    /// Returns the top-level tables.
    pub fn tables(&self) -> &[TomlTable] {
        &self.tables
    }

    /// Returns a mutable reference to the top-level tables.
    ///
    /// Names of tables pushed here are not validated. Use bare names, as
    /// [`TomlPath`] requires, or the written document won't parse back.
    pub fn tables_mut(&mut self) -> &mut Vec<TomlTable> {
        &mut self.tables
    }

    /// Finds the table at `path`. Segments after an array of tables continue
    /// into its last instance; a path ending at an array of tables yields the
    /// container.
    pub fn resolve(&self, path: &TomlPath) -> Option<&TomlTable> {
        let (first, rest) = path.split_first();
        find_in(&self.tables, first, rest)
    }

    /// Mutable version of [`TomlDocument::resolve`].
    pub fn resolve_mut(&mut self, path: &TomlPath) -> Option<&mut TomlTable> {
        let (first, rest) = path.split_first();
        find_in_mut(&mut self.tables, first, rest)
    }

    /// Finds the table at `path`, creating it and any missing intermediate
    /// tables. Existing tables are reused, so this never duplicates a name.
    pub fn resolve_or_create(&mut self, path: &TomlPath) -> &mut TomlTable {
        let mut steps = Vec::new();
        let (first, rest) = path.split_first();
        create_in(&mut self.tables, first, rest, &mut steps)
    }

    /// Appends a new instance to the array of tables at `path` and returns
    /// it. The table at `path` is created if needed and becomes an array
    /// container.
    pub fn resolve_array_of_tables(&mut self, path: &TomlPath) -> &mut TomlTable {
        let mut steps = Vec::new();
        let (first, rest) = path.split_first();
        push_instance_in(&mut self.tables, first, rest, &mut steps)
    }

    /// Depth-first search for the first table named `name` anywhere in the
    /// tree, including inside array instances.
    pub fn find_table_deep(&self, name: &str) -> Option<&TomlTable> {
        self.tables.iter().find_map(|table| {
            if table.name == name {
                Some(table)
            } else {
                table.find_deep(name)
            }
        })
    }

    pub(crate) fn locate_or_create(&mut self, path: &TomlPath) -> (Vec<Step>, &mut TomlTable) {
        let mut steps = Vec::new();
        let (first, rest) = path.split_first();
        let table = create_in(&mut self.tables, first, rest, &mut steps);
        (steps, table)
    }

    pub(crate) fn locate_new_instance(
        &mut self,
        path: &TomlPath,
    ) -> (Vec<Step>, &mut TomlTable) {
        let mut steps = Vec::new();
        let (first, rest) = path.split_first();
        let table = push_instance_in(&mut self.tables, first, rest, &mut steps);
        (steps, table)
    }

    pub(crate) fn table_at_mut(&mut self, steps: &[Step]) -> Option<&mut TomlTable> {
        let (first, rest) = steps.split_first()?;
        let Step::Table(index) = first else {
            return None;
        };
        let mut table = self.tables.get_mut(*index)?;
        for step in rest {
            table = match step {
                Step::Table(index) => table.subtables.get_mut(*index)?,
                Step::Instance(index) => table.instances.get_mut(*index)?,
            };
        }
        Some(table)
    }

    fn table_for(&self, path: &str) -> Result<&TomlTable, TomlError> {
        let parsed: TomlPath = path.parse()?;
        self.resolve(&parsed)
            .ok_or_else(|| TomlError::TableNotFound(path.to_string()))
    }

    fn table_for_mut(&mut self, path: &str) -> Result<&mut TomlTable, TomlError> {
        let parsed: TomlPath = path.parse()?;
        self.resolve_mut(&parsed)
            .ok_or_else(|| TomlError::TableNotFound(path.to_string()))
    }

    fn value_mut(&mut self, path: &str, key: &str) -> Result<&mut TomlValue, TomlError> {
        self.table_for_mut(path)?
            .get_mut(key)
            .ok_or_else(|| TomlError::KeyNotFound {
                path: path.to_string(),
                key: key.to_string(),
            })
    }

    /// Gets the value for `key` in the table at `path`.
    pub fn get(&self, path: &str, key: &str) -> Result<&TomlValue, TomlError> {
        self.table_for(path)?
            .get(key)
            .ok_or_else(|| TomlError::KeyNotFound {
                path: path.to_string(),
                key: key.to_string(),
            })
    }

    /// Gets a string value.
    pub fn get_string(&self, path: &str, key: &str) -> Result<&str, TomlError> {
        let value = self.get(path, key)?;
        value.as_str().ok_or(TomlError::TypeMismatch {
            expected: TomlValueType::String,
            found: value.ty(),
        })
    }

    /// Gets an integer value.
    pub fn get_int(&self, path: &str, key: &str) -> Result<i32, TomlError> {
        let value = self.get(path, key)?;
        value.as_int().ok_or(TomlError::TypeMismatch {
            expected: TomlValueType::Int,
            found: value.ty(),
        })
    }

    /// Gets a float value.
    pub fn get_float(&self, path: &str, key: &str) -> Result<f64, TomlError> {
        let value = self.get(path, key)?;
        value.as_f64().ok_or(TomlError::TypeMismatch {
            expected: TomlValueType::Float,
            found: value.ty(),
        })
    }

    /// Gets a boolean value.
    pub fn get_bool(&self, path: &str, key: &str) -> Result<bool, TomlError> {
        let value = self.get(path, key)?;
        value.as_bool().ok_or(TomlError::TypeMismatch {
            expected: TomlValueType::Bool,
            found: value.ty(),
        })
    }

    /// Overwrites an existing value, which must have the same type as the
    /// new one. On a type mismatch the stored value is left untouched.
    ///
    /// A float without its own precision keeps the precision of the value it
    /// replaces, so `ratio = 0.25` updated with `0.5` is written `0.50`.
    pub fn set(&mut self, path: &str, key: &str, value: impl Into<TomlValue>) -> Result<(), TomlError> {
        let mut value = value.into();
        let slot = self.value_mut(path, key)?;
        if slot.ty() != value.ty() {
            return Err(TomlError::TypeMismatch {
                expected: slot.ty(),
                found: value.ty(),
            });
        }
        if let TomlValue::Float { precision, .. } = &mut value {
            if precision.is_none() {
                *precision = slot.precision();
            }
        }
        *slot = value;
        Ok(())
    }

    /// Overwrites an existing value with one of any type, returning the old
    /// value.
    pub fn replace(
        &mut self,
        path: &str,
        key: &str,
        value: impl Into<TomlValue>,
    ) -> Result<TomlValue, TomlError> {
        let slot = self.value_mut(path, key)?;
        Ok(std::mem::replace(slot, value.into()))
    }

    /// Sets `key` in the table at `path`, creating the table (and any missing
    /// parents) and the pair as needed. Returns the previous value, if any.
    ///
    /// An empty `key` is rejected with [`TomlError::EmptyKey`].
    pub fn insert(
        &mut self,
        path: &str,
        key: &str,
        value: impl Into<TomlValue>,
    ) -> Result<Option<TomlValue>, TomlError> {
        if key.is_empty() {
            return Err(TomlError::EmptyKey);
        }
        let parsed: TomlPath = path.parse()?;
        Ok(self.resolve_or_create(&parsed).insert(key, value))
    }

    /// Gets an array value.
    pub fn get_array(&self, path: &str, key: &str) -> Result<&TomlArray, TomlError> {
        let value = self.get(path, key)?;
        value.as_array().ok_or(TomlError::TypeMismatch {
            expected: TomlValueType::Array,
            found: value.ty(),
        })
    }

    /// Gets a mutable reference to an array value.
    pub fn get_array_mut(&mut self, path: &str, key: &str) -> Result<&mut TomlArray, TomlError> {
        let value = self.value_mut(path, key)?;
        let found = value.ty();
        value.as_array_mut().ok_or(TomlError::TypeMismatch {
            expected: TomlValueType::Array,
            found,
        })
    }

    /// Gets one element of an array value.
    pub fn array_get(&self, path: &str, key: &str, index: usize) -> Result<&TomlValue, TomlError> {
        self.get_array(path, key)?.get(index)
    }

    /// Replaces one element of an array value, returning the old element.
    pub fn array_set(
        &mut self,
        path: &str,
        key: &str,
        index: usize,
        value: impl Into<TomlValue>,
    ) -> Result<TomlValue, TomlError> {
        self.get_array_mut(path, key)?.set(index, value)
    }

    /// Appends an element to an array value.
    pub fn array_push(
        &mut self,
        path: &str,
        key: &str,
        value: impl Into<TomlValue>,
    ) -> Result<(), TomlError> {
        self.get_array_mut(path, key)?.push(value);
        Ok(())
    }

    /// Returns the instances of the array of tables at `path`.
    pub fn array_of_tables(&self, path: &str) -> Result<&[TomlTable], TomlError> {
        let table = self.table_for(path)?;
        if table.is_array_container {
            Ok(&table.instances)
        } else {
            Err(TomlError::NotArrayOfTables(path.to_string()))
        }
    }

    /// Returns mutable references to the instances of the array of tables at
    /// `path`. Use [`TomlDocument::resolve_array_of_tables`] to add more.
    pub fn array_of_tables_mut(&mut self, path: &str) -> Result<&mut [TomlTable], TomlError> {
        let table = self.table_for_mut(path)?;
        if table.is_array_container {
            Ok(&mut table.instances)
        } else {
            Err(TomlError::NotArrayOfTables(path.to_string()))
        }
    }
}

/// Finds the table reusable for `name` among `siblings`, or appends a new
/// one. Array instances are never reused as plain tables.
fn child_index(siblings: &mut Vec<TomlTable>, name: &str) -> usize {
    match siblings
        .iter()
        .position(|table| table.name == name && !table.is_array_element)
    {
        Some(index) => index,
        None => {
            siblings.push(TomlTable::new(name));
            siblings.len() - 1
        }
    }
}

/// Steps from a table to the list its next path segment lives in.
fn descend<'t>(table: &'t mut TomlTable, steps: &mut Vec<Step>) -> &'t mut Vec<TomlTable> {
    if table.is_array_container {
        if let Some(last) = table.instances.len().checked_sub(1) {
            steps.push(Step::Instance(last));
        }
    }
    table.descent_children_mut()
}

fn create_in<'t>(
    siblings: &'t mut Vec<TomlTable>,
    name: &str,
    rest: &[String],
    steps: &mut Vec<Step>,
) -> &'t mut TomlTable {
    let index = child_index(siblings, name);
    steps.push(Step::Table(index));
    let table = &mut siblings[index];
    let Some((next, rest)) = rest.split_first() else {
        return table;
    };
    create_in(descend(table, steps), next, rest, steps)
}

fn push_instance_in<'t>(
    siblings: &'t mut Vec<TomlTable>,
    name: &str,
    rest: &[String],
    steps: &mut Vec<Step>,
) -> &'t mut TomlTable {
    let index = child_index(siblings, name);
    steps.push(Step::Table(index));
    let table = &mut siblings[index];
    match rest.split_first() {
        Some((next, rest)) => push_instance_in(descend(table, steps), next, rest, steps),
        None => {
            table.is_array_container = true;
            table.instances.push(TomlTable::new_instance(name));
            let last = table.instances.len() - 1;
            steps.push(Step::Instance(last));
            &mut table.instances[last]
        }
    }
}

fn find_in<'t>(siblings: &'t [TomlTable], name: &str, rest: &[String]) -> Option<&'t TomlTable> {
    let table = siblings
        .iter()
        .find(|table| table.name == name && !table.is_array_element)?;
    match rest.split_first() {
        None => Some(table),
        Some((next, rest)) => find_in(table.descent_children(), next, rest),
    }
}

fn find_in_mut<'t>(
    siblings: &'t mut [TomlTable],
    name: &str,
    rest: &[String],
) -> Option<&'t mut TomlTable> {
    let table = siblings
        .iter_mut()
        .find(|table| table.name == name && !table.is_array_element)?;
    match rest.split_first() {
        None => Some(table),
        Some((next, rest)) => find_in_mut(table.descent_children_mut(), next, rest),
    }
}

impl Display for TomlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = FormatConfig::default();
        Writer::new(f, &config).document(self)
    }
}

impl FromStr for TomlDocument {
    type Err = TomlParseFailure;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        TomlDocument::parse(input)
    }
}
