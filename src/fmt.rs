use crate::{TomlDocument, TomlPair, TomlTable, DEFAULT_FLOAT_PRECISION};

/// Formatting configuration for writing documents.
///
/// ```rust
/// # use tomlet::{FormatConfig, TomlDocument};
/// let doc: TomlDocument = "[a]\nx = 1.5\n".parse()?;
/// let config = FormatConfig::default().with_indent(2);
/// assert_eq!(doc.to_string_with(&config), "[a]\n  x = 1.5\n");
/// # Ok::<(), miette::Report>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    /// Spaces added per nesting level. Pairs are indented one level deeper
    /// than their table's header. Defaults to `0`.
    pub indent: usize,

    /// Fractional digits for floats that carry no precision of their own.
    /// Defaults to [`DEFAULT_FLOAT_PRECISION`].
    pub default_float_precision: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            indent: 0,
            default_float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

impl FormatConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the number of spaces per nesting level.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the precision used for floats without a recorded precision.
    pub fn with_default_float_precision(mut self, precision: usize) -> Self {
        self.default_float_precision = precision;
        self
    }
}

/// Emits headers and pairs, separating consecutive tables with one blank
/// line.
pub(crate) struct Writer<'a, W> {
    out: &'a mut W,
    config: &'a FormatConfig,
    wrote_any: bool,
}

impl<'a, W: std::fmt::Write> Writer<'a, W> {
    pub(crate) fn new(out: &'a mut W, config: &'a FormatConfig) -> Self {
        Writer {
            out,
            config,
            wrote_any: false,
        }
    }

    /// Root pairs first, then every table depth-first.
    pub(crate) fn document(&mut self, doc: &TomlDocument) -> std::fmt::Result {
        for pair in &doc.pairs {
            self.pair(pair, 0)?;
        }
        for table in &doc.tables {
            self.table(table, None, 0)?;
        }
        Ok(())
    }

    pub(crate) fn table(
        &mut self,
        table: &TomlTable,
        parent: Option<&str>,
        depth: usize,
    ) -> std::fmt::Result {
        let path = match parent {
            Some(parent) => format!("{parent}.{}", table.name),
            None => table.name.clone(),
        };
        self.scope(table, &path, depth)
    }

    /// Writes a table's header and pairs, then its subtables, then its
    /// instances. Instances share the container's path.
    fn scope(&mut self, table: &TomlTable, path: &str, depth: usize) -> std::fmt::Result {
        if !table.is_pure_container() {
            self.header(path, table.is_array_element, depth)?;
            for pair in &table.pairs {
                self.pair(pair, depth + 1)?;
            }
        }
        for subtable in &table.subtables {
            self.table(subtable, Some(path), depth + 1)?;
        }
        for instance in &table.instances {
            self.scope(instance, path, depth)?;
        }
        Ok(())
    }

    fn header(&mut self, path: &str, is_array_element: bool, depth: usize) -> std::fmt::Result {
        if self.wrote_any {
            writeln!(self.out)?;
        }
        self.wrote_any = true;
        let indent = depth * self.config.indent;
        if is_array_element {
            writeln!(self.out, "{:indent$}[[{path}]]", "")
        } else {
            writeln!(self.out, "{:indent$}[{path}]", "")
        }
    }

    fn pair(&mut self, pair: &TomlPair, depth: usize) -> std::fmt::Result {
        self.wrote_any = true;
        let indent = depth * self.config.indent;
        write!(self.out, "{:indent$}", "")?;
        pair.write_to(self.out, self.config.default_float_precision)?;
        writeln!(self.out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder() {
        let config = FormatConfig::default()
            .with_indent(4)
            .with_default_float_precision(1);
        assert_eq!(
            config,
            FormatConfig {
                indent: 4,
                default_float_precision: 1
            }
        );
    }

    #[test]
    fn indentation() -> miette::Result<()> {
        let doc: TomlDocument = "top = 1\n[a]\nx = 1\n[a.b]\ny = 2\n[[a.list]]\nz = 3\n".parse()?;
        let mut out = String::new();
        let config = FormatConfig::default().with_indent(2);
        Writer::new(&mut out, &config).document(&doc).unwrap();
        assert_eq!(
            out,
            "top = 1\n\n[a]\n  x = 1\n\n  [a.b]\n    y = 2\n\n  [[a.list]]\n    z = 3\n"
        );
        Ok(())
    }

    #[test]
    fn default_precision() -> miette::Result<()> {
        let mut doc = TomlDocument::new();
        doc.insert("a", "ratio", 0.5)?;
        doc.insert("a", "exact", crate::TomlValue::float_with_precision(0.5, 1))?;
        let config = FormatConfig::default().with_default_float_precision(5);
        assert_eq!(
            doc.to_string_with(&config),
            "[a]\nratio = 0.50000\nexact = 0.5\n"
        );
        Ok(())
    }
}
