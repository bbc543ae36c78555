//! `tomlet` is a "document-oriented" parser and writer for a small,
//! line-oriented subset of [TOML](https://toml.io). It is meant for
//! configuration files that people edit by hand and programs read, tweak and
//! write back.
//!
//! The supported subset is: `[table]` and `[[array.of.tables]]` headers with
//! dotted paths, `key = value` pairs, `# comments`, and values that are
//! strings, 32-bit integers, floats, booleans, or (possibly nested,
//! possibly multi-line) arrays of those.
//!
//! ## Example
//!
//! ```rust
//! use tomlet::TomlDocument;
//!
//! let doc_str = r#"
//! [general]
//! log_level = 4
//! ratio = 0.250
//!
//! [[servers]]
//! name = "alpha"
//! ports = [80, 443]
//!
//! [[servers]]
//! name = "beta"
//! "#;
//!
//! let mut doc: TomlDocument = doc_str.parse()?;
//!
//! assert_eq!(doc.get_int("general", "log_level")?, 4);
//! assert_eq!(doc.array_of_tables("servers")?.len(), 2);
//!
//! // Float precision is remembered, so values are written back as they
//! // were read.
//! doc.set("general", "ratio", 0.5)?;
//! assert_eq!(
//!     doc.to_string(),
//!     r#"[general]
//! log_level = 4
//! ratio = 0.500
//!
//! [[servers]]
//! name = "alpha"
//! ports = [80, 443]
//!
//! [[servers]]
//! name = "beta"
//! "#
//! );
//! # Ok::<(), miette::Report>(())
//! ```
//!
//! Comments and blank lines are not kept. Writing a parsed document, or one
//! built through the path-based API ([`TomlDocument::insert`],
//! [`TomlDocument::resolve_or_create`] and friends), and parsing the output
//! again gives back an equal document. Tables and pairs pushed directly
//! through [`TomlDocument::tables_mut`], [`TomlTable::subtables_mut`] or the
//! `pairs_mut` accessors skip that validation: table names must be bare keys
//! (ASCII letters, digits, `_` and `-`) and keys must be non-empty for the
//! output to read back.
//!
//! ## Strict and Lenient Parsing
//!
//! [`TomlDocument::parse`] (and [`str::parse`]) fail if anything in the input
//! is malformed. [`TomlDocument::parse_lenient`] instead skips whatever it
//! can't understand and hands back the rest, along with a
//! [`TomlDiagnostic`] for every problem:
//!
//! ```rust
//! use tomlet::TomlDocument;
//!
//! let partial = TomlDocument::parse_lenient("[a]\nx = 1\ny = oops\nlist = [1, ?, 3]\n");
//! assert_eq!(partial.diagnostics.len(), 2);
//! assert_eq!(partial.document.get_int("a", "x")?, 1);
//! assert!(partial.document.get("a", "y").is_err());
//! assert_eq!(partial.document.get_array("a", "list")?.len(), 2);
//! # Ok::<(), miette::Report>(())
//! ```
//!
//! ## Error Reporting
//!
//! [`TomlParseFailure`] and [`TomlError`] implement [`miette::Diagnostic`]
//! and can be used to display detailed, pretty-printed diagnostic messages
//! when using [`miette::Result`] and the `"fancy"` feature flag for `miette`:
//!
//! ```toml
//! # Cargo.toml
//! [dependencies]
//! miette = { version = "x.y.z", features = ["fancy"] }
//! ```
//!
//! ```no_run
//! fn main() -> miette::Result<()> {
//!     "[a]\nescape = \"\\q\"".parse::<tomlet::TomlDocument>()?;
//!     Ok(())
//! }
//! ```
//!
//! This will display a message like:
//! ```text
//! Error:
//!   × Failed to parse TOML document
//!
//! Error:
//!   × Unsupported escape sequence `\q`.
//!    ╭─[2:10]
//!  1 │ [a]
//!  2 │ escape = "\q"
//!    ·          ──┬─
//!    ·            ╰── unsupported escape
//!    ╰────
//!   help: Supported escapes are `\\`, `\"`, `\n`, `\t` and `\r`. Use a 'single-quoted' string to avoid escaping.
//! ```
//!
//! ## Quirks
//!
//! ### Keys
//!
//! Repeated keys within a table are all kept, in order, and all written
//! back. Lookups such as [`TomlTable::get`] return the _first_ one.
//!
//! ### Numbers
//!
//! * Numbers without a decimal point are interpreted as [`i32`]. Literals
//!   that don't fit are reported as errors.
//! * Numbers with a decimal point are interpreted as [`f64`], and the number
//!   of characters after the point is recorded as the float's precision.
//! * Floats without a recorded precision are written with
//!   [`FormatConfig::default_float_precision`] digits.
//! * Non-finite floats have no literal form and are written as `NaN` or
//!   `inf`, which do not parse back.
//!
//! ## License
//!
//! The code in this repository is covered by the Apache-2.0 License.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub, rust_2018_idioms, unreachable_pub)]
#![cfg_attr(test, deny(warnings))]

pub use document::*;
pub use error::*;
pub use fmt::FormatConfig;
pub use pair::*;
pub use path::*;
pub use table::*;
pub use value::*;

mod document;
mod error;
mod fmt;
mod literal;
mod pair;
mod parser;
mod path;
mod table;
mod value;
