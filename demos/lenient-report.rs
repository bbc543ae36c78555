/// Show how to load a damaged file leniently and report every problem
/// yourself, without the `fancy` feature or `main()` returning
/// `miette::Result`.
use miette::Diagnostic;
use tomlet::{TomlDiagnostic, TomlDocument};

fn describe(diagnostic: &TomlDiagnostic) -> String {
    let Some(source) = diagnostic.source_code() else {
        return diagnostic.to_string();
    };
    let Ok(contents) = source.read_span(&diagnostic.span, 0, 0) else {
        return diagnostic.to_string();
    };
    // miette uses 0 based indexes, but humans prefer 1-based
    let line = contents.line() + 1;
    let column = contents.column() + 1;
    let level = if diagnostic.is_error() { "error" } else { "warning" };
    match &diagnostic.help {
        Some(help) => format!("{level}: line {line}, column {column}: {diagnostic}\n  help: {help}"),
        None => format!("{level}: line {line}, column {column}: {diagnostic}"),
    }
}

fn main() {
    let input = r#"
[general]
log_level = 4x
name = "edge-01"

[mqtt..broker]
host = "10.0.0.1"
"#;
    let partial = TomlDocument::parse_lenient(input);
    for diagnostic in &partial.diagnostics {
        eprintln!("{}", describe(diagnostic));
    }
    print!("{}", partial.document);
    // Output:
    //  error: line 3, column 13: invalid digit found in string
    //    help: Integers are decimal and must fit in 32 bits.
    //  error: line 6, column 2: `mqtt..broker` is not a valid table path.
    //    help: Table paths are dot-separated names made of letters, digits, `_` and `-`.
    //  warning: line 7, column 1: Pair `host` has no valid table to belong to.
    //  [general]
    //  name = "edge-01"
}
