use pretty_assertions::assert_eq;
use tomlet::{TomlDocument, TomlError, TomlPath, TomlValue, TomlValueType};

const GATEWAY: &str = r#"
[general]
log_level = 4
log_json = false

[logging]
level = "debug"

[integration]
enabled = [
  "mqtt",
]

[integration.mqtt]
server = "tcp://localhost:1883/"
keep_alive = 30.0

[[servers]]
ip = "a"

[[servers]]
ip = "b"
"#;

fn gateway() -> miette::Result<TomlDocument> {
    Ok(GATEWAY.parse()?)
}

#[test]
fn reads_typed_values() -> miette::Result<()> {
    let doc = gateway()?;
    assert_eq!(doc.get_int("general", "log_level")?, 4);
    assert!(!doc.get_bool("general", "log_json")?);
    assert_eq!(doc.get_string("logging", "level")?, "debug");
    assert_eq!(doc.get_float("integration.mqtt", "keep_alive")?, 30.0);
    assert_eq!(doc.get("integration.mqtt", "keep_alive")?.precision(), Some(1));
    assert_eq!(doc.array_get("integration", "enabled", 0)?.as_str(), Some("mqtt"));
    Ok(())
}

#[test]
fn lookup_failures() -> miette::Result<()> {
    let doc = gateway()?;
    assert!(matches!(
        doc.get("nope", "x"),
        Err(TomlError::TableNotFound(path)) if path == "nope"
    ));
    assert!(matches!(
        doc.get("general", "nope"),
        Err(TomlError::KeyNotFound { path, key }) if path == "general" && key == "nope"
    ));
    assert!(matches!(doc.get(".general", "x"), Err(TomlError::MalformedPath(_))));
    // Lookups are exact: `mqtt` is only reachable through its full path.
    assert!(matches!(doc.get("mqtt", "server"), Err(TomlError::TableNotFound(_))));
    assert_eq!(
        doc.find_table_deep("mqtt").and_then(|t| t.get("server")),
        Some(&TomlValue::from("tcp://localhost:1883/"))
    );
    Ok(())
}

#[test]
fn set_keeps_type() -> miette::Result<()> {
    let mut doc = gateway()?;
    doc.set("general", "log_level", 3)?;
    assert_eq!(doc.get_int("general", "log_level")?, 3);

    let err = doc.set("general", "log_level", "oops").unwrap_err();
    assert!(matches!(
        err,
        TomlError::TypeMismatch {
            expected: TomlValueType::Int,
            found: TomlValueType::String
        }
    ));
    assert_eq!(doc.get_int("general", "log_level")?, 3);

    doc.set("integration.mqtt", "keep_alive", 45.25)?;
    assert_eq!(
        doc.get("integration.mqtt", "keep_alive")?,
        &TomlValue::float_with_precision(45.25, 1)
    );
    doc.set(
        "integration.mqtt",
        "keep_alive",
        TomlValue::float_with_precision(45.25, 2),
    )?;
    assert!(doc.to_string().contains("keep_alive = 45.25\n"));
    Ok(())
}

#[test]
fn array_elements() -> miette::Result<()> {
    let mut doc = gateway()?;
    doc.array_push("integration", "enabled", "postgresql")?;
    assert_eq!(doc.get_array("integration", "enabled")?.len(), 2);

    assert!(matches!(
        doc.array_get("integration", "enabled", 2),
        Err(TomlError::IndexOutOfRange { index: 2, len: 2 })
    ));
    assert!(matches!(
        doc.array_set("integration", "enabled", 2, "x"),
        Err(TomlError::IndexOutOfRange { index: 2, len: 2 })
    ));

    let old = doc.array_set("integration", "enabled", 0, "amqp")?;
    assert_eq!(old, TomlValue::from("mqtt"));
    assert!(doc
        .to_string()
        .contains("enabled = [\"amqp\", \"postgresql\"]\n"));

    assert!(matches!(
        doc.array_push("general", "log_level", 1),
        Err(TomlError::TypeMismatch {
            expected: TomlValueType::Array,
            found: TomlValueType::Int
        })
    ));
    Ok(())
}

#[test]
fn array_of_tables_instances_are_independent() -> miette::Result<()> {
    let mut doc = gateway()?;
    let servers = doc.array_of_tables("servers")?;
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0].get("ip"), Some(&TomlValue::from("a")));
    assert_eq!(servers[1].get("ip"), Some(&TomlValue::from("b")));

    doc.array_of_tables_mut("servers")?[0].insert("ip", "c");
    let servers = doc.array_of_tables("servers")?;
    assert_eq!(servers[0].get("ip"), Some(&TomlValue::from("c")));
    assert_eq!(servers[1].get("ip"), Some(&TomlValue::from("b")));

    assert!(matches!(
        doc.array_of_tables("general"),
        Err(TomlError::NotArrayOfTables(_))
    ));
    Ok(())
}

#[test]
fn path_resolution() -> miette::Result<()> {
    let mut doc: TomlDocument = "[a]\nx = 1\n[a.b]\ny = 2\n".parse()?;
    let path: TomlPath = "a.c".parse()?;
    doc.resolve_array_of_tables(&path).insert("n", 1);
    doc.resolve_array_of_tables(&path);
    doc.resolve_array_of_tables(&path).insert("n", 3);
    let b = doc.resolve(&"a.b".parse()?).map(|t| t.get("y"));
    assert_eq!(b, Some(Some(&TomlValue::Int(2))));

    let instances = doc.array_of_tables("a.c")?;
    assert_eq!(instances.len(), 3);
    assert_eq!(instances[0].get("n"), Some(&TomlValue::Int(1)));
    assert!(instances[1].pairs().is_empty());
    assert_eq!(instances[2].get("n"), Some(&TomlValue::Int(3)));
    Ok(())
}

#[test]
fn build_from_scratch() -> miette::Result<()> {
    let mut doc = TomlDocument::new();
    doc.insert("general", "log_level", 4)?;
    doc.insert("sqlite", "path", "/tmp/db.sqlite")?;
    doc.insert("sqlite", "max_open_connections", 4)?;
    doc.insert("integration.mqtt", "topics", vec!["up", "down"])?;
    assert_eq!(doc.insert("general", "log_level", 5)?, Some(TomlValue::Int(4)));
    assert_eq!(
        doc.to_string(),
        r#"[general]
log_level = 5

[sqlite]
path = "/tmp/db.sqlite"
max_open_connections = 4

[integration]

[integration.mqtt]
topics = ["up", "down"]
"#
    );
    Ok(())
}

#[test]
fn open_and_save() -> miette::Result<()> {
    let dir = std::env::temp_dir().join(format!("tomlet-{}", std::process::id()));
    std::fs::create_dir_all(&dir).map_err(TomlError::from)?;
    let input = dir.join("in.toml");
    let output = dir.join("out.toml");
    std::fs::write(&input, GATEWAY).map_err(TomlError::from)?;

    let mut doc = TomlDocument::open(&input)?;
    doc.set("general", "log_level", 3)?;
    doc.save(&output)?;

    let reloaded = TomlDocument::open(&output)?;
    assert_eq!(reloaded.get_int("general", "log_level")?, 3);
    assert_eq!(reloaded, doc);

    assert!(matches!(
        TomlDocument::open(dir.join("missing.toml")),
        Err(TomlError::Io(_))
    ));

    std::fs::write(&input, "[a]\nx = ?\ny = 1\n").map_err(TomlError::from)?;
    assert!(matches!(TomlDocument::open(&input), Err(TomlError::Parse(_))));
    let partial = TomlDocument::open_lenient(&input)?;
    assert_eq!(partial.diagnostics.len(), 1);
    assert_eq!(partial.document.get_int("a", "y")?, 1);

    std::fs::remove_dir_all(&dir).map_err(TomlError::from)?;
    Ok(())
}
