// Shows how to load a config, adjust a few values and keep a list sorted
// before writing it back out.
//
// Usage: edit-config [INPUT [OUTPUT]]
//
// Without INPUT a built-in sample is used. Set RUST_LOG=tomlet=trace to see
// what the parser does.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use tomlet::{FormatConfig, TomlDocument, TomlValue};

const SAMPLE: &str = r#"
# gateway settings
[general]
log_level = 4
ratio = 0.25

[mqtt]
topics = ["sensors", "alerts"]

[[mqtt.brokers]]
host = "10.0.0.1"
port = 1883
"#;

fn main() -> miette::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mut doc = match args.next() {
        Some(input) => TomlDocument::open(input)?,
        None => SAMPLE.parse()?,
    };
    println!("{doc}");

    if let Ok(level) = doc.get_int("general", "log_level") {
        println!("general.log_level = {level}");
        doc.set("general", "log_level", 2)?;
    }
    if doc.get_float("general", "ratio").is_ok() {
        doc.set("general", "ratio", 0.5)?;
    }

    if let Ok(topics) = doc.get_array_mut("mqtt", "topics") {
        topics.push("commands");
        let mut sorted: Vec<TomlValue> = topics.iter().cloned().collect();
        sorted.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        *topics = sorted.into_iter().collect();
    }

    let broker = doc.resolve_array_of_tables(&"mqtt.brokers".parse()?);
    broker.insert("host", "10.0.0.2");
    broker.insert("port", 8883);

    let config = FormatConfig::new().with_indent(2);
    match args.next() {
        Some(output) => doc.save_with(output, &config)?,
        None => print!("{}", doc.to_string_with(&config)),
    }

    // output, for the built-in sample:
    // [general]
    //   log_level = 2
    //   ratio = 0.50
    //
    // [mqtt]
    //   topics = ["alerts", "commands", "sensors"]
    //
    //   [[mqtt.brokers]]
    //     host = "10.0.0.1"
    //     port = 1883
    //
    //   [[mqtt.brokers]]
    //     host = "10.0.0.2"
    //     port = 8883

    Ok(())
}
