//! Property-based round-trip tests.
//!
//! Documents are built through the accessor API from random paths, keys and
//! values, then written and parsed back. Floats are generated as an integer
//! mantissa over a power of ten with a matching explicit precision, so the
//! written text always reads back as the same `f64`.
use proptest::prelude::*;
use tomlet::{FormatConfig, TomlArray, TomlDocument, TomlPath, TomlValue};

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_-]{0,7}").unwrap()
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_name(),
        1 => prop::string::string_regex("[a-z .]{1,8}").unwrap(),
    ]
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        prop::string::string_regex("[a-z#\\[\\],'=.]{0,12}").unwrap(),
        Just("line1\nline2".to_string()),
        Just("col1\tcol2\r".to_string()),
        Just("path\\to\\file".to_string()),
        Just("say \"hi\"".to_string()),
        Just("caf\u{00e9}".to_string()),
    ]
}

fn arb_float() -> impl Strategy<Value = TomlValue> {
    (-1_000_000i64..1_000_000i64, 1usize..5usize).prop_map(|(mantissa, precision)| {
        let value = mantissa as f64 / 10f64.powi(precision as i32);
        TomlValue::float_with_precision(value, precision)
    })
}

fn arb_scalar() -> impl Strategy<Value = TomlValue> {
    prop_oneof![
        arb_string().prop_map(TomlValue::from),
        any::<i32>().prop_map(TomlValue::from),
        arb_float(),
        any::<bool>().prop_map(TomlValue::from),
    ]
}

fn arb_value() -> impl Strategy<Value = TomlValue> {
    arb_scalar().prop_recursive(3, 24, 5, |inner| {
        prop::collection::vec(inner, 0..5)
            .prop_map(|values| TomlValue::from(values.into_iter().collect::<TomlArray>()))
    })
}

fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_name(), 1..4).prop_map(|segments| segments.join("."))
}

/// A document built from `(path, key, value)` inserts, plus a few
/// array-of-tables instances.
fn arb_document() -> impl Strategy<Value = TomlDocument> {
    (
        prop::collection::vec((arb_path(), arb_key(), arb_value()), 0..12),
        prop::collection::vec((arb_path(), arb_key(), arb_scalar()), 0..4),
    )
        .prop_map(|(inserts, instances)| {
            let mut doc = TomlDocument::new();
            for (path, key, value) in inserts {
                doc.insert(&path, &key, value).unwrap();
            }
            for (path, key, value) in instances {
                let path: TomlPath = path.parse().unwrap();
                doc.resolve_array_of_tables(&path).insert(&key, value);
            }
            doc
        })
}

proptest! {
    #[test]
    fn roundtrip(doc in arb_document()) {
        let written = doc.to_string();
        let reparsed: TomlDocument = written.parse().unwrap();
        prop_assert_eq!(&reparsed, &doc);
    }

    #[test]
    fn idempotent(doc in arb_document(), indent in 0usize..4) {
        let config = FormatConfig::new().with_indent(indent);
        let written = doc.to_string_with(&config);
        let reparsed: TomlDocument = written.parse().unwrap();
        prop_assert_eq!(reparsed.to_string_with(&config), written);
    }

    #[test]
    fn standalone_values(value in arb_value()) {
        let reparsed: TomlValue = value.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, value);
    }

    #[test]
    fn lenient_parsing_never_panics(input in "[\\[\\]a-z0-9=\"'#., \n-]{0,80}") {
        let partial = TomlDocument::parse_lenient(&input);
        // Whatever survived must itself be writable and parse cleanly.
        let written = partial.document.to_string();
        prop_assert!(written.parse::<TomlDocument>().is_ok(), "{:?}", written);
    }
}
