//! Integration tests for precedence and deep merging across sources.

use layered_config::error::{ConfigError, NamespaceError, ValidationError};
use layered_config::prelude::*;
use layered_config::sources::{EmbeddedDefaults, Env, FileType, LocalFile, StructSource};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
struct Address {
    country_code: String,
    city: String,
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
struct ServiceConfig {
    port: u16,
    address: Address,
    language: String,
}

impl Validate for ServiceConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        Ok(())
    }
}

#[test]
fn test_three_layer_merge() {
    let temp_dir = TempDir::new().unwrap();
    let layers = [
        (
            "conf1.toml",
            "port = 8000\nlanguage = 'en'\n\n[address]\ncountry_code = 'US'\ncity = 'Boston'\n",
        ),
        ("conf2.toml", "[address]\ncountry_code = 'NL'\ncity = ''\n"),
        ("conf3.toml", "port = 8080\nlanguage = 'nl'\n"),
    ];

    let mut builder = Manager::builder(ServiceConfig::default());
    for (name, contents) in layers {
        let path = temp_dir.path().join(name);
        fs::write(&path, contents).unwrap();
        builder = builder.with_source(LocalFile::new(path));
    }
    let manager = builder.init().unwrap();

    assert_eq!(
        manager.model(),
        &ServiceConfig {
            port: 8080,
            address: Address {
                country_code: "NL".to_string(),
                // An explicit empty string still overrides.
                city: String::new(),
            },
            language: "nl".to_string(),
        }
    );
}

#[test]
fn test_partial_overlap() {
    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(default)]
    struct Pair {
        a: i64,
        b: i64,
    }

    impl Validate for Pair {
        fn validate(&self) -> std::result::Result<(), ValidationError> {
            Ok(())
        }
    }

    let manager = Manager::builder(Pair::default())
        .with_source(EmbeddedDefaults::new("a = 1\nb = 2", FileType::Toml))
        .with_source(EmbeddedDefaults::new(r#"{"b": 3}"#, FileType::Json))
        .init()
        .unwrap();

    assert_eq!(manager.model(), &Pair { a: 1, b: 3 });
}

#[test]
fn test_precedence_ignores_source_kind() {
    #[derive(Serialize)]
    struct Overrides {
        port: u16,
        language: String,
    }

    // A struct registered first loses to the embedded defaults after it.
    let manager = Manager::builder(ServiceConfig::default())
        .with_source(StructSource::new(&Overrides {
            port: 1,
            language: "de".to_string(),
        }))
        .with_source(Env::new("MERGE").with_vars([("MERGE_LANGUAGE", "fr")]))
        .with_source(EmbeddedDefaults::new("port = 2", FileType::Toml))
        .init()
        .unwrap();

    assert_eq!(manager.model().port, 2);
    assert_eq!(manager.model().language, "fr");
}

#[test]
fn test_initial_model_is_lowest_layer() {
    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Listener {
        host: String,
        port: u16,
        backlog: u32,
    }

    impl Validate for Listener {
        fn validate(&self) -> std::result::Result<(), ValidationError> {
            Ok(())
        }
    }

    let mut manager = Manager::builder(Listener {
        host: "0.0.0.0".to_string(),
        port: 8080,
        backlog: 128,
    })
    .with_source(EmbeddedDefaults::new("host = 'localhost'", FileType::Toml))
    .with_source(Env::new("LISTEN").with_vars([("LISTEN_BACKLOG", "512")]))
    .build()
    .unwrap();

    manager.load().unwrap();
    assert_eq!(
        manager.model(),
        &Listener {
            host: "localhost".to_string(),
            port: 8080, // Initial value
            backlog: 512,
        }
    );

    manager.set("host", "example.org").unwrap();
    assert_eq!(manager.model().port, 8080);
}

#[test]
fn test_set_overrides_until_next_source_mentions_key() {
    let mut manager = Manager::builder(ServiceConfig::default())
        .with_source(EmbeddedDefaults::new("language = 'en'", FileType::Toml))
        .init()
        .unwrap();

    manager.set("port", 9000).unwrap();
    manager.set("language", "nl").unwrap();
    assert_eq!(manager.model().port, 9000);

    manager.load().unwrap();
    assert_eq!(manager.model().port, 9000);
    assert_eq!(manager.model().language, "en");
}

#[test]
fn test_strict_merge_rejects_type_change() {
    let mut manager = Manager::builder(ServiceConfig::default())
        .with_source(EmbeddedDefaults::new(
            "[address]\ncity = 'Delft'",
            FileType::Toml,
        ))
        .with_source(EmbeddedDefaults::new("address = 'flat'", FileType::Toml))
        .with_strict_merge(true)
        .build()
        .unwrap();

    let err = manager.load().unwrap_err();
    match err {
        ConfigError::SourceLoad {
            index: 1, source, ..
        } => assert!(matches!(
            source,
            SourceError::Namespace(NamespaceError::TypeMismatch { .. })
        )),
        other => panic!("unexpected error: {other}"),
    }

    // Without strict merging a later string may replace an integer.
    let manager = Manager::builder(ServiceConfig::default())
        .with_source(EmbeddedDefaults::new("port = 1", FileType::Toml))
        .with_source(EmbeddedDefaults::new("port = '2'", FileType::Toml))
        .init()
        .unwrap();
    assert_eq!(manager.model().port, 2);
}

#[test]
fn test_custom_delimiter_applies_to_keys() {
    let mut manager = Manager::builder(ServiceConfig::default())
        .with_delimiter("/")
        .with_source(EmbeddedDefaults::new(
            "[address]\ncity = 'Delft'",
            FileType::Toml,
        ))
        .init()
        .unwrap();

    assert!(manager.namespace().exists("address/city"));
    manager.set("address/country_code", "NL").unwrap();
    assert_eq!(manager.model().address.country_code, "NL");
    assert_eq!(manager.model().address.city, "Delft");
}

#[cfg(feature = "cli")]
#[test]
fn test_flags_win_over_env() {
    use clap::{Arg, Command};
    use layered_config::sources::Flags;

    let mut command = Command::new("svc").arg(Arg::new("port").long("port"));
    let matches = command.try_get_matches_from_mut(["svc", "--port", "7000"]).unwrap();

    let manager = Manager::builder(ServiceConfig::default())
        .with_source(Env::new("SVC").with_vars([("SVC_PORT", "6000"), ("SVC_LANGUAGE", "it")]))
        .with_source(Flags::new(&command, &matches))
        .init()
        .unwrap();

    assert_eq!(manager.model().port, 7000);
    assert_eq!(manager.model().language, "it");
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct Single {
    key: i64,
}

impl Validate for Single {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct KeyOnly {
    key: i64,
}

proptest! {
    #[test]
    fn prop_last_source_wins(values in prop::collection::vec(any::<i64>(), 1..8)) {
        let mut builder = Manager::builder(Single::default());
        for (i, value) in values.iter().enumerate() {
            builder = if i % 2 == 0 {
                builder.with_source(EmbeddedDefaults::new(format!("key = {value}"), FileType::Toml))
            } else {
                builder.with_source(StructSource::new(&KeyOnly { key: *value }))
            };
        }

        let manager = builder.init().unwrap();
        prop_assert_eq!(manager.model().key, *values.last().unwrap());
    }

    #[test]
    fn prop_unrelated_keys_survive(a in any::<i64>(), b in any::<i64>()) {
        let manager = Manager::builder(Single::default())
            .with_source(EmbeddedDefaults::new(format!("key = {a}\nother = 1"), FileType::Toml))
            .with_source(EmbeddedDefaults::new(format!("key = {b}"), FileType::Toml))
            .init()
            .unwrap();

        prop_assert_eq!(manager.model().key, b);
        prop_assert!(manager.namespace().exists("other"));
    }
}
