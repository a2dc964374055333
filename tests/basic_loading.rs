//! Integration tests for basic configuration loading.

#![allow(unsafe_code)] // For env var manipulation in tests

use layered_config::error::{ConfigError, ValidationError};
use layered_config::prelude::*;
use layered_config::sources::{
    EmbeddedDefaults, Env, FileType, LocalFile, Optional, StructSource,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
struct ServerConfig {
    port: u16,
    host: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
struct DatabaseConfig {
    url: String,
    max_connections: u32,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
struct AppConfig {
    server: ServerConfig,
    database: DatabaseConfig,
}

impl Validate for AppConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.server.port < 1024 {
            return Err(ValidationError::invalid_field(
                "server.port",
                "must be >= 1024",
            ));
        }
        Ok(())
    }
}

const BASE_YAML: &str = r#"
server:
  port: 8080
  host: localhost
database:
  url: postgres://localhost/db
  max_connections: 10
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_single_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(&temp_dir, "config.yaml", BASE_YAML);

    let manager = Manager::builder(AppConfig::default())
        .with_source(LocalFile::new(&config_path))
        .init()
        .unwrap();

    let cfg = manager.model();
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.server.host, "localhost");
    assert_eq!(cfg.database.url, "postgres://localhost/db");
    assert_eq!(cfg.database.max_connections, 10);
}

#[test]
fn test_file_precedence() {
    let temp_dir = TempDir::new().unwrap();
    let default_path = write(&temp_dir, "default.yaml", BASE_YAML);
    // Override config only touches the port, in another format
    let override_path = write(&temp_dir, "override.toml", "[server]\nport = 9090\n");

    let manager = Manager::builder(AppConfig::default())
        .with_source(LocalFile::new(&default_path))
        .with_source(LocalFile::new(&override_path))
        .init()
        .unwrap();

    let cfg = manager.model();
    assert_eq!(cfg.server.port, 9090); // Overridden
    assert_eq!(cfg.server.host, "localhost"); // From default
    assert_eq!(cfg.database.max_connections, 10); // From default
}

#[test]
fn test_env_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(&temp_dir, "config.yaml", BASE_YAML);

    // Unique prefix so parallel tests never see these variables
    unsafe {
        std::env::set_var("LAYERED_BASIC_SERVER__PORT", "9999");
        std::env::set_var("LAYERED_BASIC_DATABASE__MAX_CONNECTIONS", "50");
    }

    let result = Manager::builder(AppConfig::default())
        .with_source(LocalFile::new(&config_path))
        .with_source(Env::new("LAYERED_BASIC"))
        .init();

    unsafe {
        std::env::remove_var("LAYERED_BASIC_SERVER__PORT");
        std::env::remove_var("LAYERED_BASIC_DATABASE__MAX_CONNECTIONS");
    }

    let manager = result.unwrap();
    let cfg = manager.model();
    assert_eq!(cfg.server.port, 9999); // From env
    assert_eq!(cfg.server.host, "localhost"); // From file
    assert_eq!(cfg.database.max_connections, 50); // From env
}

#[test]
fn test_validation_failure() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(&temp_dir, "config.yaml", BASE_YAML);

    let mut manager = Manager::builder(AppConfig::default())
        .with_source(LocalFile::new(&config_path))
        .with_source(EmbeddedDefaults::new("server:\n  port: 80\n", FileType::Yaml))
        .build()
        .unwrap();

    let err = manager.load().unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("failed to validate config model"));
    assert!(err.to_string().contains("server.port"));

    // Validation is advisory: the merged values are kept.
    assert_eq!(manager.model().server.port, 80);
}

#[test]
fn test_validation_disabled() {
    let manager = Manager::builder(AppConfig::default())
        .with_source(EmbeddedDefaults::new("server:\n  port: 80\n", FileType::Yaml))
        .with_validation(false)
        .init()
        .unwrap();
    assert_eq!(manager.model().server.port, 80);
}

#[test]
fn test_reload() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(&temp_dir, "config.yaml", BASE_YAML);

    let mut manager = Manager::builder(AppConfig::default())
        .with_source(LocalFile::new(&config_path))
        .init()
        .unwrap();
    assert_eq!(manager.model().server.port, 8080);

    fs::write(&config_path, BASE_YAML.replace("8080", "9090")).unwrap();
    manager.load().unwrap();
    assert_eq!(manager.model().server.port, 9090);
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("local.toml");

    let err = Manager::builder(AppConfig::default())
        .with_source(EmbeddedDefaults::new(BASE_YAML, FileType::Yaml))
        .with_source(LocalFile::new(&missing))
        .init()
        .err()
        .unwrap();
    match err {
        ConfigError::SourceLoad {
            index: 1,
            kind: SourceKind::File,
            source,
        } => assert!(source.is_not_found()),
        other => panic!("unexpected error: {other}"),
    }

    let manager = Manager::builder(AppConfig::default())
        .with_source(EmbeddedDefaults::new(BASE_YAML, FileType::Yaml))
        .with_source(Optional::new(LocalFile::new(&missing)).allow_not_found())
        .init()
        .unwrap();
    assert_eq!(manager.model().server.port, 8080);
}

#[test]
fn test_optional_does_not_hide_parse_errors_when_filtered() {
    let temp_dir = TempDir::new().unwrap();
    let broken = write(&temp_dir, "broken.json", "{ not json");

    let result = Manager::builder(AppConfig::default())
        .with_source(EmbeddedDefaults::new(BASE_YAML, FileType::Yaml))
        .with_source(Optional::new(LocalFile::new(&broken)).allow_not_found())
        .init();
    assert!(matches!(result, Err(ConfigError::SourceLoad { index: 1, .. })));

    // Without filters every load error is tolerated.
    let result = Manager::builder(AppConfig::default())
        .with_source(EmbeddedDefaults::new(BASE_YAML, FileType::Yaml))
        .with_source(Optional::new(LocalFile::new(&broken)))
        .init();
    assert!(result.is_ok());
}

#[test]
fn test_struct_source_overrides() {
    #[derive(Serialize)]
    struct Overrides {
        server: PortOnly,
    }

    #[derive(Serialize)]
    struct PortOnly {
        port: u16,
    }

    let manager = Manager::builder(AppConfig::default())
        .with_source(EmbeddedDefaults::new(BASE_YAML, FileType::Yaml))
        .with_source(StructSource::new(&Overrides {
            server: PortOnly { port: 4443 },
        }))
        .init()
        .unwrap();

    assert_eq!(manager.model().server.port, 4443);
    assert_eq!(manager.model().server.host, "localhost");
    assert_eq!(
        manager.source_kinds(),
        vec![SourceKind::Default, SourceKind::Struct]
    );
}

#[cfg(feature = "cli")]
#[test]
fn test_flags_override_files() {
    use clap::{Arg, Command};
    use layered_config::sources::Flags;

    let mut command = Command::new("app")
        .arg(Arg::new("server.port").long("port"))
        .arg(
            Arg::new("server.host")
                .long("host")
                .default_value("0.0.0.0"),
        );
    let matches = command.try_get_matches_from_mut(["app", "--port", "7070"]).unwrap();

    let manager = Manager::builder(AppConfig::default())
        .with_source(EmbeddedDefaults::new(BASE_YAML, FileType::Yaml))
        .with_source(Flags::new(&command, &matches))
        .init()
        .unwrap();

    assert_eq!(manager.model().server.port, 7070);
    // The clap default does not override the embedded value.
    assert_eq!(manager.model().server.host, "localhost");
}

#[test]
fn test_embedded_toml_scenario() {
    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(default)]
    struct Model {
        key: String,
    }

    impl Validate for Model {
        fn validate(&self) -> std::result::Result<(), ValidationError> {
            if self.key.is_empty() {
                return Err(ValidationError::custom("key is required"));
            }
            Ok(())
        }
    }

    let mut manager = Manager::builder(Model::default())
        .with_source(EmbeddedDefaults::new("key = 'value'", FileType::Toml))
        .build()
        .unwrap();
    manager.load().unwrap();
    assert_eq!(manager.model().key, "value");
}

#[test]
fn test_expired_context() {
    let mut manager = Manager::builder(AppConfig::default())
        .with_source(EmbeddedDefaults::new(BASE_YAML, FileType::Yaml))
        .build()
        .unwrap();

    let err = manager
        .load_with(&LoadContext::with_timeout(Duration::ZERO))
        .unwrap_err();
    assert!(err.is_interrupted());
    assert!(manager.namespace().is_empty());
    assert_eq!(manager.model(), &AppConfig::default());
}

#[test]
fn test_load_timeout_bounds_slow_sources() {
    struct Slow;

    impl Source for Slow {
        fn kind(&self) -> &str {
            SourceKind::Default.as_str()
        }

        fn load(
            &self,
            ctx: &LoadContext,
            _ns: &mut layered_config::namespace::Namespace,
        ) -> std::result::Result<(), SourceError> {
            std::thread::sleep(Duration::from_millis(50));
            ctx.check()?;
            Ok(())
        }
    }

    let mut manager = Manager::builder(AppConfig::default())
        .with_source_instance(Slow)
        .with_load_timeout(Duration::from_millis(10))
        .build()
        .unwrap();

    let err = manager.load().unwrap_err();
    assert!(err.is_interrupted());
    assert!(matches!(err, ConfigError::SourceLoad { index: 0, .. }));
}
