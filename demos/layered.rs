//! Example layering embedded defaults, a local file, environment variables
//! and command-line flags into one service configuration.
//!
//! This example shows how to:
//! - Ship defaults inside the binary
//! - Let an optional local file override them
//! - Override both from `LAYERED_*` environment variables
//! - Override everything from command-line flags
//!
//! Run with: cargo run --example layered -- --port 9090 --config local.yaml

use clap::{Arg, Command};
use layered_config::prelude::*;
use layered_config::sources::{EmbeddedDefaults, Env, FileType, Flags, LocalFile, Optional};
use serde::{Deserialize, Serialize};

const DEFAULTS: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
url = "postgres://localhost/app"
max_connections = 10
"#;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct ServiceConfig {
    server: ServerConfig,
    database: DatabaseConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct ServerConfig {
    host: String,
    port: u16,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct DatabaseConfig {
    url: String,
    max_connections: u32,
}

impl Validate for ServiceConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.server.port == 0 {
            errors.push(ValidationError::invalid_field("server.port", "must be set"));
        }
        if self.database.max_connections == 0 {
            errors.push(ValidationError::invalid_field(
                "database.max_connections",
                "must be at least 1",
            ));
        }
        match ValidationError::from_errors(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn main() -> Result<()> {
    println!("=== Layered Configuration Example ===\n");

    let mut command = Command::new("layered")
        .arg(
            Arg::new("config")
                .long("config")
                .default_value("config/local.yaml"),
        )
        .arg(Arg::new("server.host").long("host"))
        .arg(Arg::new("server.port").long("port"));
    let matches = command.get_matches_mut();

    let local = matches
        .get_one::<String>("config")
        .cloned()
        .unwrap_or_default();

    let manager = Manager::builder(ServiceConfig::default())
        .with_source(EmbeddedDefaults::new(DEFAULTS, FileType::Toml))
        .with_source(Optional::new(LocalFile::new(&local)).allow_not_found())
        .with_source(Env::new("LAYERED"))
        .with_source(Flags::new(&command, &matches))
        .init()?;

    println!("Sources, lowest precedence first:");
    for name in manager.source_names() {
        println!("  - {name}");
    }
    println!();

    let cfg = manager.model();
    println!("Server:   {}:{}", cfg.server.host, cfg.server.port);
    println!(
        "Database: {} (max {} connections)",
        cfg.database.url, cfg.database.max_connections
    );

    println!("\nResolved keys:");
    for (key, value) in manager.namespace().flatten() {
        println!("  {key} = {value}");
    }

    Ok(())
}
