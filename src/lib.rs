//! # layered-config
//!
//! Typed configuration assembled from ordered sources with deterministic precedence.
//!
//! ## Overview
//!
//! `layered-config` merges values from several inputs into one namespace and
//! decodes the result into your own configuration struct:
//! - Sources are applied in registration order; later sources win on conflicts
//! - Embedded defaults, local files (TOML, YAML, JSON), environment variables,
//!   command-line flags and in-memory structs are supported out of the box
//! - Any source can be made optional, tolerating all or selected load errors
//! - The model validates itself after every load
//!
//! ## Quick Start
//!
//! ```rust
//! use layered_config::prelude::*;
//! use layered_config::sources::{EmbeddedDefaults, Env, FileType, LocalFile, Optional};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Deserialize, Serialize)]
//! #[serde(default)]
//! struct AppConfig {
//!     server: ServerConfig,
//! }
//!
//! #[derive(Debug, Default, Deserialize, Serialize)]
//! #[serde(default)]
//! struct ServerConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! impl Validate for AppConfig {
//!     fn validate(&self) -> std::result::Result<(), ValidationError> {
//!         if self.server.port == 0 {
//!             return Err(ValidationError::invalid_field("server.port", "must be set"));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn example() -> Result<()> {
//! let manager = Manager::builder(AppConfig::default())
//!     .with_source(EmbeddedDefaults::new(
//!         "[server]\nhost = 'localhost'\nport = 8080",
//!         FileType::Toml,
//!     ))
//!     .with_source(Optional::new(LocalFile::new("config/local.yaml")).allow_not_found())
//!     .with_source(Env::new("APP"))
//!     .init()?;
//!
//! println!("listening on {}:{}", manager.model().server.host, manager.model().server.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): the [`sources::Flags`] source for `clap` arguments

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod namespace;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{LoadContext, Manager, ManagerBuilder, Validate};
    pub use crate::error::{ConfigError, Result, SourceError, ValidationError};
    pub use crate::sources::{Source, SourceFactory, SourceKind};
}
