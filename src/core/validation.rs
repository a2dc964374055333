//! The validation contract every configuration model implements.

use crate::error::ValidationError;

/// Trait for configuration validation.
///
/// A [`Manager`](super::Manager) calls this after every load while validation
/// is enabled, on the fully merged model. Models without constraints can
/// return `Ok(())`.
///
/// Constraints usually span several fields, and those fields may come from
/// different sources, so checks belong here rather than in each source.
///
/// # Examples
///
/// ```rust
/// use layered_config::prelude::*;
/// use layered_config::sources::{EmbeddedDefaults, Env, FileType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Deserialize, Serialize)]
/// #[serde(default)]
/// struct PoolConfig {
///     min_connections: u32,
///     max_connections: u32,
///     tls: bool,
///     ca_file: Option<String>,
/// }
///
/// impl Validate for PoolConfig {
///     fn validate(&self) -> std::result::Result<(), ValidationError> {
///         let mut errors = Vec::new();
///         if self.min_connections > self.max_connections {
///             errors.push(ValidationError::invalid_field(
///                 "min_connections",
///                 "must not exceed max_connections",
///             ));
///         }
///         if self.tls && self.ca_file.is_none() {
///             errors.push(ValidationError::invalid_field("ca_file", "required when tls is on"));
///         }
///         ValidationError::from_errors(errors).map_or(Ok(()), Err)
///     }
/// }
///
/// // The defaults are fine on their own; the environment breaks them.
/// let result = Manager::builder(PoolConfig::default())
///     .with_source(EmbeddedDefaults::new(
///         "min_connections = 2\nmax_connections = 10",
///         FileType::Toml,
///     ))
///     .with_source(Env::new("POOL").with_vars([("POOL_MAX_CONNECTIONS", "1")]))
///     .init();
///
/// assert!(matches!(result, Err(ConfigError::Validation(_))));
/// ```
pub trait Validate {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}
