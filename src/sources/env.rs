//! Environment variable configuration source.

use super::{Source, SourceFactory, SourceKind};
use crate::core::LoadContext;
use crate::error::SourceError;
use crate::namespace::{DEFAULT_DELIMITER, Namespace};
use config::{Environment, Map, Source as _, Value};

/// Separator marking nesting inside a variable name.
pub const NESTING_SEPARATOR: &str = "__";

/// Environment variable configuration source.
///
/// Reads every variable starting with `<PREFIX>_`, strips the prefix, lower-cases
/// the rest and turns `__` into the namespace delimiter:
/// `APP_SERVER__PORT=8080` becomes `server.port = "8080"`.
///
/// Values are kept as strings unless [`Env::parse_values`] is enabled; typed
/// fields are still decoded from strings when the model is unmarshalled.
/// Variables whose names leave an empty key segment, such as `APP_` or
/// `APP_A____B`, are skipped.
///
/// # Examples
///
/// ```rust
/// use layered_config::sources::Env;
///
/// // APP_SERVER__PORT=8080 -> server.port = 8080
/// let source = Env::new("APP");
/// ```
#[derive(Debug, Clone)]
pub struct Env {
    prefix: String,
    parse_values: bool,
    vars: Option<Map<String, String>>,
}

impl Env {
    /// Create a new environment variable source.
    ///
    /// A trailing `_` on the prefix is optional: `"APP"` and `"APP_"` match the
    /// same variables. An empty prefix matches every variable.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('_').to_string(),
            parse_values: false,
            vars: None,
        }
    }

    /// Convert numeric and boolean looking values to numbers and booleans.
    pub fn parse_values(mut self, enabled: bool) -> Self {
        self.parse_values = enabled;
        self
    }

    /// Read from a fixed set of variables instead of the process environment.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// The normalised prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn collect(&self) -> Result<Map<String, Value>, SourceError> {
        let environment = if self.prefix.is_empty() {
            Environment::default()
        } else {
            Environment::with_prefix(&self.prefix).prefix_separator("_")
        };

        environment
            .separator(NESTING_SEPARATOR)
            .try_parsing(self.parse_values)
            .source(self.vars.clone())
            .collect()
            .map_err(SourceError::Environment)
    }
}

impl SourceFactory for Env {
    fn create(self: Box<Self>) -> Result<Box<dyn Source>, SourceError> {
        Ok(self)
    }
}

impl Source for Env {
    fn kind(&self) -> &str {
        SourceKind::Env.as_str()
    }

    fn load(&self, ctx: &LoadContext, ns: &mut Namespace) -> Result<(), SourceError> {
        ctx.check()?;
        let collected = self.collect()?;
        ctx.check()?;

        let mut map = Map::new();
        for (key, value) in collected {
            // The environment reader always nests with ".".
            let key = if ns.delimiter() == DEFAULT_DELIMITER {
                key
            } else {
                key.replace(DEFAULT_DELIMITER, ns.delimiter())
            };
            // `APP_`, `APP_A__` and `APP_A____B` leave an empty segment.
            if ns.split_key(&key).is_err() {
                tracing::debug!(
                    source = %self.name(),
                    key = %key,
                    "skipping environment variable with an empty key segment"
                );
                continue;
            }
            map.insert(key, value);
        }
        ns.merge(map)?;
        Ok(())
    }

    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }
}
