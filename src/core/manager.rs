//! The configuration manager: ordered sources, one namespace, one typed model.

use crate::core::{LoadContext, ManagerBuilder, Validate};
use crate::error::{ConfigError, LoadStage, Result};
use crate::namespace::{DEFAULT_DELIMITER, Namespace};
use crate::sources::{Source, SourceKind};
use config::{Map, Value};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Default bound on a single load.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings resolved from builder options.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) validation_enabled: bool,
    pub(crate) strict_merge: bool,
    pub(crate) load_timeout: Duration,
    pub(crate) delimiter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            validation_enabled: true,
            strict_merge: false,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// A source whose kind has been checked.
pub(crate) struct RegisteredSource {
    pub(crate) kind: SourceKind,
    pub(crate) source: Box<dyn Source>,
}

/// Merges ordered sources into a namespace and decodes it into a typed model.
///
/// Sources are applied in registration order on every load, so for any key
/// set by several sources the last one registered wins. After the sources
/// run, the namespace is decoded into the model and, unless disabled, the
/// model validates itself. The model given to the builder acts as the lowest
/// layer: a field no source mentions keeps its initial value.
///
/// A failed load is not rolled back: the namespace keeps whatever the sources
/// before the failure merged, and a failed validation leaves the model
/// holding the rejected values. Build a fresh manager if that matters.
///
/// A manager is not meant to be loaded from several threads at once; wrap it
/// in a lock if it has to be shared.
///
/// # Examples
///
/// ```rust
/// use layered_config::prelude::*;
/// use layered_config::sources::{EmbeddedDefaults, FileType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Deserialize, Serialize)]
/// #[serde(default)]
/// struct AppConfig {
///     key: String,
/// }
///
/// impl Validate for AppConfig {
///     fn validate(&self) -> std::result::Result<(), ValidationError> {
///         if self.key.is_empty() {
///             return Err(ValidationError::invalid_field("key", "is required"));
///         }
///         Ok(())
///     }
/// }
///
/// # fn example() -> Result<()> {
/// let mut manager = Manager::builder(AppConfig::default())
///     .with_source(EmbeddedDefaults::new("key = 'value'", FileType::Toml))
///     .build()?;
///
/// manager.load()?;
/// assert_eq!(manager.model().key, "value");
///
/// manager.set("key", "changed")?;
/// assert_eq!(manager.model().key, "changed");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct Manager<M> {
    namespace: Namespace,
    model: M,
    base: Map<String, Value>,
    sources: Vec<RegisteredSource>,
    settings: Settings,
}

impl<M> Manager<M> {
    /// Start building a manager around `model`.
    pub fn builder(model: M) -> ManagerBuilder<M> {
        ManagerBuilder::new(model)
    }

    pub(crate) fn from_parts(
        model: M,
        base: Map<String, Value>,
        namespace: Namespace,
        sources: Vec<RegisteredSource>,
        settings: Settings,
    ) -> Self {
        Self {
            namespace,
            model,
            base,
            sources,
            settings,
        }
    }

    /// The model as of the last successful unmarshal.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consume the manager, keeping only the model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// The merged key/value tree.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Kinds of the registered sources, in precedence order.
    pub fn source_kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|entry| entry.kind).collect()
    }

    /// Names of the registered sources, in precedence order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|entry| entry.source.name()).collect()
    }

    /// Whether loads validate the model.
    pub fn validation_enabled(&self) -> bool {
        self.settings.validation_enabled
    }

    /// Whether the namespace rejects type-changing merges.
    pub fn strict_merge(&self) -> bool {
        self.settings.strict_merge
    }

    /// The bound applied to each load.
    pub fn load_timeout(&self) -> Duration {
        self.settings.load_timeout
    }
}

impl<M: Validate> Manager<M> {
    /// Run the model's validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the model rejects its contents.
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        Ok(())
    }
}

impl<M: DeserializeOwned + Validate> Manager<M> {
    /// Load every source, unmarshal and validate, bounded by the load timeout.
    ///
    /// # Errors
    ///
    /// See [`Manager::load_with`].
    pub fn load(&mut self) -> Result<()> {
        self.load_with(&LoadContext::background())
    }

    /// Like [`Manager::load`], under a caller-supplied context.
    ///
    /// The effective context is a child of `ctx` bounded by the load timeout;
    /// cancelling `ctx` cancels the load.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The context is cancelled or expires between stages
    /// - Any source fails (carrying its index and kind)
    /// - The namespace does not decode into the model
    /// - Validation is enabled and fails
    pub fn load_with(&mut self, ctx: &LoadContext) -> Result<()> {
        let ctx = ctx.child_with_timeout(self.settings.load_timeout);
        let started = Instant::now();
        let span = tracing::debug_span!("config_load", sources = self.sources.len());
        let _guard = span.enter();

        for (index, entry) in self.sources.iter().enumerate() {
            let kind = entry.kind;
            ctx.check().map_err(|source| ConfigError::Interrupted {
                stage: LoadStage::Source { index, kind },
                source,
            })?;

            tracing::debug!(index, %kind, source = %entry.source.name(), "loading source");
            entry
                .source
                .load(&ctx, &mut self.namespace)
                .map_err(|source| ConfigError::SourceLoad {
                    index,
                    kind,
                    source,
                })?;
        }

        ctx.check().map_err(|source| ConfigError::Interrupted {
            stage: LoadStage::Unmarshal,
            source,
        })?;
        self.unmarshal()?;

        if self.settings.validation_enabled {
            self.validate()?;
        }

        tracing::debug!(
            keys = self.namespace.len(),
            elapsed = ?started.elapsed(),
            "configuration loaded"
        );
        Ok(())
    }

    /// Set `key` directly and refresh the model. Does not validate.
    ///
    /// The value survives until a later load or set overrides it; sources
    /// that do not mention `key` leave it in place on reload.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Set`] if the key is malformed or strict merging
    /// rejects the value, and [`ConfigError::Unmarshal`] if the model no
    /// longer decodes. In the latter case the namespace keeps the new value.
    pub fn set(&mut self, key: &str, value: impl Into<config::Value>) -> Result<()> {
        self.namespace
            .set(key, value)
            .map_err(|source| ConfigError::Set {
                key: key.to_string(),
                source,
            })?;
        self.unmarshal()
    }

    fn unmarshal(&mut self) -> Result<()> {
        self.model = self
            .namespace
            .unmarshal_over(&self.base)
            .map_err(ConfigError::Unmarshal)?;
        Ok(())
    }
}
