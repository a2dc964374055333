//! Builder for constructing Manager instances.

use crate::core::manager::{RegisteredSource, Settings};
use crate::core::{Manager, Validate};
use crate::error::{ConfigError, OptionError, Result, SourceError};
use crate::namespace::Namespace;
use crate::sources::{Source, SourceFactory, SourceKind, to_table};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A recorded builder call, applied in order by [`ManagerBuilder::build`].
enum BuildOption {
    Validation(bool),
    StrictMerge(bool),
    LoadTimeout(Duration),
    Delimiter(String),
    Sources(Vec<Box<dyn SourceFactory>>),
}

impl BuildOption {
    fn apply(
        self,
        settings: &mut Settings,
        sources: &mut Vec<Box<dyn Source>>,
    ) -> std::result::Result<(), OptionError> {
        match self {
            Self::Validation(enabled) => settings.validation_enabled = enabled,
            Self::StrictMerge(strict) => settings.strict_merge = strict,
            Self::LoadTimeout(timeout) => {
                if timeout.is_zero() {
                    return Err(OptionError::ZeroTimeout(timeout));
                }
                settings.load_timeout = timeout;
            }
            Self::Delimiter(delimiter) => {
                if delimiter.is_empty() {
                    return Err(OptionError::EmptyDelimiter);
                }
                settings.delimiter = delimiter;
            }
            Self::Sources(factories) => {
                for (index, factory) in factories.into_iter().enumerate() {
                    let source = factory
                        .create()
                        .map_err(|source| OptionError::Source { index, source })?;
                    sources.push(source);
                }
            }
        }
        Ok(())
    }
}

/// Builder for constructing a [`Manager`].
///
/// Every `with_*` call is recorded and applied in call order when
/// [`build`](Self::build) runs. Sources are registered in that same order,
/// which is their precedence order: later sources override earlier ones.
///
/// # Examples
///
/// ```rust
/// use layered_config::prelude::*;
/// use layered_config::sources::{EmbeddedDefaults, Env, FileType, LocalFile, Optional};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Deserialize, Serialize)]
/// #[serde(default)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// impl Validate for AppConfig {
///     fn validate(&self) -> std::result::Result<(), ValidationError> {
///         Ok(())
///     }
/// }
///
/// # fn example() -> Result<()> {
/// let manager = Manager::builder(AppConfig::default())
///     .with_source(EmbeddedDefaults::new("port = 8080", FileType::Toml))
///     .with_source(Optional::new(LocalFile::new("config/local.toml")).allow_not_found())
///     .with_source(Env::new("APP"))
///     .init()?;
///
/// println!("port: {}", manager.model().port);
/// # Ok(())
/// # }
/// ```
pub struct ManagerBuilder<M> {
    model: M,
    options: Vec<BuildOption>,
}

impl<M> ManagerBuilder<M> {
    /// Create a builder around the model instance that loads will overwrite.
    pub fn new(model: M) -> Self {
        Self {
            model,
            options: Vec::new(),
        }
    }

    /// Enable or disable validation after each load. Enabled by default.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.options.push(BuildOption::Validation(enabled));
        self
    }

    /// Add a source. It overrides every source registered before it.
    pub fn with_source<F>(self, factory: F) -> Self
    where
        F: SourceFactory + 'static,
    {
        self.with_sources(vec![Box::new(factory) as Box<dyn SourceFactory>])
    }

    /// Add several sources as a single option, in the given order.
    ///
    /// If one of them fails to build, the error carries both the option's
    /// index and the source's index within it.
    pub fn with_sources<I>(mut self, factories: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn SourceFactory>>,
    {
        self.options
            .push(BuildOption::Sources(factories.into_iter().collect()));
        self
    }

    /// Add a ready-made source that needs no construction step.
    ///
    /// Its kind label is still checked when the manager is built.
    pub fn with_source_instance<S>(self, source: S) -> Self
    where
        S: Source + 'static,
    {
        self.with_source(move || -> std::result::Result<Box<dyn Source>, SourceError> {
            Ok(Box::new(source))
        })
    }

    /// Reject merges that change the type of a stored value. Off by default.
    pub fn with_strict_merge(mut self, strict: bool) -> Self {
        self.options.push(BuildOption::StrictMerge(strict));
        self
    }

    /// Bound each load, sources and unmarshal included. Defaults to 10 seconds.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.options.push(BuildOption::LoadTimeout(timeout));
        self
    }

    /// Separator between nested key segments. Defaults to `.`.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.options.push(BuildOption::Delimiter(delimiter.into()));
        self
    }

    /// Apply every option and create the manager without loading anything.
    ///
    /// Options run in call order, then every source's kind is checked, and
    /// only then is the namespace created. The model handed to
    /// [`new`](Self::new) is serialized once and kept as the lowest layer:
    /// fields no source mentions keep their initial values on every load.
    ///
    /// # Errors
    ///
    /// Returns the first failing option with its index, the first source
    /// with an unknown kind with its index, or [`ConfigError::Model`] if the
    /// model does not serialize to a table.
    pub fn build(self) -> Result<Manager<M>>
    where
        M: Serialize,
    {
        let mut settings = Settings::default();
        let mut sources = Vec::new();

        for (index, option) in self.options.into_iter().enumerate() {
            option
                .apply(&mut settings, &mut sources)
                .map_err(|source| ConfigError::Option { index, source })?;
        }

        let mut registered = Vec::with_capacity(sources.len());
        for (index, source) in sources.into_iter().enumerate() {
            let kind = source
                .kind()
                .parse::<SourceKind>()
                .map_err(|err| ConfigError::InvalidSourceKind { index, source: err })?;
            registered.push(RegisteredSource { kind, source });
        }

        let base = to_table(&self.model).map_err(ConfigError::Model)?;
        let namespace = Namespace::new(settings.delimiter.clone(), settings.strict_merge);
        Ok(Manager::from_parts(
            self.model, base, namespace, registered, settings,
        ))
    }

    /// Build the manager and load it once.
    ///
    /// # Errors
    ///
    /// Returns whichever of [`build`](Self::build) or [`Manager::load`] failed.
    pub fn init(self) -> Result<Manager<M>>
    where
        M: Serialize + DeserializeOwned + Validate,
    {
        let mut manager = self.build()?;
        manager.load()?;
        Ok(manager)
    }
}
